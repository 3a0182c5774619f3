use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use backend_domain::utils::round_to_cents;
use backend_domain::{
    ContributionPage, ContributionSummary, LeaderboardEntry, LeaderboardRepository, RankingPage,
    RankingRow,
};

use crate::repositories::rows::{LeaderboardRow, RankingDbRow};

const LEADERBOARD_COLUMNS: &str = "id, user_id, resource_id, action_type, quantity_changed, \
    base_points, resource_multiplier, status_bonus, final_points, resource_name, \
    resource_category, resource_status, created_at";

#[derive(Clone)]
pub struct SqliteLeaderboardRepository {
    pool: SqlitePool,
}

impl SqliteLeaderboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Lower bound on `created_at`; the `all` window starts at the epoch.
fn window_start(since: Option<DateTime<Utc>>) -> i64 {
    since.map(|value| value.timestamp_millis()).unwrap_or(0)
}

#[async_trait]
impl LeaderboardRepository for SqliteLeaderboardRepository {
    async fn rankings(
        &self,
        since: Option<DateTime<Utc>>,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<RankingPage> {
        let start = window_start(since);
        let rows = sqlx::query_as::<_, RankingDbRow>(
            "SELECT rank, user_id, total_points, total_actions FROM ( \
                SELECT user_id, \
                    SUM(final_points) AS total_points, \
                    COUNT(*) AS total_actions, \
                    RANK() OVER (ORDER BY SUM(final_points) DESC) AS rank \
                FROM leaderboard WHERE created_at >= ? GROUP BY user_id \
            ) ORDER BY total_points DESC, user_id ASC LIMIT ? OFFSET ?",
        )
        .bind(start)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM leaderboard WHERE created_at >= ?")
                .bind(start)
                .fetch_one(&self.pool)
                .await?;

        Ok(RankingPage {
            rankings: rows
                .into_iter()
                .map(RankingRow::from)
                .map(|mut row| {
                    row.total_points = round_to_cents(row.total_points);
                    row
                })
                .collect(),
            total,
        })
    }

    async fn contributions(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
        offset: usize,
    ) -> anyhow::Result<ContributionPage> {
        let start = window_start(since);
        let rows = sqlx::query_as::<_, LeaderboardRow>(&format!(
            "SELECT {} FROM leaderboard WHERE user_id = ? AND created_at >= ? \
            ORDER BY created_at DESC LIMIT ? OFFSET ?",
            LEADERBOARD_COLUMNS
        ))
        .bind(user_id)
        .bind(start)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        let (total_points, total_actions): (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(final_points), 0.0), COUNT(*) FROM leaderboard \
            WHERE user_id = ? AND created_at >= ?",
        )
        .bind(user_id)
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(ContributionPage {
            contributions: rows.into_iter().map(LeaderboardEntry::from).collect(),
            summary: ContributionSummary {
                total_points: round_to_cents(total_points),
                total_actions,
            },
            total: total_actions,
        })
    }

    async fn user_rank(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<i64>> {
        let rank = sqlx::query_scalar::<_, i64>(
            "WITH totals AS ( \
                SELECT user_id, SUM(final_points) AS total FROM leaderboard \
                WHERE created_at >= ? GROUP BY user_id \
            ) \
            SELECT (SELECT COUNT(*) FROM totals other WHERE other.total > mine.total) + 1 \
            FROM totals mine WHERE mine.user_id = ?",
        )
        .bind(window_start(since))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rank)
    }
}
