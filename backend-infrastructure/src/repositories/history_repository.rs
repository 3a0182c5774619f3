use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::QueryBuilder;

use backend_domain::{
    ActivityEntry, ActivityFilter, ErasureMode, HistoryRepository, ResourceHistoryEntry,
};

use crate::repositories::rows::{ActivityRow, HistoryRow, HISTORY_COLUMNS};

#[derive(Clone)]
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn push_identifiers(query: &mut QueryBuilder<'_, Sqlite>, identifiers: &[String]) {
    query.push(" AND h.updated_by IN (");
    let mut separated = query.separated(", ");
    for identifier in identifiers {
        separated.push_bind(identifier.clone());
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn list_for_resource(
        &self,
        resource_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<ResourceHistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {} FROM resource_history h \
            WHERE h.resource_id = ? AND h.created_at >= ? \
            ORDER BY h.created_at DESC LIMIT ?",
            HISTORY_COLUMNS
        ))
        .bind(resource_id)
        .bind(since.timestamp_millis())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ResourceHistoryEntry::from).collect())
    }

    async fn delete_entry(&self, resource_id: &str, entry_id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM resource_history WHERE id = ? AND resource_id = ?")
            .bind(entry_id)
            .bind(resource_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_activity(&self, filter: &ActivityFilter) -> anyhow::Result<Vec<ActivityEntry>> {
        if matches!(&filter.identifiers, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {}, r.name AS resource_name, r.category AS resource_category \
            FROM resource_history h JOIN resources r ON r.id = h.resource_id WHERE 1 = 1",
            HISTORY_COLUMNS
        ));
        if let Some(identifiers) = &filter.identifiers {
            push_identifiers(&mut query, identifiers);
        }
        if let Some(since) = filter.since {
            query
                .push(" AND h.created_at >= ")
                .push_bind(since.timestamp_millis());
        }
        query
            .push(" ORDER BY h.created_at DESC LIMIT ")
            .push_bind(filter.limit as i64);

        let rows = query
            .build_query_as::<ActivityRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    async fn erase_by_identifiers(
        &self,
        identifiers: &[String],
        mode: ErasureMode,
        replacement: &str,
    ) -> anyhow::Result<u64> {
        if identifiers.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;

        let mut count = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM resource_history h WHERE 1 = 1",
        );
        push_identifiers(&mut count, identifiers);
        let matched: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut erase = match mode {
            ErasureMode::Delete => {
                QueryBuilder::<Sqlite>::new("DELETE FROM resource_history AS h WHERE 1 = 1")
            }
            ErasureMode::Anonymize => {
                let mut update = QueryBuilder::<Sqlite>::new(
                    "UPDATE resource_history AS h SET updated_by = ",
                );
                // Free-text reasons may name the user, so they go too.
                update.push_bind(replacement.to_string()).push(", reason = NULL WHERE 1 = 1");
                update
            }
        };
        push_identifiers(&mut erase, identifiers);
        erase.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(matched.max(0) as u64)
    }
}
