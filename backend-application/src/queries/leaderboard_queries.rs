use chrono::Utc;
use tracing::error;

use crate::dtos::{LeaderboardQuery, LeaderboardResponse, Pagination, UserLeaderboardResponse};
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::TimeFilter;

pub async fn leaderboard(
    state: &AppState,
    _ctx: &SessionContext,
    query: LeaderboardQuery,
) -> Result<LeaderboardResponse, AppError> {
    let time_filter = parse_time_filter(query.time_filter.as_deref());
    let pagination = Pagination::from_query(&query);
    let since = time_filter.cutoff(Utc::now());

    let page = state
        .leaderboard_repo
        .rankings(since, pagination.limit, pagination.offset)
        .await
        .map_err(|err| {
            error!("failed to load leaderboard: {}", err);
            AppError::Internal(err)
        })?;

    Ok(LeaderboardResponse {
        leaderboard: page.rankings,
        time_filter: time_filter.as_str().to_string(),
        total: page.total,
        page: pagination.page,
        page_size: pagination.limit,
        total_pages: pagination.total_pages(page.total),
        has_next_page: pagination.has_next_page(page.total),
        has_prev_page: pagination.has_prev_page(),
    })
}

pub async fn user_contributions(
    state: &AppState,
    _ctx: &SessionContext,
    user_id: &str,
    query: LeaderboardQuery,
) -> Result<UserLeaderboardResponse, AppError> {
    let time_filter = parse_time_filter(query.time_filter.as_deref());
    let pagination = Pagination::from_query(&query);
    let since = time_filter.cutoff(Utc::now());

    let page = state
        .leaderboard_repo
        .contributions(user_id, since, pagination.limit, pagination.offset)
        .await
        .map_err(|err| {
            error!("failed to load contributions for {}: {}", user_id, err);
            AppError::Internal(err)
        })?;
    let rank = state
        .leaderboard_repo
        .user_rank(user_id, since)
        .await
        .map_err(|err| {
            error!("failed to compute rank for {}: {}", user_id, err);
            AppError::Internal(err)
        })?;

    Ok(UserLeaderboardResponse {
        user_id: user_id.to_string(),
        rank,
        contributions: page.contributions,
        summary: page.summary,
        time_filter: time_filter.as_str().to_string(),
        total: page.total,
        page: pagination.page,
        page_size: pagination.limit,
        total_pages: pagination.total_pages(page.total),
        has_next_page: pagination.has_next_page(page.total),
        has_prev_page: pagination.has_prev_page(),
    })
}

/// Unknown values fall back to the all-time window.
fn parse_time_filter(raw: Option<&str>) -> TimeFilter {
    raw.map(TimeFilter::from).unwrap_or_default()
}
