use chrono::Utc;
use tracing::error;

use crate::dtos::HistoryQuery;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::utils::window_start;
use backend_domain::ResourceHistoryEntry;

const DEFAULT_HISTORY_DAYS: i64 = 7;
const HISTORY_LIMIT: usize = 100;

/// History rows of one resource inside the requested window, newest first.
pub async fn resource_history(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
    query: HistoryQuery,
) -> Result<Vec<ResourceHistoryEntry>, AppError> {
    ctx.require_resource_access()?;
    let days = query
        .days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_HISTORY_DAYS);
    let since = window_start(Utc::now(), days);
    state
        .history_repo
        .list_for_resource(resource_id, since, HISTORY_LIMIT)
        .await
        .map_err(|err| {
            error!("failed to load history for {}: {}", resource_id, err);
            AppError::Internal(err)
        })
}
