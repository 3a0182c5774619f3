use chrono::Utc;
use tracing::error;

use crate::dtos::{is_true, ActivityQuery};
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::utils::window_start;
use backend_domain::{ActivityEntry, ActivityFilter};

const DEFAULT_ACTIVITY_DAYS: i64 = 30;
const DEFAULT_ACTIVITY_LIMIT: usize = 500;
const MAX_ACTIVITY_LIMIT: usize = 2000;

/// Recent history joined with resource names. Without `global` only rows
/// written under the caller's current or legacy identifiers are returned.
pub async fn user_activity(
    state: &AppState,
    ctx: &SessionContext,
    query: ActivityQuery,
) -> Result<Vec<ActivityEntry>, AppError> {
    ctx.require_resource_access()?;
    let days = query
        .days
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_ACTIVITY_DAYS);
    let limit = query
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .min(MAX_ACTIVITY_LIMIT);
    let identifiers = if is_true(query.global.as_deref()) {
        None
    } else {
        Some(ctx.session.user.activity_identifiers())
    };

    let filter = ActivityFilter {
        identifiers,
        since: Some(window_start(Utc::now(), days)),
        limit,
    };
    state
        .history_repo
        .list_activity(&filter)
        .await
        .map_err(|err| {
            error!("failed to load user activity: {}", err);
            AppError::Internal(err)
        })
}
