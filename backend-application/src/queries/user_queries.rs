use tracing::error;

use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::UserSummary;

pub async fn list_users(
    state: &AppState,
    ctx: &SessionContext,
) -> Result<Vec<UserSummary>, AppError> {
    let permissions = &ctx.permissions;
    if !permissions.has_user_management_access && !permissions.has_resource_admin_access {
        return Err(AppError::forbidden("Forbidden"));
    }
    let users = state.user_repo.list_users().await.map_err(|err| {
        error!("failed to list users: {}", err);
        AppError::Internal(err)
    })?;
    Ok(users.iter().map(UserSummary::from).collect())
}
