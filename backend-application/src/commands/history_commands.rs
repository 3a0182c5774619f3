use tracing::{error, info};

use crate::dtos::DeleteEntryResponse;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};

pub async fn delete_history_entry(
    state: &AppState,
    ctx: &SessionContext,
    resource_id: &str,
    entry_id: &str,
) -> Result<DeleteEntryResponse, AppError> {
    ctx.require_admin("Insufficient permissions")?;
    let deleted = state
        .history_repo
        .delete_entry(resource_id, entry_id)
        .await
        .map_err(|err| {
            error!("failed to delete history entry {}: {}", entry_id, err);
            AppError::Internal(err)
        })?;
    if !deleted {
        return Err(AppError::NotFound("History entry not found".to_string()));
    }
    info!(
        "history entry {} of resource {} deleted by {}",
        entry_id,
        resource_id,
        ctx.identifier()
    );
    Ok(DeleteEntryResponse {
        success: true,
        message: "History entry deleted successfully".to_string(),
    })
}
