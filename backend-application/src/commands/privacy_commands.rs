use chrono::Utc;
use tracing::{error, info};

use crate::dtos::DataDeletionResponse;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::utils::new_id;
use backend_domain::ErasureMode;

/// Erases the caller's history rows, matched by current and legacy
/// identifiers. Rows are anonymized unless hard deletion is configured.
pub async fn request_data_deletion(
    state: &AppState,
    ctx: &SessionContext,
) -> Result<DataDeletionResponse, AppError> {
    ctx.require_resource_access()?;
    let identifiers = ctx.session.user.activity_identifiers();
    let mode = if state.config.gdpr_hard_delete {
        ErasureMode::Delete
    } else {
        ErasureMode::Anonymize
    };
    let now = Utc::now();
    let replacement = anonymized_identifier(now.timestamp_millis());

    let records_affected = state
        .history_repo
        .erase_by_identifiers(&identifiers, mode, &replacement)
        .await
        .map_err(|err| {
            error!("data deletion failed for {}: {}", ctx.identifier(), err);
            AppError::Internal(err)
        })?;
    state.metrics.record_gdpr_deletion();
    info!(
        "data deletion request from {} (identifiers: {}): {} records, method {}",
        ctx.identifier(),
        identifiers.join(", "),
        records_affected,
        mode.as_str()
    );

    Ok(DataDeletionResponse {
        message: "Data deletion request processed successfully".to_string(),
        records_affected,
        method: mode.as_str().to_string(),
        timestamp: now,
    })
}

fn anonymized_identifier(now_ms: i64) -> String {
    let suffix: String = new_id().chars().take(9).collect();
    format!("deleted-user-{}-{}", now_ms, suffix)
}
