use serde_json::Value;
use tracing::{error, info, warn};

use crate::commands::resource_commands::invalidate_resource_cache;
use crate::dtos::BulkConfirmResponse;
use crate::queries::session_queries::SessionContext;
use crate::{AppError, AppState};
use backend_domain::services::{collect_confirmed_updates, diff_rows, parse_csv, referenced_ids};
use backend_domain::ImportDiffRow;

const FORBIDDEN: &str = "Forbidden";

/// A file part pulled out of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Diffs an uploaded CSV against current stock. Nothing is written.
pub async fn preview_import(
    state: &AppState,
    ctx: &SessionContext,
    upload: Option<UploadedFile>,
) -> Result<Vec<ImportDiffRow>, AppError> {
    ctx.require_target_edit(FORBIDDEN)?;
    let upload =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    validate_upload(&upload, state.config.bulk_import_max_bytes)?;

    let rows = parse_csv(&upload.data).map_err(|err| {
        warn!("rejected unparseable csv '{}': {}", upload.file_name, err);
        AppError::BadRequest("No valid data found in CSV".to_string())
    })?;
    let ids = referenced_ids(&rows);
    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "No valid data found in CSV".to_string(),
        ));
    }

    let current = state
        .resource_repo
        .find_resources_by_ids(&ids)
        .await
        .map_err(|err| {
            error!("failed to load resources for csv diff: {}", err);
            AppError::Internal(err)
        })?;
    Ok(diff_rows(&rows, &current))
}

fn validate_upload(upload: &UploadedFile, max_bytes: usize) -> Result<(), AppError> {
    if !upload.file_name.to_lowercase().ends_with(".csv") {
        return Err(AppError::BadRequest(
            "Invalid file type. Please upload a .csv file.".to_string(),
        ));
    }
    if upload.data.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File size exceeds the {}KB limit.",
            max_bytes / 1024
        )));
    }
    Ok(())
}

/// Applies the `changed` rows of a previously returned diff in one transaction.
pub async fn confirm_import(
    state: &AppState,
    ctx: &SessionContext,
    body: Value,
) -> Result<BulkConfirmResponse, AppError> {
    ctx.require_target_edit(FORBIDDEN)?;
    let invalid = || AppError::BadRequest("Invalid update data".to_string());
    match &body {
        Value::Array(items) if !items.is_empty() => {}
        _ => return Err(invalid()),
    }
    let rows: Vec<ImportDiffRow> = serde_json::from_value(body).map_err(|_| invalid())?;
    let updates = collect_confirmed_updates(rows)?;

    let actor = ctx.identifier();
    let updated = state
        .resource_repo
        .apply_bulk_import(&updates, &actor)
        .await
        .map_err(|err| {
            error!("bulk import failed: {}", err);
            AppError::from_repo(err)
        })?;
    invalidate_resource_cache(state).await;
    state.metrics.record_bulk_import(updated);
    info!("bulk import by {} updated {} resources", actor, updated);
    Ok(BulkConfirmResponse {
        message: "Import successful".to_string(),
        updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            data: vec![b'a'; size],
        }
    }

    #[test]
    fn upload_must_be_a_small_csv() {
        assert!(validate_upload(&upload("stock.CSV", 10), 256 * 1024).is_ok());
        assert!(matches!(
            validate_upload(&upload("stock.xlsx", 10), 256 * 1024),
            Err(AppError::BadRequest(msg)) if msg == "Invalid file type. Please upload a .csv file."
        ));
        assert!(matches!(
            validate_upload(&upload("stock.csv", 256 * 1024 + 1), 256 * 1024),
            Err(AppError::BadRequest(msg)) if msg == "File size exceeds the 256KB limit."
        ));
    }
}
