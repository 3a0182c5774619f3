use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::warn;

use backend_application::commands::bulk_import_commands::{self, UploadedFile};
use backend_application::dtos::{BulkConfirmResponse, ResourceListQuery};
use backend_application::queries::resource_queries;
use backend_application::AppState;
use backend_domain::ImportDiffRow;

use crate::error::HttpError;
use crate::middleware::require_session;

const UPLOAD_FIELD: &str = "file";

pub async fn export_resources_csv(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ResourceListQuery>, QueryRejection>,
) -> Result<Response, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    let csv = resource_queries::export_csv(&state, &ctx, query.into_filters()).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resources.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// Accepts a multipart upload and returns the per-row diff without writing.
pub async fn preview_bulk_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<ImportDiffRow>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let upload = read_upload(multipart?).await?;
    let rows = bulk_import_commands::preview_import(&state, &ctx, upload).await?;
    Ok(Json(rows))
}

pub async fn confirm_bulk_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> Result<Json<BulkConfirmResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let body = body.map(|Json(value)| value).unwrap_or(Value::Null);
    Ok(Json(bulk_import_commands::confirm_import(&state, &ctx, body).await?))
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>, HttpError> {
    let malformed = |err: axum::extract::multipart::MultipartError| {
        warn!("rejected malformed multipart upload: {}", err);
        HttpError::BadRequest("Invalid multipart upload".to_string())
    };
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field.bytes().await.map_err(malformed)?;
        return Ok(Some(UploadedFile {
            file_name,
            data: data.to_vec(),
        }));
    }
    Ok(None)
}
