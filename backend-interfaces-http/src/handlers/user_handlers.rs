use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::commands::privacy_commands;
use backend_application::dtos::{ActivityQuery, DataDeletionResponse, DataExportFile};
use backend_application::queries::{activity_queries, privacy_queries, user_queries};
use backend_application::AppState;
use backend_domain::{ActivityEntry, UserSummary};

use crate::error::HttpError;
use crate::middleware::require_session;

pub async fn user_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<Json<Vec<ActivityEntry>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    Ok(Json(activity_queries::user_activity(&state, &ctx, query).await?))
}

pub async fn export_own_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let file = privacy_queries::export_own_data(&state, &ctx).await?;
    Ok(attachment(file))
}

pub async fn request_data_deletion(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DataDeletionResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(privacy_commands::request_data_deletion(&state, &ctx).await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserSummary>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(user_queries::list_users(&state, &ctx).await?))
}

pub async fn export_user_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Response, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let file = privacy_queries::export_user_data(&state, &ctx, &user_id).await?;
    Ok(attachment(file))
}

fn attachment(file: DataExportFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response()
}
