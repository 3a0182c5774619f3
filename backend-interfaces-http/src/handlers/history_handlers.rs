use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::history_commands;
use backend_application::dtos::{DeleteEntryResponse, HistoryQuery};
use backend_application::queries::history_queries;
use backend_application::AppState;
use backend_domain::ResourceHistoryEntry;

use crate::error::HttpError;
use crate::middleware::require_session;

pub async fn resource_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ResourceHistoryEntry>>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    let entries = history_queries::resource_history(&state, &ctx, &resource_id, query).await?;
    Ok(Json(entries))
}

pub async fn delete_history_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((resource_id, entry_id)): Path<(String, String)>,
) -> Result<Json<DeleteEntryResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let response =
        history_commands::delete_history_entry(&state, &ctx, &resource_id, &entry_id).await?;
    Ok(Json(response))
}
