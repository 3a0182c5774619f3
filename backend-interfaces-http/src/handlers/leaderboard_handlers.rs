use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::dtos::{LeaderboardQuery, LeaderboardResponse, UserLeaderboardResponse};
use backend_application::queries::leaderboard_queries;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::require_session;

pub async fn leaderboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<LeaderboardResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    Ok(Json(leaderboard_queries::leaderboard(&state, &ctx, query).await?))
}

pub async fn user_contributions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<UserLeaderboardResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    let Query(query) = query?;
    let response = leaderboard_queries::user_contributions(&state, &ctx, &user_id, query).await?;
    Ok(Json(response))
}
