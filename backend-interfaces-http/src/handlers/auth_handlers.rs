use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::commands::auth_commands;
use backend_application::dtos::{LoginResponse, MessageResponse, OAuthCallbackQuery, SessionResponse};
use backend_application::queries::session_queries;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{clear_session_cookie, require_session, session_cookie};

pub async fn login(State(state): State<AppState>) -> Result<Response, HttpError> {
    let url = auth_commands::begin_login(&state)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    query: Result<Query<OAuthCallbackQuery>, QueryRejection>,
) -> Result<([(header::HeaderName, String); 1], Json<LoginResponse>), HttpError> {
    let Query(query) = query?;
    let result = auth_commands::complete_login(&state, query).await?;
    let cookie = session_cookie(
        &result.token,
        result.max_age_seconds,
        state.config.cookie_secure,
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(result.response)))
}

pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(session_queries::session_info(&state, &ctx)))
}

pub async fn refresh_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, HttpError> {
    let ctx = require_session(&state, &headers).await?;
    Ok(Json(auth_commands::refresh_roles(&state, ctx).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<([(header::HeaderName, String); 1], Json<MessageResponse>), HttpError> {
    let ctx = require_session(&state, &headers).await?;
    auth_commands::logout(&state, &ctx).await?;
    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Json(MessageResponse::new("Logged out")),
    ))
}
