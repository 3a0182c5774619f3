use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use backend_application::commands::auth_commands::SESSION_COOKIE;
use backend_application::queries::session_queries::{self, SessionContext};
use backend_application::AppState;
use backend_domain::RuntimeConfig;

use crate::error::HttpError;

/// Gate for the ops metrics endpoint. Open when no token is configured.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(metrics_token) = &config.metrics_token {
        return extract_bearer(headers)
            .map(|v| v == *metrics_token)
            .unwrap_or(false);
    }
    true
}

/// Session token from `Authorization: Bearer`, falling back to the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer(headers).or_else(|| cookie_value(headers, SESSION_COOKIE))
}

pub async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionContext, HttpError> {
    let token = session_token(headers);
    Ok(session_queries::resolve_session(state, token.as_deref()).await?)
}

pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Counts responses that ended in a server error.
pub async fn track_request_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if response.status().is_server_error() {
        state.metrics.record_request_error();
    }
    response
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
