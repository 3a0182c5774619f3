use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use backend_application::AppError;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal,
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Unauthorized => HttpError::Unauthorized,
            AppError::Forbidden(msg) => HttpError::Forbidden(msg),
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::NotFound(msg) => HttpError::NotFound(msg),
            AppError::BadGateway(msg) => HttpError::BadGateway(msg),
            AppError::Internal(err) => {
                error!("request failed: {:#}", err);
                HttpError::Internal
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected request body: {}", rejection.body_text());
        HttpError::BadRequest("Invalid request body".to_string())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("rejected query string: {}", rejection.body_text());
        HttpError::BadRequest("Invalid query parameters".to_string())
    }
}

impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        debug!("rejected multipart request: {}", rejection.body_text());
        HttpError::BadRequest("Invalid multipart upload".to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            HttpError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            HttpError::Unauthorized => "Unauthorized".to_string(),
            HttpError::Forbidden(msg)
            | HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::BadGateway(msg) => msg,
            HttpError::Internal => "Internal server error".to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
