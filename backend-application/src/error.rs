use backend_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream failure: {0}")]
    BadGateway(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn forbidden(message: &str) -> Self {
        AppError::Forbidden(message.to_string())
    }

    /// Maps a repository failure, surfacing domain rejections as client errors.
    pub fn from_repo(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(DomainError::NotFound(message)) => AppError::NotFound(message),
            Ok(DomainError::InvalidInput(message)) => AppError::BadRequest(message),
            Err(err) => AppError::Internal(err),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(message) => AppError::NotFound(message),
            DomainError::InvalidInput(message) => AppError::BadRequest(message),
        }
    }
}
