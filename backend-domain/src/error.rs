use thiserror::Error;

/// Business rule violations raised by domain services and repositories.
///
/// Repositories return these wrapped in `anyhow::Error`; the application
/// layer downcasts them back into client-facing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn resource_not_found() -> Self {
        DomainError::NotFound("Resource not found".to_string())
    }
}
