use thiserror::Error;

use crate::forms::reviews::ReviewFormError;
use crate::repository::RepositoryError;

pub mod reviews;

/// Result alias returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to callers of review mutations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted payload was rejected before reaching storage.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The user has already reviewed this tour.
    #[error("review already exists")]
    Duplicate,
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Duplicate(_) => ServiceError::Duplicate,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ReviewFormError> for ServiceError {
    fn from(value: ReviewFormError) -> Self {
        ServiceError::Validation(value.to_string())
    }
}
