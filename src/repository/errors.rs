use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Result alias returned by every repository operation.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,
    /// A unique index rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Duplicate(info.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}
