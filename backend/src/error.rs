use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors raised by the data access layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Kitten with id={0} does not exist")]
    KittenNotFound(i64),

    /// A write was rejected by a database constraint (foreign key, unique, not null, check)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::ForeignKeyViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => {
                    return StorageError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
