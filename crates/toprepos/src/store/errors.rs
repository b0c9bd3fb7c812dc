use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A value does not fit the schema (e.g. a count beyond the column range).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl PersistenceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
