use thiserror::Error;

/// Errors raised by persistence and token handling.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid number in {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("database open error: {0}")]
    Open(#[from] rusqlite::Error),

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id: '{0}'")]
    InvalidSubject(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
