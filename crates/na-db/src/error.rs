//! Error types for na-db

use thiserror::Error;

/// Query gateway errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement rejected by the backend (D002)
    ///
    /// `code` is the backend's numeric error code when it reported one.
    #[error("[D002] SQL execution failed: {message}")]
    Sql { code: Option<i64>, message: String },

    /// Column missing from a result row (D003)
    #[error("[D003] Column '{column}' not found in result (available: {available})")]
    UnknownColumn { column: String, available: String },

    /// Unexpected result shape (D004)
    #[error("[D004] Unexpected result from '{query}': {reason}")]
    UnexpectedResult { query: String, reason: String },

    /// Not implemented (D005)
    #[error("[D005] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D007)
    #[error("[D007] Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Build a SQL error with an optional backend error code
    pub fn sql(code: Option<i64>, message: impl Into<String>) -> Self {
        DbError::Sql {
            code,
            message: message.into(),
        }
    }

    /// Backend error code, for SQL errors that carried one
    pub fn code(&self) -> Option<i64> {
        match self {
            DbError::Sql { code, .. } => *code,
            _ => None,
        }
    }

    /// The backend's message without the error-code prefix
    pub fn message(&self) -> String {
        match self {
            DbError::Sql { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}
