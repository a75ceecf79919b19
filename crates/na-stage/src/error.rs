//! Error types for na-stage

use na_db::DbError;
use thiserror::Error;

/// Stage diff and sync errors
#[derive(Error, Debug)]
pub enum StageError {
    /// Local deploy root missing (S001)
    #[error("[S001] Deploy root not found: {path}. Run the bundle step first")]
    DeployRootNotFound { path: String },

    /// Local file could not be read (S002)
    #[error("[S002] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Stage listing has an unexpected shape (S003)
    #[error("[S003] Unexpected stage listing for {stage}: {reason}")]
    UnexpectedListing { stage: String, reason: String },

    /// Underlying query failed (S004)
    #[error("[S004] {0}")]
    Db(#[from] DbError),
}

/// Result type alias for StageError
pub type StageResult<T> = Result<T, StageError>;
