//! Error types for na-manager

use na_core::CoreError;
use na_db::DbError;
use na_jinja::JinjaError;
use na_stage::StageError;
use thiserror::Error;

/// Lifecycle errors
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Object owned by another role (N001)
    #[error("[N001] Cannot operate on {object}: owned by {actual} (expected {expected})")]
    UnexpectedOwner {
        object: String,
        expected: String,
        actual: String,
    },

    /// Internal package without the marker comment (N002)
    #[error("[N002] An application package {name} already exists in account that may have been created without napp")]
    ApplicationPackageAlreadyExists { name: String },

    /// Package script file missing (N003)
    #[error("[N003] Package script \"{path}\" does not exist")]
    MissingPackageScript { path: String },

    /// Package script failed to render (N004)
    #[error("[N004] Package script \"{path}\" is not a valid jinja template: {cause}")]
    InvalidPackageScript { path: String, cause: String },

    /// No database from name, argument or connection (N005)
    #[error("[N005] Database not specified. Add a database to the connection or pass a qualified name")]
    DatabaseNotProvided,

    /// No schema from name or connection (N006)
    #[error("[N006] Schema not specified. Add a schema to the connection or pass a qualified name")]
    SchemaNotProvided,

    /// Statement gave no usable result (N007)
    #[error("[N007] Failed to execute query: {query}")]
    SqlExecution { query: String },

    /// Query returned a shape the caller did not scope for (N008)
    #[error("[N008] {message}")]
    Programming { message: String },

    /// `in` clause given together with a qualified name (N009)
    #[error("[N009] Non-empty 'in' clause passed with qualified name '{name}'")]
    InClauseWithQualifiedName { name: String },

    /// Application not created by this tool from stage files (N010)
    #[error("[N010] An application object {name} already exists in account that may have been created without napp")]
    ApplicationAlreadyExists { name: String },

    /// Application package missing (N011)
    #[error("[N011] Application package {name} does not exist or is not authorized for the current role")]
    ApplicationPackageDoesNotExist { name: String },

    /// Requested version missing from the package (N012)
    #[error("[N012] Application package {package} does not have any version {version} defined")]
    VersionNotFound { package: String, version: String },

    /// Package still has versions (N013)
    #[error("[N013] Cannot drop application package as versions are still defined in it. Drop all versions first")]
    CouldNotDropApplicationPackageWithVersions,

    /// Recreating the application after a failed upgrade was declined (N014)
    ///
    /// `interactive` is set when a user answered the prompt.
    #[error("[N014] {message}")]
    UpgradeDeclined { message: String, interactive: bool },

    /// Project definition or bundling error (N015)
    #[error("[N015] {0}")]
    Core(#[from] CoreError),

    /// Gateway error (N016)
    #[error("[N016] {0}")]
    Db(#[from] DbError),

    /// Stage diff or sync error (N017)
    #[error("[N017] {0}")]
    Stage(#[from] StageError),
}

/// Result type alias for ManagerError
pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<JinjaError> for ManagerError {
    fn from(err: JinjaError) -> Self {
        match err {
            JinjaError::TemplateNotFound { path } => ManagerError::MissingPackageScript { path },
            JinjaError::Syntax { path, message }
            | JinjaError::Undefined { path, message }
            | JinjaError::Render { path, message } => ManagerError::InvalidPackageScript {
                path,
                cause: message,
            },
        }
    }
}
