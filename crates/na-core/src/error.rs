//! Error types for na-core

use thiserror::Error;

/// Core error type for napp
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Project definition file not found
    #[error("[E001] Project definition not found: {path}")]
    DefinitionNotFound { path: String },

    /// E002: Failed to parse project definition
    #[error("[E002] Failed to parse project definition {path}: {message}")]
    DefinitionParseError { path: String, message: String },

    /// E003: Invalid project definition value
    #[error("[E003] Invalid project definition: {message}")]
    ConfigInvalid { message: String },

    /// E004: Project directory not found
    #[error("[E004] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E005: Artifact source matched nothing
    #[error("[E005] Artifact source '{src}' did not match any files in {root}")]
    ArtifactNotFound { src: String, root: String },

    /// E006: Artifact destination outside the deploy root
    #[error("[E006] Artifact destination '{dest}' resolves outside of the deploy root")]
    ArtifactOutsideDeployRoot { dest: String },

    /// E007: Invalid glob in artifact source
    #[error("[E007] Invalid artifact pattern '{pattern}': {message}")]
    InvalidArtifactPattern { pattern: String, message: String },

    /// E008: Deploy root would clobber something outside the project
    #[error("[E008] Deploy root {path} must be inside the project root {root}")]
    DeployRootOutsideProject { path: String, root: String },

    /// E009: No role could be resolved for an object
    #[error("[E009] No {object} role is defined in the project definition and the connection has no default role")]
    RoleNotResolved { object: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML error
    #[error("[E015] YAML error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
