//! Error types for na-jinja

use thiserror::Error;

/// Package script templating errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template file does not exist (J001)
    #[error("[J001] Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Template does not parse (J002)
    #[error("[J002] Syntax error in {path}: {message}")]
    Syntax { path: String, message: String },

    /// Template references an undefined variable (J003)
    #[error("[J003] Undefined variable in {path}: {message}")]
    Undefined { path: String, message: String },

    /// Any other render failure (J004)
    #[error("[J004] Failed to render {path}: {message}")]
    Render { path: String, message: String },
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

impl JinjaError {
    /// Classify a minijinja error raised while rendering `path`
    pub fn from_render(path: &str, err: minijinja::Error) -> Self {
        let path = path.to_string();
        let message = err.to_string();
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => JinjaError::TemplateNotFound { path },
            minijinja::ErrorKind::SyntaxError => JinjaError::Syntax { path, message },
            minijinja::ErrorKind::UndefinedError => JinjaError::Undefined { path, message },
            _ => JinjaError::Render { path, message },
        }
    }

    /// Path of the template that failed
    pub fn path(&self) -> &str {
        match self {
            JinjaError::TemplateNotFound { path }
            | JinjaError::Syntax { path, .. }
            | JinjaError::Undefined { path, .. }
            | JinjaError::Render { path, .. } => path,
        }
    }
}
