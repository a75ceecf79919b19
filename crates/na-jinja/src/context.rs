//! Variables available to package script templates

use serde::Serialize;

/// Render context for package scripts, exposed as `{{ package_name }}`.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptContext {
    /// Application package name, as it should appear in SQL
    pub package_name: String,
}

impl ScriptContext {
    /// Context for the given package
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }
}
