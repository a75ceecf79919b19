//! Jinja environment for package scripts

use crate::context::ScriptContext;
use crate::error::{JinjaError, JinjaResult};
use minijinja::{path_loader, Environment, UndefinedBehavior};
use std::path::Path;

/// Renders package scripts found under a project root
pub struct ScriptEnvironment {
    env: Environment<'static>,
}

impl ScriptEnvironment {
    /// Create an environment loading templates relative to `project_root`.
    ///
    /// Undefined variables are errors and trailing newlines are preserved.
    pub fn new(project_root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(project_root));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render the script at `relative_path` with `context`.
    pub fn render_script(&self, relative_path: &str, context: &ScriptContext) -> JinjaResult<String> {
        let name = relative_path.replace('\\', "/");
        log::debug!("Rendering package script {}", name);
        let template = self
            .env
            .get_template(&name)
            .map_err(|e| JinjaError::from_render(relative_path, e))?;
        template
            .render(context)
            .map_err(|e| JinjaError::from_render(relative_path, e))
    }
}

#[cfg(test)]
#[path = "environment_test.rs"]
mod tests;
