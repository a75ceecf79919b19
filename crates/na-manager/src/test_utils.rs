//! Shared test utilities for na-manager

use crate::console::Console;
use na_core::{Distribution, ProjectIdentity};
use std::path::Path;
use std::sync::Mutex;

/// Console entry kinds recorded by [`RecordingConsole`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// `Console::step`
    Step,
    /// `Console::message`
    Message,
    /// `Console::warning`
    Warning,
}

/// Console that keeps everything it is told
#[derive(Debug, Default)]
pub struct RecordingConsole {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingConsole {
    fn push(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }

    /// Messages recorded at `level`, in order
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(l, _)| *l == level)
                    .map(|(_, m)| m.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Recorded warnings
    pub fn warnings(&self) -> Vec<String> {
        self.at(Level::Warning)
    }
}

impl Console for RecordingConsole {
    fn step(&self, message: &str) {
        self.push(Level::Step, message);
    }

    fn message(&self, message: &str) {
        self.push(Level::Message, message);
    }

    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }
}

/// Identity of a project named `myapp` rooted at `root`, with the package
/// owned by `pkg_role` and the application by `app_role`.
pub fn identity(root: &Path) -> ProjectIdentity {
    ProjectIdentity {
        project_root: root.to_path_buf(),
        project_identifier: "myapp".to_string(),
        package_name: "myapp_pkg".to_string(),
        package_role: "pkg_role".to_string(),
        package_distribution: Distribution::Internal,
        package_warehouse: Some("pkg_wh".to_string()),
        package_scripts: Vec::new(),
        app_name: "myapp".to_string(),
        app_role: "app_role".to_string(),
        app_warehouse: Some("app_wh".to_string()),
        debug_mode: true,
        stage_fqn: "myapp_pkg.app_src.stage".to_string(),
        stage_schema: "app_src".to_string(),
        deploy_root: root.join("output/deploy"),
        artifacts: Vec::new(),
    }
}

/// Write `files` (relative path, content) under `root`
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent directory");
        }
        std::fs::write(full, content).expect("write test file");
    }
}
