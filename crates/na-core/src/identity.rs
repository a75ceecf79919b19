//! Resolved project identity
//!
//! Every object name, role and path a lifecycle command touches is derived
//! once from the project definition and the connection defaults, then passed
//! by reference through the whole pipeline.

use crate::bundle::ArtifactMapping;
use crate::config::{Distribution, NativeAppDefinition};
use crate::error::{CoreError, CoreResult};
use crate::sql_utils::{append_to_identifier, clean_identifier, split_qualified_name, to_identifier};
use std::path::{Path, PathBuf};

/// Fallback user name when none is known
pub const DEFAULT_USERNAME: &str = "unknown_user";

/// Values taken from the active connection when the project definition is
/// silent.
#[derive(Debug, Clone, Default)]
pub struct SessionDefaults {
    /// Role the connection starts with
    pub role: Option<String>,
    /// Warehouse the connection starts with
    pub warehouse: Option<String>,
    /// Local user name, used to keep default object names per developer
    pub user: Option<String>,
}

/// Immutable, fully-resolved identity of a native app project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Project root directory
    pub project_root: PathBuf,
    /// Project name as a valid identifier
    pub project_identifier: String,
    /// Application package name
    pub package_name: String,
    /// Role that owns the application package
    pub package_role: String,
    /// Declared package distribution
    pub package_distribution: Distribution,
    /// Warehouse used while applying package scripts
    pub package_warehouse: Option<String>,
    /// Package scripts relative to the project root, in application order
    pub package_scripts: Vec<String>,
    /// Application object name
    pub app_name: String,
    /// Role that owns the application object
    pub app_role: String,
    /// Warehouse used to create and upgrade the application
    pub app_warehouse: Option<String>,
    /// Whether the application runs in debug mode
    pub debug_mode: bool,
    /// Fully-qualified name of the package stage (`package.schema.stage`)
    pub stage_fqn: String,
    /// Schema holding the package stage
    pub stage_schema: String,
    /// Absolute path of the local deploy root
    pub deploy_root: PathBuf,
    /// Artifacts to bundle, in declaration order
    pub artifacts: Vec<ArtifactMapping>,
}

/// `<project>_pkg_<user>`
pub fn default_app_package(project_identifier: &str, user: &str) -> String {
    append_to_identifier(project_identifier, &format!("_pkg_{}", user))
}

/// `<project>_<user>`
pub fn default_application(project_identifier: &str, user: &str) -> String {
    append_to_identifier(project_identifier, &format!("_{}", user))
}

impl ProjectIdentity {
    /// Resolve the identity of `definition` rooted at `project_root`.
    pub fn resolve(
        definition: &NativeAppDefinition,
        project_root: &Path,
        session: &SessionDefaults,
    ) -> CoreResult<Self> {
        let user = session
            .user
            .as_deref()
            .map(clean_identifier)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

        let project_identifier = to_identifier(&definition.name);
        let package = definition.package.clone().unwrap_or_default();
        let application = definition.application.clone().unwrap_or_default();

        let package_name = match &package.name {
            Some(name) => to_identifier(name),
            None => default_app_package(&project_identifier, &user),
        };
        let app_name = match &application.name {
            Some(name) => to_identifier(name),
            None => default_application(&project_identifier, &user),
        };

        let package_role = package
            .role
            .clone()
            .or_else(|| session.role.clone())
            .ok_or_else(|| CoreError::RoleNotResolved {
                object: "package".to_string(),
            })?;
        let app_role = application
            .role
            .clone()
            .or_else(|| session.role.clone())
            .ok_or_else(|| CoreError::RoleNotResolved {
                object: "application".to_string(),
            })?;

        let stage_parts = split_qualified_name(&definition.source_stage);
        let stage_schema = match stage_parts.as_slice() {
            [schema, stage] if !schema.is_empty() && !stage.is_empty() => schema.to_string(),
            _ => {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "source_stage '{}' must be of the form <schema>.<stage>",
                        definition.source_stage
                    ),
                })
            }
        };
        let stage_fqn = format!("{}.{}", package_name, definition.source_stage);

        Ok(Self {
            project_root: project_root.to_path_buf(),
            project_identifier,
            package_name,
            package_role,
            package_distribution: package.distribution.unwrap_or_default(),
            package_warehouse: package.warehouse.or_else(|| session.warehouse.clone()),
            package_scripts: package.scripts,
            app_name,
            app_role,
            app_warehouse: application.warehouse.or_else(|| session.warehouse.clone()),
            debug_mode: application.debug.unwrap_or(true),
            stage_fqn,
            stage_schema,
            deploy_root: project_root.join(&definition.deploy_root),
            artifacts: definition.artifacts.iter().map(ArtifactMapping::from).collect(),
        })
    }
}
