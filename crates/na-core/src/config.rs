//! Project definition types and parsing for snowflake.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Base name of the project definition file
pub const DEFINITION_FILE_STEM: &str = "snowflake";

/// Base name of the per-developer override file
pub const LOCAL_OVERRIDE_FILE_STEM: &str = "snowflake.local";

/// Top-level project definition from snowflake.yml
///
/// Sections other than `native_app` belong to other tools sharing the same
/// file and are ignored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDefinition {
    /// Schema version of the definition file; only version 1 is understood
    pub definition_version: serde_yaml::Value,

    /// Native application section
    #[serde(default)]
    pub native_app: Option<NativeAppDefinition>,
}

/// The `native_app` section of the project definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeAppDefinition {
    /// Project name, used to derive default object names
    pub name: String,

    /// Files to bundle into the deploy root, in order
    pub artifacts: Vec<ArtifactDefinition>,

    /// Local directory the bundle is materialized into
    #[serde(default = "default_deploy_root")]
    pub deploy_root: String,

    /// Stage (relative to the package) that receives the deploy root
    #[serde(default = "default_source_stage")]
    pub source_stage: String,

    /// Application package overrides
    #[serde(default)]
    pub package: Option<PackageDefinition>,

    /// Application object overrides
    #[serde(default)]
    pub application: Option<ApplicationDefinition>,
}

/// The `native_app.package` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDefinition {
    /// Package name
    #[serde(default)]
    pub name: Option<String>,

    /// Role that owns the package
    #[serde(default)]
    pub role: Option<String>,

    /// Warehouse used while running package scripts
    #[serde(default)]
    pub warehouse: Option<String>,

    /// Package scripts, relative to the project root, applied in order
    #[serde(default)]
    pub scripts: Vec<String>,

    /// Package distribution
    #[serde(default)]
    pub distribution: Option<Distribution>,
}

/// The `native_app.application` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationDefinition {
    /// Application name
    #[serde(default)]
    pub name: Option<String>,

    /// Role that owns the application
    #[serde(default)]
    pub role: Option<String>,

    /// Warehouse used to create and upgrade the application
    #[serde(default)]
    pub warehouse: Option<String>,

    /// Whether the application is created in debug mode
    #[serde(default)]
    pub debug: Option<bool>,
}

/// One entry of `native_app.artifacts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactDefinition {
    /// Bare source path, bundled to the same relative path
    Path(String),
    /// Explicit source and destination
    Mapping {
        /// Source path or glob, relative to the project root
        src: String,
        /// Destination relative to the deploy root
        #[serde(default)]
        dest: Option<String>,
    },
}

/// Application package distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Distribution {
    /// Visible only to the owning account
    #[default]
    Internal,
    /// Listable and installable by other accounts
    External,
}

impl Distribution {
    /// Lower-case keyword as used in SQL and in `describe` output
    pub fn as_str(&self) -> &'static str {
        match self {
            Distribution::Internal => "internal",
            Distribution::External => "external",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Ok(Distribution::Internal),
            "external" => Ok(Distribution::External),
            other => Err(format!(
                "unknown distribution '{}', expected 'internal' or 'external'",
                other
            )),
        }
    }
}

impl TryFrom<String> for Distribution {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Distribution> for String {
    fn from(d: Distribution) -> Self {
        d.as_str().to_string()
    }
}

fn default_deploy_root() -> String {
    "output/deploy/".to_string()
}

fn default_source_stage() -> String {
    "app_src.stage".to_string()
}

/// Recursively merge `source` into `target`.
///
/// Mappings merge key by key; any other value in `source` replaces the
/// corresponding value in `target`.
pub fn merge_left(target: &mut serde_yaml::Value, source: serde_yaml::Value) {
    match (target, source) {
        (serde_yaml::Value::Mapping(target_map), serde_yaml::Value::Mapping(source_map)) => {
            for (key, value) in source_map {
                let nested =
                    value.is_mapping() && target_map.get(&key).is_some_and(|v| v.is_mapping());
                if !nested {
                    target_map.insert(key, value);
                } else if let Some(existing) = target_map.get_mut(&key) {
                    merge_left(existing, value);
                }
            }
        }
        (target, source) => *target = source,
    }
}

fn read_yaml(path: &Path) -> CoreResult<serde_yaml::Value> {
    if !path.exists() {
        return Err(CoreError::DefinitionNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_yaml::from_str(&content).map_err(|e| CoreError::DefinitionParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Find `<stem>.yml` or `<stem>.yaml` in `dir`
fn find_definition_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    let yml = dir.join(format!("{}.yml", stem));
    if yml.exists() {
        return Some(yml);
    }
    let yaml = dir.join(format!("{}.yaml", stem));
    yaml.exists().then_some(yaml)
}

impl ProjectDefinition {
    /// Load a definition from one or more files, merged left to right with
    /// increasing precedence.
    pub fn load(paths: &[PathBuf]) -> CoreResult<Self> {
        let (base, overrides) = paths.split_first().ok_or_else(|| CoreError::ConfigInvalid {
            message: "at least one project definition file is required".to_string(),
        })?;

        let mut merged = read_yaml(base)?;
        for path in overrides {
            let overlay = read_yaml(path)?;
            log::debug!("Merging project definition override {}", path.display());
            merge_left(&mut merged, overlay);
        }

        let definition: ProjectDefinition =
            serde_yaml::from_value(merged).map_err(|e| CoreError::DefinitionParseError {
                path: base.display().to_string(),
                message: e.to_string(),
            })?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load the definition from a project directory.
    ///
    /// Looks for snowflake.yml (or .yaml), then applies snowflake.local.yml
    /// when present, then each of `extra_overrides` in order.
    pub fn load_from_dir(dir: &Path, extra_overrides: &[PathBuf]) -> CoreResult<Self> {
        if !dir.exists() {
            return Err(CoreError::ProjectNotFound {
                path: dir.display().to_string(),
            });
        }
        let base = find_definition_file(dir, DEFINITION_FILE_STEM).ok_or_else(|| {
            CoreError::DefinitionNotFound {
                path: dir.join("snowflake.yml").display().to_string(),
            }
        })?;

        let mut paths = vec![base];
        if let Some(local) = find_definition_file(dir, LOCAL_OVERRIDE_FILE_STEM) {
            paths.push(local);
        }
        paths.extend(extra_overrides.iter().cloned());
        Self::load(&paths)
    }

    /// The `native_app` section, or an error when the project has none
    pub fn native_app(&self) -> CoreResult<&NativeAppDefinition> {
        self.native_app.as_ref().ok_or_else(|| CoreError::ConfigInvalid {
            message: "the project definition has no 'native_app' section".to_string(),
        })
    }

    /// Validate the definition
    fn validate(&self) -> CoreResult<()> {
        let version_ok = match &self.definition_version {
            serde_yaml::Value::Number(n) => n.as_u64() == Some(1),
            serde_yaml::Value::String(s) => s.trim() == "1",
            _ => false,
        };
        if !version_ok {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "unsupported definition_version {:?}, expected 1",
                    self.definition_version
                ),
            });
        }

        if let Some(app) = &self.native_app {
            if app.name.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "native_app.name cannot be empty".to_string(),
                });
            }
            let scripts = app.package.iter().flat_map(|p| p.scripts.iter());
            for script in scripts {
                if Path::new(script).is_absolute() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "package script '{}' must be relative to the project root",
                            script
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
