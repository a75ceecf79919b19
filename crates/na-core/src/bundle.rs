//! Artifact bundling into the local deploy root

use crate::config::ArtifactDefinition;
use crate::error::{CoreError, CoreResult};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A source (relative to the project root, may be a glob) and the
/// destination it is copied to (relative to the deploy root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMapping {
    /// Source path or glob
    pub src: String,
    /// Destination path; a trailing `/` marks a directory
    pub dest: String,
}

impl From<&ArtifactDefinition> for ArtifactMapping {
    fn from(def: &ArtifactDefinition) -> Self {
        match def {
            ArtifactDefinition::Path(src) => Self {
                src: src.clone(),
                dest: src.clone(),
            },
            ArtifactDefinition::Mapping { src, dest } => Self {
                src: src.clone(),
                dest: dest.clone().unwrap_or_else(|| src.clone()),
            },
        }
    }
}

fn io_err(path: &Path, source: std::io::Error) -> CoreError {
    CoreError::IoWithPath {
        path: path.display().to_string(),
        source,
    }
}

fn escapes_root(relative: &Path) -> bool {
    relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Populate `deploy_root` from `artifacts`.
///
/// The deploy root is deleted and recreated on every call, so it must live
/// inside the project root.
pub fn build_bundle(
    project_root: &Path,
    deploy_root: &Path,
    artifacts: &[ArtifactMapping],
) -> CoreResult<()> {
    let relative_root = deploy_root.strip_prefix(project_root).ok();
    if relative_root.map_or(true, |r| r.as_os_str().is_empty() || escapes_root(r)) {
        return Err(CoreError::DeployRootOutsideProject {
            path: deploy_root.display().to_string(),
            root: project_root.display().to_string(),
        });
    }

    if deploy_root.exists() {
        log::debug!("Removing existing deploy root {}", deploy_root.display());
        std::fs::remove_dir_all(deploy_root).map_err(|e| io_err(deploy_root, e))?;
    }
    std::fs::create_dir_all(deploy_root).map_err(|e| io_err(deploy_root, e))?;

    for artifact in artifacts {
        bundle_artifact(project_root, deploy_root, artifact)?;
    }
    Ok(())
}

fn bundle_artifact(
    project_root: &Path,
    deploy_root: &Path,
    artifact: &ArtifactMapping,
) -> CoreResult<()> {
    if escapes_root(Path::new(&artifact.dest)) {
        return Err(CoreError::ArtifactOutsideDeployRoot {
            dest: artifact.dest.clone(),
        });
    }

    let pattern = project_root.join(&artifact.src);
    let pattern_str = pattern.to_string_lossy();
    let entries = glob::glob(&pattern_str).map_err(|e| CoreError::InvalidArtifactPattern {
        pattern: artifact.src.clone(),
        message: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let source = std::io::Error::new(e.error().kind(), e.error().to_string());
            io_err(e.path(), source)
        })?;
        matches.push(path);
    }
    if matches.is_empty() {
        return Err(CoreError::ArtifactNotFound {
            src: artifact.src.clone(),
            root: project_root.display().to_string(),
        });
    }

    let into_directory = artifact.dest.ends_with('/');
    if matches.len() > 1 && !into_directory {
        return Err(CoreError::ConfigInvalid {
            message: format!(
                "artifact '{}' matches several files, so its destination '{}' must end with '/'",
                artifact.src, artifact.dest
            ),
        });
    }

    let dest_base = deploy_root.join(&artifact.dest);
    for source in matches {
        let target = if into_directory {
            match source.file_name() {
                Some(name) => dest_base.join(name),
                None => dest_base.clone(),
            }
        } else {
            dest_base.clone()
        };
        log::debug!("Bundling {} -> {}", source.display(), target.display());
        copy_tree(&source, &target)?;
    }
    Ok(())
}

/// Copy a file, or a directory recursively, to `target`.
fn copy_tree(source: &Path, target: &Path) -> CoreResult<()> {
    if source.is_file() {
        return copy_file(source, target);
    }
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_default();
            io_err(&path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| CoreError::ConfigInvalid {
                message: format!("cannot relativize {}", entry.path().display()),
            })?;
        let destination: PathBuf = target.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination).map_err(|e| io_err(&destination, e))?;
        } else {
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}

fn copy_file(source: &Path, target: &Path) -> CoreResult<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::copy(source, target).map_err(|e| io_err(source, e))?;
    Ok(())
}
