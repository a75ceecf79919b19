//! Local deploy root vs. stage comparison

use crate::checksum::{compute_md5sum, is_valid_md5sum};
use crate::error::{StageError, StageResult};
use crate::manager::StageManager;
use na_db::SqlGateway;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Difference between a local directory and a stage at one instant.
///
/// Paths are relative and `/`-separated. Each path appears in exactly one
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Present locally, absent on the stage
    pub added: Vec<String>,
    /// Present in both with different contents
    pub modified: Vec<String>,
    /// Present on the stage, absent locally
    pub deleted: Vec<String>,
    /// Present in both with the same contents
    pub identical: Vec<String>,
}

impl DiffResult {
    /// Whether applying the diff would change the stage
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty())
    }

    /// Number of files that would be uploaded or removed
    pub fn change_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "stage is up to date ({} files)", self.identical.len());
        }
        write!(
            f,
            "{} added, {} modified, {} deleted, {} unchanged",
            self.added.len(),
            self.modified.len(),
            self.deleted.len(),
            self.identical.len()
        )
    }
}

/// Every regular file under `root`, as sorted relative `/`-separated paths.
///
/// Symlinks are followed and listed under the link's own path.
fn enumerate_local_files(root: &Path) -> StageResult<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| StageError::Io {
            path: e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(parts.join("/"));
        }
    }
    Ok(files)
}

/// Compare the files under `local_root` with those on `stage_fqn`.
pub async fn stage_diff(
    conn: &dyn SqlGateway,
    local_root: &Path,
    stage_fqn: &str,
) -> StageResult<DiffResult> {
    if !local_root.is_dir() {
        return Err(StageError::DeployRootNotFound {
            path: local_root.display().to_string(),
        });
    }
    let local_files = enumerate_local_files(local_root)?;
    let remote = StageManager::new(conn).list_files(stage_fqn).await?;

    // An unusable remote checksum always reads as modified.
    let mut remote_md5: BTreeMap<String, Option<String>> = remote
        .into_iter()
        .map(|f| {
            let md5 = f.md5.filter(|m| is_valid_md5sum(m)).map(|m| m.to_lowercase());
            (f.path, md5)
        })
        .collect();

    let mut result = DiffResult::default();
    for relative in local_files {
        match remote_md5.remove(&relative) {
            None => result.added.push(relative),
            Some(remote) => {
                let full = local_root.join(&relative);
                let local = compute_md5sum(&full).map_err(|e| StageError::Io {
                    path: full.display().to_string(),
                    source: e,
                })?;
                if remote.as_deref() == Some(local.as_str()) {
                    result.identical.push(relative);
                } else {
                    result.modified.push(relative);
                }
            }
        }
    }
    result.deleted = remote_md5.into_keys().collect();

    log::debug!("Stage diff for {}: {}", stage_fqn, result);
    Ok(result)
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
