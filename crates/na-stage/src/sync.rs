//! Apply a [`DiffResult`] to a stage

use crate::diff::DiffResult;
use crate::error::StageResult;
use crate::manager::{StageManager, DEFAULT_PUT_PARALLEL};
use na_db::SqlGateway;
use std::path::Path;

/// Stage directory a relative file path is uploaded into
fn stage_directory(stage_fqn: &str, relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((parent, _)) => format!("{}/{}", stage_fqn, parent),
        None => stage_fqn.to_string(),
    }
}

/// Make `stage_fqn` match `local_root` according to `diff`.
///
/// Removes files only on the stage, then re-uploads modified files, then
/// uploads new ones. Runs under the currently active role.
pub async fn sync_local_diff_with_stage(
    conn: &dyn SqlGateway,
    diff: &DiffResult,
    local_root: &Path,
    stage_fqn: &str,
) -> StageResult<()> {
    let manager = StageManager::new(conn);

    for path in &diff.deleted {
        log::debug!("Removing {} from {}", path, stage_fqn);
        manager.remove(stage_fqn, path).await?;
    }
    for path in &diff.modified {
        log::debug!("Uploading modified {}", path);
        manager
            .put(
                &local_root.join(path),
                &stage_directory(stage_fqn, path),
                DEFAULT_PUT_PARALLEL,
                true,
            )
            .await?;
    }
    for path in &diff.added {
        log::debug!("Uploading new {}", path);
        manager
            .put(
                &local_root.join(path),
                &stage_directory(stage_fqn, path),
                DEFAULT_PUT_PARALLEL,
                false,
            )
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use na_db::mock::ScriptedGateway;
    use std::path::PathBuf;

    #[test]
    fn test_stage_directory() {
        assert_eq!(stage_directory("p.s.st", "setup.sql"), "p.s.st");
        assert_eq!(stage_directory("p.s.st", "ui/pages/a.py"), "p.s.st/ui/pages");
    }

    #[tokio::test]
    async fn test_sync_order_and_overwrite() {
        let conn = ScriptedGateway::new("R");
        let diff = DiffResult {
            added: vec!["ui/new.py".to_string()],
            modified: vec!["setup.sql".to_string()],
            deleted: vec!["old.sql".to_string()],
            identical: vec!["manifest.yml".to_string()],
        };
        sync_local_diff_with_stage(&conn, &diff, &PathBuf::from("/d"), "p.s.st")
            .await
            .unwrap();
        assert_eq!(
            conn.statements(),
            vec![
                "remove @p.s.st/old.sql",
                "put file:///d/setup.sql @p.s.st auto_compress=false parallel=4 overwrite=true",
                "put file:///d/ui/new.py @p.s.st/ui auto_compress=false parallel=4 overwrite=false",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_diff_issues_nothing() {
        let conn = ScriptedGateway::new("R");
        sync_local_diff_with_stage(&conn, &DiffResult::default(), &PathBuf::from("/d"), "p.s.st")
            .await
            .unwrap();
        assert!(conn.statements().is_empty());
    }
}
