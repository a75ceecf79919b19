//! Stage file operations issued as SQL through the gateway

use crate::error::{StageError, StageResult};
use na_core::sql_utils::to_string_literal;
use na_db::SqlGateway;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static UNQUOTED_STAGE_RE: OnceLock<Regex> = OnceLock::new();
static PLAIN_URI_RE: OnceLock<Regex> = OnceLock::new();

/// Get the compiled regex for stage names usable without quoting (built
/// once from a literal pattern, reused)
fn unquoted_stage_regex() -> &'static Regex {
    UNQUOTED_STAGE_RE.get_or_init(|| Regex::new(r"^@[\w./$]+$").expect("valid regex"))
}

/// Get the compiled regex for file URIs usable without quoting (built once
/// from a literal pattern, reused)
fn plain_uri_regex() -> &'static Regex {
    PLAIN_URI_RE.get_or_init(|| Regex::new(r"^[\w/.:\-]+$").expect("valid regex"))
}

/// Default `parallel` setting for uploads
pub const DEFAULT_PUT_PARALLEL: u32 = 4;

/// Prefix `name` with `@` unless it already refers to a stage.
pub fn get_standard_stage_prefix(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{}", name)
    }
}

/// Stage reference usable in `put`, `ls` and `remove`.
///
/// Names made only of word characters, `.`, `/` and `$` are used bare;
/// anything else becomes a string literal.
pub fn quote_stage_name(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('\'') && name.ends_with('\'') {
        return name.to_string();
    }
    let standard = get_standard_stage_prefix(name);
    if unquoted_stage_regex().is_match(&standard) {
        standard
    } else {
        to_string_literal(&standard)
    }
}

fn file_uri(path: &Path) -> String {
    let uri = format!("file://{}", path.display().to_string().replace('\\', "/"));
    if plain_uri_regex().is_match(&uri) {
        uri
    } else {
        to_string_literal(&uri)
    }
}

/// One entry of a stage listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    /// Path relative to the stage root, `/`-separated
    pub path: String,
    /// Checksum reported by the stage
    pub md5: Option<String>,
    /// Size in bytes
    pub size: Option<u64>,
}

/// Drop the leading stage-name component from a listed file name.
fn strip_stage_name(listed: &str) -> &str {
    listed.split_once('/').map_or(listed, |(_, rest)| rest)
}

/// Issues stage commands through a [`SqlGateway`] under whatever role is
/// currently active.
pub struct StageManager<'a> {
    conn: &'a dyn SqlGateway,
}

impl<'a> StageManager<'a> {
    /// Create a manager issuing commands through `conn`
    pub fn new(conn: &'a dyn SqlGateway) -> Self {
        Self { conn }
    }

    /// List every file on `stage`.
    pub async fn list_files(&self, stage: &str) -> StageResult<Vec<StageFile>> {
        let result = self
            .conn
            .execute(&format!("ls {}", quote_stage_name(stage)))
            .await?;
        let mut files = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let name = row.get("name")?.ok_or_else(|| StageError::UnexpectedListing {
                stage: stage.to_string(),
                reason: "file with no name".to_string(),
            })?;
            files.push(StageFile {
                path: strip_stage_name(name).to_string(),
                md5: row.get("md5")?.map(str::to_string),
                size: row.get("size")?.and_then(|s| s.parse().ok()),
            });
        }
        Ok(files)
    }

    /// Upload `local_path` into the `stage_path` directory.
    pub async fn put(
        &self,
        local_path: &Path,
        stage_path: &str,
        parallel: u32,
        overwrite: bool,
    ) -> StageResult<()> {
        let sql = format!(
            "put {} {} auto_compress=false parallel={} overwrite={}",
            file_uri(local_path),
            quote_stage_name(stage_path),
            parallel,
            overwrite
        );
        self.conn.execute(&sql).await?;
        Ok(())
    }

    /// Remove `path` (relative to the stage root) from `stage`.
    pub async fn remove(&self, stage: &str, path: &str) -> StageResult<()> {
        let target = format!("{}/{}", stage.trim_end_matches('/'), path);
        self.conn
            .execute(&format!("remove {}", quote_stage_name(&target)))
            .await?;
        Ok(())
    }
}
