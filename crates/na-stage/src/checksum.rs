//! MD5 checksums matching the ones Snowflake reports for staged files

use md5::{Digest, Md5};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

const READ_CHUNK: usize = 8192;

static MD5_RE: OnceLock<Regex> = OnceLock::new();

/// MD5 of the file at `path` as lower-case hex.
pub fn compute_md5sum(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// Whether `value` is a plain 32-digit hex MD5.
///
/// Files uploaded in several parts are listed with a composite checksum that
/// cannot be compared against a local MD5.
pub fn is_valid_md5sum(value: &str) -> bool {
    md5_regex().is_match(value)
}

/// Get the compiled MD5 regex (built once from a literal pattern, reused)
fn md5_regex() -> &'static Regex {
    MD5_RE.get_or_init(|| Regex::new(r"^[A-Fa-f0-9]{32}$").expect("valid regex"))
}
