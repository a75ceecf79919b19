//! na-stage - Stage diffing and synchronization for napp
//!
//! Compares a local deploy root against the files on a Snowflake stage by
//! MD5 checksum and applies the difference with `put` and `remove`.

pub mod checksum;
pub mod diff;
pub mod error;
pub mod manager;
pub mod sync;

pub use checksum::{compute_md5sum, is_valid_md5sum};
pub use diff::{stage_diff, DiffResult};
pub use error::{StageError, StageResult};
pub use manager::{get_standard_stage_prefix, quote_stage_name, StageFile, StageManager};
pub use sync::sync_local_diff_with_stage;
