//! Column names, markers and error codes shared by the lifecycle commands

/// Comment written on every object this tool creates
pub const SPECIAL_COMMENT: &str = "GENERATED_BY_SNOWFLAKECLI";

/// Comments that mark an object as created by this tool, including the
/// marker older releases wrote
pub const ALLOWED_SPECIAL_COMMENTS: &[&str] = &[SPECIAL_COMMENT, "GENERATED_BY_SNOWCLI"];

/// `name` column of `show` output
pub const NAME_COL: &str = "name";
/// `owner` column of `show` output
pub const OWNER_COL: &str = "owner";
/// `comment` column of `show` output
pub const COMMENT_COL: &str = "comment";
/// `version` column of `show applications` / `show versions` output
pub const VERSION_COL: &str = "version";

/// Version reported for applications created from files on a named stage
pub const LOOSE_FILES_MAGIC_VERSION: &str = "UNVERSIONED";

/// Warehouse access denied
pub const ERROR_CODE_2043: i64 = 2043;
/// Message of error 2043
pub const ERROR_MESSAGE_2043: &str = "Object does not exist, or operation cannot be performed.";
/// No warehouse in session
pub const ERROR_CODE_606: i64 = 606;
/// Message of error 606
pub const ERROR_MESSAGE_606: &str = "No active warehouse selected in the current session.";
/// Substring of every missing-or-unauthorized object error
pub const NOT_EXIST_OR_NOT_AUTHORIZED: &str = "does not exist or not authorized";

/// Upgrade errors meaning the application was created by a different
/// process and has to be recreated
pub const UPGRADE_RESTRICTION_CODES: &[i64] = &[93044, 93045, 93046, 93055];

/// Whether `comment` marks an object as created by this tool
pub fn is_special_comment(comment: &str) -> bool {
    ALLOWED_SPECIAL_COMMENTS.contains(&comment)
}
