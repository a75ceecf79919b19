//! Enrichment of well-known backend errors with actionable messages

use crate::constants::{
    ERROR_CODE_2043, ERROR_CODE_606, ERROR_MESSAGE_2043, ERROR_MESSAGE_606,
    NOT_EXIST_OR_NOT_AUTHORIZED,
};
use na_db::DbError;

/// Rewrap `err` with a message explaining its likely cause.
///
/// Recognizes missing warehouse access, a session without a warehouse and
/// missing or unauthorized objects. The backend error code is kept. Any
/// other error is returned unchanged.
pub fn classify_sql_error(err: DbError, role: Option<&str>, warehouse: Option<&str>) -> DbError {
    let DbError::Sql { code, message } = &err else {
        return err;
    };
    let code = *code;
    let hint = if code == Some(ERROR_CODE_2043) || message.contains(ERROR_MESSAGE_2043) {
        format!(
            "'{}' may not have access to warehouse '{}'.\nPlease grant usage privilege on warehouse to this role.",
            role.unwrap_or("unknown"),
            warehouse.unwrap_or("unknown")
        )
    } else if code == Some(ERROR_CODE_606) || message.contains(ERROR_MESSAGE_606) {
        "Please provide a warehouse for the active session role in your project definition file, \
         the SNOWFLAKE_WAREHOUSE environment variable, or via command line."
            .to_string()
    } else if message.contains(NOT_EXIST_OR_NOT_AUTHORIZED) {
        "Please check the name of the resource you are trying to query or the permissions of \
         the role you are using to run the query."
            .to_string()
    } else {
        return err;
    };
    DbError::sql(
        code,
        format!(
            "Received error message '{}' while executing SQL statement.\n{}",
            message, hint
        ),
    )
}
