//! Role and warehouse scoping within one logical session
//!
//! A [`RoleScope`] switches to a role only when it differs from the current
//! one and restores whatever role was active when the scope was entered.
//! Nested scopes therefore unwind one level at a time.

use crate::error::{DbError, DbResult};
use crate::traits::SqlGateway;
use na_core::sql_utils::{to_identifier, unquote_identifier};
use std::future::Future;

/// Query the role currently active in the session.
pub async fn current_role(conn: &dyn SqlGateway) -> DbResult<String> {
    let query = "select current_role()";
    let result = conn.execute(query).await?;
    result
        .first()
        .and_then(|row| row.value(0))
        .map(str::to_string)
        .ok_or_else(|| DbError::UnexpectedResult {
            query: query.to_string(),
            reason: "no role returned".to_string(),
        })
}

/// Switch the session to `warehouse`.
pub async fn use_warehouse(conn: &dyn SqlGateway, warehouse: &str) -> DbResult<()> {
    conn.execute(&format!("use warehouse {}", to_identifier(warehouse)))
        .await?;
    Ok(())
}

/// Whether two role names resolve to the same role
pub fn same_role(a: &str, b: &str) -> bool {
    unquote_identifier(a).eq_ignore_ascii_case(&unquote_identifier(b))
}

/// An entered role scope. Call [`RoleScope::exit`] on every path.
#[must_use = "a role scope must be exited to restore the previous role"]
pub struct RoleScope<'a> {
    conn: &'a dyn SqlGateway,
    previous: Option<String>,
    restored: bool,
}

impl<'a> RoleScope<'a> {
    /// Make `role` the active role, remembering the current one.
    ///
    /// No statement is issued besides the lookup when `role` is already
    /// active.
    pub async fn enter(conn: &'a dyn SqlGateway, role: &str) -> DbResult<RoleScope<'a>> {
        let current = current_role(conn).await?;
        if same_role(&current, role) {
            return Ok(Self {
                conn,
                previous: None,
                restored: false,
            });
        }
        log::debug!("Switching role from {} to {}", current, role);
        conn.execute(&format!("use role {}", to_identifier(role)))
            .await?;
        Ok(Self {
            conn,
            previous: Some(current),
            restored: false,
        })
    }

    /// Restore the role that was active when the scope was entered.
    pub async fn exit(mut self) -> DbResult<()> {
        self.restored = true;
        if let Some(previous) = self.previous.take() {
            log::debug!("Restoring role {}", previous);
            self.conn
                .execute(&format!("use role {}", to_identifier(&previous)))
                .await?;
        }
        Ok(())
    }
}

impl Drop for RoleScope<'_> {
    fn drop(&mut self) {
        if !self.restored {
            if let Some(previous) = &self.previous {
                log::warn!("Role scope dropped without restoring role {}", previous);
            }
        }
    }
}

/// Run `work` with `role` active, restoring the previous role afterwards
/// whether or not `work` succeeds.
///
/// An error from `work` takes precedence over a failure to restore.
pub async fn with_role<T, E, F>(conn: &dyn SqlGateway, role: &str, work: F) -> Result<T, E>
where
    E: From<DbError>,
    F: Future<Output = Result<T, E>>,
{
    let scope = RoleScope::enter(conn, role).await.map_err(E::from)?;
    let outcome = work.await;
    let restore = scope.exit().await;
    match (outcome, restore) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(E::from(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            log::warn!("Failed to restore role after error: {}", restore_err);
            Err(e)
        }
    }
}
