//! Query gateway trait definition

use crate::error::DbResult;
use crate::row::QueryResult;
use crate::split::split_statements;
use async_trait::async_trait;

/// Connection-level defaults a gateway was opened with.
///
/// These are the values the session started with, not necessarily the ones
/// currently active after `use role` or `use warehouse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionContext {
    /// Role of the connection
    pub role: Option<String>,
    /// Warehouse of the connection
    pub warehouse: Option<String>,
    /// Database of the connection
    pub database: Option<String>,
    /// Schema of the connection
    pub schema: Option<String>,
}

/// SQL gateway abstraction for napp
///
/// A gateway is one logical session: `use role` and `use warehouse` issued
/// through [`SqlGateway::execute`] affect every later statement.
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait SqlGateway: Send + Sync {
    /// Execute a single statement and return its result
    async fn execute(&self, sql: &str) -> DbResult<QueryResult>;

    /// Execute a script of `;`-separated statements in order, stopping at the
    /// first failure. Returns the result of the last statement.
    async fn execute_batch(&self, sql: &str) -> DbResult<QueryResult> {
        let mut last = QueryResult::empty();
        for statement in split_statements(sql) {
            last = self.execute(&statement).await?;
        }
        Ok(last)
    }

    /// Defaults the connection was opened with
    fn connection_context(&self) -> ConnectionContext;

    /// Gateway type identifier for logging
    fn db_type(&self) -> &'static str;
}
