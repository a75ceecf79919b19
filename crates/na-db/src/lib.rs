//! na-db - Query gateway for napp
//!
//! This crate provides the [`SqlGateway`] trait every lifecycle operation
//! talks through, typed result rows, role scoping for a single logical
//! session, and a Snowflake SQL API implementation. A scripted in-memory
//! gateway for tests is available behind the `test-support` feature.

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod row;
pub mod session;
pub mod snowflake;
pub mod split;
pub mod traits;

pub use error::{DbError, DbResult};
pub use row::{QueryResult, Row};
pub use session::{current_role, same_role, use_warehouse, with_role, RoleScope};
pub use snowflake::{SnowflakeBackend, SnowflakeConfig};
pub use split::split_statements;
pub use traits::{ConnectionContext, SqlGateway};
