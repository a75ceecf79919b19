//! na-manager - Native application lifecycle manager for napp
//!
//! Reconciles a local project against the application package and
//! application objects in a Snowflake account:
//!
//! - [`NativeAppManager::create_app_package`] creates the package or
//!   validates an existing one (owner, distribution, marker comment)
//! - [`NativeAppManager::apply_package_scripts`] renders every package
//!   script before executing any of them
//! - [`NativeAppManager::sync_deploy_root_with_stage`] makes the package
//!   stage match the local deploy root
//! - [`NativeAppManager::deploy`] runs the three steps in order
//!
//! Application run and teardown build on the same manager.

pub mod classify;
pub mod console;
pub mod constants;
pub mod error;
pub mod manager;
pub mod objects;
pub mod policy;
pub mod run;
pub mod teardown;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use classify::classify_sql_error;
pub use console::Console;
pub use error::{ManagerError, ManagerResult};
pub use manager::NativeAppManager;
pub use objects::{ensure_correct_owner, show_specific_object, to_fully_qualified_name};
pub use policy::{AllowAlwaysPolicy, AskAlwaysPolicy, DenyAlwaysPolicy, Policy};
pub use run::{RunOptions, RunOutcome};
pub use teardown::{DropOutcome, TeardownOutcome};
