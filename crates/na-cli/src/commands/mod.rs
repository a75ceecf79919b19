//! CLI command implementations

pub(crate) mod bundle;
pub(crate) mod common;
pub(crate) mod deploy;
pub(crate) mod run;
pub(crate) mod teardown;
pub(crate) mod validate;
