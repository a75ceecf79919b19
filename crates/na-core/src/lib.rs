//! na-core - Core library for napp
//!
//! This crate provides the project definition schema (`snowflake.yml`),
//! Snowflake identifier utilities, the resolved [`ProjectIdentity`] used by
//! every lifecycle command, and the artifact bundler that materializes the
//! local deploy root.

pub mod bundle;
pub mod config;
pub mod error;
pub mod identity;
pub mod sql_utils;

pub use bundle::{build_bundle, ArtifactMapping};
pub use config::{
    ApplicationDefinition, ArtifactDefinition, Distribution, NativeAppDefinition,
    PackageDefinition, ProjectDefinition,
};
pub use error::{CoreError, CoreResult};
pub use identity::{ProjectIdentity, SessionDefaults};
