//! Bundle command implementation

use anyhow::{Context, Result};
use na_core::build_bundle;

use crate::cli::{BundleArgs, GlobalArgs};
use crate::context::LoadedProject;

/// Execute the bundle command
pub(crate) async fn execute(_args: &BundleArgs, global: &GlobalArgs) -> Result<()> {
    let project = LoadedProject::load(global)?;
    let (deploy_root, artifacts) = project.bundle_plan()?;
    if global.verbose {
        eprintln!("[verbose] Bundling {} artifact(s)", artifacts.len());
    }

    build_bundle(&project.root, &deploy_root, &artifacts).context("Failed to bundle artifacts")?;
    println!("Bundle generated at {}", deploy_root.display());
    Ok(())
}
