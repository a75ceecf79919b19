//! Deploy command implementation

use anyhow::Result;
use na_manager::{Console, NativeAppManager};

use crate::cli::{DeployArgs, GlobalArgs};
use crate::commands::common::manager_failure;
use crate::context::RuntimeContext;

/// Execute the deploy command
pub(crate) async fn execute(_args: &DeployArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let console = ctx.console();
    let manager = NativeAppManager::new(&ctx.conn, &console, &ctx.identity);

    manager.build_bundle().map_err(manager_failure)?;
    let diff = manager.deploy().await.map_err(manager_failure)?;
    ctx.verbose(&format!("{} file(s) changed on the stage", diff.change_count()));

    console.step("Deployed successfully.");
    Ok(())
}
