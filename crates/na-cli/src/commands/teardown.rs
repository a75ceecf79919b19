//! Teardown command implementation

use anyhow::Result;
use na_manager::{Console, DropOutcome, NativeAppManager};

use crate::cli::{GlobalArgs, TeardownArgs};
use crate::commands::common::manager_failure;
use crate::console::{is_interactive, policy_for};
use crate::context::RuntimeContext;

/// Execute the teardown command
pub(crate) async fn execute(args: &TeardownArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let console = ctx.console();
    let manager = NativeAppManager::new(&ctx.conn, &console, &ctx.identity);

    // Forced drops never consult the policy
    let policy = policy_for(false, is_interactive(false));
    let outcome = manager
        .teardown(args.force, policy.as_ref())
        .await
        .map_err(manager_failure)?;
    ctx.verbose(&format!(
        "application: {:?}, package: {:?}",
        outcome.application, outcome.package
    ));

    if outcome.application == DropOutcome::Kept || outcome.package == DropOutcome::Kept {
        return Ok(());
    }
    console.step("Teardown is now complete.");
    Ok(())
}
