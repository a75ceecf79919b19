//! Run command implementation

use anyhow::Result;
use na_manager::{Console, NativeAppManager, RunOptions, RunOutcome};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::manager_failure;
use crate::console::{is_interactive, policy_for};
use crate::context::RuntimeContext;

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let console = ctx.console();
    let manager = NativeAppManager::new(&ctx.conn, &console, &ctx.identity);

    let interactive = is_interactive(args.interactive);
    let policy = policy_for(args.force, interactive);
    let options = RunOptions {
        version: args.version.clone(),
        patch: args.patch,
        from_release_directive: args.from_release_directive,
        interactive,
    };

    manager.build_bundle().map_err(manager_failure)?;
    let outcome = manager
        .run(&options, policy.as_ref())
        .await
        .map_err(manager_failure)?;
    match &outcome {
        RunOutcome::Development(diff) => ctx.verbose(&format!("Stage: {}", diff)),
        RunOutcome::Version { version, patch } => ctx.verbose(&format!(
            "Using version {}{}",
            version,
            patch.map(|p| format!(" patch {}", p)).unwrap_or_default()
        )),
        RunOutcome::ReleaseDirective => ctx.verbose("Using the release directive"),
    }

    console.step(&format!(
        "Your application object ({}) is now available.",
        ctx.identity.app_name
    ));
    Ok(())
}
