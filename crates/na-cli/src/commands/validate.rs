//! Validate command implementation

use anyhow::Result;
use na_core::ProjectIdentity;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::context::{session_defaults, LoadedProject};

/// Shown for roles only a live connection could supply
const CONNECTION_ROLE: &str = "(connection role)";

/// Resolve names without a connection. A role neither the definition nor
/// the flags provide is reported as [`CONNECTION_ROLE`].
fn resolve_offline(project: &LoadedProject, global: &GlobalArgs) -> Result<ProjectIdentity> {
    let mut session = session_defaults(global);
    session
        .role
        .get_or_insert_with(|| CONNECTION_ROLE.to_string());
    project.resolve(&session)
}

/// Resolved names worth showing, in display order
fn identity_summary(identity: &ProjectIdentity) -> Vec<(&'static str, String)> {
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| "(none)".to_string());
    vec![
        ("Project", identity.project_identifier.clone()),
        ("Application package", identity.package_name.clone()),
        ("Package role", identity.package_role.clone()),
        ("Package warehouse", or_none(&identity.package_warehouse)),
        ("Distribution", identity.package_distribution.to_string()),
        ("Package scripts", identity.package_scripts.len().to_string()),
        ("Application", identity.app_name.clone()),
        ("Application role", identity.app_role.clone()),
        ("Application warehouse", or_none(&identity.app_warehouse)),
        ("Debug mode", identity.debug_mode.to_string()),
        ("Stage", identity.stage_fqn.clone()),
        ("Deploy root", identity.deploy_root.display().to_string()),
    ]
}

/// Execute the validate command
pub(crate) async fn execute(_args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = LoadedProject::load(global)?;
    let identity = resolve_offline(&project, global)?;

    for (label, value) in identity_summary(&identity) {
        println!("{:<22} {}", format!("{}:", label), value);
    }
    println!("Project definition is valid.");
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
