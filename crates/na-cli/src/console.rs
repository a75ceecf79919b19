//! Terminal output and confirmation prompts

use dialoguer::Confirm;
use na_manager::{AllowAlwaysPolicy, AskAlwaysPolicy, Console, DenyAlwaysPolicy, Policy};
use std::io::IsTerminal;

/// Console printing progress to stdout and warnings to stderr
pub(crate) struct TerminalConsole;

impl Console for TerminalConsole {
    fn step(&self, message: &str) {
        println!("{}", message);
    }

    fn message(&self, message: &str) {
        println!("  {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }
}

fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Whether prompts can be answered: requested explicitly or stdin is a
/// terminal
pub(crate) fn is_interactive(requested: bool) -> bool {
    requested || std::io::stdin().is_terminal()
}

/// Policy for confirmations: `force` allows everything, otherwise ask when
/// interactive and refuse when not.
pub(crate) fn policy_for(force: bool, interactive: bool) -> Box<dyn Policy> {
    if force {
        Box::new(AllowAlwaysPolicy)
    } else if interactive {
        Box::new(AskAlwaysPolicy::new(confirm))
    } else {
        Box::new(DenyAlwaysPolicy)
    }
}
