//! Shared utilities for CLI commands

use na_manager::ManagerError;
use std::fmt;

/// Error type representing a process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; never shown to the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Convert a manager failure into the error `main` reports.
///
/// A declined recreate has already been explained on the console, so it
/// only sets the exit code: 0 when a user chose it, 1 otherwise.
pub(crate) fn manager_failure(err: ManagerError) -> anyhow::Error {
    match err {
        ManagerError::UpgradeDeclined { interactive, .. } => {
            ExitCode(if interactive { 0 } else { 1 }).into()
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_code(err: &anyhow::Error) -> Option<i32> {
        err.downcast_ref::<ExitCode>().map(|code| code.0)
    }

    #[test]
    fn test_declined_upgrade_exit_codes() {
        let interactive = manager_failure(ManagerError::UpgradeDeclined {
            message: "Not upgrading the application object.".to_string(),
            interactive: true,
        });
        assert_eq!(exit_code(&interactive), Some(0));

        let scripted = manager_failure(ManagerError::UpgradeDeclined {
            message: "Cannot upgrade the application object non-interactively without --force."
                .to_string(),
            interactive: false,
        });
        assert_eq!(exit_code(&scripted), Some(1));
    }

    #[test]
    fn test_other_failures_keep_their_message() {
        let err = manager_failure(ManagerError::CouldNotDropApplicationPackageWithVersions);
        assert_eq!(exit_code(&err), None);
        assert!(err.to_string().starts_with("[N013]"));
    }
}
