//! Dropping the application object and its package

use crate::constants::{is_special_comment, COMMENT_COL, OWNER_COL};
use crate::error::{ManagerError, ManagerResult};
use crate::manager::NativeAppManager;
use crate::objects::ensure_correct_owner;
use crate::policy::Policy;
use na_core::Distribution;
use na_db::{with_role, Row};

/// What teardown did with one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The object was dropped
    Dropped,
    /// No such object owned by the expected role
    NotFound,
    /// Confirmation was refused and the object kept
    Kept,
}

/// Result of `teardown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownOutcome {
    pub application: DropOutcome,
    pub package: DropOutcome,
}

fn detail<'r>(row: &'r Row, column: &str) -> &'r str {
    row.get(column).ok().flatten().unwrap_or_default()
}

impl NativeAppManager<'_> {
    /// Drop `object_type object_name` as `role`.
    pub async fn drop_generic_object(
        &self,
        object_type: &str,
        object_name: &str,
        role: &str,
    ) -> ManagerResult<()> {
        with_role(self.conn, role, async {
            self.console
                .step(&format!("Dropping {} {} now.", object_type, object_name));
            let query = format!("drop {} {}", object_type, object_name);
            if let Err(err) = self.conn.execute(&query).await {
                log::debug!("{} failed: {}", query, err);
                return Err(ManagerError::SqlExecution { query });
            }
            self.console.message(&format!(
                "Dropped {} {} successfully.",
                object_type, object_name
            ));
            Ok(())
        })
        .await
    }

    /// Drop the application object.
    ///
    /// Objects without the marker comment are only dropped when `force` is
    /// set or `policy` confirms.
    pub async fn drop_application(
        &self,
        force: bool,
        policy: &dyn Policy,
    ) -> ManagerResult<DropOutcome> {
        let identity = self.identity;
        let Some(row) = self.get_existing_app_info().await? else {
            self.console.warning(&format!(
                "Role {} does not own any application object with the name {}, \
                 or the application object does not exist.",
                identity.app_role, identity.app_name
            ));
            return Ok(DropOutcome::NotFound);
        };

        ensure_correct_owner(&row, &identity.app_role, &identity.app_name)?;

        let comment = row.text(COMMENT_COL)?;
        if !is_special_comment(comment) && !force {
            let prompt = format!(
                "Application object {name} was not created by napp.\n\
                 Application object details:\n\
                 Name: {name}\n\
                 Created on: {created_on}\n\
                 Source: {source}\n\
                 Owner: {owner}\n\
                 Comment: {comment}\n\
                 Version: {version}\n\
                 Patch: {patch}\n\
                 Are you sure you want to drop it?",
                name = identity.app_name,
                created_on = detail(&row, "created_on"),
                source = detail(&row, "source"),
                owner = detail(&row, OWNER_COL),
                comment = comment,
                version = detail(&row, "version"),
                patch = detail(&row, "patch"),
            );
            if !policy.should_proceed(&prompt) {
                self.console.message(&format!(
                    "Did not drop application object {}.",
                    identity.app_name
                ));
                return Ok(DropOutcome::Kept);
            }
        }

        self.drop_generic_object("application", &identity.app_name, &identity.app_role)
            .await?;
        Ok(DropOutcome::Dropped)
    }

    /// Drop the application package.
    ///
    /// Refuses while versions are defined. Internal packages without the
    /// marker comment and all external packages need `force` or a
    /// confirmation from `policy`.
    pub async fn drop_package(&self, force: bool, policy: &dyn Policy) -> ManagerResult<DropOutcome> {
        let identity = self.identity;
        let Some(row) = self.get_existing_app_pkg_info().await? else {
            self.console.warning(&format!(
                "Role {} does not own any application package with the name {}, \
                 or the application package does not exist.",
                identity.package_role, identity.package_name
            ));
            return Ok(DropOutcome::NotFound);
        };

        ensure_correct_owner(&row, &identity.package_role, &identity.package_name)?;

        let versions = self.get_all_existing_versions().await?;
        if versions.row_count.unwrap_or(0) > 0 {
            return Err(ManagerError::CouldNotDropApplicationPackageWithVersions);
        }

        let actual = self.get_app_pkg_distribution_in_snowflake().await?;
        if !self.verify_project_distribution(Some(&actual)).await? {
            self.console.warning(&format!(
                "Continuing to execute `napp teardown` on application package {} with distribution '{}'.",
                identity.package_name, actual
            ));
        }

        let comment = row.text(COMMENT_COL)?;
        let needs_confirm = if actual == Distribution::Internal.as_str() {
            !is_special_comment(comment)
        } else {
            true
        };

        if needs_confirm && !force {
            if actual == Distribution::Internal.as_str() {
                self.console.warning(&format!(
                    "Application package {} was not created by napp.",
                    identity.package_name
                ));
            } else {
                self.console.warning(&format!(
                    "Application package {} in your Snowflake account has distribution property '{}' \
                     and could be associated with one or more of your listings on Snowflake Marketplace.",
                    identity.package_name,
                    Distribution::External
                ));
            }

            let prompt = format!(
                "Application package details:\n\
                 Name: {}\n\
                 Created on: {}\n\
                 Distribution: {}\n\
                 Owner: {}\n\
                 Comment: {}\n\
                 Are you sure you want to drop it?",
                identity.package_name,
                detail(&row, "created_on"),
                actual,
                detail(&row, OWNER_COL),
                comment,
            );
            if !policy.should_proceed(&prompt) {
                self.console.message(&format!(
                    "Did not drop application package {}.",
                    identity.package_name
                ));
                return Ok(DropOutcome::Kept);
            }
        }

        self.drop_generic_object(
            "application package",
            &identity.package_name,
            &identity.package_role,
        )
        .await?;
        Ok(DropOutcome::Dropped)
    }

    /// Drop the application object, then its package.
    pub async fn teardown(&self, force: bool, policy: &dyn Policy) -> ManagerResult<TeardownOutcome> {
        let application = self.drop_application(force, policy).await?;
        let package = self.drop_package(force, policy).await?;
        Ok(TeardownOutcome {
            application,
            package,
        })
    }
}

#[cfg(test)]
#[path = "teardown_test.rs"]
mod tests;
