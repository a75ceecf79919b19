//! Creating and upgrading the application object

use crate::classify::classify_sql_error;
use crate::constants::{
    is_special_comment, COMMENT_COL, LOOSE_FILES_MAGIC_VERSION, NOT_EXIST_OR_NOT_AUTHORIZED,
    SPECIAL_COMMENT, UPGRADE_RESTRICTION_CODES, VERSION_COL,
};
use crate::error::{ManagerError, ManagerResult};
use crate::manager::NativeAppManager;
use crate::objects::{ensure_correct_owner, show_specific_object};
use crate::policy::Policy;
use na_db::{same_role, use_warehouse, with_role, DbError, DbResult, QueryResult, Row};
use na_stage::{quote_stage_name, DiffResult};

const RECREATE_PROMPT: &str =
    "Do you want napp to drop the existing application object and recreate it?";

/// How `run` should obtain the application object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Upgrade to this package version instead of the stage files
    pub version: Option<String>,
    /// Patch of `version`
    pub patch: Option<u32>,
    /// Upgrade according to the package's release directive
    pub from_release_directive: bool,
    /// Whether a user is available to answer prompts
    pub interactive: bool,
}

/// What `run` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Deployed and created or upgraded from the stage files
    Development(DiffResult),
    /// Created or upgraded from a package version
    Version {
        version: String,
        patch: Option<u32>,
    },
    /// Created or upgraded from the release directive
    ReleaseDirective,
}

/// `using version ...` clause for an upgrade, empty without a version
fn using_clause(version: Option<&str>, patch: Option<u32>) -> String {
    match (version, patch) {
        (Some(version), Some(patch)) => format!("using version {} patch {}", version, patch),
        (Some(version), None) => format!("using version {}", version),
        (None, _) => String::new(),
    }
}

fn is_upgrade_restriction(err: &DbError) -> bool {
    err.code()
        .is_some_and(|code| UPGRADE_RESTRICTION_CODES.contains(&code))
}

impl NativeAppManager<'_> {
    async fn use_app_warehouse(&self) -> ManagerResult<()> {
        if let Some(warehouse) = &self.identity.app_warehouse {
            let role = self.identity.app_role.as_str();
            use_warehouse(self.conn, warehouse)
                .await
                .map_err(|e| classify_sql_error(e, Some(role), Some(warehouse)))?;
        }
        Ok(())
    }

    fn set_debug_mode_sql(&self) -> String {
        format!(
            "alter application {} set debug_mode = {}",
            self.identity.app_name, self.identity.debug_mode
        )
    }

    /// Create the application from the stage files, or upgrade the one a
    /// previous run created.
    pub async fn create_dev_app(&self, diff: &DiffResult) -> ManagerResult<()> {
        let identity = self.identity;
        let role = identity.app_role.as_str();
        with_role(self.conn, role, async {
            self.use_app_warehouse().await?;

            if let Some(row) = self.get_existing_app_info().await? {
                let comment = row.text(COMMENT_COL)?;
                let version = row.text(VERSION_COL)?;
                if !is_special_comment(comment) || version != LOOSE_FILES_MAGIC_VERSION {
                    return Err(ManagerError::ApplicationAlreadyExists {
                        name: identity.app_name.clone(),
                    });
                }
                ensure_correct_owner(&row, role, &identity.app_name)?;

                let upgraded: DbResult<()> = async {
                    if diff.has_changes() {
                        self.console.step(&format!(
                            "Upgrading existing application object {}.",
                            identity.app_name
                        ));
                        self.conn
                            .execute(&format!(
                                "alter application {} upgrade using @{}",
                                identity.app_name, identity.stage_fqn
                            ))
                            .await?;
                    }
                    self.conn.execute(&self.set_debug_mode_sql()).await?;
                    Ok(())
                }
                .await;
                return upgraded
                    .map_err(|e| ManagerError::from(classify_sql_error(e, None, None)));
            }

            self.console.step(&format!(
                "Creating new application {} in account.",
                identity.app_name
            ));
            if !same_role(role, &identity.package_role) {
                let grants = format!(
                    "grant install, develop on application package {pkg} to role {role};\n\
                     grant usage on schema {pkg}.{schema} to role {role};\n\
                     grant read on stage {stage} to role {role};",
                    pkg = identity.package_name,
                    schema = identity.stage_schema,
                    stage = identity.stage_fqn,
                    role = role,
                );
                with_role(
                    self.conn,
                    &identity.package_role,
                    self.conn.execute_batch(&grants),
                )
                .await?;
            }

            let sql = format!(
                "create application {}\n    from application package {}\n    using {}\n    debug_mode = {}\n    comment = {}",
                identity.app_name,
                identity.package_name,
                quote_stage_name(&identity.stage_fqn),
                identity.debug_mode,
                SPECIAL_COMMENT
            );
            self.conn
                .execute(&sql)
                .await
                .map_err(|e| classify_sql_error(e, None, None))?;
            Ok::<(), ManagerError>(())
        })
        .await
    }

    /// Every version defined in the application package.
    pub async fn get_all_existing_versions(&self) -> ManagerResult<QueryResult> {
        let query = format!(
            "show versions in application package {}",
            self.identity.package_name
        );
        let result = self
            .execute_with_role(&self.identity.package_role, &query)
            .await?;
        if result.row_count.is_none() {
            return Err(ManagerError::SqlExecution { query });
        }
        Ok(result)
    }

    /// The package version named `version`, if defined.
    pub async fn get_existing_version_info(&self, version: &str) -> ManagerResult<Option<Row>> {
        let identity = self.identity;
        let role = identity.package_role.as_str();
        let in_clause = format!("in application package {}", identity.package_name);
        with_role(self.conn, role, async {
            match show_specific_object(
                self.conn,
                "versions",
                version,
                VERSION_COL,
                Some(&in_clause),
                false,
            )
            .await
            {
                Err(ManagerError::Db(err)) if err.message().contains(NOT_EXIST_OR_NOT_AUTHORIZED) => {
                    Err(ManagerError::ApplicationPackageDoesNotExist {
                        name: identity.package_name.clone(),
                    })
                }
                Err(ManagerError::Db(err)) => {
                    Err(ManagerError::from(classify_sql_error(err, Some(role), None)))
                }
                other => other,
            }
        })
        .await
    }

    /// Drop the application so it can be recreated, if `policy` allows.
    pub async fn drop_application_before_upgrade(
        &self,
        policy: &dyn Policy,
        interactive: bool,
    ) -> ManagerResult<()> {
        if !policy.should_proceed(RECREATE_PROMPT) {
            let message = if interactive {
                "Not upgrading the application object."
            } else {
                "Cannot upgrade the application object non-interactively without --force."
            };
            self.console.message(message);
            return Err(ManagerError::UpgradeDeclined {
                message: message.to_string(),
                interactive,
            });
        }
        self.conn
            .execute(&format!("drop application {}", self.identity.app_name))
            .await
            .map_err(|e| classify_sql_error(e, None, None))?;
        Ok(())
    }

    /// Upgrade the application to `version`, or to the release directive
    /// without one. Creates it when missing.
    ///
    /// An upgrade the backend refuses because the application came from a
    /// different source falls back to drop and recreate, subject to `policy`.
    pub async fn upgrade_app(
        &self,
        policy: &dyn Policy,
        interactive: bool,
        version: Option<&str>,
        patch: Option<u32>,
    ) -> ManagerResult<()> {
        let identity = self.identity;
        let role = identity.app_role.as_str();
        let using = using_clause(version, patch);
        with_role(self.conn, role, async {
            self.use_app_warehouse().await?;

            if let Some(row) = self.get_existing_app_info().await? {
                ensure_correct_owner(&row, role, &identity.app_name)?;

                let upgraded: DbResult<()> = async {
                    self.conn
                        .execute(
                            format!("alter application {} upgrade {}", identity.app_name, using)
                                .trim_end(),
                        )
                        .await?;
                    if !using.is_empty() {
                        self.conn.execute(&self.set_debug_mode_sql()).await?;
                    }
                    Ok(())
                }
                .await;
                match upgraded {
                    Ok(()) => return Ok(()),
                    Err(err) if is_upgrade_restriction(&err) => {
                        self.console.warning(&err.message());
                        self.drop_application_before_upgrade(policy, interactive)
                            .await?;
                    }
                    Err(err) => return Err(ManagerError::from(classify_sql_error(err, None, None))),
                }
            }

            self.console.step(&format!(
                "Creating new application object {} in account.",
                identity.app_name
            ));
            if !same_role(role, &identity.package_role) {
                let install = format!(
                    "grant install on application package {} to role {}",
                    identity.package_name, role
                );
                let develop = format!(
                    "grant develop on application package {} to role {}",
                    identity.package_name, role
                );
                with_role(self.conn, &identity.package_role, async {
                    self.conn.execute(&install).await?;
                    if version.is_some() {
                        self.conn.execute(&develop).await?;
                    }
                    Ok::<(), DbError>(())
                })
                .await?;
            }

            let mut source = format!("from application package {}", identity.package_name);
            if !using.is_empty() {
                source = format!("{} {}", source, using);
            }
            let created: DbResult<()> = async {
                self.conn
                    .execute(&format!(
                        "create application {}\n    {}\n    comment = {}",
                        identity.app_name, source, SPECIAL_COMMENT
                    ))
                    .await?;
                if !using.is_empty() {
                    self.conn.execute(&self.set_debug_mode_sql()).await?;
                }
                Ok(())
            }
            .await;
            created.map_err(|e| classify_sql_error(e, None, None))?;
            Ok::<(), ManagerError>(())
        })
        .await
    }

    /// Bring the application object up to date.
    ///
    /// With `from_release_directive` the application follows the release
    /// directive. With a version it is upgraded to that version, which must
    /// exist. Otherwise the project is deployed and the application runs
    /// from the stage files.
    pub async fn run(&self, options: &RunOptions, policy: &dyn Policy) -> ManagerResult<RunOutcome> {
        if options.from_release_directive {
            self.upgrade_app(policy, options.interactive, None, None)
                .await?;
            return Ok(RunOutcome::ReleaseDirective);
        }

        if let Some(version) = options.version.as_deref() {
            if self.get_existing_version_info(version).await?.is_none() {
                return Err(ManagerError::VersionNotFound {
                    package: self.identity.package_name.clone(),
                    version: version.to_string(),
                });
            }
            self.upgrade_app(policy, options.interactive, Some(version), options.patch)
                .await?;
            return Ok(RunOutcome::Version {
                version: version.to_string(),
                patch: options.patch,
            });
        }

        let diff = self.deploy().await?;
        self.create_dev_app(&diff).await?;
        Ok(RunOutcome::Development(diff))
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
