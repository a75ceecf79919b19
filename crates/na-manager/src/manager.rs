//! Package reconciliation, package scripts and stage synchronization

use crate::classify::classify_sql_error;
use crate::console::Console;
use crate::constants::{is_special_comment, COMMENT_COL, NAME_COL, SPECIAL_COMMENT};
use crate::error::{ManagerError, ManagerResult};
use crate::objects::{ensure_correct_owner, show_specific_object};
use na_core::{build_bundle, Distribution, ProjectIdentity};
use na_db::{use_warehouse, with_role, DbError, QueryResult, Row, SqlGateway};
use na_jinja::{ScriptContext, ScriptEnvironment};
use na_stage::{stage_diff, sync_local_diff_with_stage, DiffResult};

/// Lifecycle operations for one native app project.
///
/// Borrows the session, the console and the resolved identity for the
/// duration of a single command.
pub struct NativeAppManager<'a> {
    pub(crate) conn: &'a dyn SqlGateway,
    pub(crate) console: &'a dyn Console,
    pub(crate) identity: &'a ProjectIdentity,
}

impl<'a> NativeAppManager<'a> {
    /// Create a manager for `identity` talking through `conn`
    pub fn new(
        conn: &'a dyn SqlGateway,
        console: &'a dyn Console,
        identity: &'a ProjectIdentity,
    ) -> Self {
        Self {
            conn,
            console,
            identity,
        }
    }

    /// The resolved project identity
    pub fn identity(&self) -> &ProjectIdentity {
        self.identity
    }

    /// Populate the local deploy root from the project's artifacts.
    pub fn build_bundle(&self) -> ManagerResult<()> {
        build_bundle(
            &self.identity.project_root,
            &self.identity.deploy_root,
            &self.identity.artifacts,
        )?;
        Ok(())
    }

    /// Run `sql` with `role` active.
    pub(crate) async fn execute_with_role(&self, role: &str, sql: &str) -> ManagerResult<QueryResult> {
        let result = with_role(self.conn, role, self.conn.execute(sql)).await?;
        Ok(result)
    }

    /// The application object of this project, if it exists.
    pub async fn get_existing_app_info(&self) -> ManagerResult<Option<Row>> {
        let identity = self.identity;
        with_role(
            self.conn,
            &identity.app_role,
            show_specific_object(
                self.conn,
                "applications",
                &identity.app_name,
                NAME_COL,
                None,
                false,
            ),
        )
        .await
    }

    /// The application package of this project, if it exists.
    pub async fn get_existing_app_pkg_info(&self) -> ManagerResult<Option<Row>> {
        let identity = self.identity;
        with_role(
            self.conn,
            &identity.package_role,
            show_specific_object(
                self.conn,
                "application packages",
                &identity.package_name,
                NAME_COL,
                None,
                false,
            ),
        )
        .await
    }

    /// Live `distribution` of the application package, lower-cased.
    pub async fn get_app_pkg_distribution_in_snowflake(&self) -> ManagerResult<String> {
        let identity = self.identity;
        let role = identity.package_role.as_str();
        let query = format!("describe application package {}", identity.package_name);
        let described = with_role(self.conn, role, async {
            self.conn
                .execute(&query)
                .await
                .map_err(|e| classify_sql_error(e, Some(role), None))
        })
        .await?;

        if described.row_count.unwrap_or(0) == 0 {
            return Err(ManagerError::SqlExecution { query });
        }
        for row in &described.rows {
            if row
                .value(0)
                .is_some_and(|property| property.eq_ignore_ascii_case("distribution"))
            {
                return Ok(row.value(1).unwrap_or_default().to_lowercase());
            }
        }
        Err(ManagerError::Programming {
            message: format!(
                "Could not find the 'distribution' attribute for application package {} \
                 in the output of SQL query:\n'{}'",
                identity.package_name, query
            ),
        })
    }

    /// Whether the live distribution matches the project definition.
    ///
    /// `expected` is used as the live value when given; otherwise it is
    /// queried. A mismatch is reported as a warning only.
    pub async fn verify_project_distribution(&self, expected: Option<&str>) -> ManagerResult<bool> {
        let actual = match expected {
            Some(value) => value.to_lowercase(),
            None => self.get_app_pkg_distribution_in_snowflake().await?,
        };
        let declared = self.identity.package_distribution.as_str();
        if actual != declared {
            self.console.warning(&format!(
                "Application package {} in your Snowflake account has distribution property {},\n\
                 which does not match the value specified in project definition file: {}.",
                self.identity.package_name, actual, declared
            ));
            return Ok(false);
        }
        Ok(true)
    }

    /// Create the application package, or validate the one that exists.
    ///
    /// An existing package must be owned by the package role. Internal
    /// packages must also carry a marker comment, otherwise they were not
    /// created by this tool and are left alone.
    pub async fn create_app_package(&self) -> ManagerResult<()> {
        let identity = self.identity;
        let Some(row) = self.get_existing_app_pkg_info().await? else {
            self.console.step(&format!(
                "Creating new application package {} in account.",
                identity.package_name
            ));
            let sql = format!(
                "create application package {}\n    comment = {}\n    distribution = {}",
                identity.package_name, SPECIAL_COMMENT, identity.package_distribution
            );
            self.execute_with_role(&identity.package_role, &sql).await?;
            return Ok(());
        };

        ensure_correct_owner(&row, &identity.package_role, &identity.package_name)?;

        let actual = self.get_app_pkg_distribution_in_snowflake().await?;
        if !self.verify_project_distribution(Some(&actual)).await? {
            self.console.warning(&format!(
                "Continuing to execute on application package {} with distribution '{}'.",
                identity.package_name, actual
            ));
        }

        if actual == Distribution::Internal.as_str() {
            let comment = row.text(COMMENT_COL)?;
            if !is_special_comment(comment) {
                return Err(ManagerError::ApplicationPackageAlreadyExists {
                    name: identity.package_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Render every package script, then execute them in order.
    ///
    /// Nothing is executed unless every script renders. Scripts that already
    /// ran are not rolled back when a later one fails.
    pub async fn apply_package_scripts(&self) -> ManagerResult<()> {
        let identity = self.identity;
        let env = ScriptEnvironment::new(&identity.project_root);
        let context = ScriptContext::new(identity.package_name.as_str());
        let rendered = identity
            .package_scripts
            .iter()
            .map(|path| env.render_script(path, &context))
            .collect::<Result<Vec<_>, _>>()?;

        let role = identity.package_role.as_str();
        let warehouse = identity.package_warehouse.as_deref();
        with_role(self.conn, role, async {
            if let Some(warehouse) = warehouse {
                use_warehouse(self.conn, warehouse)
                    .await
                    .map_err(|e| classify_sql_error(e, Some(role), Some(warehouse)))?;
            }
            for (path, sql) in identity.package_scripts.iter().zip(&rendered) {
                self.console
                    .step(&format!("Applying package script: {}", path));
                self.conn
                    .execute_batch(sql)
                    .await
                    .map_err(|e| classify_sql_error(e, Some(role), warehouse))?;
            }
            Ok::<(), DbError>(())
        })
        .await?;
        Ok(())
    }

    /// Make the package stage match the local deploy root, acting as `role`.
    ///
    /// Creates the stage schema and stage when missing. Returns the diff
    /// whether or not anything had to change.
    pub async fn sync_deploy_root_with_stage(&self, role: &str) -> ManagerResult<DiffResult> {
        let identity = self.identity;
        with_role(self.conn, role, async {
            self.console
                .step("Checking if stage exists, or creating a new one if none exists.");
            self.conn
                .execute(&format!(
                    "create schema if not exists {}.{}",
                    identity.package_name, identity.stage_schema
                ))
                .await?;
            self.conn
                .execute(&format!(
                    "create stage if not exists {}\n    encryption = (TYPE = 'SNOWFLAKE_SSE')\n    DIRECTORY = (ENABLE = TRUE)",
                    identity.stage_fqn
                ))
                .await?;

            self.console.step(&format!(
                "Performing a diff between the Snowflake stage and your local deploy_root ('{}') directory.",
                identity.deploy_root.display()
            ));
            let diff = stage_diff(self.conn, &identity.deploy_root, &identity.stage_fqn).await?;
            self.console.message(&diff.to_string());

            if diff.has_changes() {
                self.console.step(&format!(
                    "Uploading diff-ed files from your local {} directory to the Snowflake stage.",
                    identity.deploy_root.display()
                ));
                sync_local_diff_with_stage(
                    self.conn,
                    &diff,
                    &identity.deploy_root,
                    &identity.stage_fqn,
                )
                .await?;
            }
            Ok::<DiffResult, ManagerError>(diff)
        })
        .await
    }

    /// Create or validate the package, apply package scripts, then sync the
    /// stage.
    ///
    /// Scripts and stage sync share one package-role scope.
    pub async fn deploy(&self) -> ManagerResult<DiffResult> {
        self.create_app_package().await?;
        let role = self.identity.package_role.as_str();
        with_role(self.conn, role, async {
            self.apply_package_scripts().await?;
            self.sync_deploy_root_with_stage(role).await
        })
        .await
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
