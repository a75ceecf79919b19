//! Runtime context for CLI commands

use anyhow::{Context, Result};
use na_core::{ArtifactMapping, NativeAppDefinition, ProjectDefinition, ProjectIdentity, SessionDefaults};
use na_db::{current_role, SnowflakeBackend, SnowflakeConfig, SqlGateway};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::console::TerminalConsole;

/// A loaded project definition and the directory it was loaded from
pub(crate) struct LoadedProject {
    /// Canonical project root
    pub root: PathBuf,
    /// Merged definition
    pub definition: ProjectDefinition,
}

impl LoadedProject {
    /// Load the definition in `--project-dir`, applying `--definition`
    /// overrides.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let dir = Path::new(&args.project_dir);
        let root = dir
            .canonicalize()
            .with_context(|| format!("Project directory not found: {}", dir.display()))?;
        let overrides: Vec<PathBuf> = args.definitions.iter().map(PathBuf::from).collect();
        let definition = ProjectDefinition::load_from_dir(&root, &overrides)
            .context("Failed to load project definition")?;
        Ok(Self { root, definition })
    }

    /// The `native_app` section
    pub fn native_app(&self) -> Result<&NativeAppDefinition> {
        Ok(self.definition.native_app()?)
    }

    /// Local deploy root and artifact mappings, without resolving names
    pub fn bundle_plan(&self) -> Result<(PathBuf, Vec<ArtifactMapping>)> {
        let app = self.native_app()?;
        let artifacts = app.artifacts.iter().map(ArtifactMapping::from).collect();
        Ok((self.root.join(&app.deploy_root), artifacts))
    }

    /// Resolve the project identity against `session`
    pub fn resolve(&self, session: &SessionDefaults) -> Result<ProjectIdentity> {
        ProjectIdentity::resolve(self.native_app()?, &self.root, session)
            .context("Failed to resolve project names")
    }
}

/// Connection defaults given on the command line or in the environment
pub(crate) fn session_defaults(args: &GlobalArgs) -> SessionDefaults {
    SessionDefaults {
        role: args.connection.role.clone(),
        warehouse: args.connection.warehouse.clone(),
        user: std::env::var("USER").ok(),
    }
}

fn connection_config(args: &GlobalArgs) -> SnowflakeConfig {
    let connection = &args.connection;
    SnowflakeConfig {
        account: connection.account.clone().unwrap_or_default(),
        host: connection.host.clone(),
        token: connection.token.clone().unwrap_or_default(),
        token_type: connection.token_type.clone(),
        role: connection.role.clone(),
        warehouse: connection.warehouse.clone(),
        database: connection.database.clone(),
        schema: connection.schema.clone(),
        timeout_secs: connection.timeout,
    }
}

/// Warehouse the session starts with, if any
async fn current_warehouse(conn: &dyn SqlGateway) -> Result<Option<String>> {
    let result = conn.execute("select current_warehouse()").await?;
    Ok(result
        .first()
        .and_then(|row| row.value(0))
        .map(str::to_string))
}

/// Runtime context for commands that talk to Snowflake
pub(crate) struct RuntimeContext {
    /// Resolved project identity
    pub identity: ProjectIdentity,

    /// Snowflake session
    pub conn: SnowflakeBackend,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Load the project, connect, and resolve names against the session.
    ///
    /// Role and warehouse defaults not given as flags are read from the
    /// session.
    pub async fn new(args: &GlobalArgs) -> Result<Self> {
        let project = LoadedProject::load(args)?;
        let conn = SnowflakeBackend::new(connection_config(args))
            .context("Failed to configure the Snowflake connection")?;
        if args.verbose {
            eprintln!("[verbose] Using {} gateway", conn.db_type());
        }

        let mut session = session_defaults(args);
        if session.role.is_none() {
            let role = current_role(&conn)
                .await
                .context("Failed to read the current role")?;
            session.role = Some(role);
        }
        if session.warehouse.is_none() {
            session.warehouse = current_warehouse(&conn)
                .await
                .context("Failed to read the current warehouse")?;
        }

        let identity = project.resolve(&session)?;
        let context = Self {
            identity,
            conn,
            verbose: args.verbose,
        };
        context.verbose(&format!(
            "package {} (role {}), application {} (role {})",
            context.identity.package_name,
            context.identity.package_role,
            context.identity.app_name,
            context.identity.app_role
        ));
        Ok(context)
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }

    /// Console for manager progress output
    pub fn console(&self) -> TerminalConsole {
        TerminalConsole
    }
}
