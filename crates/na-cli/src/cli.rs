//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// napp - Deploy and manage Snowflake native applications
#[derive(Parser, Debug)]
#[command(name = "napp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Extra project definition override files, applied in order
    #[arg(long = "definition", global = true)]
    pub definitions: Vec<String>,

    /// Connection settings
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Snowflake connection settings
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Account identifier
    #[arg(long, global = true, env = "SNOWFLAKE_ACCOUNT")]
    pub account: Option<String>,

    /// Host override for the SQL API
    #[arg(long, global = true, env = "SNOWFLAKE_HOST")]
    pub host: Option<String>,

    /// OAuth or key-pair JWT token
    #[arg(long, global = true, env = "SNOWFLAKE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Token type sent with the token (default: OAUTH)
    #[arg(long, global = true, env = "SNOWFLAKE_TOKEN_TYPE")]
    pub token_type: Option<String>,

    /// Role for the session and default owner role
    #[arg(long, global = true, env = "SNOWFLAKE_ROLE")]
    pub role: Option<String>,

    /// Warehouse for the session
    #[arg(long, global = true, env = "SNOWFLAKE_WAREHOUSE")]
    pub warehouse: Option<String>,

    /// Database for the session
    #[arg(long, global = true, env = "SNOWFLAKE_DATABASE")]
    pub database: Option<String>,

    /// Schema for the session
    #[arg(long, global = true, env = "SNOWFLAKE_SCHEMA")]
    pub schema: Option<String>,

    /// Per-statement timeout in seconds
    #[arg(long, global = true, env = "SNOWFLAKE_TIMEOUT")]
    pub timeout: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy artifacts into the local deploy root
    Bundle(BundleArgs),

    /// Create or update the application package and sync its stage
    ///
    /// The SQL API connection cannot upload files. When the stage is out of
    /// date, upload the deploy root with a Snowflake driver or SnowSQL first.
    Deploy(DeployArgs),

    /// Create or upgrade the application object
    ///
    /// Without --version this deploys first, so the same file upload
    /// limitation as `deploy` applies.
    Run(RunArgs),

    /// Drop the application object and the application package
    Teardown(TeardownArgs),

    /// Check the project definition and print the resolved names
    Validate(ValidateArgs),
}

/// Arguments for the bundle command
#[derive(Args, Debug)]
pub struct BundleArgs {}

/// Arguments for the deploy command
#[derive(Args, Debug)]
pub struct DeployArgs {}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Create or upgrade from this package version instead of the stage files
    #[arg(long)]
    pub version: Option<String>,

    /// Patch of --version to use
    #[arg(long, requires = "version")]
    pub patch: Option<u32>,

    /// Create or upgrade according to the package's release directive
    #[arg(long, conflicts_with_all = ["version", "patch"])]
    pub from_release_directive: bool,

    /// Drop and recreate the application without asking when an upgrade
    /// is refused
    #[arg(long)]
    pub force: bool,

    /// Ask before dropping the application even without a terminal
    #[arg(long)]
    pub interactive: bool,
}

/// Arguments for the teardown command
#[derive(Args, Debug)]
pub struct TeardownArgs {
    /// Drop objects without asking, even ones not created by napp
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
