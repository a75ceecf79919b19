//! napp - deploy and manage Snowflake native applications

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod console;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{bundle, deploy, run, teardown, validate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Bundle(args) => bundle::execute(args, &cli.global).await,
        cli::Commands::Deploy(args) => deploy::execute(args, &cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Teardown(args) => teardown::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
    };

    match result {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(0)) => Ok(()),
            Some(ExitCode(code)) => std::process::exit(*code),
            None => Err(err),
        },
        ok => ok,
    }
}
