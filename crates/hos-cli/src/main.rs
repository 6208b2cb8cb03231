use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hos_cli::commands::{check, classify, evaluate, events};
use hos_cli::{Cli, Commands, Config};

/// Load config and reject limits no rule could be evaluated against.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    config.limits.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries reports
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Check {
            files,
            entries,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            check::run(&mut stdout, files, *entries, *json, &config.limits)?;
        }
        Some(Commands::Events { files }) => {
            events::run(&mut stdout, files)?;
        }
        Some(Commands::Evaluate { file, json }) => {
            let config = load_config(cli.config.as_deref())?;
            evaluate::run(&mut stdout, file.as_deref(), *json, &config.limits)?;
        }
        Some(Commands::Classify { note }) => {
            classify::run(&mut stdout, note)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
