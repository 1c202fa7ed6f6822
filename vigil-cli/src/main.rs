//! Vigil CLI entry point
//!
//! Parses arguments, loads configuration, initializes tracing, and
//! dispatches to the subcommand handlers. Errors are printed to stderr
//! and mapped to process exit codes by [`error::CliError::exit_code`].

use std::path::Path;

use clap::Parser;

use vigil_core::config::VigilConfig;
use vigil_core::error::{ConfigError, VigilError};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

mod cli;
mod commands;
mod error;
mod output;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_or_default(&cli.config).await?;
    init_tracing(&cli, &config);

    tracing::debug!(config = %cli.config.display(), "vigil starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Sync => commands::sync::execute(&config, &writer).await,
        Commands::Events(args) => commands::events::execute(args, &config, &writer).await,
        Commands::Dashboard(args) => commands::dashboard::execute(args, &config, &writer).await,
        Commands::Export(args) => commands::export::execute(args, &config).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}

/// Load the configuration file, falling back to defaults when it does
/// not exist. The dashboard must run before any configuration has been
/// written; every other load failure is still an error.
pub(crate) async fn load_or_default(path: &Path) -> Result<VigilConfig, CliError> {
    match VigilConfig::load(path).await {
        Ok(config) => Ok(config),
        Err(VigilError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = VigilConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
        Err(err) => Err(err.into()),
    }
}

fn init_tracing(cli: &Cli, config: &VigilConfig) {
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.general.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_new(&level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}
