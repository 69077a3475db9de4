//! Hyphen - hyphenation dictionary manager
//!
//! Main entry point: parses global options, initializes tracing and
//! dispatches to the dictionary commands.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hyphen_core::InstallerConfig;

mod dictionary_cli;

use dictionary_cli::DictionaryCommand;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "hyphen",
    about = "Install and manage hyphenation dictionaries",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: DictionaryCommand,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Configuration file (defaults to the per-user config.yaml)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Installation directory
    #[clap(long, global = true)]
    dir: Option<PathBuf>,

    /// Dictionary repository base URL
    #[clap(long, global = true)]
    repository: Option<String>,
}

impl Cli {
    /// Resolve configuration: flags over environment over file over defaults
    fn installer_config(&self) -> Result<InstallerConfig> {
        let mut config = InstallerConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.dir {
            config.directory = dir.clone();
        }
        if let Some(repository) = &self.repository {
            config.set_repository(repository);
        }
        Ok(config)
    }
}

/// Initialize tracing from --log-level and --log-json
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let config = cli.installer_config()?;
    tracing::debug!(
        directory = %config.directory.display(),
        repository = %config.repository,
        "Resolved configuration"
    );

    cli.command.execute(config)
}
