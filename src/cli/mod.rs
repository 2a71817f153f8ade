//! Command-line interface for phrasegen.
//!
//! # Available Commands
//!
//! - `run` - Generate messages from a definitions file
//! - `validate` - Check a definitions file for registration errors, undefined references
//!   and reference cycles
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug logging (and print the initial state before `run` output)
//! - `--quiet` - Disable logging
//! - `--config` - Path to a global configuration file (also `PHRASEGEN_CONFIG`)
//!
//! `RUST_LOG` takes precedence over `--verbose` and `--quiet` when set. Logs go to stderr,
//! so generated messages on stdout can be piped.
//!
//! # Example
//!
//! ```bash
//! # Generate three messages from ./phrasegen.yaml
//! phrasegen run -n 3
//!
//! # Start from a different root with an initial state
//! phrasegen run -f greetings.yaml --root Greeting -s "Gender=Female,Mood=calm"
//!
//! # Check a definitions file
//! phrasegen validate greetings.yaml --format json
//! ```

mod run;
mod validate;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;
use crate::constants::CONFIG_PATH_ENV;

pub use run::RunCommand;
pub use validate::{ValidateCommand, ValidationReport};

/// Output format shared by the commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Main CLI structure for phrasegen.
#[derive(Parser, Debug)]
#[command(
    name = "phrasegen",
    about = "Generate text from constraint-driven template definitions",
    version,
    long_about = "phrasegen expands tree-structured templates into messages, choosing among \
                  alternative definitions whose constraints agree with everything generated so far."
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the global configuration file
    #[arg(long, global = true, env = CONFIG_PATH_ENV, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate messages
    Run(RunCommand),

    /// Validate a definitions file
    Validate(ValidateCommand),
}

impl Cli {
    /// Install logging, load the global configuration and run the command.
    ///
    /// # Errors
    ///
    /// Returns the command's error, or a configuration loading error.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        let global = GlobalConfig::load_with_optional(self.config.clone()).await?;

        match self.command {
            Commands::Run(cmd) => cmd.execute(&global, self.verbose).await,
            Commands::Validate(cmd) => cmd.execute(&global).await,
        }
    }
}

/// The log filter directive for the given flags, when `RUST_LOG` is not set.
fn log_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "off"
    } else if verbose {
        "phrasegen=debug"
    } else {
        "warn"
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(log_directive(verbose, quiet))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
