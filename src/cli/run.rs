//! Generate messages from a definitions file.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use super::OutputFormat;
use crate::config::{GlobalConfig, load_definitions, parse_state};
use crate::generator::{Generator, GeneratorOptions};

/// Command to generate messages.
///
/// Unset flags fall back to the global configuration, then to built-in defaults.
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Definitions file path or http(s) URL
    #[arg(short, long, value_name = "PATH_OR_URL")]
    pub file: Option<String>,

    /// Definition type to generate
    #[arg(long)]
    pub root: Option<String>,

    /// Initial state as comma-separated key=value pairs
    #[arg(short, long, default_value = "")]
    pub state: String,

    /// Number of distinct messages to generate
    #[arg(short, long)]
    pub num: Option<usize>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reject messages longer than this many characters
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Bound the branches explored at once per fan-out
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Prefer definitions with higher constraint priorities
    #[arg(long)]
    pub priority: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    root: &'a str,
    state: BTreeMap<&'a str, &'a str>,
    messages: &'a [String],
}

impl RunCommand {
    /// Run the command with `global` supplying defaults for unset flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be parsed, the definitions cannot be loaded or
    /// registered, or generation fails.
    pub async fn execute(self, global: &GlobalConfig, verbose: bool) -> Result<()> {
        let file = self.file.clone().unwrap_or_else(|| global.file.clone());
        let root = self.root.clone().unwrap_or_else(|| global.root.clone());
        let num = self.num.unwrap_or(global.num);
        let initial_state = parse_state(&self.state)?;

        let config = load_definitions(&file).await?;
        tracing::info!("Loaded {} definition(s) from {}", config.len(), file);

        let generator = Generator::new(self.generator_options(global));
        generator
            .add_definitions(config.definitions)
            .with_context(|| format!("Invalid definitions in {file}"))?;

        let messages = generator
            .generate(&root, initial_state.clone(), num)
            .await
            .with_context(|| format!("Failed to generate '{root}' from {file}"))?;

        match self.format {
            OutputFormat::Text => {
                if verbose {
                    print!("{}", format_state(&initial_state));
                }
                for message in &messages {
                    println!("{message}");
                    println!();
                }
            }
            OutputFormat::Json => {
                let output = RunOutput {
                    root: &root,
                    state: sorted(&initial_state),
                    messages: &messages,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }

    /// The generator options these flags select.
    pub(crate) fn generator_options(&self, global: &GlobalConfig) -> GeneratorOptions {
        let mut options = GeneratorOptions::default().with_max_depth(global.max_depth);
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        if let Some(max_length) = self.max_length.or(global.max_length) {
            options = options.with_max_length(max_length);
        }
        if let Some(max_concurrency) = self.max_concurrency.or(global.max_concurrency) {
            options = options.with_max_concurrency(max_concurrency);
        }
        if self.priority {
            options = options.with_priority_ordering();
        }
        options
    }
}

fn sorted(state: &HashMap<String, String>) -> BTreeMap<&str, &str> {
    state.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

/// The initial state block printed before verbose text output, empty for an empty state.
pub(crate) fn format_state(state: &HashMap<String, String>) -> String {
    if state.is_empty() {
        return String::new();
    }

    let mut block = String::from("---- state ----\n");
    for (key, value) in sorted(state) {
        let _ = writeln!(block, "{key}: {value}");
    }
    block.push_str("---------------\n\n");
    block
}
