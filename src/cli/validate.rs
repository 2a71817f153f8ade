//! Validate a definitions file without generating from it.
//!
//! Every record is registered into a scratch generator so each registration error is
//! reported, not just the first. The resulting registry is then checked statically:
//!
//! - placeholders resolving to a type with no definitions (warning, the branch is dead)
//! - reference cycles between types (warning, generation relies on the depth limit)
//!
//! With `--strict`, warnings fail validation as well.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use super::OutputFormat;
use crate::config::{DefinitionsConfig, GlobalConfig, load_definitions};
use crate::generator::Generator;
use crate::resolver::{TypeGraph, UndefinedReference};

/// Command to validate a definitions file.
#[derive(Args, Debug, Default)]
pub struct ValidateCommand {
    /// Definitions file path or http(s) URL (defaults to the configured file)
    #[arg(value_name = "PATH_OR_URL")]
    pub file: Option<String>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Outcome of validating one definitions file.
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    /// Whether validation passed
    pub valid: bool,
    /// The validated file or URL
    pub source: String,
    /// Registered definitions per type
    pub definitions: BTreeMap<String, usize>,
    /// Placeholders resolving to types with no definitions
    pub undefined_references: Vec<UndefinedReference>,
    /// Groups of types referencing each other in a cycle
    pub cycles: Vec<Vec<String>>,
    /// Problems that fail validation
    pub errors: Vec<String>,
    /// Problems that only fail validation with `--strict`
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Check a parsed definitions file.
    #[must_use]
    pub fn check(source: &str, config: DefinitionsConfig, strict: bool) -> Self {
        let mut report = Self {
            source: source.to_string(),
            ..Self::default()
        };
        if config.is_empty() {
            report.warnings.push("No definitions declared".to_string());
        }

        let generator = Generator::default();
        for (index, raw) in config.definitions.into_iter().enumerate() {
            let def_type = raw.def_type.clone();
            if let Err(e) = generator.add_definitions([raw]) {
                report.errors.push(format!("Definition {} ('{}'): {}", index + 1, def_type, e));
            }
        }

        let registry = generator.registry();
        for def_type in registry.definition_types() {
            report.definitions.insert(def_type.to_string(), registry.get(def_type).len());
        }

        let graph = TypeGraph::from_registry(&registry);
        for reference in graph.undefined_references() {
            let via = if reference.placeholder == reference.target {
                String::new()
            } else {
                format!(" (through alias '{}')", reference.placeholder)
            };
            report.warnings.push(format!(
                "'{}' references undefined type '{}'{}",
                reference.from, reference.target, via
            ));
            report.undefined_references.push(reference.clone());
        }

        for cycle in graph.cycles() {
            report.warnings.push(format!("Reference cycle between {}", cycle.join(", ")));
            report.cycles.push(cycle);
        }

        report.valid = report.errors.is_empty() && !(strict && !report.warnings.is_empty());
        report
    }

    fn print_text(&self) {
        println!("Validating {}", self.source.bold());
        for (def_type, count) in &self.definitions {
            println!("  {} {} ({} definition(s))", "•".dimmed(), def_type, count);
        }
        for warning in &self.warnings {
            println!("{} {}", "⚠".yellow(), warning);
        }
        for error in &self.errors {
            println!("{} {}", "✗".red(), error);
        }
        if self.valid {
            println!("{} Definitions are valid", "✓".green());
        }
    }
}

impl ValidateCommand {
    /// Run the command, falling back to the configured definitions file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or validation fails.
    pub async fn execute(self, global: &GlobalConfig) -> Result<()> {
        let source = self.file.clone().unwrap_or_else(|| global.file.clone());

        let config = match load_definitions(&source).await {
            Ok(config) => config,
            Err(e) => {
                if self.format == OutputFormat::Json {
                    let report = ValidationReport {
                        source: source.clone(),
                        errors: vec![format!("{e:#}")],
                        ..ValidationReport::default()
                    };
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                return Err(e);
            }
        };

        let report = ValidationReport::check(&source, config, self.strict);
        match self.format {
            OutputFormat::Text => report.print_text(),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }

        if report.valid {
            Ok(())
        } else {
            Err(anyhow!(
                "Validation of {} failed with {} error(s) and {} warning(s)",
                source,
                report.errors.len(),
                report.warnings.len()
            ))
        }
    }
}
