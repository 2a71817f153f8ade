//! Test utilities for phrasegen
//!
//! This module provides helpers shared by unit tests and the integration suite:
//! - Logging initialization that works with the test harness
//! - Definitions file fixtures
//! - Shortcuts for building generators and initial states
//!
//! # Example
//!
//! ```rust,no_run
//! use phrasegen::definition::RawDefinition;
//! use phrasegen::generator::GeneratorOptions;
//! use phrasegen::test_utils::{generator_with, init_test_logging};
//!
//! init_test_logging(None);
//! let generator = generator_with(
//!     GeneratorOptions::default().with_seed(1),
//!     vec![RawDefinition::new("Root", ["hello"])],
//! );
//! ```

pub mod fixtures;

pub use fixtures::DefinitionsFixture;

use std::collections::HashMap;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::definition::RawDefinition;
use crate::generator::{Generator, GeneratorOptions};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG` environment
/// variable if set, or uses the provided log level.
///
/// # Arguments
///
/// * `level` - Optional log level to use. If None, uses `RUST_LOG` environment variable
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=phrasegen=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Build a generator and register `definitions`, panicking on invalid records.
pub fn generator_with(options: GeneratorOptions, definitions: Vec<RawDefinition>) -> Generator {
    let generator = Generator::new(options);
    if let Err(e) = generator.add_definitions(definitions) {
        panic!("Failed to register test definitions: {e}");
    }
    generator
}

/// An initial state from key/value pairs.
pub fn state_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
