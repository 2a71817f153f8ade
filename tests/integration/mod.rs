//! Integration test suite for phrasegen
//!
//! End-to-end tests that load real definitions files and run the `phrasegen` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **generate**: Loading YAML definitions and generating through the library API
//! - **cli**: The `run` and `validate` commands, global configuration and error output
//!
//! Definitions files used by both live under `tests/fixtures/`.

use std::path::PathBuf;

mod cli;
mod generate;

/// Absolute path of a file under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// [`fixture_path`] as a string, for APIs taking a path-or-URL source.
pub fn fixture_source(name: &str) -> String {
    fixture_path(name).to_string_lossy().into_owned()
}
