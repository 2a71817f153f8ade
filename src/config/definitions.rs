//! Definitions files and initial-state strings.
//!
//! Definitions are read from YAML documents wrapping the records in a `Definitions` list.
//! A source is either a local path or an `http(s)://` URL.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

use crate::constants::DEFINITIONS_FETCH_TIMEOUT;
use crate::core::PhrasegenError;
use crate::definition::RawDefinition;

/// The envelope of a definitions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    /// Records in file order
    #[serde(rename = "Definitions", default)]
    pub definitions: Vec<RawDefinition>,
}

impl DefinitionsConfig {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the file declared no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Whether `source` names a remote definitions file.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a definitions file from a local path or an `http(s)://` URL.
///
/// # Examples
///
/// ```rust,no_run
/// use phrasegen::config::load_definitions;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = load_definitions("./phrasegen.yaml").await?;
/// println!("Loaded {} definitions", config.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the source cannot be read or fetched, or if its content is not a
/// valid definitions document.
pub async fn load_definitions(source: &str) -> Result<DefinitionsConfig> {
    let content = if is_remote(source) {
        fetch_definitions(source).await?
    } else {
        read_definitions(Path::new(source)).await?
    };

    tracing::debug!("Read {} byte(s) of definitions from {}", content.len(), source);
    parse_definitions(&content, source)
}

async fn read_definitions(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read definitions file {}", path.display()))
}

async fn fetch_definitions(url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(DEFINITIONS_FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch definitions from {url}"))?
        .error_for_status()
        .with_context(|| format!("Definitions request to {url} was rejected"))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read definitions response from {url}"))
}

/// Parse a definitions document. `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`PhrasegenError::ConfigParseError`] if `content` is not valid YAML for the
/// definitions envelope.
pub fn parse_definitions(content: &str, origin: &str) -> Result<DefinitionsConfig> {
    serde_yaml::from_str(content).map_err(|e| {
        PhrasegenError::ConfigParseError {
            file: origin.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Parse an initial state written as `k1=v1,k2=v2`.
///
/// An empty string is the empty state. Later entries overwrite earlier ones with the same
/// key.
///
/// # Errors
///
/// Returns [`PhrasegenError::InvalidArgument`] for an entry that is not exactly one
/// `key=value` pair with a non-empty key.
pub fn parse_state(raw: &str) -> Result<HashMap<String, String>> {
    let mut state = HashMap::new();
    if raw.trim().is_empty() {
        return Ok(state);
    }

    for entry in raw.split(',') {
        let parts: Vec<&str> = entry.split('=').collect();
        let [key, value] = parts.as_slice() else {
            return Err(invalid_state_entry(entry));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid_state_entry(entry));
        }
        state.insert(key.to_string(), value.trim().to_string());
    }
    Ok(state)
}

fn invalid_state_entry(entry: &str) -> anyhow::Error {
    PhrasegenError::InvalidArgument {
        reason: format!("invalid state entry '{entry}', expected key=value"),
    }
    .into()
}
