//! Global user configuration.
//!
//! An optional TOML file supplying defaults for the command-line flags, so frequently used
//! settings don't have to be repeated on every invocation.
//!
//! # Location
//!
//! - **Unix/macOS**: `~/.phrasegen/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\phrasegen\config.toml`
//! - **Override**: `--config <PATH>` or the `PHRASEGEN_CONFIG` environment variable
//!
//! A missing file is not an error; every setting then takes its built-in default.
//!
//! # Format
//!
//! ```toml
//! file = "~/phrases/greetings.yaml"
//! root = "Greeting"
//! num = 3
//! max_concurrency = 8
//! max_length = 140
//! ```
//!
//! Command-line flags always take precedence over these values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DEFINITIONS_FILE, DEFAULT_MAX_DEPTH,
    DEFAULT_MESSAGE_COUNT, DEFAULT_ROOT_TYPE,
};
use crate::core::PhrasegenError;

fn default_file() -> String {
    DEFAULT_DEFINITIONS_FILE.to_string()
}

fn default_root() -> String {
    DEFAULT_ROOT_TYPE.to_string()
}

const fn default_num() -> usize {
    DEFAULT_MESSAGE_COUNT
}

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Defaults for the command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Definitions file path or URL
    #[serde(default = "default_file")]
    pub file: String,

    /// Root definition type
    #[serde(default = "default_root")]
    pub root: String,

    /// Number of messages to generate
    #[serde(default = "default_num")]
    pub num: usize,

    /// Branches polled at once per fan-out, unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Maximum message length in characters, unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Deepest dependency nesting explored
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            root: default_root(),
            num: default_num(),
            max_concurrency: None,
            max_length: None,
            max_depth: default_max_depth(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, the default location otherwise.
    ///
    /// A missing file yields [`GlobalConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("No default config location: {}", e);
                    return Ok(Self::default());
                }
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No global config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or
    /// [`PhrasegenError::ConfigParseError`] if it is not valid configuration TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| PhrasegenError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Loaded global config from {}", path.display());
        Ok(config)
    }

    /// The platform-specific default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("phrasegen")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(CONFIG_DIR_NAME)
        };

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }
}
