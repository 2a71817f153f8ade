//! Global constants used throughout the phrasegen codebase.
//!
//! This module contains default values, limits and timeouts that are used across
//! multiple modules. Defining them centrally keeps magic numbers discoverable.

use std::time::Duration;

/// Default maximum resolution depth (64).
///
/// A branch that would resolve a dependency deeper than this is pruned with a warning.
/// This bounds self-referencing definitions such as `Root -> "{{.Root}}"`.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Capacity of the channel between a generation's driver task and its consumer.
///
/// The driver computes at most this many messages ahead of the consumer.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 16;

/// Default root definition type for the `run` command.
pub const DEFAULT_ROOT_TYPE: &str = "Root";

/// Default definitions file for the `run` and `validate` commands.
pub const DEFAULT_DEFINITIONS_FILE: &str = "./phrasegen.yaml";

/// Default number of messages generated by the `run` command.
pub const DEFAULT_MESSAGE_COUNT: usize = 1;

/// Directory under the home directory holding the global configuration.
pub const CONFIG_DIR_NAME: &str = ".phrasegen";

/// File name of the global configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the global configuration path.
pub const CONFIG_PATH_ENV: &str = "PHRASEGEN_CONFIG";

/// Timeout for fetching definitions from a URL (30 seconds).
pub const DEFINITIONS_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
