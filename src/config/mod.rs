//! Configuration for phrasegen
//!
//! Two kinds of files configure a run:
//!
//! 1. **Definitions file** (`./phrasegen.yaml` by default) - the definition records to
//!    generate from, read from disk or fetched over HTTP
//! 2. **Global configuration** (`~/.phrasegen/config.toml`) - optional defaults for the
//!    command-line flags
//!
//! # Modules
//!
//! - `definitions` - The YAML envelope, remote fetching and initial-state parsing
//! - `global` - The TOML user configuration
//!
//! # Definitions File
//!
//! ```yaml
//! Definitions:
//!   - Type: Root
//!     Templates: ["{{.FirstName}} said {{.Pronoun}} would come."]
//!   - Type: FirstName
//!     Templates: ["Alice"]
//!     Constraints: { "Gender+": Female }
//!   - Type: Pronoun
//!     Templates: ["she"]
//!     Constraints: { Gender: Female }
//! ```
//!
//! # Initial State
//!
//! Initial state values are passed as `key=value` pairs separated by commas, e.g.
//! `Gender=Female,Mood=calm`; see [`parse_state`].

pub mod definitions;
pub mod global;

pub use definitions::{DefinitionsConfig, is_remote, load_definitions, parse_definitions, parse_state};
pub use global::GlobalConfig;
