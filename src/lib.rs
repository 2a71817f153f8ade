//! phrasegen - constraint-driven text generation
//!
//! Messages are generated from declarative, tree-structured templates. Each definition
//! registers one or more templates under a definition type; templates reference other
//! types through `{{.TypeName}}` placeholders, and definitions carry constraints that
//! decide which alternatives agree with everything generated so far.
//!
//! # Architecture Overview
//!
//! A generation starts from a root definition type and an initial state:
//! - the definition pipeline filters and orders the candidate definitions of a type
//! - the template pipeline filters and orders the templates of a chosen definition
//! - every placeholder is resolved recursively, each alternative on its own fork of the
//!   state, and completed templates are executed and bound into the state
//! - validators prune branches whose (partial) output is unacceptable
//!
//! Alternatives are explored concurrently and streamed as they are found, so the first
//! messages arrive without waiting for the whole search space.
//!
//! # Core Modules
//!
//! ## Engine
//! - [`generator`] - The public entry point: registration, `generate` and `start`
//! - [`resolver`] - Recursive resolution, the definition registry and message streams
//! - [`picker`] - Template and definition selection pipelines
//! - [`validator`] - Branch guards such as the maximum length check
//!
//! ## Model
//! - [`constraint`] - Constraint keys with `!`, `?`, `+` and `/` operators and priorities
//! - [`definition`] - Raw records and validated definitions with aliases and weights
//! - [`templating`] - Template parsing, dependency extraction and rendering
//! - [`state`] - The per-branch map of generated values and picked templates
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Definitions files, initial-state strings and global configuration
//! - [`constants`] - Defaults and limits
//! - [`core`] - Error types and user-facing error rendering
//!
//! # Definitions Format
//!
//! ```yaml
//! Definitions:
//!   - Type: Root
//!     Templates: ["{{.FirstName}} {{.LastName}} said {{.Pronoun}} would come."]
//!   - Type: FirstName
//!     Templates: ["Alice"]
//!     Constraints: { "Gender+": Female }
//!   - Type: FirstName
//!     Templates: ["Bob"]
//!     Constraints: { "Gender+": Male }
//!   - Type: LastName
//!     Templates: ["Smith", "Jones"]
//!   - Type: Pronoun
//!     Templates: ["she"]
//!     Constraints: { Gender: Female }
//!   - Type: Pronoun
//!     Templates: ["he"]
//!     Constraints: { Gender: Male }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Generate three messages from ./phrasegen.yaml
//! phrasegen run -n 3
//!
//! # Reproducible output from a remote file
//! phrasegen run -f https://example.com/greetings.yaml --seed 42
//!
//! # Check a definitions file
//! phrasegen validate greetings.yaml
//! ```

// Engine
pub mod generator;
pub mod picker;
pub mod resolver;
pub mod validator;

// Model
pub mod constraint;
pub mod definition;
pub mod state;
pub mod templating;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
