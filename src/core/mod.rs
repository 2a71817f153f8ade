//! Core types shared by every phrasegen module.
//!
//! The core module currently hosts the error system:
//! - [`PhrasegenError`] - Enumerated error types covering all failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//! - [`IntoAnyhowWithContext`] - Extension trait for error conversion
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use phrasegen::core::{PhrasegenError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(PhrasegenError::InvalidArgument {
//!         reason: "count must be greater than zero".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.to_string().contains("count must be greater than zero"));
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, IntoAnyhowWithContext, PhrasegenError, user_friendly_error};

/// Result alias used by the engine layers.
pub type Result<T, E = PhrasegenError> = std::result::Result<T, E>;
