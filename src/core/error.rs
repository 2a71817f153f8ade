//! Error handling for phrasegen
//!
//! This module provides the error types and user-friendly error reporting for the
//! phrasegen engine and CLI. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`PhrasegenError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Registration**: [`PhrasegenError::InvalidConstraintKey`],
//!   [`PhrasegenError::InvalidConstraintValue`], [`PhrasegenError::TemplateSyntax`],
//!   [`PhrasegenError::InvalidDefinition`]. These are fatal and reported when definitions
//!   are added, never deferred to generation time.
//! - **Generation**: [`PhrasegenError::TemplateExecution`], [`PhrasegenError::ValidatorFailed`],
//!   [`PhrasegenError::PickerFailed`]. These abort the generation call that hit them.
//! - **Request**: [`PhrasegenError::InvalidArgument`], [`PhrasegenError::DefinitionNotFound`],
//!   [`PhrasegenError::NoValidMessage`].
//! - **Configuration**: [`PhrasegenError::ConfigParseError`], [`PhrasegenError::IoError`],
//!   [`PhrasegenError::YamlError`], [`PhrasegenError::TomlError`].
//!
//! Exhausted candidates and unsatisfied constraints are *not* errors: the branch that hit
//! them simply produces no message and its siblings keep searching. Only when the whole
//! request has no viable branch left does the caller see [`PhrasegenError::NoValidMessage`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use phrasegen::core::{PhrasegenError, ErrorContext, user_friendly_error};
//!
//! let error = PhrasegenError::NoValidMessage {
//!     def_type: "Root".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for phrasegen operations.
///
/// Each variant carries enough context (definition type, template text, constraint key)
/// to diagnose the failure without re-running the generation.
#[derive(Error, Debug)]
pub enum PhrasegenError {
    /// A constraint key could not be parsed
    ///
    /// Raised for malformed priority suffixes (`Key:abc`, `Key:1:2`), keys without a
    /// definition type, and mutually exclusive modifiers (`/+`, `/!`, `!?`).
    #[error("Invalid constraint key '{key}': {reason}")]
    InvalidConstraintKey {
        /// The raw constraint key as written in the definition
        key: String,
        /// Why the key was rejected
        reason: String,
    },

    /// A constraint value could not be compiled (regular expression values only)
    #[error("Invalid value for constraint '{key}': {reason}")]
    InvalidConstraintValue {
        /// The raw constraint key owning the value
        key: String,
        /// The rejected value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A raw template could not be parsed
    #[error("Template syntax error in '{template}': {reason}")]
    TemplateSyntax {
        /// The raw template text
        template: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A raw definition record is malformed
    #[error("Invalid definition of type '{def_type}': {reason}")]
    InvalidDefinition {
        /// The definition type of the rejected record
        def_type: String,
        /// Why the record was rejected
        reason: String,
    },

    /// A template failed to render against a state
    #[error("Failed to execute template '{template}': {reason}")]
    TemplateExecution {
        /// The raw template text
        template: String,
        /// Rendering diagnostic
        reason: String,
    },

    /// A validator failed to run (as opposed to rejecting a branch)
    #[error("Validator '{validator}' failed on template '{template}': {reason}")]
    ValidatorFailed {
        /// Name of the failing validator
        validator: String,
        /// The raw template text being validated
        template: String,
        /// Validator diagnostic
        reason: String,
    },

    /// A selection stage failed to run
    #[error("Picker '{picker}' failed: {reason}")]
    PickerFailed {
        /// Name of the failing picker
        picker: String,
        /// Picker diagnostic
        reason: String,
    },

    /// The caller passed an unusable argument
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// The requested root definition type has no registered definitions
    #[error("Definition type '{def_type}' not found")]
    DefinitionNotFound {
        /// The requested definition type
        def_type: String,
        /// Registered types with similar names
        suggestions: Vec<String>,
    },

    /// The whole search space was exhausted without producing a message
    #[error("No valid message could be generated for '{def_type}': all candidate definitions unsatisfied")]
    NoValidMessage {
        /// The requested root definition type
        def_type: String,
    },

    /// A definitions file or global config could not be parsed
    #[error("Invalid configuration in {file}")]
    ConfigParseError {
        /// File path or URL of the configuration
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl PhrasegenError {
    /// Returns `true` for errors raised while registering definitions.
    #[must_use]
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConstraintKey { .. }
                | Self::InvalidConstraintValue { .. }
                | Self::TemplateSyntax { .. }
                | Self::InvalidDefinition { .. }
        )
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// Suggestions should be actionable steps; details explain why the error happened.
///
/// ```rust,no_run
/// use phrasegen::core::{PhrasegenError, ErrorContext};
///
/// let context = ErrorContext::new(PhrasegenError::InvalidArgument {
///     reason: "count must be greater than zero".to_string(),
/// })
/// .with_suggestion("Pass --num 1 or higher");
///
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying phrasegen error
    pub error: PhrasegenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`PhrasegenError`]
    #[must_use]
    pub const fn new(error: PhrasegenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Extension trait for converting [`PhrasegenError`] to [`anyhow::Error`] with context
pub trait IntoAnyhowWithContext {
    /// Convert the error to an [`anyhow::Error`] with the provided context
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error;
}

impl IntoAnyhowWithContext for PhrasegenError {
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error {
        anyhow::Error::new(ErrorContext {
            error: self,
            suggestion: context.suggestion,
            details: context.details,
        })
    }
}

/// Convert any error into an [`ErrorContext`] with suggestions where we know the cause.
///
/// Already-wrapped [`ErrorContext`] values are passed through, [`PhrasegenError`] values get
/// a tailored suggestion, and anything else becomes [`PhrasegenError::Other`] with the full
/// `anyhow` chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    let chain = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
    let head = error.to_string();

    match error.downcast::<PhrasegenError>() {
        Ok(err) => {
            // Context layers keep the typed error downcastable; surface their message as details
            let ctx = create_error_context(err);
            if ctx.details.is_none() && head != ctx.error.to_string() {
                ctx.with_details(head)
            } else {
                ctx
            }
        }
        Err(_) => {
            let ctx = ErrorContext::new(PhrasegenError::Other {
                message: head,
            });
            if chain.is_empty() { ctx } else { ctx.with_details(chain.join(": ")) }
        }
    }
}

fn create_error_context(error: PhrasegenError) -> ErrorContext {
    match &error {
        PhrasegenError::InvalidConstraintKey { .. } => {
            let ctx = ErrorContext::new(error);
            ctx.with_suggestion(
                "Constraint keys look like 'Type', 'Type!', 'Type?', 'Type/', 'Type+' or 'Type+:2'",
            )
            .with_details("'/' cannot be combined with '+' or '!', and '!' cannot be combined with '?'")
        }
        PhrasegenError::InvalidConstraintValue { .. } => ErrorContext::new(error)
            .with_suggestion("Check the regular expression syntax of '/' constraint values"),
        PhrasegenError::TemplateSyntax { .. } => ErrorContext::new(error)
            .with_suggestion("Placeholders must be written as {{.TypeName}}"),
        PhrasegenError::DefinitionNotFound {
            suggestions,
            ..
        } => {
            let suggestion = if suggestions.is_empty() {
                "Check the --root flag against the Type fields of your definitions".to_string()
            } else {
                format!("Did you mean: {}?", suggestions.join(", "))
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        PhrasegenError::NoValidMessage { .. } => ErrorContext::new(error)
            .with_details("Every candidate definition was rejected by its constraints, anti-duplication or a validator")
            .with_suggestion("Relax constraints, add more templates, or check the initial state"),
        PhrasegenError::InvalidArgument { .. } => ErrorContext::new(error),
        PhrasegenError::ConfigParseError {
            reason,
            ..
        } => {
            let reason = reason.clone();
            ErrorContext::new(error)
                .with_details(reason)
                .with_suggestion("Definitions files need a top-level 'Definitions' list")
        }
        _ => ErrorContext::new(error),
    }
}
