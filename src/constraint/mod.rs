//! Constraint parsing and evaluation.
//!
//! Constraints gate whether a definition may be picked given the values resolved so far.
//! Each constraint is a `(key, value)` pair attached to a definition; the key names a state
//! entry (a definition type or alias name) and carries modifiers that change how the value
//! is compared.
//!
//! # Constraint Types
//!
//! | Key | Satisfied when |
//! |-----|----------------|
//! | `Gender` | `Gender` is resolved and equals the value |
//! | `Gender?` | `Gender` is absent, or equals the value |
//! | `Gender!` | `Gender` is absent (the value is ignored) |
//! | `Gender/` | `Gender` is resolved and the value regex matches it |
//! | `Gender+` | like `?`; when absent, the value is written into the state once the definition is picked |
//! | `Gender:3` | like `Gender`, with priority 3 for priority ordering |
//!
//! # Examples
//!
//! ```rust
//! use phrasegen::constraint::Constraints;
//! use phrasegen::state::State;
//! use std::collections::HashMap;
//!
//! let constraints = Constraints::from_pairs([("Gender?", "Female"), ("Age/", "^[0-9]+$")])?;
//!
//! let state = State::from_values(HashMap::from([("Age".to_string(), "42".to_string())]));
//! assert!(constraints.are_satisfied(&state));
//!
//! let state = State::from_values(HashMap::from([("Gender".to_string(), "Male".to_string())]));
//! assert!(!constraints.are_satisfied(&state));
//! # Ok::<(), phrasegen::core::PhrasegenError>(())
//! ```
//!
//! # Error Conditions
//!
//! Malformed keys and invalid regular expressions are rejected when the constraint is
//! built, which happens when definitions are registered. Evaluating a built constraint
//! cannot fail.

use regex::Regex;
use std::fmt;

use crate::core::{PhrasegenError, Result};
use crate::state::State;

pub mod constraint_set;
pub mod key;

pub use constraint_set::Constraints;
pub use key::ConstraintKey;


/// The right-hand side of a constraint.
#[derive(Debug, Clone)]
pub enum ConstraintValue {
    /// Compared by exact string equality
    Literal(String),
    /// Compared with [`Regex::is_match`] (a search, not a full-string match)
    Pattern(Regex),
}

impl ConstraintValue {
    /// Build a value for `key`, compiling it as a regular expression when the key has `/`.
    pub fn parse(key: &ConstraintKey, raw: &str) -> Result<Self> {
        if !key.has_regex_value {
            return Ok(Self::Literal(raw.to_string()));
        }
        Regex::new(raw).map(Self::Pattern).map_err(|e| PhrasegenError::InvalidConstraintValue {
            key: key.raw.clone(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    /// Whether a resolved message satisfies this value.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Literal(value) => value == message,
            Self::Pattern(re) => re.is_match(message),
        }
    }

    /// The raw value text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(value) => value,
            Self::Pattern(re) => re.as_str(),
        }
    }
}

impl PartialEq for ConstraintValue {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Literal(_), Self::Literal(_)) | (Self::Pattern(_), Self::Pattern(_))
        ) && self.as_str() == other.as_str()
    }
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single parsed `(key, value)` requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    key: ConstraintKey,
    value: ConstraintValue,
}

impl Constraint {
    /// Parse a raw key and value into a constraint.
    pub fn new(raw_key: &str, raw_value: &str) -> Result<Self> {
        let key = ConstraintKey::parse(raw_key)?;
        let value = ConstraintValue::parse(&key, raw_value)?;
        Ok(Self {
            key,
            value,
        })
    }

    /// The parsed key.
    #[must_use]
    pub const fn key(&self) -> &ConstraintKey {
        &self.key
    }

    /// The parsed value.
    #[must_use]
    pub const fn value(&self) -> &ConstraintValue {
        &self.value
    }

    /// Evaluate this constraint against a state.
    ///
    /// - absent and `?`/`+`/`!` → satisfied
    /// - absent otherwise → unsatisfied
    /// - present and `!` → unsatisfied
    /// - present → the value must match the resolved message
    #[must_use]
    pub fn is_satisfied(&self, state: &State) -> bool {
        let Some(message) = state.get(&self.key.definition_type) else {
            return self.key.is_allowed_to_not_exist || self.key.must_not_exist;
        };

        if self.key.must_not_exist {
            return false;
        }

        self.value.matches(message)
    }

    /// The message a `+` constraint writes into the state, if any.
    #[must_use]
    pub fn injected_value(&self) -> Option<&str> {
        match (&self.value, self.key.will_add_value) {
            (ConstraintValue::Literal(value), true) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}
