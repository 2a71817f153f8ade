//! Constraint key parsing.
//!
//! A constraint key names the state entry a constraint inspects and, through trailing
//! modifier characters and an optional priority suffix, how it inspects it:
//!
//! ```text
//! TypeName[<modifiers>][:<priority>]
//! ```
//!
//! | Modifier | Meaning |
//! |----------|---------|
//! | `!` | the entry must be absent |
//! | `?` | the entry may be absent |
//! | `/` | the value is a regular expression |
//! | `+` | implies `?`; an absent entry is filled with the value |
//!
//! `/` excludes `+` and `!`, and `!` excludes `?`.

use std::fmt;

use crate::core::{PhrasegenError, Result};

/// Characters that may trail the definition type in a constraint key.
const MODIFIER_CHARS: &[char] = &['!', '?', '/', '+'];

/// A parsed constraint key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintKey {
    /// The key exactly as written
    pub raw: String,
    /// The state entry this constraint inspects
    pub definition_type: String,
    /// `/`: value is matched as a regular expression
    pub has_regex_value: bool,
    /// `?` (or `+`): an absent entry satisfies the constraint
    pub is_allowed_to_not_exist: bool,
    /// `!`: the entry must be absent
    pub must_not_exist: bool,
    /// `+`: an absent entry is filled with the constraint value
    pub will_add_value: bool,
    /// Explicit `:N` priority, 0 when absent
    pub priority: i64,
}

impl ConstraintKey {
    /// Parse a raw constraint key.
    ///
    /// The `:N` priority suffix is split off first; modifier characters are then consumed
    /// right to left until the first ordinary character, and whatever precedes them is the
    /// definition type.
    ///
    /// # Errors
    ///
    /// Returns [`PhrasegenError::InvalidConstraintKey`] if the key has more than one colon,
    /// a non-integer priority, no definition type, or mutually exclusive modifiers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phrasegen::constraint::ConstraintKey;
    ///
    /// let key = ConstraintKey::parse("Test?/:1")?;
    /// assert_eq!(key.definition_type, "Test");
    /// assert!(key.is_allowed_to_not_exist);
    /// assert!(key.has_regex_value);
    /// assert_eq!(key.priority, 1);
    ///
    /// assert!(ConstraintKey::parse("Test/+").is_err());
    /// # Ok::<(), phrasegen::core::PhrasegenError>(())
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let (remaining, priority) = split_priority(raw)?;

        let mut key = Self {
            raw: raw.to_string(),
            definition_type: String::new(),
            has_regex_value: false,
            is_allowed_to_not_exist: false,
            must_not_exist: false,
            will_add_value: false,
            priority,
        };

        let type_part = remaining.trim_end_matches(MODIFIER_CHARS);
        for modifier in remaining[type_part.len()..].chars().rev() {
            key.apply_modifier(modifier);
        }

        if type_part.is_empty() {
            return Err(invalid_key(raw, "definition type is empty"));
        }
        key.definition_type = type_part.to_string();

        if let Err(reason) = key.validate() {
            return Err(invalid_key(raw, reason));
        }
        Ok(key)
    }

    fn apply_modifier(&mut self, modifier: char) {
        match modifier {
            '!' => self.must_not_exist = true,
            '?' => self.is_allowed_to_not_exist = true,
            '/' => self.has_regex_value = true,
            '+' => {
                self.will_add_value = true;
                self.is_allowed_to_not_exist = true;
            }
            _ => unreachable!("only modifier characters are trimmed"),
        }
    }

    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.has_regex_value && self.will_add_value {
            return Err("/ and + are exclusive");
        }
        if self.has_regex_value && self.must_not_exist {
            return Err("/ and ! are exclusive");
        }
        if self.must_not_exist && self.is_allowed_to_not_exist {
            return Err("! and ? are exclusive");
        }
        Ok(())
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn split_priority(raw: &str) -> Result<(&str, i64)> {
    let mut chunks = raw.split(':');
    let head = chunks.next().unwrap_or_default();
    let Some(priority) = chunks.next() else {
        return Ok((raw, 0));
    };
    if chunks.next().is_some() {
        return Err(invalid_key(raw, "2 or more colons found"));
    }

    let priority = priority.parse::<i64>().map_err(|e| {
        invalid_key(raw, format!("failed to extract priority from '{priority}': {e}"))
    })?;
    Ok((head, priority))
}

fn invalid_key(raw: &str, reason: impl Into<String>) -> PhrasegenError {
    PhrasegenError::InvalidConstraintKey {
        key: raw.to_string(),
        reason: reason.into(),
    }
}
