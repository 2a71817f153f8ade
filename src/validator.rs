//! Early branch pruning.
//!
//! A [`TemplateValidator`] inspects a template against a state that may not yet resolve
//! all of the template's dependencies. Returning `Ok(false)` prunes the branch silently;
//! returning `Err` aborts the generation call.
//!
//! The resolver runs validators before each dependency is resolved and once more on the
//! complete message, so a branch that is already too long is abandoned before any further
//! expansion is spent on it.

use std::fmt;
use std::sync::Arc;

use crate::core::Result;
use crate::state::State;
use crate::templating::Template;

/// A guard over partially resolved templates.
pub trait TemplateValidator: Send + Sync + fmt::Debug {
    /// Validator name for logs and errors.
    fn name(&self) -> &str;

    /// Whether the branch may continue.
    fn validate(&self, template: &Template, state: &State) -> Result<bool>;
}

/// Rejects templates whose best-effort rendering exceeds a character count.
///
/// Unresolved placeholders contribute nothing, so the count only grows as the branch
/// resolves more dependencies.
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthValidator {
    max_chars: usize,
}

impl MaxLengthValidator {
    /// Accept at most `max_chars` characters.
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
        }
    }

    /// The configured bound.
    #[must_use]
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl TemplateValidator for MaxLengthValidator {
    fn name(&self) -> &str {
        "MaxLengthValidator"
    }

    fn validate(&self, template: &Template, state: &State) -> Result<bool> {
        let (message, _) = template.execute_with_incomplete_state(state);
        let length = message.chars().count();
        if length > self.max_chars {
            tracing::trace!(
                "Rejected '{}': {} chars exceeds {}",
                template.raw(),
                length,
                self.max_chars
            );
            return Ok(false);
        }
        Ok(true)
    }
}

/// Run every validator, stopping at the first rejection or failure.
pub(crate) fn validate_all(
    validators: &[Arc<dyn TemplateValidator>],
    template: &Template,
    state: &State,
) -> Result<bool> {
    for validator in validators {
        if !validator.validate(template, state)? {
            return Ok(false);
        }
    }
    Ok(true)
}
