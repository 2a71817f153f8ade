//! Template selection stages.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

use super::TemplatePicker;
use crate::core::Result;
use crate::definition::ScopedDefinition;
use crate::state::State;
use crate::templating::Template;

/// Drops templates already picked for the definition in this generation.
///
/// Picks made under any scope of a definition (its own type or any alias) count, so a
/// template picked as `Friend` is unavailable as `Rival` and as the plain type. The filter
/// is lifted entirely when the definition, or the alias being resolved, allows duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuplicateTemplatePicker;

impl TemplatePicker for NoDuplicateTemplatePicker {
    fn name(&self) -> &str {
        "NoDuplicateTemplatePicker"
    }

    fn pick(
        &self,
        templates: Vec<Arc<Template>>,
        definition: &ScopedDefinition,
        state: &State,
        _rng: &mut StdRng,
    ) -> Result<Vec<Arc<Template>>> {
        if definition.allows_duplicates() {
            return Ok(templates);
        }
        Ok(templates.into_iter().filter(|t| !state.is_picked(definition.id(), t)).collect())
    }
}

/// Shuffles the candidates uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTemplatePicker;

impl TemplatePicker for RandomTemplatePicker {
    fn name(&self) -> &str {
        "RandomTemplatePicker"
    }

    fn pick(
        &self,
        mut templates: Vec<Arc<Template>>,
        _definition: &ScopedDefinition,
        _state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<Arc<Template>>> {
        templates.shuffle(rng);
        Ok(templates)
    }
}

/// Keeps declaration order. Replaces [`RandomTemplatePicker`] for reproducible output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AscendingOrderTemplatePicker;

impl TemplatePicker for AscendingOrderTemplatePicker {
    fn name(&self) -> &str {
        "AscendingOrderTemplatePicker"
    }

    fn pick(
        &self,
        templates: Vec<Arc<Template>>,
        _definition: &ScopedDefinition,
        _state: &State,
        _rng: &mut StdRng,
    ) -> Result<Vec<Arc<Template>>> {
        Ok(templates)
    }
}
