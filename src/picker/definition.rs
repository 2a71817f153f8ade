//! Definition selection stages.

use rand::Rng;
use rand::rngs::StdRng;
use std::cmp::Reverse;

use super::DefinitionPicker;
use crate::core::Result;
use crate::definition::ScopedDefinition;
use crate::state::State;

/// Drops definitions whose constraints the state does not satisfy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintsSatisfiedDefinitionPicker;

impl DefinitionPicker for ConstraintsSatisfiedDefinitionPicker {
    fn name(&self) -> &str {
        "ConstraintsSatisfiedDefinitionPicker"
    }

    fn pick(
        &self,
        definitions: Vec<ScopedDefinition>,
        state: &State,
        _rng: &mut StdRng,
    ) -> Result<Vec<ScopedDefinition>> {
        Ok(definitions
            .into_iter()
            .filter(|d| {
                let satisfied = d.constraints().are_satisfied(state);
                if !satisfied {
                    tracing::trace!("Constraints of {} not satisfied", d);
                }
                satisfied
            })
            .collect())
    }
}

/// Orders the candidates by repeated weighted draws.
///
/// Each round draws one remaining definition with probability proportional to its weight
/// and moves it to the output, so heavier definitions tend to come first while every
/// candidate still appears exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWithWeightDefinitionPicker;

impl DefinitionPicker for RandomWithWeightDefinitionPicker {
    fn name(&self) -> &str {
        "RandomWithWeightDefinitionPicker"
    }

    fn pick(
        &self,
        mut definitions: Vec<ScopedDefinition>,
        _state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<ScopedDefinition>> {
        let mut ordered = Vec::with_capacity(definitions.len());
        while !definitions.is_empty() {
            let total: f64 = definitions.iter().map(|d| f64::from(d.definition().weight())).sum();
            if total <= 0.0 {
                ordered.append(&mut definitions);
                break;
            }

            let mut draw = rng.gen_range(0.0..total);
            let last = definitions.len() - 1;
            let index = definitions
                .iter()
                .position(|d| {
                    let weight = f64::from(d.definition().weight());
                    if draw < weight {
                        return true;
                    }
                    draw -= weight;
                    false
                })
                .unwrap_or(last);
            ordered.push(definitions.remove(index));
        }
        Ok(ordered)
    }
}

/// Stable sort by each definition's highest constraint priority, highest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByConstraintPriorityDefinitionPicker;

impl DefinitionPicker for SortByConstraintPriorityDefinitionPicker {
    fn name(&self) -> &str {
        "SortByConstraintPriorityDefinitionPicker"
    }

    fn pick(
        &self,
        mut definitions: Vec<ScopedDefinition>,
        _state: &State,
        _rng: &mut StdRng,
    ) -> Result<Vec<ScopedDefinition>> {
        definitions.sort_by_key(|d| Reverse(d.definition().max_priority()));
        Ok(definitions)
    }
}
