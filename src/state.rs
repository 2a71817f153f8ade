//! Per-branch resolution state.
//!
//! A [`State`] accumulates everything one resolution branch has decided so far:
//! - resolved messages, keyed by definition type or alias name
//! - the templates already picked for each definition (anti-duplication history)
//! - which alias names each definition has been bound under
//!
//! States are forked by value whenever the search branches (`Clone` is a deep copy), so
//! sibling branches never observe each other's writes. Outside the crate a state is
//! read-only apart from building an initial state and [`State::with_update`], which returns
//! an updated fork.

use std::collections::HashMap;

use crate::constraint::{Constraint, Constraints};
use crate::definition::{DefinitionId, ScopedDefinition};
use crate::templating::Template;

/// A template recorded as picked for a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedTemplate {
    /// Raw text of the picked template
    pub raw: String,
    /// Alias the definition was resolved under, `None` for the default scope
    pub alias: Option<String>,
}

/// Snapshot of one resolution branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    values: HashMap<String, String>,
    picked_templates: HashMap<DefinitionId, Vec<PickedTemplate>>,
    aliases: HashMap<DefinitionId, Vec<String>>,
}

impl State {
    /// An empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state seeded with caller-supplied values.
    #[must_use]
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Builder-style insertion of an initial value.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.values.insert(key.into(), message.into());
        self
    }

    /// The message resolved for a definition type or alias name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether a definition type or alias name has been resolved.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All resolved values.
    #[must_use]
    pub const fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Templates already picked for a definition, in pick order.
    #[must_use]
    pub fn picked_templates(&self, id: DefinitionId) -> &[PickedTemplate] {
        self.picked_templates.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Whether `template` has been picked for definition `id` under any scope.
    #[must_use]
    pub fn is_picked(&self, id: DefinitionId, template: &Template) -> bool {
        self.picked_templates(id).iter().any(|picked| picked.raw == template.raw())
    }

    /// Alias names definition `id` has been bound under.
    #[must_use]
    pub fn alias_names(&self, id: DefinitionId) -> &[String] {
        self.aliases.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Fork this state and record `message` as the result of `definition` picking `template`.
    #[must_use]
    pub fn with_update(
        &self,
        definition: &ScopedDefinition,
        template: &Template,
        message: &str,
    ) -> Self {
        let mut forked = self.clone();
        forked.update(definition, template, message);
        forked
    }

    pub(crate) fn set(&mut self, def_type: &str, message: &str) {
        self.values.insert(def_type.to_string(), message.to_string());
    }

    pub(crate) fn set_alias(&mut self, id: DefinitionId, alias_name: &str, message: &str) {
        self.values.insert(alias_name.to_string(), message.to_string());
        self.aliases.entry(id).or_default().push(alias_name.to_string());
    }

    /// Apply a `+` constraint: write its value if the target entry is absent.
    ///
    /// Returns `true` if the state changed.
    pub(crate) fn set_by_constraint(&mut self, constraint: &Constraint) -> bool {
        let Some(value) = constraint.injected_value() else {
            return false;
        };
        let target = &constraint.key().definition_type;
        if self.contains(target) {
            return false;
        }
        self.set(target, value);
        true
    }

    /// Apply every `+` constraint of a set, returning how many entries were written.
    pub(crate) fn set_by_constraints(&mut self, constraints: &Constraints) -> usize {
        constraints.iter().filter(|c| self.set_by_constraint(c)).count()
    }

    /// Bind a definition's message under its type (or alias) and apply its `+` constraints.
    pub(crate) fn set_by_definition(&mut self, definition: &ScopedDefinition, message: &str) {
        match definition.alias_name() {
            Some(alias_name) => self.set_alias(definition.id(), alias_name, message),
            None => self.set(definition.def_type(), message),
        }
        self.set_by_constraints(definition.constraints());
    }

    pub(crate) fn record_pick(&mut self, definition: &ScopedDefinition, template: &Template) {
        self.picked_templates.entry(definition.id()).or_default().push(PickedTemplate {
            raw: template.raw().to_string(),
            alias: definition.alias_name().map(str::to_string),
        });
    }

    /// Bind the message, apply `+` constraints and record the pick.
    pub(crate) fn update(
        &mut self,
        definition: &ScopedDefinition,
        template: &Template,
        message: &str,
    ) {
        self.set_by_definition(definition, message);
        self.record_pick(definition, template);
    }
}

impl From<HashMap<String, String>> for State {
    fn from(values: HashMap<String, String>) -> Self {
        Self::from_values(values)
    }
}
