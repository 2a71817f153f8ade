//! Definition registry.
//!
//! Registered definitions are grouped by definition type, in registration order within a
//! type. Identifiers are assigned sequentially as definitions are registered and are never
//! reused.

use std::collections::HashMap;
use std::sync::Arc;
use strsim::levenshtein;

use crate::core::Result;
use crate::definition::{Definition, DefinitionId, RawDefinition};

/// Maximum Levenshtein distance, as a percentage of the requested name's length, for a
/// registered type to be suggested.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of suggestions reported for an unknown type.
const MAX_SUGGESTIONS: usize = 3;

/// Definitions by type.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<String, Vec<Arc<Definition>>>,
    next_id: u64,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register one record.
    ///
    /// The identifier is only consumed if the record is valid.
    pub fn add(&mut self, raw: RawDefinition) -> Result<Arc<Definition>> {
        let definition = Arc::new(Definition::new(DefinitionId(self.next_id), raw)?);
        self.next_id += 1;

        tracing::debug!(
            "Registered definition {} of type '{}' with {} template(s)",
            definition.id(),
            definition.def_type(),
            definition.templates().len()
        );
        self.definitions
            .entry(definition.def_type().to_string())
            .or_default()
            .push(Arc::clone(&definition));
        Ok(definition)
    }

    /// Definitions registered under `def_type`, in registration order.
    #[must_use]
    pub fn get(&self, def_type: &str) -> &[Arc<Definition>] {
        self.definitions.get(def_type).map_or(&[], Vec::as_slice)
    }

    /// Whether any definition is registered under `def_type`.
    #[must_use]
    pub fn contains(&self, def_type: &str) -> bool {
        !self.get(def_type).is_empty()
    }

    /// Registered definition types, sorted.
    #[must_use]
    pub fn definition_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Every registered definition in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<&Arc<Definition>> {
        let mut all: Vec<&Arc<Definition>> = self.definitions.values().flatten().collect();
        all.sort_by_key(|d| d.id());
        all
    }

    /// Total number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.values().map(Vec::len).sum()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Registered types whose names are close to `def_type`, closest first.
    #[must_use]
    pub fn suggestions(&self, def_type: &str) -> Vec<String> {
        let threshold = (def_type.chars().count() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);

        let mut scored: Vec<(&str, usize)> = self
            .definitions
            .keys()
            .map(|candidate| (candidate.as_str(), levenshtein(def_type, candidate)))
            .filter(|(_, distance)| *distance <= threshold)
            .collect();
        scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));

        scored.into_iter().take(MAX_SUGGESTIONS).map(|(name, _)| name.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PhrasegenError;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut registry = Registry::new();
        let a = registry.add(RawDefinition::new("A", ["a"])).unwrap();
        let b = registry.add(RawDefinition::new("B", ["b"])).unwrap();
        let a2 = registry.add(RawDefinition::new("A", ["a2"])).unwrap();

        assert_eq!((a.id(), b.id(), a2.id()), (DefinitionId(0), DefinitionId(1), DefinitionId(2)));
        assert_eq!(registry.get("A").len(), 2);
        assert_eq!(registry.get("A")[1].templates()[0].raw(), "a2");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.definition_types(), ["A", "B"]);
        let ids: Vec<DefinitionId> = registry.all().iter().map(|d| d.id()).collect();
        assert_eq!(ids, [DefinitionId(0), DefinitionId(1), DefinitionId(2)]);
    }

    #[test]
    fn test_invalid_record_does_not_consume_id() {
        let mut registry = Registry::new();
        let err = registry.add(RawDefinition::new("A", ["{{.Broken"])).unwrap_err();
        assert!(matches!(err, PhrasegenError::TemplateSyntax { .. }));
        assert!(registry.is_empty());

        let a = registry.add(RawDefinition::new("A", ["a"])).unwrap();
        assert_eq!(a.id(), DefinitionId(0));
    }

    #[test]
    fn test_unknown_type_is_empty() {
        let registry = Registry::new();
        assert!(registry.get("Missing").is_empty());
        assert!(!registry.contains("Missing"));
    }

    #[test]
    fn test_suggestions() {
        let mut registry = Registry::new();
        for def_type in ["Root", "FirstName", "LastName", "Pronoun"] {
            registry.add(RawDefinition::new(def_type, ["x"])).unwrap();
        }

        assert_eq!(registry.suggestions("Rot"), ["Root"]);
        assert_eq!(registry.suggestions("FirstNam")[0], "FirstName");
        assert!(registry.suggestions("Completely").is_empty());
    }
}
