//! Constraint set attached to a definition.

use std::collections::{BTreeMap, HashMap};

use super::Constraint;
use crate::core::Result;
use crate::state::State;

/// The constraints of one definition, all of which must hold for it to be picked.
///
/// Members are keyed by their raw key, so `Gender` and `Gender?` are distinct members. A
/// secondary index maps each definition type to the raw key that last claimed it; when two
/// keys target the same type with different modifiers, the one iterated last (in raw key
/// order) wins the index slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    constraints: BTreeMap<String, Constraint>,
    by_type: HashMap<String, String>,
}

impl Constraints {
    /// Creates an empty constraint set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed key or invalid regular expression.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.set(key.as_ref(), value.as_ref())?;
        }
        Ok(set)
    }

    /// Parse and insert one constraint, replacing any member with the same raw key.
    pub fn set(&mut self, raw_key: &str, raw_value: &str) -> Result<()> {
        let constraint = Constraint::new(raw_key, raw_value)?;
        self.insert(constraint);
        Ok(())
    }

    fn insert(&mut self, constraint: Constraint) {
        let raw_key = constraint.key().raw.clone();
        self.by_type.insert(constraint.key().definition_type.clone(), raw_key.clone());
        self.constraints.insert(raw_key, constraint);
    }

    /// Look up a member by its raw key.
    #[must_use]
    pub fn get(&self, raw_key: &str) -> Option<&Constraint> {
        self.constraints.get(raw_key)
    }

    /// Look up the member indexed for a definition type.
    #[must_use]
    pub fn get_by_definition_type(&self, def_type: &str) -> Option<&Constraint> {
        self.by_type.get(def_type).and_then(|key| self.constraints.get(key))
    }

    /// Iterate over the members in raw key order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Collect the members not satisfied by `state` into a fresh set.
    #[must_use]
    pub fn list_unsatisfied(&self, state: &State) -> Self {
        let mut unsatisfied = Self::new();
        for constraint in self.iter().filter(|c| !c.is_satisfied(state)) {
            unsatisfied.insert(constraint.clone());
        }
        unsatisfied
    }

    /// Whether every member is satisfied by `state`.
    #[must_use]
    pub fn are_satisfied(&self, state: &State) -> bool {
        self.iter().all(|c| c.is_satisfied(state))
    }

    /// The highest explicit priority among the members, 0 for an empty set.
    #[must_use]
    pub fn max_priority(&self) -> i64 {
        self.iter().map(|c| c.key().priority).max().unwrap_or(0)
    }
}
