//! Reference graph between definition types.
//!
//! Nodes are definition types, and an edge `A -> B` means some template of a definition of
//! type `A` has a placeholder resolving to type `B` (directly or through an alias). The
//! graph backs the static checks of the `validate` command.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::Registry;

/// A reference from one definition type to a type nothing is registered under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UndefinedReference {
    /// The referencing definition type
    pub from: String,
    /// The placeholder name as written in the template
    pub placeholder: String,
    /// The type the placeholder resolves to
    pub target: String,
}

/// Definition types and the references between them.
#[derive(Debug, Default)]
pub struct TypeGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    undefined: BTreeSet<UndefinedReference>,
}

impl TypeGraph {
    /// Build the graph of every definition in `registry`.
    #[must_use]
    pub fn from_registry(registry: &Registry) -> Self {
        let mut graph = Self::default();
        for def_type in registry.definition_types() {
            graph.ensure_node(def_type);
        }

        for definition in registry.all() {
            for placeholder in definition.referenced_types() {
                let target = definition
                    .alias(placeholder)
                    .map_or(placeholder, |alias| alias.refer_type.as_str());

                if registry.contains(target) {
                    graph.add_reference(definition.def_type(), target);
                } else {
                    graph.undefined.insert(UndefinedReference {
                        from: definition.def_type().to_string(),
                        placeholder: placeholder.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
        graph
    }

    fn ensure_node(&mut self, def_type: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(def_type) {
            return index;
        }
        let index = self.graph.add_node(def_type.to_string());
        self.node_map.insert(def_type.to_string(), index);
        index
    }

    fn add_reference(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Number of definition types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Types directly referenced by `def_type`, sorted.
    #[must_use]
    pub fn references(&self, def_type: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(def_type) else {
            return Vec::new();
        };
        let mut references: Vec<&str> =
            self.graph.neighbors(index).map(|n| self.graph[n].as_str()).collect();
        references.sort_unstable();
        references
    }

    /// References to types with no registered definition, sorted.
    pub fn undefined_references(&self) -> impl Iterator<Item = &UndefinedReference> {
        self.undefined.iter()
    }

    /// Groups of types that can reach themselves through references.
    ///
    /// Each group is sorted, and groups are ordered by their first type. A type referencing
    /// itself forms a group of one.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component.first().is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|component| {
                let mut types: Vec<String> =
                    component.into_iter().map(|n| self.graph[n].clone()).collect();
                types.sort();
                types
            })
            .collect();
        cycles.sort();
        cycles
    }
}
