//! Definitions: the named units the generator resolves.
//!
//! A [`Definition`] bundles one or more [`Template`]s offered for a definition type, the
//! [`Constraints`] that gate when it may be picked, a weight for weighted random
//! selection, aliases for referencing other types under local names, and a dependency
//! order hint.
//!
//! Definitions are built from [`RawDefinition`] records when they are registered; all
//! templates and constraints are parsed at that point, so a registered definition is
//! always well-formed.
//!
//! During resolution a definition is always looked at through a [`ScopedDefinition`],
//! which records the alias (if any) the definition is being resolved under. The alias
//! decides which state entry the result is bound to and whether anti-duplication applies.

pub mod raw;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraints;
use crate::core::{PhrasegenError, Result};
use crate::templating::Template;

pub use raw::{RawAlias, RawDefinition};

/// Registration-order identifier of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub u64);

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A local name under which a definition references another definition type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The definition type looked up when the alias is resolved
    pub refer_type: String,
    /// Whether anti-duplication is lifted for this alias
    pub allow_duplicate: bool,
}

impl From<RawAlias> for Alias {
    fn from(raw: RawAlias) -> Self {
        Self {
            refer_type: raw.refer_type,
            allow_duplicate: raw.allow_duplicate,
        }
    }
}

/// A registered definition.
#[derive(Debug, Clone)]
pub struct Definition {
    id: DefinitionId,
    def_type: String,
    templates: Vec<Arc<Template>>,
    constraints: Constraints,
    aliases: BTreeMap<String, Alias>,
    weight: f32,
    allow_duplicate: bool,
    order_by: Vec<String>,
}

impl Definition {
    /// Validate and parse a raw record.
    ///
    /// # Errors
    ///
    /// - [`PhrasegenError::InvalidDefinition`] for an empty type, no templates, an alias
    ///   without a referenced type, or a negative or non-finite weight
    /// - [`PhrasegenError::InvalidConstraintKey`] / [`PhrasegenError::InvalidConstraintValue`]
    ///   for malformed constraints
    /// - [`PhrasegenError::TemplateSyntax`] for malformed templates
    pub fn new(id: DefinitionId, raw: RawDefinition) -> Result<Self> {
        let invalid = |reason: String| PhrasegenError::InvalidDefinition {
            def_type: raw.def_type.clone(),
            reason,
        };

        if raw.def_type.trim().is_empty() {
            return Err(invalid("definition type must not be empty".to_string()));
        }
        if raw.templates.is_empty() {
            return Err(invalid("at least one template is required".to_string()));
        }
        if !raw.weight.is_finite() || raw.weight < 0.0 {
            return Err(invalid(format!("weight must be a non-negative number, got {}", raw.weight)));
        }
        if let Some((name, _)) = raw.aliases.iter().find(|(_, a)| a.refer_type.trim().is_empty())
        {
            return Err(invalid(format!("alias '{name}' does not name a type")));
        }

        let constraints = Constraints::from_pairs(&raw.constraints)?;
        let templates = raw
            .templates
            .iter()
            .map(|t| Template::new(t, &raw.order_by).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            templates,
            constraints,
            aliases: raw.aliases.into_iter().map(|(name, alias)| (name, alias.into())).collect(),
            weight: if raw.weight == 0.0 { 1.0 } else { raw.weight },
            allow_duplicate: raw.allow_duplicate,
            order_by: raw.order_by,
            def_type: raw.def_type,
        })
    }

    /// Registration-order identifier.
    #[must_use]
    pub const fn id(&self) -> DefinitionId {
        self.id
    }

    /// The type this definition is registered under.
    #[must_use]
    pub fn def_type(&self) -> &str {
        &self.def_type
    }

    /// Parsed templates in declaration order.
    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.templates
    }

    /// Parsed constraints.
    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Declared aliases by name.
    #[must_use]
    pub const fn aliases(&self) -> &BTreeMap<String, Alias> {
        &self.aliases
    }

    /// Look up a declared alias.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Selection weight, never zero.
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// Whether templates may be picked again after being picked once.
    #[must_use]
    pub const fn allow_duplicate(&self) -> bool {
        self.allow_duplicate
    }

    /// Dependency order hint.
    #[must_use]
    pub fn order_by(&self) -> &[String] {
        &self.order_by
    }

    /// The highest constraint priority, used by priority ordering.
    #[must_use]
    pub fn max_priority(&self) -> i64 {
        self.constraints.max_priority()
    }

    /// Every definition type or alias referenced by any template.
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().flat_map(|t| t.depends().iter().map(String::as_str))
    }
}

/// A definition together with the alias it is being resolved under.
#[derive(Debug, Clone)]
pub struct ScopedDefinition {
    definition: Arc<Definition>,
    alias: Option<(String, Alias)>,
}

impl ScopedDefinition {
    /// A definition resolved under its own type.
    #[must_use]
    pub const fn new(definition: Arc<Definition>) -> Self {
        Self {
            definition,
            alias: None,
        }
    }

    /// A definition resolved under `alias_name`.
    #[must_use]
    pub fn aliased(definition: Arc<Definition>, alias_name: impl Into<String>, alias: Alias) -> Self {
        Self {
            definition,
            alias: Some((alias_name.into(), alias)),
        }
    }

    /// The underlying definition.
    #[must_use]
    pub const fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// The alias name the result is bound to, if any.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_ref().map(|(name, _)| name.as_str())
    }

    /// The alias being resolved, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&Alias> {
        self.alias.as_ref().map(|(_, alias)| alias)
    }

    /// The state key the result is bound to: the alias name or the definition type.
    #[must_use]
    pub fn binding_key(&self) -> &str {
        self.alias_name().unwrap_or_else(|| self.definition.def_type())
    }

    /// Whether already-picked templates may be picked again in this scope.
    #[must_use]
    pub fn allows_duplicates(&self) -> bool {
        self.definition.allow_duplicate || self.alias().is_some_and(|a| a.allow_duplicate)
    }

    /// Shorthand for the underlying definition's id.
    #[must_use]
    pub fn id(&self) -> DefinitionId {
        self.definition.id
    }

    /// Shorthand for the underlying definition's type.
    #[must_use]
    pub fn def_type(&self) -> &str {
        &self.definition.def_type
    }

    /// Shorthand for the underlying definition's templates.
    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.definition.templates
    }

    /// Shorthand for the underlying definition's constraints.
    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.definition.constraints
    }
}

impl fmt::Display for ScopedDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias_name() {
            Some(name) => write!(f, "{} {} as {}", self.def_type(), self.id(), name),
            None => write!(f, "{} {}", self.def_type(), self.id()),
        }
    }
}
