//! Serialized definition records.
//!
//! These are the records definition files deserialize into, with the PascalCase keys used
//! by the file format:
//!
//! ```yaml
//! Definitions:
//!   - Type: Pronoun
//!     Templates: ["She"]
//!     Constraints: { "Gender+": Female }
//!     Weight: 2
//!   - Type: Greeting
//!     Templates: ["{{.Friend}} and {{.Rival}}"]
//!     Aliases:
//!       Friend: { Type: Name }
//!       Rival: { Type: Name, AllowDuplicate: true }
//!     OrderBy: [Rival]
//! ```
//!
//! Constraint values may be written as any scalar; numbers and booleans are kept as their
//! textual form.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// An alias entry of a raw definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAlias {
    /// The definition type the alias refers to
    #[serde(rename = "Type")]
    pub refer_type: String,
    /// Whether templates already picked for the referenced definition may be picked again
    #[serde(default)]
    pub allow_duplicate: bool,
}

/// A definition record as read from a definitions file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDefinition {
    /// The definition type this record is registered under
    #[serde(rename = "Type")]
    pub def_type: String,
    /// Raw templates, at least one
    #[serde(default)]
    pub templates: Vec<String>,
    /// Raw constraint key to raw value
    #[serde(
        default,
        deserialize_with = "deserialize_scalar_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub constraints: BTreeMap<String, String>,
    /// Alias name to alias entry
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, RawAlias>,
    /// Whether this definition's templates may be picked more than once per generation
    #[serde(default)]
    pub allow_duplicate: bool,
    /// Dependency resolution order hint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
    /// Relative weight for weighted random selection, 0 meaning the default of 1
    #[serde(default)]
    pub weight: f32,
}

impl RawDefinition {
    /// A record with the given type and templates and everything else defaulted.
    pub fn new<I, S>(def_type: impl Into<String>, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            def_type: def_type.into(),
            templates: templates.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a constraint.
    #[must_use]
    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    /// Add an alias.
    #[must_use]
    pub fn with_alias(
        mut self,
        name: impl Into<String>,
        refer_type: impl Into<String>,
        allow_duplicate: bool,
    ) -> Self {
        self.aliases.insert(
            name.into(),
            RawAlias {
                refer_type: refer_type.into(),
                allow_duplicate,
            },
        );
        self
    }

    /// Set the weight.
    #[must_use]
    pub const fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the duplicate policy.
    #[must_use]
    pub const fn with_allow_duplicate(mut self, allow_duplicate: bool) -> Self {
        self.allow_duplicate = allow_duplicate;
        self
    }

    /// Set the dependency order hint.
    #[must_use]
    pub fn with_order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn deserialize_scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, Scalar>>::deserialize(deserializer)?;
    Ok(map.unwrap_or_default().into_iter().map(|(k, v)| (k, v.into())).collect())
}
