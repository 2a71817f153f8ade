//! Test fixtures for definition files
//!
//! Each fixture is a complete definitions document that can be parsed in memory or
//! written into a scratch directory for CLI tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture for creating sample definitions files
#[derive(Clone, Debug)]
pub struct DefinitionsFixture {
    pub content: String,
    pub name: String,
}

impl DefinitionsFixture {
    /// A root with one nested dependency, resolving to exactly `aaabbbccc`
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
Definitions:
  - Type: Root
    Templates: ["aaa{{.NestTest}}ccc"]
  - Type: NestTest
    Templates: ["bbb"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Pronouns agreeing with the gender injected by the chosen first name
    pub fn pronouns() -> Self {
        Self {
            name: "pronouns".to_string(),
            content: r#"
Definitions:
  - Type: Root
    Templates: ["{{.FirstName}} {{.LastName}} said {{.Pronoun}} would come."]
    OrderBy: [FirstName]
  - Type: FirstName
    Templates: ["Alice"]
    Constraints: { "Gender+": Female }
  - Type: FirstName
    Templates: ["Bob"]
    Constraints: { "Gender+": Male }
  - Type: LastName
    Templates: ["Smith", "Jones"]
  - Type: Pronoun
    Templates: ["she"]
    Constraints: { Gender: Female }
  - Type: Pronoun
    Templates: ["he"]
    Constraints: { Gender: Male }
"#
            .trim()
            .to_string(),
        }
    }

    /// Two aliases of the same type that must resolve to different names
    pub fn aliases() -> Self {
        Self {
            name: "aliases".to_string(),
            content: r#"
Definitions:
  - Type: Root
    Templates: ["{{.Friend}} met {{.Rival}}"]
    Aliases:
      Friend: { Type: Name }
      Rival: { Type: Name }
  - Type: Name
    Templates: ["Alice", "Bob"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Definitions whose references form a cycle and point at an undefined type
    pub fn cyclic() -> Self {
        Self {
            name: "cyclic".to_string(),
            content: r#"
Definitions:
  - Type: Root
    Templates: ["{{.Ping}}", "done"]
  - Type: Ping
    Templates: ["ping {{.Pong}}"]
  - Type: Pong
    Templates: ["pong {{.Ping}}", "{{.Missing}}"]
"#
            .trim()
            .to_string(),
        }
    }

    /// A constraint key with mutually exclusive modifiers
    pub fn invalid_constraint() -> Self {
        Self {
            name: "invalid_constraint".to_string(),
            content: r#"
Definitions:
  - Type: Root
    Templates: ["x"]
    Constraints: { "Gender/+": Female }
"#
            .trim()
            .to_string(),
        }
    }

    /// A document that is not valid YAML for the definitions envelope
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: "Definitions: [ { Type: Root, Templates: [x] ".to_string(),
        }
    }

    /// Write the fixture as `<name>.yaml` under `dir`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.yaml", self.name));
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}
