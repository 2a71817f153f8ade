//! Template parsing and execution.
//!
//! A template is a raw format string whose `{{.TypeName}}` placeholders name the definition
//! types (or alias names) it depends on. Parsing extracts those dependencies once and
//! compiles the template for rendering; execution substitutes resolved values from a
//! [`State`].
//!
//! # Dependency Order
//!
//! [`Template::depends`] lists each referenced name once, in first-occurrence order, then
//! moves the names listed in the owning definition's order hint to the front, in hint
//! order. The resolver always resolves the first unresolved entry of this list next, so the
//! hint controls which values are visible to later constraint checks.
//!
//! ```rust
//! use phrasegen::templating::Template;
//!
//! let hint = vec!["id3".to_string(), "id1".to_string()];
//! let template = Template::new("{{.id1}}{{.id2}}{{.id3}}", &hint)?;
//! assert_eq!(template.depends(), ["id3", "id1", "id2"]);
//! # Ok::<(), phrasegen::core::PhrasegenError>(())
//! ```
//!
//! # Partial Execution
//!
//! [`Template::execute_with_incomplete_state`] renders whatever it can and reports the
//! names it could not substitute. Validators use it to judge a branch before all of its
//! dependencies are chosen.
//!
//! # Module Structure
//!
//! - `parser` - Placeholder scanning
//! - `renderer` - Compilation to, and rendering with, Tera

mod parser;
mod renderer;

use std::fmt;

use crate::core::{PhrasegenError, Result};
use crate::state::State;
use parser::Segment;
use renderer::MessageRenderer;

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
    segments: Vec<Segment>,
    depends: Vec<String>,
    renderer: MessageRenderer,
}

impl Template {
    /// Parse `raw`, ordering its dependencies by `order_hint`.
    ///
    /// # Errors
    ///
    /// Returns [`PhrasegenError::TemplateSyntax`] for an unclosed `{{`, a placeholder that is
    /// not `.TypeName`, or a type name that is not an identifier. Any other text, Tera tags
    /// included, is literal.
    pub fn new(raw: &str, order_hint: &[String]) -> Result<Self> {
        let segments = parser::parse_segments(raw)?;
        let renderer = MessageRenderer::compile(raw, &segments)?;

        let mut depends: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Placeholder(name) = segment {
                if !depends.contains(name) {
                    depends.push(name.clone());
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            depends: sort_by_order(depends, order_hint),
            renderer,
        })
    }

    /// The template text as written.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Referenced names in resolution order.
    #[must_use]
    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    /// Whether the template references anything at all.
    #[must_use]
    pub fn has_dependencies(&self) -> bool {
        !self.depends.is_empty()
    }

    /// Render the template with every dependency substituted from `state`.
    ///
    /// Dependency-free templates return their raw text unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PhrasegenError::TemplateExecution`] if a dependency is unresolved in
    /// `state`.
    pub fn execute(&self, state: &State) -> Result<String> {
        if !self.has_dependencies() {
            return Ok(self.raw.clone());
        }
        if let Some(missing) = self.first_unsatisfied(state) {
            return Err(PhrasegenError::TemplateExecution {
                template: self.raw.clone(),
                reason: format!("'{missing}' is not resolved"),
            });
        }
        self.renderer.render(&self.raw, state.values())
    }

    /// Best-effort rendering against a state that may lack some dependencies.
    ///
    /// Literal text is always emitted; a placeholder is emitted only if `state` resolves
    /// it. Returns the partial message and the unresolved names in template order.
    #[must_use]
    pub fn execute_with_incomplete_state(&self, state: &State) -> (String, Vec<String>) {
        let mut message = String::with_capacity(self.raw.len());
        let mut unresolved = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => message.push_str(text),
                Segment::Placeholder(name) => match state.get(name) {
                    Some(value) => message.push_str(value),
                    None => unresolved.push(name.clone()),
                },
            }
        }
        (message, unresolved)
    }

    /// Whether every dependency is resolved in `state`.
    #[must_use]
    pub fn is_satisfied_state(&self, state: &State) -> bool {
        self.first_unsatisfied(state).is_none()
    }

    /// The first dependency, in resolution order, that `state` does not resolve.
    #[must_use]
    pub fn first_unsatisfied(&self, state: &State) -> Option<&str> {
        self.depends.iter().map(String::as_str).find(|name| !state.contains(name))
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Template {}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Move hinted names to the front in hint order; the rest keep their relative order.
fn sort_by_order(depends: Vec<String>, order_hint: &[String]) -> Vec<String> {
    if order_hint.is_empty() {
        return depends;
    }

    let mut ordered: Vec<String> = Vec::with_capacity(depends.len());
    for name in order_hint {
        if depends.contains(name) && !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    let rest: Vec<String> = depends.into_iter().filter(|name| !ordered.contains(name)).collect();
    ordered.extend(rest);
    ordered
}
