//! Template rendering with Tera.
//!
//! Parsed segments are compiled into a Tera template once, at parse time. Literal chunks
//! never reach the Tera parser: each one becomes a lookup into the `literals` list of the
//! render context, so Tera syntax in literal text is emitted verbatim. Each placeholder
//! becomes a lookup into the `state` map.

use std::collections::HashMap;
use std::error::Error as _;
use std::fmt::{self, Write as _};
use tera::{Context as TeraContext, Tera};

use super::parser::Segment;
use crate::core::{PhrasegenError, Result};

/// Name the compiled template is registered under. No `.html` suffix, so Tera does not
/// autoescape substituted values.
const TEMPLATE_NAME: &str = "message";

/// A compiled template bound to its own Tera instance.
#[derive(Clone)]
pub(crate) struct MessageRenderer {
    tera: Tera,
    literals: Vec<String>,
}

impl MessageRenderer {
    /// Compile `segments` of the template `raw` into Tera source and register it.
    pub(crate) fn compile(raw: &str, segments: &[Segment]) -> Result<Self> {
        let (source, literals) = to_tera_source(segments);

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, &source).map_err(|e| {
            PhrasegenError::TemplateSyntax {
                template: raw.to_string(),
                reason: format!("failed to compile template: {e}"),
            }
        })?;

        tracing::trace!("Compiled template '{}' into '{}'", raw, source);
        Ok(Self {
            tera,
            literals,
        })
    }

    /// Render with every placeholder looked up in `values`.
    pub(crate) fn render(&self, raw: &str, values: &HashMap<String, String>) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("literals", &self.literals);
        context.insert("state", values);

        self.tera.render(TEMPLATE_NAME, &context).map_err(|e| {
            let mut reason = e.to_string();
            let mut source = e.source();
            while let Some(inner) = source {
                let _ = write!(reason, ": {inner}");
                source = inner.source();
            }
            PhrasegenError::TemplateExecution {
                template: raw.to_string(),
                reason,
            }
        })
    }
}

impl fmt::Debug for MessageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRenderer").field("literals", &self.literals).finish_non_exhaustive()
    }
}

/// Tera source for `segments` plus the literal chunks it indexes into.
fn to_tera_source(segments: &[Segment]) -> (String, Vec<String>) {
    let mut source = String::new();
    let mut literals = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                let _ = write!(source, "{{{{ literals.{} }}}}", literals.len());
                literals.push(text.clone());
            }
            Segment::Placeholder(name) => {
                let _ = write!(source, "{{{{ state[\"{name}\"] }}}}");
            }
        }
    }
    (source, literals)
}
