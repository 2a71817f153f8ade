//! Selection policies for templates and definitions.
//!
//! Before the resolver expands anything it runs the candidates through a pipeline of
//! pickers. Each picker filters, reorders or weights the candidates it is given, and the
//! resolver then tries every surviving candidate in the resulting order.
//!
//! # Pipelines
//!
//! | Pipeline | Runs | Default stages |
//! |----------|------|----------------|
//! | [`TemplatePipeline`] | once per definition being expanded | [`NoDuplicateTemplatePicker`], [`RandomTemplatePicker`] |
//! | [`DefinitionPipeline`] | once per definition type lookup | [`ConstraintsSatisfiedDefinitionPicker`], [`RandomWithWeightDefinitionPicker`] |
//!
//! A stage that returns no candidates short-circuits the rest of its pipeline.
//!
//! # Custom Stages
//!
//! ```rust
//! use phrasegen::definition::ScopedDefinition;
//! use phrasegen::picker::DefinitionPicker;
//! use phrasegen::state::State;
//! use rand::rngs::StdRng;
//!
//! /// Keep only the first candidate.
//! #[derive(Debug)]
//! struct FirstOnly;
//!
//! impl DefinitionPicker for FirstOnly {
//!     fn name(&self) -> &str {
//!         "FirstOnly"
//!     }
//!
//!     fn pick(
//!         &self,
//!         mut definitions: Vec<ScopedDefinition>,
//!         _state: &State,
//!         _rng: &mut StdRng,
//!     ) -> phrasegen::core::Result<Vec<ScopedDefinition>> {
//!         definitions.truncate(1);
//!         Ok(definitions)
//!     }
//! }
//! ```

pub mod definition;
pub mod template;

use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;

use crate::core::Result;
use crate::definition::ScopedDefinition;
use crate::state::State;
use crate::templating::Template;

pub use definition::{
    ConstraintsSatisfiedDefinitionPicker, RandomWithWeightDefinitionPicker,
    SortByConstraintPriorityDefinitionPicker,
};
pub use template::{AscendingOrderTemplatePicker, NoDuplicateTemplatePicker, RandomTemplatePicker};

/// One stage of the template pipeline.
pub trait TemplatePicker: Send + Sync + fmt::Debug {
    /// Stage name for logs and errors.
    fn name(&self) -> &str;

    /// Filter or reorder the candidate templates of `definition`.
    fn pick(
        &self,
        templates: Vec<Arc<Template>>,
        definition: &ScopedDefinition,
        state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<Arc<Template>>>;
}

/// One stage of the definition pipeline.
pub trait DefinitionPicker: Send + Sync + fmt::Debug {
    /// Stage name for logs and errors.
    fn name(&self) -> &str;

    /// Filter or reorder candidate definitions for one type lookup.
    fn pick(
        &self,
        definitions: Vec<ScopedDefinition>,
        state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<ScopedDefinition>>;
}

/// Ordered template picker stages.
#[derive(Debug, Clone)]
pub struct TemplatePipeline {
    stages: Vec<Arc<dyn TemplatePicker>>,
}

impl TemplatePipeline {
    /// A pipeline running `stages` in order.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn TemplatePicker>>) -> Self {
        Self {
            stages,
        }
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl TemplatePicker + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over the templates of `definition`.
    pub fn apply(
        &self,
        definition: &ScopedDefinition,
        state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<Arc<Template>>> {
        let mut templates = definition.templates().to_vec();
        for stage in &self.stages {
            if templates.is_empty() {
                break;
            }
            templates = stage.pick(templates, definition, state, rng)?;
            tracing::trace!(
                "{} left {} template(s) for {}",
                stage.name(),
                templates.len(),
                definition
            );
        }
        Ok(templates)
    }
}

impl Default for TemplatePipeline {
    fn default() -> Self {
        Self::new(vec![Arc::new(NoDuplicateTemplatePicker), Arc::new(RandomTemplatePicker)])
    }
}

/// Ordered definition picker stages.
#[derive(Debug, Clone)]
pub struct DefinitionPipeline {
    stages: Vec<Arc<dyn DefinitionPicker>>,
}

impl DefinitionPipeline {
    /// A pipeline running `stages` in order.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn DefinitionPicker>>) -> Self {
        Self {
            stages,
        }
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl DefinitionPicker + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over `definitions`.
    pub fn apply(
        &self,
        mut definitions: Vec<ScopedDefinition>,
        state: &State,
        rng: &mut StdRng,
    ) -> Result<Vec<ScopedDefinition>> {
        for stage in &self.stages {
            if definitions.is_empty() {
                break;
            }
            definitions = stage.pick(definitions, state, rng)?;
            tracing::trace!("{} left {} definition(s)", stage.name(), definitions.len());
        }
        Ok(definitions)
    }
}

impl Default for DefinitionPipeline {
    fn default() -> Self {
        Self::new(vec![
            Arc::new(ConstraintsSatisfiedDefinitionPicker),
            Arc::new(RandomWithWeightDefinitionPicker),
        ])
    }
}
