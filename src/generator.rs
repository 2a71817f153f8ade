//! The public generation engine.
//!
//! A [`Generator`] owns a registry of definitions and the options every generation call
//! runs with. Definitions are added up front (or at any time, see below) and messages are
//! produced with [`Generator::generate`], which collects distinct messages, or
//! [`Generator::start`], which streams every resolution as it is found.
//!
//! # Examples
//!
//! ```rust
//! use phrasegen::definition::RawDefinition;
//! use phrasegen::generator::{Generator, GeneratorOptions};
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> phrasegen::core::Result<()> {
//! let generator = Generator::new(GeneratorOptions::default().with_seed(7));
//! generator.add_definitions([
//!     RawDefinition::new("Test", ["aaa{{.NestTest}}ccc"]),
//!     RawDefinition::new("NestTest", ["bbb"]),
//! ])?;
//!
//! let messages = generator.generate("Test", HashMap::new(), 1).await?;
//! assert_eq!(messages, ["aaabbbccc"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Registry Snapshots
//!
//! Every generation call resolves against the registry as it was when the call started.
//! [`Generator::add_definitions`] copies the registry if a generation still holds the
//! current snapshot, so running generations never observe a batch being added.
//!
//! # Randomness
//!
//! Each call draws from its own `StdRng`: seeded from [`GeneratorOptions::seed`] when set,
//! from OS entropy otherwise, or supplied directly through [`Generator::start_with_rng`].
//! With a fixed seed the same definitions produce the same output sequence.

use futures::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

use crate::constants::DEFAULT_MAX_DEPTH;
use crate::core::{PhrasegenError, Result};
use crate::definition::{Definition, RawDefinition};
use crate::picker::{
    DefinitionPipeline, SortByConstraintPriorityDefinitionPicker, TemplatePipeline,
};
use crate::resolver::{MessageStream, Registry, Resolver, ResolverSettings};
use crate::state::State;
use crate::validator::{MaxLengthValidator, TemplateValidator};

/// Options every generation call runs with.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Template selection stages
    pub template_pipeline: TemplatePipeline,
    /// Definition selection stages
    pub definition_pipeline: DefinitionPipeline,
    /// Branch guards, combined with AND
    pub template_validators: Vec<Arc<dyn TemplateValidator>>,
    /// Seed for reproducible output
    pub seed: Option<u64>,
    /// Branches polled at once per fan-out, unbounded when `None`
    pub max_concurrency: Option<usize>,
    /// Deepest dependency nesting explored
    pub max_depth: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            template_pipeline: TemplatePipeline::default(),
            definition_pipeline: DefinitionPipeline::default(),
            template_validators: Vec::new(),
            seed: None,
            max_concurrency: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GeneratorOptions {
    /// Seed every call's random generator.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the template pipeline.
    #[must_use]
    pub fn with_template_pipeline(mut self, pipeline: TemplatePipeline) -> Self {
        self.template_pipeline = pipeline;
        self
    }

    /// Replace the definition pipeline.
    #[must_use]
    pub fn with_definition_pipeline(mut self, pipeline: DefinitionPipeline) -> Self {
        self.definition_pipeline = pipeline;
        self
    }

    /// Append the priority sort after the existing definition stages.
    ///
    /// The sort is stable, so candidates of equal priority keep the order the earlier
    /// stages (weighted random by default) gave them.
    #[must_use]
    pub fn with_priority_ordering(mut self) -> Self {
        self.definition_pipeline =
            self.definition_pipeline.with_stage(SortByConstraintPriorityDefinitionPicker);
        self
    }

    /// Add a validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl TemplateValidator + 'static) -> Self {
        self.template_validators.push(Arc::new(validator));
        self
    }

    /// Reject messages longer than `max_chars` characters.
    #[must_use]
    pub fn with_max_length(self, max_chars: usize) -> Self {
        self.with_validator(MaxLengthValidator::new(max_chars))
    }

    /// Bound the branches polled at once per fan-out.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    /// Bound the dependency nesting depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Constraint-driven message generator.
#[derive(Debug, Default)]
pub struct Generator {
    registry: RwLock<Arc<Registry>>,
    options: GeneratorOptions,
}

impl Generator {
    /// A generator with no definitions.
    #[must_use]
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            registry: RwLock::new(Arc::new(Registry::new())),
            options,
        }
    }

    /// The options calls run with.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Register a batch of definitions.
    ///
    /// Records are registered in order and the batch stops at the first invalid one;
    /// records before it stay registered.
    ///
    /// # Errors
    ///
    /// Returns the registration error of the first invalid record.
    pub fn add_definitions(&self, raws: impl IntoIterator<Item = RawDefinition>) -> Result<()> {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let registry = Arc::make_mut(&mut *guard);
        for raw in raws {
            let def_type = raw.def_type.clone();
            registry.add(raw).inspect_err(|e| {
                tracing::debug!("Rejected definition of type '{}': {}", def_type, e);
            })?;
        }
        Ok(())
    }

    /// The current registry snapshot.
    #[must_use]
    pub fn registry(&self) -> Arc<Registry> {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Registered definition types, sorted.
    #[must_use]
    pub fn definition_types(&self) -> Vec<String> {
        self.registry().definition_types().into_iter().map(str::to_string).collect()
    }

    /// Definitions registered under `def_type`, in registration order.
    #[must_use]
    pub fn definitions(&self, def_type: &str) -> Vec<Arc<Definition>> {
        self.registry().get(def_type).to_vec()
    }

    /// Start streaming resolutions of `def_type`.
    ///
    /// The search begins immediately on a spawned task, so this must be called within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PhrasegenError::DefinitionNotFound`] if nothing is registered under
    /// `def_type`.
    pub fn start(&self, def_type: &str, initial_state: State) -> Result<MessageStream> {
        let rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.start_with_rng(def_type, initial_state, rng)
    }

    /// Like [`Generator::start`], drawing every random choice from `rng`.
    pub fn start_with_rng(
        &self,
        def_type: &str,
        initial_state: State,
        rng: StdRng,
    ) -> Result<MessageStream> {
        let token = CancellationToken::new();
        let settings = ResolverSettings {
            template_pipeline: self.options.template_pipeline.clone(),
            definition_pipeline: self.options.definition_pipeline.clone(),
            validators: self.options.template_validators.clone(),
            max_concurrency: self.options.max_concurrency,
            max_depth: self.options.max_depth,
        };
        let resolver = Arc::new(Resolver::new(self.registry(), settings, rng, token.clone()));
        let stream = resolver.resolve_root(def_type, initial_state)?;
        Ok(MessageStream::spawn(stream, token))
    }

    /// Generate up to `count` distinct messages for `def_type`.
    ///
    /// Returns as soon as `count` distinct messages are found, abandoning the rest of the
    /// search. If the search space runs out first, the messages found so far are returned;
    /// callers needing exactly `count` must check the length.
    ///
    /// # Errors
    ///
    /// - [`PhrasegenError::InvalidArgument`] if `count` is zero
    /// - [`PhrasegenError::DefinitionNotFound`] if nothing is registered under `def_type`
    /// - [`PhrasegenError::NoValidMessage`] if the search produced nothing
    /// - the first picker, validator or execution error any branch hit
    pub async fn generate(
        &self,
        def_type: &str,
        initial_state: HashMap<String, String>,
        count: usize,
    ) -> Result<Vec<String>> {
        if count == 0 {
            return Err(PhrasegenError::InvalidArgument {
                reason: "message count must be greater than zero".to_string(),
            });
        }

        let mut stream = self.start(def_type, State::from_values(initial_state))?;
        let mut seen = HashSet::new();
        let mut messages = Vec::with_capacity(count);

        while let Some(resolution) = stream.next().await {
            let message = resolution?.message;
            if seen.insert(message.clone()) {
                messages.push(message);
                if messages.len() == count {
                    break;
                }
            }
        }
        stream.cancel();

        if messages.is_empty() {
            return Err(PhrasegenError::NoValidMessage {
                def_type: def_type.to_string(),
            });
        }
        if messages.len() < count {
            tracing::info!(
                "Generated {} of {} requested message(s) for '{}'",
                messages.len(),
                count,
                def_type
            );
        }
        Ok(messages)
    }
}
