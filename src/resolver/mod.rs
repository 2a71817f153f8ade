//! Recursive resolution of definition types into messages.
//!
//! The resolver turns a requested definition type into a lazy stream of every message it
//! can produce, exploring alternative definitions, templates and dependency values
//! concurrently.
//!
//! # Algorithm
//!
//! For a definition (scoped under an alias or not) and a state:
//!
//! 1. Run the template pipeline over the definition's templates.
//! 2. For every surviving template, on its own fork of the state:
//!    - run the validators against the partially resolved template, pruning on rejection
//!    - take the first unresolved dependency (in the template's resolution order), follow
//!      the parent definition's alias if one matches, and run the definition pipeline over
//!      the definitions registered for the target type
//!    - resolve every surviving candidate recursively; each state it produces is checked
//!      against the same template again, until no dependency is left
//!    - execute the template, bind the message to the definition type (or alias name),
//!      apply `+` constraint injections, record the pick and validate the final message
//! 3. Merge everything the branches emit into one stream.
//!
//! A dependency with no registered or no satisfiable candidates yields nothing; sibling
//! branches are unaffected. Picker, validator and execution failures are yielded as `Err`
//! items and end the generation.
//!
//! # Concurrency
//!
//! Branches are merged with `flatten_unordered`, which polls up to `max_concurrency`
//! branches of each fan-out at once (unbounded by default). All branches of a search run
//! on the task driving its [`MessageStream`], share one seeded random generator, and are
//! bounded by the stream's cancellation token. Branches never share a state; every fork
//! owns its copy.
//!
//! # Module Structure
//!
//! - `driver` - The background task behind [`MessageStream`]
//! - `graph` - Static reference graph between definition types
//! - `registry` - Definitions by type and suggestion lookup

pub mod driver;
pub mod graph;
pub mod registry;

#[cfg(test)]
mod tests;

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::core::{PhrasegenError, Result};
use crate::definition::ScopedDefinition;
use crate::picker::{DefinitionPipeline, TemplatePipeline};
use crate::state::State;
use crate::templating::Template;
use crate::validator::{TemplateValidator, validate_all};

pub use driver::MessageStream;
pub use graph::{TypeGraph, UndefinedReference};
pub use registry::Registry;

/// A generated message with the state that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The generated text
    pub message: String,
    /// The branch state after the message was bound
    pub state: State,
}

pub(crate) type ResolutionStream = BoxStream<'static, Result<Resolution>>;
type StateStream = BoxStream<'static, Result<State>>;

/// Everything one search shares across its branches.
pub(crate) struct Resolver {
    registry: Arc<Registry>,
    template_pipeline: TemplatePipeline,
    definition_pipeline: DefinitionPipeline,
    validators: Vec<Arc<dyn TemplateValidator>>,
    rng: Mutex<StdRng>,
    max_concurrency: Option<usize>,
    max_depth: usize,
    token: CancellationToken,
}

/// Search settings taken from the generator options.
pub(crate) struct ResolverSettings {
    pub template_pipeline: TemplatePipeline,
    pub definition_pipeline: DefinitionPipeline,
    pub validators: Vec<Arc<dyn TemplateValidator>>,
    pub max_concurrency: Option<usize>,
    pub max_depth: usize,
}

impl Resolver {
    pub(crate) fn new(
        registry: Arc<Registry>,
        settings: ResolverSettings,
        rng: StdRng,
        token: CancellationToken,
    ) -> Self {
        Self {
            registry,
            template_pipeline: settings.template_pipeline,
            definition_pipeline: settings.definition_pipeline,
            validators: settings.validators,
            rng: Mutex::new(rng),
            max_concurrency: settings.max_concurrency,
            max_depth: settings.max_depth,
            token,
        }
    }

    /// Stream every resolution of `def_type` starting from `state`.
    ///
    /// Root candidates go through the definition pipeline like any dependency lookup.
    pub(crate) fn resolve_root(
        self: &Arc<Self>,
        def_type: &str,
        state: State,
    ) -> Result<ResolutionStream> {
        let definitions = self.registry.get(def_type);
        if definitions.is_empty() {
            return Err(PhrasegenError::DefinitionNotFound {
                def_type: def_type.to_string(),
                suggestions: self.registry.suggestions(def_type),
            });
        }

        tracing::debug!("Resolving '{}' from {} candidate(s)", def_type, definitions.len());
        let candidates = definitions.iter().cloned().map(ScopedDefinition::new).collect();
        Ok(self.resolve_candidates(candidates, state, 0))
    }

    /// Run the definition pipeline and resolve every surviving candidate.
    fn resolve_candidates(
        self: &Arc<Self>,
        candidates: Vec<ScopedDefinition>,
        state: State,
        depth: usize,
    ) -> ResolutionStream {
        let this = Arc::clone(self);
        let branches = stream::once(async move {
            let picked = {
                let mut rng = this.rng();
                this.definition_pipeline.apply(candidates, &state, &mut rng)
            };
            let picked = match picked {
                Ok(picked) => picked,
                Err(e) => return error_stream(e),
            };
            if picked.is_empty() {
                tracing::trace!("No candidate definition satisfies the current state");
            }

            let limit = this.max_concurrency;
            stream::iter(picked)
                .map(move |definition| this.resolve(definition, state.clone(), depth))
                .flatten_unordered(limit)
                .boxed()
        })
        .flatten();
        self.bounded(branches)
    }

    /// Resolve one scoped definition into every message it can produce.
    fn resolve(
        self: &Arc<Self>,
        definition: ScopedDefinition,
        state: State,
        depth: usize,
    ) -> ResolutionStream {
        let this = Arc::clone(self);
        let branches = stream::once(async move {
            let templates = {
                let mut rng = this.rng();
                this.template_pipeline.apply(&definition, &state, &mut rng)
            };
            let templates = match templates {
                Ok(templates) => templates,
                Err(e) => return error_stream(e),
            };
            if templates.is_empty() {
                tracing::trace!("No pickable template left for {}", definition);
            }

            let limit = this.max_concurrency;
            stream::iter(templates)
                .map(move |template| {
                    this.expand_template(definition.clone(), template, state.clone(), depth)
                })
                .flatten_unordered(limit)
                .boxed()
        })
        .flatten();
        self.bounded(branches)
    }

    /// Resolve every dependency of `template`, then execute it.
    fn expand_template(
        self: &Arc<Self>,
        definition: ScopedDefinition,
        template: Arc<Template>,
        state: State,
        depth: usize,
    ) -> ResolutionStream {
        let this = Arc::clone(self);
        let satisfied =
            self.satisfy_dependencies(definition.clone(), Arc::clone(&template), state, depth);

        satisfied
            .filter_map(move |result| {
                future::ready(match result {
                    Ok(state) => this.finish(&definition, &template, state).transpose(),
                    Err(e) => Some(Err(e)),
                })
            })
            .boxed()
    }

    /// Every state, reachable from `state`, in which all dependencies of `template` are
    /// resolved.
    fn satisfy_dependencies(
        self: &Arc<Self>,
        definition: ScopedDefinition,
        template: Arc<Template>,
        state: State,
        depth: usize,
    ) -> StateStream {
        match validate_all(&self.validators, &template, &state) {
            Ok(true) => {}
            Ok(false) => {
                tracing::trace!("Validators pruned '{}' of {}", template.raw(), definition);
                return stream::empty().boxed();
            }
            Err(e) => return error_stream(e),
        }

        let Some(dependency) = template.first_unsatisfied(&state).map(str::to_string) else {
            return stream::once(future::ready(Ok(state))).boxed();
        };

        let resolved = self.resolve_dependency(&definition, &dependency, state, depth);
        let this = Arc::clone(self);
        let limit = self.max_concurrency;
        resolved
            .map(move |result| match result {
                Ok(resolution) => this.satisfy_dependencies(
                    definition.clone(),
                    Arc::clone(&template),
                    resolution.state,
                    depth,
                ),
                Err(e) => error_stream(e),
            })
            .flatten_unordered(limit)
            .boxed()
    }

    /// Resolve one dependency of `parent`, following its aliases.
    fn resolve_dependency(
        self: &Arc<Self>,
        parent: &ScopedDefinition,
        dependency: &str,
        state: State,
        depth: usize,
    ) -> ResolutionStream {
        if depth >= self.max_depth {
            tracing::warn!(
                "Depth limit {} reached resolving '{}' for {}, pruning branch",
                self.max_depth,
                dependency,
                parent
            );
            return stream::empty().boxed();
        }

        let alias = parent.definition().alias(dependency);
        let lookup_type = alias.map_or(dependency, |a| a.refer_type.as_str());
        let candidates: Vec<ScopedDefinition> = self
            .registry
            .get(lookup_type)
            .iter()
            .map(|d| match alias {
                Some(alias) => ScopedDefinition::aliased(Arc::clone(d), dependency, alias.clone()),
                None => ScopedDefinition::new(Arc::clone(d)),
            })
            .collect();

        if candidates.is_empty() {
            tracing::debug!("No definition registered for '{}' referenced by {}", lookup_type, parent);
            return stream::empty().boxed();
        }

        tracing::trace!(
            "Resolving '{}' for {} from {} candidate(s)",
            dependency,
            parent,
            candidates.len()
        );
        self.resolve_candidates(candidates, state, depth + 1)
    }

    /// Execute a fully satisfied template and bind its message.
    ///
    /// Returns `Ok(None)` if a validator rejects the final message.
    fn finish(
        &self,
        definition: &ScopedDefinition,
        template: &Template,
        mut state: State,
    ) -> Result<Option<Resolution>> {
        let message = template.execute(&state)?;
        state.update(definition, template, &message);

        if !validate_all(&self.validators, template, &state)? {
            tracing::trace!("Validators rejected '{}' for {}", message, definition);
            return Ok(None);
        }

        tracing::trace!("Resolved {} to '{}'", definition, message);
        Ok(Some(Resolution {
            message,
            state,
        }))
    }

    fn bounded<S>(&self, stream: S) -> ResolutionStream
    where
        S: Stream<Item = Result<Resolution>> + Send + 'static,
    {
        stream.take_until(self.token.clone().cancelled_owned()).boxed()
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn error_stream<T: Send + 'static>(error: PhrasegenError) -> BoxStream<'static, Result<T>> {
    stream::once(future::ready(Err(error))).boxed()
}
