//! Staged pipeline driver.
//!
//! A pipeline is a table of stages keyed by identifier. The driver starts at
//! the entry stage, merges each stage's partial update into the accumulated
//! state, and follows whatever `next` the stage reports until one reports
//! [`Next::Complete`].

mod events;

pub use events::{EventCallback, PipelineCallbacks, PipelineEvent, verbose_callbacks};

use futures::future::BoxFuture;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::config::PipelineConfig;
use crate::context::StageContext;
use crate::error::{Error, Result};
use crate::services::Services;
use crate::state::{PipelineState, Thought};

/// Terminal routing marker.
pub const COMPLETE: &str = "complete";

/// Agent recorded in the control fields before the first stage runs.
pub const SYSTEM_AGENT: &str = "system";

/// Where the driver goes after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stage(&'static str),
    Complete,
}

impl Next {
    pub fn as_str(&self) -> &'static str {
        match self {
            Next::Stage(id) => id,
            Next::Complete => COMPLETE,
        }
    }
}

/// What a stage hands back to the driver.
///
/// The thought and the routing hint are mandatory; the update may be empty.
#[derive(Debug, Clone)]
pub struct StageOutput<U> {
    pub thought: Thought,
    pub update: U,
    pub next: Next,
}

impl<U> StageOutput<U> {
    pub fn new(thought: Thought, update: U, next: Next) -> Self {
        Self {
            thought,
            update,
            next,
        }
    }
}

/// One step of a pipeline.
pub trait Stage<S: PipelineState>: Send + Sync {
    /// Identifier other stages route to.
    fn id(&self) -> &'static str;

    /// Run against the accumulated state and return a partial update.
    ///
    /// Collaborator failures should be absorbed here. An `Err` aborts the
    /// whole invocation.
    fn run<'a>(
        &'a self,
        state: &'a S,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<S::Update>>>;
}

/// A fixed table of stages plus the collaborators they use.
pub struct Pipeline<S: PipelineState> {
    name: String,
    entry: Option<&'static str>,
    stages: Vec<Box<dyn Stage<S>>>,
    services: Services,
    config: PipelineConfig,
    callbacks: PipelineCallbacks,
}

impl<S: PipelineState> Pipeline<S> {
    /// Create an empty pipeline.
    pub fn new(name: impl Into<String>, services: Services) -> Self {
        Self {
            name: name.into(),
            entry: None,
            stages: Vec::new(),
            services,
            config: PipelineConfig::default(),
            callbacks: PipelineCallbacks::default(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Register a stage. The first registered stage is the default entry.
    pub fn stage(mut self, stage: impl Stage<S> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Start at a stage other than the first registered one.
    pub fn entry(mut self, id: &'static str) -> Self {
        self.entry = Some(id);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable verbose logging to stderr.
    ///
    /// The stderr trace runs alongside any registered callbacks, whichever
    /// order the builder calls come in.
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.config.verbose = enabled;
        self
    }

    /// Set a callback for stage start events.
    pub fn on_stage_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_stage_start = Some(Arc::new(f));
        self
    }

    /// Set a callback for stage completion events.
    pub fn on_stage_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_stage_complete = Some(Arc::new(f));
        self
    }

    /// Set a callback for extraction fallback events.
    pub fn on_extraction_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_extraction_failed = Some(Arc::new(f));
        self
    }

    /// Set a callback for fatal error events.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(f));
        self
    }

    /// Set a catch-all callback for any event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_event = Some(Arc::new(f));
        self
    }

    /// Record every event for later inspection with [`Self::take_events`].
    pub fn capture_events(mut self, enabled: bool) -> Self {
        self.callbacks.captured_events = enabled.then(|| Arc::new(Mutex::new(Vec::new())));
        self
    }

    /// Drain captured events.
    pub fn take_events(&self) -> Vec<PipelineEvent> {
        self.callbacks.take_captured()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Stage identifiers in registration order.
    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    /// The stage the driver starts at.
    pub fn entry_stage(&self) -> Option<&'static str> {
        self.entry.or_else(|| self.stages.first().map(|s| s.id()))
    }

    /// Maximum stage executions per invocation.
    pub fn step_budget(&self) -> usize {
        self.config.max_steps.unwrap_or(self.stages.len())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn find(&self, id: &str) -> Option<&dyn Stage<S>> {
        self.stages.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    fn validate(&self) -> Result<&'static str> {
        let mut seen = HashSet::new();
        for id in self.stage_ids() {
            if id == COMPLETE {
                return Err(Error::InvalidPipeline(format!(
                    "'{}' is reserved for the terminal marker",
                    COMPLETE
                )));
            }
            if !seen.insert(id) {
                return Err(Error::InvalidPipeline(format!("duplicate stage id '{}'", id)));
            }
        }
        let entry = self
            .entry_stage()
            .ok_or_else(|| Error::InvalidPipeline("no stages registered".to_string()))?;
        if !seen.contains(entry) {
            return Err(Error::InvalidPipeline(format!(
                "entry stage '{}' is not registered",
                entry
            )));
        }
        Ok(entry)
    }

    /// Emit the error event and hand the error back for propagation.
    /// Registered callbacks, plus the stderr trace when verbose.
    fn active_callbacks(&self) -> PipelineCallbacks {
        if self.config.verbose {
            self.callbacks.clone().merged_with(verbose_callbacks())
        } else {
            self.callbacks.clone()
        }
    }

    fn abort(&self, callbacks: &PipelineCallbacks, err: Error) -> Error {
        tracing::error!(pipeline = %self.name, error = %err, "pipeline aborted");
        callbacks.emit(&PipelineEvent::Error {
            message: err.to_string(),
        });
        err
    }

    // =========================================================================
    // Main run loop
    // =========================================================================

    /// Run one invocation from `seed` to the terminal marker.
    ///
    /// Returns the fully accumulated state. Only driver errors and stage
    /// errors propagate; there is no partial result on failure.
    pub async fn run(&self, seed: S::Seed) -> Result<S> {
        let callbacks = self.active_callbacks();
        let entry = self.validate().map_err(|e| self.abort(&callbacks, e))?;
        let budget = self.step_budget();

        let mut state = S::from_seed(seed);
        state.set_control(SYSTEM_AGENT, entry);

        tracing::info!(pipeline = %self.name, entry, "pipeline started");

        let mut current = entry;
        let mut steps = 0;

        loop {
            if steps >= budget {
                return Err(self.abort(&callbacks, Error::StepLimit(budget)));
            }
            let Some(stage) = self.find(current) else {
                return Err(self.abort(&callbacks, Error::UnknownStage(current.to_string())));
            };
            steps += 1;

            tracing::debug!(pipeline = %self.name, stage = current, step = steps, "stage start");
            callbacks.emit(&PipelineEvent::StageStart {
                stage: current.to_string(),
                step: steps,
            });

            let ctx = StageContext::new(stage.id(), &self.services, &callbacks);
            let output = match stage.run(&state, &ctx).await {
                Ok(output) => output,
                Err(err @ Error::Stage { .. }) => return Err(self.abort(&callbacks, err)),
                Err(err) => {
                    return Err(self.abort(&callbacks, Error::Stage {
                        stage: current.to_string(),
                        message: err.to_string(),
                    }));
                }
            };

            let next = output.next;
            state.merge(output.update);
            state.record(output.thought, next.as_str());

            tracing::debug!(pipeline = %self.name, stage = current, next = next.as_str(), "stage complete");
            callbacks.emit(&PipelineEvent::StageComplete {
                stage: current.to_string(),
                next_step: next.as_str().to_string(),
            });

            match next {
                Next::Complete => {
                    tracing::info!(pipeline = %self.name, steps, "pipeline complete");
                    callbacks.emit(&PipelineEvent::Complete { steps });
                    return Ok(state);
                }
                Next::Stage(id) => current = id,
            }
        }
    }

    /// Run independent invocations concurrently.
    ///
    /// Each invocation has its own state; results come back in seed order.
    pub async fn run_all(&self, seeds: Vec<S::Seed>) -> Vec<Result<S>> {
        futures::future::join_all(seeds.into_iter().map(|seed| self.run(seed))).await
    }
}
