//! External collaborators: search, reasoning, and static lookups.
//!
//! Stages never construct clients themselves. A [`Services`] bundle is built
//! once and handed to the pipeline, so tests can swap in deterministic
//! stubs.

mod catalog;
mod reasoning;
mod search;

pub use catalog::{Catalog, LogisticsOption, Table};
pub use reasoning::ChatCompletions;
pub use search::TavilySearch;

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::error::Result;

/// Source of unstructured search results.
pub trait SearchProvider: Send + Sync {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Large-language-model completion service.
pub trait ReasoningService: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// The collaborators a pipeline run may call.
#[derive(Clone)]
pub struct Services {
    pub search: Arc<dyn SearchProvider>,
    pub reasoning: Arc<dyn ReasoningService>,
    pub catalog: Arc<Catalog>,
}

impl Services {
    /// Bundle collaborators with the built-in catalog.
    pub fn new(
        search: impl SearchProvider + 'static,
        reasoning: impl ReasoningService + 'static,
    ) -> Self {
        Self {
            search: Arc::new(search),
            reasoning: Arc::new(reasoning),
            catalog: Arc::new(Catalog::builtin()),
        }
    }

    /// Tavily search and Groq chat completions, keyed from the environment.
    ///
    /// Missing keys do not fail here; the affected calls degrade at run time.
    pub fn from_env() -> Self {
        Self::new(TavilySearch::from_env(), ChatCompletions::from_env())
    }

    /// Replace the catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }
}
