//! Deterministic collaborators for unit tests.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::services::{ReasoningService, SearchProvider};

/// Reasoning stub that replays scripted replies, then repeats a default.
#[derive(Clone)]
pub struct ScriptedReasoning {
    replies: Arc<Mutex<VecDeque<String>>>,
    default: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedReasoning {
    /// Answer every prompt with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::replies(Vec::<String>::new(), reply)
    }

    /// Answer prompts with `replies` in order, then with `default`.
    pub fn replies<S: Into<String>>(replies: Vec<S>, default: impl Into<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Into::into).collect())),
            default: default.into(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ReasoningService for ScriptedReasoning {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        futures::future::ready(Ok(reply)).boxed()
    }
}

/// Reasoning stub that is always unavailable.
pub struct FailingReasoning;

impl ReasoningService for FailingReasoning {
    fn complete<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        futures::future::ready(Err(Error::Unavailable {
            service: "reasoning",
            reason: "stubbed outage".to_string(),
        }))
        .boxed()
    }
}

/// Search stub returning fixed text.
pub struct StaticSearch(pub String);

impl SearchProvider for StaticSearch {
    fn search<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<String>> {
        futures::future::ready(Ok(self.0.clone())).boxed()
    }
}

/// Search stub that is always unavailable.
pub struct FailingSearch;

impl SearchProvider for FailingSearch {
    fn search<'a>(&'a self, _query: &'a str) -> BoxFuture<'a, Result<String>> {
        futures::future::ready(Err(Error::Unavailable {
            service: "search",
            reason: "stubbed outage".to_string(),
        }))
        .boxed()
    }
}
