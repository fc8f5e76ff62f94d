//! Per-stage access to collaborators.
//!
//! A [`StageContext`] is what a stage sees of the outside world. Its helpers
//! absorb collaborator failures: search degrades to fallback text, a failed
//! completion becomes `None`, and extraction failures are reported as events
//! while the sentinel record flows on.

use crate::extract::{Extraction, Record, extract_report};
use crate::pipeline::{PipelineCallbacks, PipelineEvent};
use crate::services::{Catalog, Services};

/// Collaborators and event sink for one stage execution.
pub struct StageContext<'a> {
    stage: &'static str,
    services: &'a Services,
    callbacks: &'a PipelineCallbacks,
}

impl<'a> StageContext<'a> {
    pub fn new(stage: &'static str, services: &'a Services, callbacks: &'a PipelineCallbacks) -> Self {
        Self {
            stage,
            services,
            callbacks,
        }
    }

    /// Identifier of the stage this context belongs to.
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn services(&self) -> &Services {
        self.services
    }

    pub fn catalog(&self) -> &Catalog {
        &self.services.catalog
    }

    pub fn emit(&self, event: PipelineEvent) {
        self.callbacks.emit(&event);
    }

    /// Search, degrading to `fallback` when the provider fails.
    pub async fn search_or(&self, query: &str, fallback: &str) -> String {
        match self.services.search.search(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(stage = self.stage, error = %e, "search unavailable, using fallback");
                self.emit(PipelineEvent::SearchFallback {
                    stage: self.stage.to_string(),
                    query: query.to_string(),
                    reason: e.to_string(),
                });
                fallback.to_string()
            }
        }
    }

    /// Ask the reasoning service, returning `None` on any failure.
    pub async fn complete(&self, prompt: &str) -> Option<String> {
        self.emit(PipelineEvent::ReasoningRequest {
            stage: self.stage.to_string(),
            prompt_chars: prompt.chars().count(),
        });
        match self.services.reasoning.complete(prompt).await {
            Ok(content) => {
                self.emit(PipelineEvent::ReasoningResponse {
                    stage: self.stage.to_string(),
                    content: content.clone(),
                });
                Some(content)
            }
            Err(e) => {
                tracing::warn!(stage = self.stage, error = %e, "reasoning call failed");
                self.emit(PipelineEvent::ReasoningFailed {
                    stage: self.stage.to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    /// Extract records, reporting a failure event when the sentinel is used.
    pub fn extract<T: Record>(&self, raw: &str) -> Extraction<T> {
        let extraction = extract_report::<T>(raw);
        if let Some(reason) = &extraction.failure {
            tracing::warn!(stage = self.stage, reason = %reason, "structured extraction failed");
            self.emit(PipelineEvent::ExtractionFailed {
                stage: self.stage.to_string(),
                reason: reason.clone(),
            });
        }
        extraction
    }
}
