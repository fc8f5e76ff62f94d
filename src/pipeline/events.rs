//! Pipeline events and callbacks for observability.

use std::sync::{Arc, Mutex};

/// Events emitted during a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A stage is about to run
    StageStart { stage: String, step: usize },
    /// Search failed and the stage fell back to synthesized results
    SearchFallback {
        stage: String,
        query: String,
        reason: String,
    },
    /// About to call the reasoning service
    ReasoningRequest { stage: String, prompt_chars: usize },
    /// Reasoning service responded
    ReasoningResponse { stage: String, content: String },
    /// Reasoning service call failed; the stage continues with a default
    ReasoningFailed { stage: String, message: String },
    /// Structured extraction fell back to the sentinel record
    ExtractionFailed { stage: String, reason: String },
    /// A stage finished and reported where to go next
    StageComplete { stage: String, next_step: String },
    /// The terminal marker was reached
    Complete { steps: usize },
    /// The run aborted
    Error { message: String },
}

/// Type alias for event callbacks
pub type EventCallback = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Storage for pipeline callbacks
#[derive(Default, Clone)]
pub struct PipelineCallbacks {
    pub on_stage_start: Option<EventCallback>,
    pub on_search_fallback: Option<EventCallback>,
    pub on_reasoning_request: Option<EventCallback>,
    pub on_reasoning_response: Option<EventCallback>,
    pub on_reasoning_failed: Option<EventCallback>,
    pub on_extraction_failed: Option<EventCallback>,
    pub on_stage_complete: Option<EventCallback>,
    pub on_complete: Option<EventCallback>,
    pub on_error: Option<EventCallback>,
    /// Catch-all callback for any event
    pub on_event: Option<EventCallback>,
    pub(crate) captured_events: Option<Arc<Mutex<Vec<PipelineEvent>>>>,
}

impl PipelineCallbacks {
    /// Emit an event to the appropriate callback(s)
    pub fn emit(&self, event: &PipelineEvent) {
        if let Some(ref events) = self.captured_events
            && let Ok(mut events) = events.lock()
        {
            events.push(event.clone());
        }

        let specific = match event {
            PipelineEvent::StageStart { .. } => &self.on_stage_start,
            PipelineEvent::SearchFallback { .. } => &self.on_search_fallback,
            PipelineEvent::ReasoningRequest { .. } => &self.on_reasoning_request,
            PipelineEvent::ReasoningResponse { .. } => &self.on_reasoning_response,
            PipelineEvent::ReasoningFailed { .. } => &self.on_reasoning_failed,
            PipelineEvent::ExtractionFailed { .. } => &self.on_extraction_failed,
            PipelineEvent::StageComplete { .. } => &self.on_stage_complete,
            PipelineEvent::Complete { .. } => &self.on_complete,
            PipelineEvent::Error { .. } => &self.on_error,
        };

        if let Some(cb) = specific {
            cb(event);
        }

        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }

    /// Combine with `other` so both sets of handlers run, `self` first.
    /// The capture buffer of `self` wins.
    pub fn merged_with(self, other: PipelineCallbacks) -> Self {
        Self {
            on_stage_start: chain(self.on_stage_start, other.on_stage_start),
            on_search_fallback: chain(self.on_search_fallback, other.on_search_fallback),
            on_reasoning_request: chain(self.on_reasoning_request, other.on_reasoning_request),
            on_reasoning_response: chain(self.on_reasoning_response, other.on_reasoning_response),
            on_reasoning_failed: chain(self.on_reasoning_failed, other.on_reasoning_failed),
            on_extraction_failed: chain(self.on_extraction_failed, other.on_extraction_failed),
            on_stage_complete: chain(self.on_stage_complete, other.on_stage_complete),
            on_complete: chain(self.on_complete, other.on_complete),
            on_error: chain(self.on_error, other.on_error),
            on_event: chain(self.on_event, other.on_event),
            captured_events: self.captured_events.or(other.captured_events),
        }
    }

    /// Drain captured events, if capture is enabled.
    pub(crate) fn take_captured(&self) -> Vec<PipelineEvent> {
        if let Some(ref events) = self.captured_events
            && let Ok(mut events) = events.lock()
        {
            return std::mem::take(&mut *events);
        }
        Vec::new()
    }
}

fn chain(first: Option<EventCallback>, second: Option<EventCallback>) -> Option<EventCallback> {
    match (first, second) {
        (Some(a), Some(b)) => {
            let both: EventCallback = Arc::new(move |event: &PipelineEvent| {
                a(event);
                b(event);
            });
            Some(both)
        }
        (a, b) => a.or(b),
    }
}

fn preview(text: &str, limit: usize) -> String {
    let head: String = text.chars().take(limit).collect();
    let suffix = if text.chars().count() > limit { "..." } else { "" };
    format!("{}{}", head.replace('\n', "\\n"), suffix)
}

/// Create verbose logging callbacks
pub fn verbose_callbacks() -> PipelineCallbacks {
    PipelineCallbacks {
        on_stage_start: Some(Arc::new(|e| {
            if let PipelineEvent::StageStart { stage, step } = e {
                eprintln!("[nexus] --- {} (step {}) ---", stage.to_uppercase(), step);
            }
        })),
        on_search_fallback: Some(Arc::new(|e| {
            if let PipelineEvent::SearchFallback { query, reason, .. } = e {
                eprintln!("[nexus] Search fallback for '{}': {}", query, reason);
            }
        })),
        on_reasoning_response: Some(Arc::new(|e| {
            if let PipelineEvent::ReasoningResponse { content, .. } = e {
                eprintln!("[nexus] LLM: {}", preview(content, 100));
            }
        })),
        on_reasoning_failed: Some(Arc::new(|e| {
            if let PipelineEvent::ReasoningFailed { message, .. } = e {
                eprintln!("[nexus] ✗ LLM: {}", message);
            }
        })),
        on_extraction_failed: Some(Arc::new(|e| {
            if let PipelineEvent::ExtractionFailed { reason, .. } = e {
                eprintln!("[nexus] ✗ Extraction: {}", reason);
            }
        })),
        on_stage_complete: Some(Arc::new(|e| {
            if let PipelineEvent::StageComplete { stage, next_step } = e {
                eprintln!("[nexus] ✓ {} -> {}", stage, next_step);
            }
        })),
        on_complete: Some(Arc::new(|e| {
            if let PipelineEvent::Complete { steps } = e {
                eprintln!("[nexus] Complete after {} step(s)", steps);
            }
        })),
        on_error: Some(Arc::new(|e| {
            if let PipelineEvent::Error { message } = e {
                eprintln!("[nexus] Error: {}", message);
            }
        })),
        ..Default::default()
    }
}
