//! Error types for Nexus pipelines.

use thiserror::Error;

/// Errors that can occur while running a pipeline or calling a collaborator.
///
/// Collaborator errors (`Unavailable`, `Http`, `Reasoning`) are normally
/// absorbed by the stage that made the call. Only driver and stage failures
/// escape [`Pipeline::run`](crate::Pipeline::run).
#[derive(Error, Debug)]
pub enum Error {
    /// A collaborator has no credentials or is switched off
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// HTTP transport or status error from a collaborator
    #[error("HTTP error: {0}")]
    Http(String),

    /// The reasoning service answered, but not with a usable completion
    #[error("Reasoning service error: {0}")]
    Reasoning(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stage routed to an identifier that is not in the stage table
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// The step budget was exhausted before reaching the terminal marker
    #[error("Step limit ({0}) reached before pipeline completed")]
    StepLimit(usize),

    /// The stage table is malformed (missing entry, duplicate ids)
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Caller supplied unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stage failed in a way it could not recover from
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Error::Http(format!("status {}", code)),
            other => Error::Http(other.to_string()),
        }
    }
}

/// Result type for Nexus operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_conversion() {
        let err: Error = ureq::Error::StatusCode(429).into();
        assert_eq!(err.to_string(), "HTTP error: status 429");
    }

    #[test]
    fn test_stage_error_message() {
        let err = Error::Stage {
            stage: "risk_sentinel".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Stage 'risk_sentinel' failed: boom");
    }
}
