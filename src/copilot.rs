//! Research co-pilot: free-form questions answered against the knowledge table.
//!
//! Unlike pipeline stages, the co-pilot does not degrade. Collaborator
//! failures are returned to the caller as [`Error`]s.

use std::sync::Arc;

use crate::config::ReasoningConfig;
use crate::error::{Error, Result};
use crate::services::{Catalog, ChatCompletions, ReasoningService, Services};
use crate::template::fill;

/// Sampling temperature for conversational answers.
pub const COPILOT_TEMPERATURE: f32 = 0.7;

const COPILOT_PROMPT: &str = r#"You are the Nexus Research Co-pilot. You help users understand global trends.

Current knowledge context:
{context}

User question: {question}

Provide a helpful, professional response in a concise manner."#;

/// Answers questions through the reasoning service.
#[derive(Clone)]
pub struct Copilot {
    reasoning: Arc<dyn ReasoningService>,
    catalog: Arc<Catalog>,
}

impl Copilot {
    /// Share the reasoning service and catalog of an existing bundle.
    pub fn new(services: &Services) -> Self {
        Self {
            reasoning: Arc::clone(&services.reasoning),
            catalog: Arc::clone(&services.catalog),
        }
    }

    /// Chat completions from the environment at conversational temperature,
    /// over the built-in catalog.
    pub fn from_env() -> Self {
        let config = ReasoningConfig::from_env().temperature(COPILOT_TEMPERATURE);
        Self {
            reasoning: Arc::new(ChatCompletions::new(config)),
            catalog: Arc::new(Catalog::builtin()),
        }
    }

    /// Replace the reasoning service.
    pub fn with_reasoning(mut self, reasoning: impl ReasoningService + 'static) -> Self {
        self.reasoning = Arc::new(reasoning);
        self
    }

    /// The knowledge table rendered as prompt context.
    pub fn context(&self) -> String {
        self.catalog
            .knowledge(&[])
            .iter()
            .map(|t| format!("- {} ({}): {}", t.topic, t.category, t.summary))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let context = self.context();
        let prompt = fill(COPILOT_PROMPT, &[("context", context.as_str()), ("question", question)]);

        tracing::debug!(question_chars = question.len(), "co-pilot request");
        let reply = self.reasoning.complete(&prompt).await?;
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingReasoning, FailingSearch, ScriptedReasoning};

    fn copilot(reasoning: ScriptedReasoning) -> Copilot {
        Copilot::new(&Services::new(FailingSearch, reasoning))
    }

    #[test]
    fn test_ask_includes_context_and_question() {
        let reasoning = ScriptedReasoning::always("  Rates are falling.  ");
        let copilot = copilot(reasoning.clone());

        let answer = tokio_test::block_on(copilot.ask("Where are interest rates heading?")).unwrap();

        assert_eq!(answer, "Rates are falling.");
        let prompts = reasoning.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User question: Where are interest rates heading?"));
        assert!(prompts[0].contains("- Interest rate cycle (Economics):"));
    }

    #[test]
    fn test_empty_question_is_rejected() {
        let reasoning = ScriptedReasoning::always("unused");
        let copilot = copilot(reasoning.clone());

        let err = tokio_test::block_on(copilot.ask("   ")).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(reasoning.prompts().is_empty());
    }

    #[test]
    fn test_reasoning_failure_propagates() {
        let copilot = copilot(ScriptedReasoning::always("unused")).with_reasoning(FailingReasoning);

        let err = tokio_test::block_on(copilot.ask("What changed in AI policy?")).unwrap_err();

        assert!(matches!(err, Error::Unavailable { service: "reasoning", .. }));
    }

    #[test]
    fn test_context_lists_every_topic() {
        let copilot = copilot(ScriptedReasoning::always(""));
        assert_eq!(copilot.context().lines().count(), 6);
    }
}
