//! Reasoning-service collaborator for OpenAI-compatible chat completions.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::ReasoningService;
use crate::config::ReasoningConfig;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client (Groq by default).
#[derive(Clone)]
pub struct ChatCompletions {
    config: ReasoningConfig,
    agent: ureq::Agent,
}

impl ChatCompletions {
    pub fn new(config: ReasoningConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { config, agent }
    }

    /// Client configured from `GROQ_API_KEY` and friends.
    pub fn from_env() -> Self {
        Self::new(ReasoningConfig::from_env())
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }
}

impl ReasoningService for ChatCompletions {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        let config = self.config.clone();
        let agent = self.agent.clone();
        let prompt = prompt.to_string();
        async move {
            let Some(api_key) = config.api_key.clone() else {
                return Err(Error::Unavailable {
                    service: "reasoning",
                    reason: "GROQ_API_KEY not set".to_string(),
                });
            };
            tokio::task::spawn_blocking(move || complete_blocking(&agent, &config, &api_key, &prompt))
                .await
                .map_err(|e| Error::Reasoning(format!("completion task failed: {}", e)))?
        }
        .boxed()
    }
}

fn build_request<'a>(config: &'a ReasoningConfig, prompt: &'a str) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = config.system.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt,
    });
    ChatRequest {
        model: &config.model,
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

fn complete_blocking(
    agent: &ureq::Agent,
    config: &ReasoningConfig,
    api_key: &str,
    prompt: &str,
) -> Result<String> {
    let request = build_request(config, prompt);

    tracing::debug!(model = %config.model, prompt_chars = prompt.len(), "chat completion");
    let mut response = agent
        .post(&config.completions_url())
        .header("Authorization", &format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .send_json(&request)?;
    let data: ChatResponse = response.body_mut().read_json()?;
    first_content(data)
}

fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::Reasoning("response contained no message content".to_string()))
}
