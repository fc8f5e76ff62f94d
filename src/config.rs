//! Pipeline and collaborator configuration.

use std::env;
use std::time::Duration;

/// Configuration for the pipeline driver.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// Maximum number of stage executions per invocation.
    /// `None` means one step per registered stage.
    pub max_steps: Option<usize>,
    /// Print a stage-by-stage trace to stderr
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step budget.
    pub fn max_steps(mut self, n: usize) -> Self {
        self.max_steps = Some(n);
        self
    }

    /// Enable or disable the stderr trace.
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

/// Configuration for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ReasoningConfig {
    /// The model to use (e.g., "llama-3.3-70b-versatile")
    pub model: String,
    /// Base URL of the API, without the `/chat/completions` suffix
    pub base_url: String,
    /// Bearer token; `None` makes every call fail as unavailable
    pub api_key: Option<String>,
    /// Temperature for LLM sampling
    pub temperature: Option<f32>,
    /// Maximum tokens for LLM response
    pub max_tokens: Option<u32>,
    /// Optional system message sent ahead of every prompt
    pub system: Option<String>,
    /// Global timeout for one request
    pub timeout: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            temperature: Some(0.0),
            max_tokens: Some(2048),
            system: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ReasoningConfig {
    /// Create a new config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Read `GROQ_API_KEY`, `NEXUS_MODEL` and `NEXUS_LLM_BASE_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_key = non_empty_var("GROQ_API_KEY");
        if let Some(model) = non_empty_var("NEXUS_MODEL") {
            config.model = model;
        }
        if let Some(url) = non_empty_var("NEXUS_LLM_BASE_URL") {
            config.base_url = url;
        }
        config
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Remove the max tokens limit (let the model use its default).
    pub fn no_max_tokens(mut self) -> Self {
        self.max_tokens = None;
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Configuration for the web search collaborator.
#[derive(Clone)]
pub struct SearchConfig {
    pub endpoint: String,
    /// `None` makes every search fail as unavailable
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key: None,
            max_results: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SearchConfig {
    /// Read `TAVILY_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_var("TAVILY_API_KEY"),
            ..Default::default()
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Clamped to 1..=10.
    pub fn max_results(mut self, n: u32) -> Self {
        self.max_results = n.clamp(1, 10);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
