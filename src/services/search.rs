//! Web search collaborator backed by the Tavily API.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::SearchProvider;
use crate::config::SearchConfig;
use crate::error::{Error, Result};

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily search client.
///
/// The HTTP call is blocking and runs on tokio's blocking pool.
#[derive(Clone)]
pub struct TavilySearch {
    config: SearchConfig,
    agent: ureq::Agent,
}

impl TavilySearch {
    pub fn new(config: SearchConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { config, agent }
    }

    /// Client configured from `TAVILY_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(SearchConfig::from_env())
    }
}

impl SearchProvider for TavilySearch {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<String>> {
        let config = self.config.clone();
        let agent = self.agent.clone();
        let query = query.to_string();
        async move {
            let Some(api_key) = config.api_key.clone() else {
                return Err(Error::Unavailable {
                    service: "search",
                    reason: "TAVILY_API_KEY not set".to_string(),
                });
            };
            tokio::task::spawn_blocking(move || search_blocking(&agent, &config, &api_key, &query))
                .await
                .map_err(|e| Error::Http(format!("search task failed: {}", e)))?
        }
        .boxed()
    }
}

fn search_blocking(
    agent: &ureq::Agent,
    config: &SearchConfig,
    api_key: &str,
    query: &str,
) -> Result<String> {
    let request = TavilyRequest {
        query,
        max_results: config.max_results,
    };

    tracing::debug!(query, "tavily search");
    let mut response = agent
        .post(&config.endpoint)
        .header("Authorization", &format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .send_json(&request)?;
    let data: TavilyResponse = response.body_mut().read_json()?;
    Ok(render_results(&data.results))
}

fn render_results(results: &[TavilyResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} ({})\n{}", i + 1, r.title, r.url, r.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let search = TavilySearch::new(SearchConfig::default());
        let result = tokio_test::block_on(search.search("port strikes"));
        assert!(matches!(
            result,
            Err(Error::Unavailable {
                service: "search",
                ..
            })
        ));
    }

    #[test]
    fn test_render_results() {
        let results = vec![
            TavilyResult {
                title: "Red Sea alerts".to_string(),
                url: "https://example.com/a".to_string(),
                content: " Carriers divert. ".to_string(),
            },
            TavilyResult {
                title: "Port strike".to_string(),
                url: "https://example.com/b".to_string(),
                content: "Long Beach delays.".to_string(),
            },
        ];
        let text = render_results(&results);
        assert!(text.starts_with("1. Red Sea alerts (https://example.com/a)\nCarriers divert."));
        assert!(text.contains("2. Port strike"));
    }

    #[test]
    fn test_render_no_results() {
        assert_eq!(render_results(&[]), "No search results found.");
    }
}
