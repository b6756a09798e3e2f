//! Tavily search — primary paid search API.
//!
//! JSON POST to `/search`; results arrive pre-snippeted, which makes
//! this the highest-quality provider when a key is available.

use crate::error::{BriefError, Result};
use crate::http;
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily search API client.
pub struct TavilyProvider {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
}

impl TavilyProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    published_date: Option<String>,
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>> {
        tracing::trace!(query, "Tavily search");

        let client = http::build_client(self.timeout_seconds)?;
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });

        let response = client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("Tavily request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("Tavily HTTP error: {e}")))?;

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("Tavily response parse failed: {e}")))?;

        let sources: Vec<CandidateSource> = parsed
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(max_results)
            .map(|r| CandidateSource {
                title: r.title,
                url: r.url,
                description: r.content,
                published_at: r.published_date,
                provider: self.name().to_owned(),
                content: String::new(),
            })
            .collect();

        tracing::debug!(count = sources.len(), "Tavily results parsed");
        Ok(sources)
    }

    fn name(&self) -> &'static str {
        "Tavily"
    }
}
