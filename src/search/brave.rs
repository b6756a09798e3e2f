//! Brave Search API — secondary keyed search provider.
//!
//! JSON GET against `/res/v1/web/search` with the subscription token in
//! a header. Independent index, good quality, generous free tier.

use crate::error::{BriefError, Result};
use crate::http;
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com";

/// Brave Search API client.
pub struct BraveProvider {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
}

impl BraveProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: BraveWeb,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    page_age: Option<String>,
}

#[async_trait]
impl SearchProvider for BraveProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>> {
        tracing::trace!(query, "Brave search");

        let client = http::build_client(self.timeout_seconds)?;
        let response = client
            .get(format!("{}/res/v1/web/search", self.base_url))
            .query(&[("q", query), ("count", &max_results.to_string())])
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("Brave request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("Brave HTTP error: {e}")))?;

        let parsed: BraveResponse = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("Brave response parse failed: {e}")))?;

        let sources: Vec<CandidateSource> = parsed
            .web
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(max_results)
            .map(|r| CandidateSource {
                title: r.title,
                url: r.url,
                description: r.description,
                published_at: r.page_age,
                provider: self.name().to_owned(),
                content: String::new(),
            })
            .collect();

        tracing::debug!(count = sources.len(), "Brave results parsed");
        Ok(sources)
    }

    fn name(&self) -> &'static str {
        "Brave"
    }
}
