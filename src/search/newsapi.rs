//! NewsAPI — keyed news provider, the main supplier of dated sources.
//!
//! Articles carry a `publishedAt` timestamp, which feeds the recency
//! term in result ranking.

use crate::error::{BriefError, Result};
use crate::http;
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// NewsAPI `everything` endpoint client.
pub struct NewsApiProvider {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
}

impl NewsApiProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[async_trait]
impl SearchProvider for NewsApiProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>> {
        tracing::trace!(query, "NewsAPI search");

        let client = http::build_client(self.timeout_seconds)?;
        let response = client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("q", query),
                ("pageSize", &max_results.to_string()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("NewsAPI request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("NewsAPI HTTP error: {e}")))?;

        let parsed: NewsResponse = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("NewsAPI response parse failed: {e}")))?;

        let sources: Vec<CandidateSource> = parsed
            .articles
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .take(max_results)
            .map(|a| CandidateSource {
                title: a.title,
                url: a.url,
                description: a.description.unwrap_or_default(),
                published_at: a.published_at,
                provider: self.name().to_owned(),
                content: String::new(),
            })
            .collect();

        tracing::debug!(count = sources.len(), "NewsAPI results parsed");
        Ok(sources)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}
