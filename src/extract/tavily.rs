//! Tavily extract API — keyed, highest-quality extraction.

use crate::error::{BriefError, Result};
use crate::extract::ExtractProvider;
use crate::http;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Tavily `/extract` endpoint client.
pub struct TavilyExtractor {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
}

impl TavilyExtractor {
    pub fn new(api_key: String, base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    results: Vec<ExtractResult>,
}

#[derive(Debug, Deserialize)]
struct ExtractResult {
    #[serde(default)]
    raw_content: String,
}

#[async_trait]
impl ExtractProvider for TavilyExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        tracing::trace!(url, "Tavily extraction");

        let client = http::build_client(self.timeout_seconds)?;
        let body = serde_json::json!({
            "api_key": self.api_key,
            "urls": [url],
        });

        let response = client
            .post(format!("{}/extract", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("Tavily extract request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("Tavily extract HTTP error: {e}")))?;

        let parsed: ExtractResponse = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("Tavily extract parse failed: {e}")))?;

        let content = parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.raw_content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(BriefError::Parse("Tavily extract returned no content".into()));
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "TavilyExtract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes() {
        let json = r#"{"results": [{"url": "https://a.com", "raw_content": "Page body"}], "failed_results": []}"#;
        let parsed: ExtractResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].raw_content, "Page body");
    }

    #[test]
    fn empty_results_tolerated() {
        let parsed: ExtractResponse = serde_json::from_str("{}").expect("should parse");
        assert!(parsed.results.is_empty());
    }
}
