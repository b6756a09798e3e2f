//! Hosted url-to-markdown conversion — keyed, first in the chain.
//!
//! Talks to a RapidAPI-style `/convert` endpoint that returns the page
//! already rendered as markdown, which beats anything we can produce
//! locally. Joins the chain only when a RapidAPI key is configured.

use crate::error::{BriefError, Result};
use crate::extract::ExtractProvider;
use crate::http;
use async_trait::async_trait;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://url-to-markdown-api.p.rapidapi.com";

/// Client for the hosted `/convert` markdown conversion endpoint.
pub struct UrlToMarkdownExtractor {
    api_key: String,
    base_url: String,
    timeout_seconds: u64,
}

impl UrlToMarkdownExtractor {
    pub fn new(api_key: String, base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }

    /// The `x-rapidapi-host` header value, derived from the base URL.
    fn host_header(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExtractProvider for UrlToMarkdownExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        tracing::trace!(url, "url-to-markdown conversion");

        let client = http::build_client(self.timeout_seconds)?;
        let body = serde_json::json!({
            "url": url,
            "returnType": "markdown",
        });

        let response = client
            .post(format!("{}/convert", self.base_url))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", self.host_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("conversion request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("conversion HTTP error: {e}")))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("conversion response parse failed: {e}")))?;

        markdown_from_response(value)
    }

    fn name(&self) -> &'static str {
        "UrlToMarkdown"
    }
}

/// Pull the markdown payload out of a conversion response.
///
/// The endpoint answers with either `{"markdown": "..."}` or a bare
/// JSON string; anything else is a parse error.
fn markdown_from_response(value: serde_json::Value) -> Result<String> {
    let markdown = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(mut map) => match map.remove("markdown") {
            Some(serde_json::Value::String(s)) => s,
            _ => {
                return Err(BriefError::Parse(
                    "conversion response missing markdown field".into(),
                ))
            }
        },
        _ => {
            return Err(BriefError::Parse(
                "unexpected conversion response shape".into(),
            ))
        }
    };

    if markdown.trim().is_empty() {
        return Err(BriefError::Parse("conversion returned no content".into()));
    }
    Ok(markdown)
}
