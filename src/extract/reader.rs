//! Reader proxy extraction — keyless markdown rendering service.
//!
//! Prepends the reader base URL to the target URL (the r.jina.ai
//! convention) and receives the page back as markdown.

use crate::error::{BriefError, Result};
use crate::extract::ExtractProvider;
use crate::http;
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://r.jina.ai";

/// Reader-proxy extractor.
pub struct ReaderExtractor {
    base_url: String,
    timeout_seconds: u64,
}

impl ReaderExtractor {
    pub fn new(base_url: Option<String>, timeout_seconds: u64) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_seconds,
        }
    }

    fn proxied_url(&self, url: &str) -> String {
        format!("{}/{}", self.base_url, url)
    }
}

#[async_trait]
impl ExtractProvider for ReaderExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        tracing::trace!(url, "reader extraction");

        let client = http::build_client(self.timeout_seconds)?;
        let response = client
            .get(self.proxied_url(url))
            .header("Accept", "text/plain")
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("reader request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("reader HTTP error: {e}")))?;

        let text = response
            .text()
            .await
            .map_err(|e| BriefError::Http(format!("reader response read failed: {e}")))?;

        if text.trim().is_empty() {
            return Err(BriefError::Parse("reader returned empty body".into()));
        }
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "Reader"
    }
}
