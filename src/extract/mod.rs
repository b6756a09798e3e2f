//! Content extraction with a per-link fallback chain.
//!
//! Each selected source URL is pushed through an ordered chain of
//! extraction providers. The first provider returning non-empty text
//! wins; later providers are not consulted. A link where every
//! provider fails yields a fixed placeholder document so downstream
//! stages never see a hole.

pub mod readability;
pub mod reader;
pub mod tavily;
pub mod url2md;

pub use readability::ReadabilityExtractor;
pub use reader::ReaderExtractor;
pub use tavily::TavilyExtractor;
pub use url2md::UrlToMarkdownExtractor;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::retry::{retry, FailureTally, RetryPolicy};
use async_trait::async_trait;

/// Attempts per extractor within the chain. Extraction calls are slow,
/// so the budget is tighter than the general retry policy.
const CHAIN_ATTEMPTS: u32 = 2;

/// A pluggable page-content extractor.
#[async_trait]
pub trait ExtractProvider: Send + Sync {
    /// Fetch and convert one page to markdown-ish plain text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the page yields
    /// no extractable content. The chain treats both the same way and
    /// moves on to the next provider.
    async fn extract(&self, url: &str) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Build the default extraction chain in priority order.
///
/// The hosted url-to-markdown conversion leads when a RapidAPI key is
/// configured, followed by the Tavily extract API when keyed; the
/// keyless reader proxy and the local readability fallback always
/// close the chain, so it is never empty.
pub fn default_extractors(config: &PipelineConfig) -> Vec<Box<dyn ExtractProvider>> {
    let mut chain: Vec<Box<dyn ExtractProvider>> = Vec::new();
    let timeout = config.timeout_seconds;

    if let Some(key) = &config.credentials.rapidapi_key {
        chain.push(Box::new(UrlToMarkdownExtractor::new(
            key.clone(),
            config.endpoints.url2md.clone(),
            timeout,
        )));
    }
    if let Some(key) = &config.credentials.tavily_api_key {
        chain.push(Box::new(TavilyExtractor::new(
            key.clone(),
            config.endpoints.tavily.clone(),
            timeout,
        )));
    }
    chain.push(Box::new(ReaderExtractor::new(
        config.endpoints.reader.clone(),
        timeout,
    )));
    chain.push(Box::new(ReadabilityExtractor::new(timeout)));
    chain
}

/// The document substituted when every extractor fails for a link.
pub fn unavailable_placeholder(url: &str) -> String {
    format!("# Unavailable\n\n{url}\n")
}

/// Whether an extracted text is the failure placeholder.
pub fn is_placeholder(text: &str) -> bool {
    text.starts_with("# Unavailable\n")
}

/// Run the extraction chain for one URL.
///
/// Each provider gets a small retry budget; the first non-empty result
/// is returned as-is. When the whole chain fails, one hard failure is
/// recorded on `tally` and the placeholder document is returned.
pub async fn extract_with_fallback(
    extractors: &[Box<dyn ExtractProvider>],
    url: &str,
    policy: &RetryPolicy,
    tally: &FailureTally,
) -> String {
    let per_link = policy.capped(CHAIN_ATTEMPTS);

    for extractor in extractors {
        match retry(&per_link, || extractor.extract(url)).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(provider = extractor.name(), url, chars = text.len(), "extracted");
                return text;
            }
            Ok(_) => {
                tracing::debug!(provider = extractor.name(), url, "empty extraction, falling through");
            }
            Err(e) => {
                tracing::warn!(provider = extractor.name(), url, error = %e, "extraction failed");
            }
        }
    }

    let failures = tally.record();
    tracing::warn!(url, failures, "extraction chain exhausted");
    unavailable_placeholder(url)
}
