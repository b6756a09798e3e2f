//! Search provider implementations.
//!
//! Each module provides a struct implementing [`SearchProvider`] for one
//! external search service. Providers are assembled into an ordered
//! fallback chain — primary paid APIs first, then free/public APIs, then
//! the encyclopedic fallback — and queried by the aggregator.

pub mod brave;
pub mod duckduckgo;
pub mod newsapi;
pub mod tavily;
pub mod wikipedia;

pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use newsapi::NewsApiProvider;
pub use tavily::TavilyProvider;
pub use wikipedia::WikipediaProvider;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::CandidateSource;
use async_trait::async_trait;

/// A pluggable search backend.
///
/// Implementors call one external service and return structured
/// candidate sources. Each provider handles its own URL construction,
/// authentication, and response parsing. All implementations must be
/// `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a search and return candidate sources.
    ///
    /// An empty vector is a normal outcome (no matches), not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rate limiting, or an
    /// unparsable response. Callers retry transient errors and fall
    /// through to the next provider in the chain.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>>;

    /// Provider name, recorded on every returned source.
    fn name(&self) -> &'static str;
}

/// Build the default provider chain in priority order.
///
/// Keyed providers (Tavily, Brave, NewsAPI) are included only when a
/// credential is configured; the keyless scrape and encyclopedic
/// fallbacks are always present, so the chain is never empty.
pub fn default_providers(config: &PipelineConfig) -> Vec<Box<dyn SearchProvider>> {
    let mut chain: Vec<Box<dyn SearchProvider>> = Vec::new();
    let timeout = config.timeout_seconds;

    if let Some(key) = &config.credentials.tavily_api_key {
        chain.push(Box::new(TavilyProvider::new(
            key.clone(),
            config.endpoints.tavily.clone(),
            timeout,
        )));
    }
    if let Some(key) = &config.credentials.brave_api_key {
        chain.push(Box::new(BraveProvider::new(
            key.clone(),
            config.endpoints.brave.clone(),
            timeout,
        )));
    }
    if let Some(key) = &config.credentials.news_api_key {
        chain.push(Box::new(NewsApiProvider::new(
            key.clone(),
            config.endpoints.newsapi.clone(),
            timeout,
        )));
    }
    chain.push(Box::new(DuckDuckGoProvider::new(
        config.endpoints.duckduckgo.clone(),
        timeout,
    )));
    chain.push(Box::new(WikipediaProvider::new(
        config.endpoints.wikipedia.clone(),
        timeout,
    )));
    chain
}
