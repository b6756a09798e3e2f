//! Wikipedia — encyclopedic fallback, last in the provider chain.
//!
//! Uses the MediaWiki `opensearch` action for search, and the
//! `extracts` prop to enrich wikipedia-hosted candidates with article
//! text during research.

use crate::error::{BriefError, Result};
use crate::http;
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

/// Character cap on enrichment extracts, bounding prompt size.
const EXTRACT_CHAR_CAP: usize = 4000;

/// Wikipedia opensearch client.
pub struct WikipediaProvider {
    base_url: String,
    timeout_seconds: u64,
}

impl WikipediaProvider {
    pub fn new(base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }
}

#[async_trait]
impl SearchProvider for WikipediaProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>> {
        tracing::trace!(query, "Wikipedia search");

        let client = http::build_client(self.timeout_seconds)?;
        let response = client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "opensearch"),
                ("search", query),
                ("limit", &max_results.to_string()),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("Wikipedia request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("Wikipedia HTTP error: {e}")))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BriefError::Parse(format!("Wikipedia response parse failed: {e}")))?;

        let sources = parse_opensearch(&value, self.name());
        tracing::debug!(count = sources.len(), "Wikipedia results parsed");
        Ok(sources)
    }

    fn name(&self) -> &'static str {
        "Wikipedia"
    }
}

/// Parse an opensearch payload: `[query, [titles], [descriptions], [urls]]`.
///
/// Rows with a missing or empty URL are skipped; other malformed rows
/// degrade to empty strings rather than errors.
fn parse_opensearch(value: &serde_json::Value, provider: &str) -> Vec<CandidateSource> {
    let titles = value.get(1).and_then(|v| v.as_array());
    let descriptions = value.get(2).and_then(|v| v.as_array());
    let urls = value.get(3).and_then(|v| v.as_array());

    let (Some(titles), Some(urls)) = (titles, urls) else {
        return Vec::new();
    };

    titles
        .iter()
        .enumerate()
        .filter_map(|(i, title)| {
            let url = urls.get(i)?.as_str()?.to_owned();
            if url.is_empty() {
                return None;
            }
            let description = descriptions
                .and_then(|d| d.get(i))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned();
            Some(CandidateSource {
                title: title.as_str().unwrap_or_default().to_owned(),
                url,
                description,
                published_at: None,
                provider: provider.to_owned(),
                content: String::new(),
            })
        })
        .collect()
}

/// Whether a URL points at a wikipedia article page.
pub fn is_article_url(url: &str) -> bool {
    url.contains("wikipedia.org/wiki/")
}

/// Fetch the plain-text extract for a wikipedia article URL.
///
/// Used during research to enrich wikipedia-sourced candidates with
/// article content. The extract is capped at a fixed character budget.
///
/// # Errors
///
/// Returns [`BriefError::Http`] / [`BriefError::Parse`] on failure;
/// callers treat a failed enrichment as "no content", never fatal.
pub async fn fetch_extract(base_url: &str, timeout_seconds: u64, url: &str) -> Result<String> {
    let title = match url.split_once("/wiki/") {
        Some((_, rest)) => urlencoding::decode(rest)
            .map(|t| t.into_owned())
            .unwrap_or_else(|_| rest.to_owned()),
        None => url.to_owned(),
    };

    let client = http::build_client(timeout_seconds)?;
    let response = client
        .get(format!("{base_url}/w/api.php"))
        .query(&[
            ("action", "query"),
            ("prop", "extracts"),
            ("explaintext", "1"),
            ("titles", &title),
            ("format", "json"),
        ])
        .send()
        .await
        .map_err(|e| BriefError::Http(format!("Wikipedia extract request failed: {e}")))?
        .error_for_status()
        .map_err(|e| BriefError::Http(format!("Wikipedia extract HTTP error: {e}")))?;

    let value: serde_json::Value = response
        .json()
        .await
        .map_err(|e| BriefError::Parse(format!("Wikipedia extract parse failed: {e}")))?;

    let pages = value["query"]["pages"]
        .as_object()
        .ok_or_else(|| BriefError::Parse("Wikipedia extract: missing pages".into()))?;

    let extract = pages
        .values()
        .next()
        .and_then(|page| page["extract"].as_str())
        .unwrap_or_default();

    Ok(extract.chars().take(EXTRACT_CHAR_CAP).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_opensearch_payload() {
        let value = serde_json::json!([
            "edge ai",
            ["Edge computing", "AI accelerator"],
            ["Computing paradigm", "Hardware class"],
            [
                "https://en.wikipedia.org/wiki/Edge_computing",
                "https://en.wikipedia.org/wiki/AI_accelerator"
            ]
        ]);
        let sources = parse_opensearch(&value, "Wikipedia");
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Edge computing");
        assert_eq!(sources[1].url, "https://en.wikipedia.org/wiki/AI_accelerator");
        assert_eq!(sources[0].provider, "Wikipedia");
    }

    #[test]
    fn parse_opensearch_missing_descriptions() {
        let value = serde_json::json!(["q", ["T"], [], ["https://en.wikipedia.org/wiki/T"]]);
        let sources = parse_opensearch(&value, "Wikipedia");
        assert_eq!(sources.len(), 1);
        assert!(sources[0].description.is_empty());
    }

    #[test]
    fn parse_opensearch_malformed_returns_empty() {
        let value = serde_json::json!({"unexpected": "shape"});
        assert!(parse_opensearch(&value, "Wikipedia").is_empty());
    }

    #[test]
    fn article_url_detection() {
        assert!(is_article_url("https://en.wikipedia.org/wiki/Edge_computing"));
        assert!(!is_article_url("https://example.com/wiki-page"));
    }
}
