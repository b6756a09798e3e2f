//! DuckDuckGo scrape fallback — keyless web search.
//!
//! Queries the JavaScript-free results page under `/html/`, which
//! serves plain markup and holds up well under scripted access. First
//! provider in the chain when no API keys are configured.

use crate::error::{BriefError, Result};
use crate::http;
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo HTML search scraper.
pub struct DuckDuckGoProvider {
    base_url: String,
    timeout_seconds: u64,
}

impl DuckDuckGoProvider {
    pub fn new(base_url: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout_seconds,
        }
    }

    /// Unwrap DuckDuckGo's redirect indirection.
    ///
    /// Result links point at `//duckduckgo.com/l/?uddg=<encoded>&rut=...`
    /// with the destination URL-encoded in the `uddg` parameter; direct
    /// links pass through untouched.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<CandidateSource>> {
        tracing::trace!(query, "DuckDuckGo search");

        let client = http::build_client(self.timeout_seconds)?;
        let response = client
            .post(format!("{}/html/", self.base_url))
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| BriefError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, max_results)
    }

    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }
}

/// Scrape candidate sources out of a results page.
///
/// Takes the raw HTML rather than a response so tests can feed it
/// fixture markup.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<CandidateSource>> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| BriefError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| BriefError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| BriefError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let title_el = match element.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let href = match title_el.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        let url = match DuckDuckGoProvider::extract_url(href) {
            Some(u) => u,
            None => continue,
        };

        let description = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(CandidateSource {
            title,
            url,
            description,
            published_at: None,
            provider: "DuckDuckGo".to_owned(),
            content: String::new(),
        });

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
