//! Provider wire-level tests against a local mock server.

use marketbrief::config::PipelineConfig;
use marketbrief::extract::{
    extract_with_fallback, ExtractProvider, ReaderExtractor, TavilyExtractor,
    UrlToMarkdownExtractor,
};
use marketbrief::retry::{FailureTally, RetryPolicy};
use marketbrief::search::{
    DuckDuckGoProvider, SearchProvider, TavilyProvider, WikipediaProvider,
};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        attempts: 1,
        base_delay: Duration::from_millis(0),
    }
}

#[tokio::test]
async fn tavily_search_parses_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_string_contains("\"query\":\"edge ai chips\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {
                    "title": "Edge AI Market",
                    "url": "https://research.example.com/edge",
                    "content": "snippet text",
                    "published_date": "2026-01-15T00:00:00Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let provider = TavilyProvider::new("test-key".into(), Some(server.uri()), 5);
    let results = provider.search("edge ai chips", 10).await.expect("searches");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Edge AI Market");
    assert_eq!(results[0].description, "snippet text");
    assert_eq!(results[0].published_at.as_deref(), Some("2026-01-15T00:00:00Z"));
    assert_eq!(results[0].provider, "Tavily");
}

#[tokio::test]
async fn tavily_http_error_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = TavilyProvider::new("test-key".into(), Some(server.uri()), 5);
    assert!(provider.search("anything", 10).await.is_err());
}

#[tokio::test]
async fn wikipedia_opensearch_parses_array_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "opensearch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            "edge computing",
            ["Edge computing"],
            ["Distributed computing paradigm"],
            ["https://en.wikipedia.org/wiki/Edge_computing"]
        ])))
        .mount(&server)
        .await;

    let provider = WikipediaProvider::new(Some(server.uri()), 5);
    let results = provider.search("edge computing", 5).await.expect("searches");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Edge computing");
    assert_eq!(results[0].url, "https://en.wikipedia.org/wiki/Edge_computing");
}

#[tokio::test]
async fn duckduckgo_scrapes_html_results() {
    let html = r#"<!DOCTYPE html><html><body>
        <div class="result results_links results_links_deep web-result">
            <a class="result__a" href="https://market.example.com/report">Annual Market Report</a>
            <div class="result__snippet">Yearly figures.</div>
        </div>
    </body></html>"#;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::new(Some(server.uri()), 5);
    let results = provider.search("market report", 10).await.expect("searches");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, "https://market.example.com/report");
    assert_eq!(results[0].provider, "DuckDuckGo");
}

#[tokio::test]
async fn reader_extractor_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Page\n\nReadable body."))
        .mount(&server)
        .await;

    let extractor = ReaderExtractor::new(Some(server.uri()), 5);
    let text = extractor
        .extract("https://research.example.com/edge")
        .await
        .expect("extracts");
    assert!(text.contains("Readable body."));
}

#[tokio::test]
async fn url_to_markdown_converts_with_rapidapi_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(header("x-rapidapi-key", "rapid-key"))
        .and(body_string_contains("\"returnType\":\"markdown\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "markdown": "# Converted\n\nPage body as markdown."
        })))
        .mount(&server)
        .await;

    let extractor = UrlToMarkdownExtractor::new("rapid-key".into(), Some(server.uri()), 5);
    let text = extractor
        .extract("https://research.example.com/edge")
        .await
        .expect("converts");
    assert!(text.starts_with("# Converted"));
    assert!(text.contains("Page body as markdown."));
}

#[tokio::test]
async fn extraction_chain_falls_back_across_providers() {
    let server = MockServer::start().await;
    // The keyed extract endpoint is down; the reader proxy works.
    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered by reader"))
        .mount(&server)
        .await;

    let chain: Vec<Box<dyn ExtractProvider>> = vec![
        Box::new(TavilyExtractor::new("key".into(), Some(server.uri()), 5)),
        Box::new(ReaderExtractor::new(Some(server.uri()), 5)),
    ];
    let tally = FailureTally::default();
    let text = extract_with_fallback(
        &chain,
        "https://research.example.com/edge",
        &fast_policy(),
        &tally,
    )
    .await;

    assert_eq!(text, "recovered by reader");
    assert_eq!(tally.count(), 0);
}

#[tokio::test]
async fn brave_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(header("X-Subscription-Token", "brave-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "web": {"results": [
                {"title": "B", "url": "https://b.com", "description": "brave result"}
            ]}
        })))
        .mount(&server)
        .await;

    let provider = marketbrief::search::BraveProvider::new(
        "brave-key".into(),
        Some(server.uri()),
        5,
    );
    let results = provider.search("query", 10).await.expect("searches");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider, "Brave");
}

#[tokio::test]
async fn keyless_default_chain_searches_against_mocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="web-result"><a class="result__a" href="https://a.com/r">A Result</a></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            "q", ["W"], ["wiki"], ["https://en.wikipedia.org/wiki/W"]
        ])))
        .mount(&server)
        .await;

    let mut config = PipelineConfig::default();
    config.endpoints.duckduckgo = Some(server.uri());
    config.endpoints.wikipedia = Some(server.uri());

    let chain = marketbrief::search::default_providers(&config);
    assert_eq!(chain.len(), 2);
    for provider in &chain {
        let results = provider.search("q", 5).await.expect("searches");
        assert_eq!(results.len(), 1);
    }
}
