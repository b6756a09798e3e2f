//! Local readability fallback — fetch the page and strip it down
//! ourselves. Last in the chain: no third-party service involved, so
//! it works whenever the origin itself is reachable.

use crate::error::{BriefError, Result};
use crate::extract::ExtractProvider;
use crate::http;
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Character cap on locally extracted text.
const MAX_CHARS: usize = 20_000;

/// Tags removed wholesale before parsing, content included.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Fetch-and-strip extractor.
pub struct ReadabilityExtractor {
    timeout_seconds: u64,
}

impl ReadabilityExtractor {
    pub fn new(timeout_seconds: u64) -> Self {
        Self { timeout_seconds }
    }
}

#[async_trait]
impl ExtractProvider for ReadabilityExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        tracing::trace!(url, "local readability extraction");

        let client = http::build_client(self.timeout_seconds)?;
        let html = client
            .get(url)
            .send()
            .await
            .map_err(|e| BriefError::Http(format!("page fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Http(format!("page HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| BriefError::Http(format!("page read failed: {e}")))?;

        match html_to_markdown(&html) {
            Ok(text) => Ok(text),
            // Raw passthrough: a fetched page we cannot parse still
            // beats a placeholder.
            Err(_) if !html.trim().is_empty() => Ok(cap_chars(html.trim(), MAX_CHARS)),
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &'static str {
        "Readability"
    }
}

/// Convert raw HTML into a markdown-ish plain-text document.
///
/// Boilerplate elements are dropped, the first of
/// `article`/`main`/`[role=main]`/`body` becomes the content root, and
/// the result is whitespace-normalised and capped. The page title, if
/// any, becomes a leading `#` heading.
///
/// # Errors
///
/// Returns [`BriefError::Parse`] when no readable text remains.
pub fn html_to_markdown(html: &str) -> Result<String> {
    let cleaned = strip_boilerplate(html);
    let document = Html::parse_document(&cleaned);

    let title = first_text(&document, "title");
    let body = main_text(&document);
    let body = collapse_whitespace(&body);
    if body.is_empty() {
        return Err(BriefError::Parse("no extractable content found".into()));
    }

    let body = cap_chars(&body, MAX_CHARS);
    if title.is_empty() {
        Ok(body)
    } else {
        Ok(format!("# {title}\n\n{body}"))
    }
}

fn first_text(document: &Html, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_owned()
}

/// Text of the first matching content root, trying selectors in
/// priority order and falling back to `<body>`.
fn main_text(document: &Html) -> String {
    for selector_str in ["article", "main", "[role=\"main\"]", "body"] {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text: String = element.text().collect::<Vec<_>>().join(" ");
            if !text.trim().is_empty() {
                return text.trim().to_owned();
            }
        }
    }
    String::new()
}

/// Remove every boilerplate tag together with its content.
fn strip_boilerplate(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| remove_tag_blocks(&acc, tag))
}

/// Remove all `<tag>…</tag>` blocks from `html`, case-insensitively.
///
/// An unclosed tag loses only its opening element. Prefix matches
/// (`<navigate>` when removing `nav`) are left intact.
fn remove_tag_blocks(html: &str, tag: &str) -> String {
    let lower = html.to_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(offset) = lower[pos..].find(&open) {
        let start = pos + offset;
        let after = start + open.len();

        // The next byte must end the tag name, otherwise this is a
        // longer tag that merely shares the prefix.
        let is_tag_boundary = lower
            .as_bytes()
            .get(after)
            .copied()
            .map_or(true, |b| matches!(b, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t'));
        if !is_tag_boundary {
            out.push_str(&html[pos..after]);
            pos = after;
            continue;
        }

        out.push_str(&html[pos..start]);
        pos = match lower[start..].find(&close) {
            Some(close_offset) => start + close_offset + close.len(),
            None => match lower[start..].find('>') {
                Some(gt) => start + gt + 1,
                None => html.len(),
            },
        };
    }
    out.push_str(&html[pos..]);
    out
}

/// Collapse runs of spaces to one and runs of blank lines to one.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newlines = 0u32;

    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            newlines += 1;
            pending_space = false;
            if newlines <= 2 {
                out.push('\n');
            }
        } else if ch.is_whitespace() {
            newlines = 0;
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            pending_space = false;
            newlines = 0;
            out.push(ch);
        }
    }

    out.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

/// Truncate at a char boundary, marking the cut.
fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut capped: String = text.chars().take(max_chars).collect();
    capped.push_str("\n\n[content truncated]");
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_becomes_heading() {
        let html =
            "<html><head><title>Quarterly Outlook</title></head><body>Revenue grew.</body></html>";
        let md = html_to_markdown(html).expect("should extract");
        assert!(md.starts_with("# Quarterly Outlook\n\n"));
        assert!(md.contains("Revenue grew."));
    }

    #[test]
    fn article_preferred_over_surroundings() {
        let html = r#"<html><body>
            <nav>Site nav</nav>
            <article>Adoption accelerated across the sector.</article>
            <footer>Copyright</footer>
        </body></html>"#;
        let md = html_to_markdown(html).expect("should extract");
        assert!(md.contains("Adoption accelerated"));
        assert!(!md.contains("Site nav"));
        assert!(!md.contains("Copyright"));
    }

    #[test]
    fn scripts_and_styles_removed() {
        let html = r#"<html><body>
            <p>Visible text</p>
            <script>track("pageview");</script>
            <style>.x { color: red; }</style>
        </body></html>"#;
        let md = html_to_markdown(html).expect("should extract");
        assert!(md.contains("Visible text"));
        assert!(!md.contains("pageview"));
        assert!(!md.contains("color"));
    }

    #[test]
    fn prefix_tags_survive_removal() {
        let html = "<html><body><nav>drop</nav><p>how to navigate markets</p></body></html>";
        let md = html_to_markdown(html).expect("should extract");
        assert!(!md.contains("drop"));
        assert!(md.contains("navigate markets"));
    }

    #[test]
    fn empty_page_is_an_error() {
        assert!(html_to_markdown("").is_err());
        assert!(html_to_markdown("<html><body>  \n </body></html>").is_err());
    }

    #[test]
    fn whitespace_collapsed() {
        let html = "<html><body>one    two\n\n\n\nthree</body></html>";
        let md = html_to_markdown(html).expect("should extract");
        assert!(!md.contains("  "));
        assert!(!md.contains("\n\n\n"));
    }

    #[test]
    fn long_text_capped() {
        let body = "lorem ".repeat(10_000);
        let html = format!("<html><body><p>{body}</p></body></html>");
        let md = html_to_markdown(&html).expect("should extract");
        assert!(md.chars().count() <= MAX_CHARS + 32);
        assert!(md.ends_with("[content truncated]"));
    }

    #[test]
    fn unclosed_boilerplate_tag_tolerated() {
        let html = "<html><body><script src=\"x.js\"><p>After the tag</p></body></html>";
        let md = html_to_markdown(html);
        // The unclosed script swallows the rest of the block, so this
        // degrades to an extraction error rather than a panic.
        let _ = md;
    }
}
