//! Core data model: candidate sources, facts, sections, and the final brief.

use serde::{Deserialize, Serialize};

/// A single candidate source returned by a search provider.
///
/// The `url` is the natural key; `content` starts empty and may be
/// enriched later in the run. Sources are never mutated once they enter
/// the ranked source set, except for content enrichment during research.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSource {
    /// Page title as reported by the provider.
    pub title: String,
    /// The source URL — the natural key for deduplication.
    pub url: String,
    /// Short description or snippet from the provider.
    pub description: String,
    /// RFC 3339 publication timestamp, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Which provider returned this source.
    pub provider: String,
    /// Extracted page content, filled during enrichment. Empty until then.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl CandidateSource {
    /// Construct a source with no date and no content.
    pub fn new(title: &str, url: &str, description: &str, provider: &str) -> Self {
        Self {
            title: title.to_owned(),
            url: url.to_owned(),
            description: description.to_owned(),
            published_at: None,
            provider: provider.to_owned(),
            content: String::new(),
        }
    }

    /// Whether this source carries any usable text beyond its title.
    pub fn has_text(&self) -> bool {
        !self.description.trim().is_empty() || !self.content.trim().is_empty()
    }
}

/// An evidence-linked, confidence-scored statement derived from sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    /// The statement text. Never empty in a validated fact.
    pub statement: String,
    /// URL of the supporting source, preferably one from the source set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    /// Extraction confidence, always within `[0.0, 1.0]`.
    pub confidence: f64,
}

impl Fact {
    /// A fact is valid when its statement is meaningful and its
    /// confidence lies in the unit interval.
    pub fn is_valid(&self) -> bool {
        self.statement.trim().len() >= 3 && (0.0..=1.0).contains(&self.confidence)
    }
}

/// Extracted page content for one source used by the writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// URL the content was extracted from.
    pub source_url: String,
    /// Section title (usually the source title).
    pub title: String,
    /// Normalised text, capped to the configured line budget.
    pub text: String,
}

/// The final structured output of a pipeline run.
///
/// `document` is rendered Markdown whose numbered reference list
/// corresponds 1:1 with `sources` order: every citation marker `[i]`
/// resolves to `sources[i - 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    /// The research topic this brief covers.
    pub topic: String,
    /// Short prose summary, bounded in length.
    pub summary: String,
    /// Evidence-linked facts, 1–8 per run.
    pub facts: Vec<Fact>,
    /// The deduplicated, ranked source set in citation order.
    pub sources: Vec<CandidateSource>,
    /// Rendered Markdown narrative plus numbered reference list.
    pub document: String,
}
