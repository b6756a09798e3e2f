//! Brief synthesis — prompt assembly, draft post-processing, and the
//! deterministic fallback renderer.
//!
//! The model writes the narrative; references are never the model's
//! job. Whatever the draft contains, any `## References` section it
//! produced is cut and replaced with a deterministically numbered list
//! built from the source set, so citation indices always resolve.

use crate::config::PipelineConfig;
use crate::llm::LanguageModel;
use crate::retry::retry;
use crate::types::{Brief, CandidateSource, Fact, Section};

/// Character cap on the summary taken from the writer draft.
pub const WRITER_SUMMARY_CHAR_CAP: usize = 1500;

/// Tighter cap applied during review.
pub const REVIEW_SUMMARY_CHAR_CAP: usize = 1180;

const REFERENCES_HEADING: &str = "## References";

/// Cap text to `max_lines` lines.
pub fn cap_lines(text: &str, max_lines: usize) -> String {
    text.lines().take(max_lines).collect::<Vec<_>>().join("\n")
}

/// Build the writer's section for one source: its best available text
/// (extracted content, falling back to the provider description),
/// line-capped.
pub fn build_section(source: &CandidateSource, line_budget: usize) -> Section {
    let body = if source.content.trim().is_empty() {
        source.description.as_str()
    } else {
        source.content.as_str()
    };
    Section {
        source_url: source.url.clone(),
        title: source.title.clone(),
        text: cap_lines(body, line_budget),
    }
}

/// Render one section as citable markdown: `#### [n] title` plus body.
pub fn section_markdown(index: usize, section: &Section) -> String {
    format!("#### [{index}] {}\n\n{}", section.title, section.text)
}

/// All sources rendered as sections, separated by horizontal rules.
pub fn sections_markdown(sources: &[CandidateSource], line_budget: usize) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| section_markdown(i + 1, &build_section(s, line_budget)))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// The deterministic numbered reference list: `{n}. [{title}]({url})`.
pub fn references_block(sources: &[CandidateSource]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. [{}]({})", i + 1, s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the brief-writing prompt from facts and source sections.
pub fn writer_prompt(
    topic: &str,
    facts: &[Fact],
    sources: &[CandidateSource],
    config: &PipelineConfig,
) -> String {
    let fact_lines: String = facts
        .iter()
        .map(|f| {
            let evidence = f.evidence_url.as_deref().unwrap_or("n/a");
            format!("- {} (confidence {:.2}, evidence: {})\n", f.statement, f.confidence, evidence)
        })
        .collect();

    format!(
        "You are writing a market brief on \"{topic}\".\n\
         Structure the brief as markdown with these sections:\n\
         1. An executive summary of at most six sentences.\n\
         2. \"## Key Insights\" as bullet points, each citing sources with [n] markers \
         matching the numbered sections below.\n\
         3. \"## Competitive Snapshot\" comparing the main players.\n\
         4. \"## Outlook\" with the forward view.\n\
         Do not write a references section; it is appended separately.\n\n\
         Verified facts:\n{fact_lines}\n\
         Numbered sources:\n\n{sections}\n",
        sections = sections_markdown(sources, config.section_line_budget),
    )
}

/// Cut any model-written references section and append the
/// deterministic one.
fn finalize_document(draft: &str, sources: &[CandidateSource]) -> String {
    let body = match draft.find(REFERENCES_HEADING) {
        Some(i) => draft[..i].trim_end(),
        None => draft.trim_end(),
    };
    format!(
        "{body}\n\n{REFERENCES_HEADING}\n\n{refs}\n",
        refs = references_block(sources)
    )
}

/// Deterministic document used when the writer model is unavailable.
///
/// Lists the facts as bullets with their evidence links, then the
/// reference list. Contains no model-generated text.
pub fn render_fallback(topic: &str, facts: &[Fact], sources: &[CandidateSource]) -> String {
    let fact_lines: String = facts
        .iter()
        .map(|f| match &f.evidence_url {
            Some(url) => format!("- {} ([source]({url}))\n", f.statement),
            None => format!("- {}\n", f.statement),
        })
        .collect();

    format!(
        "# Market Brief: {topic}\n\n## Key Facts\n\n{fact_lines}\n{REFERENCES_HEADING}\n\n{refs}\n",
        refs = references_block(sources)
    )
}

/// Document produced when no sources could be gathered at all.
pub fn no_sources_document(topic: &str) -> String {
    format!("# Market Brief: {topic}\n\n_No sources found._\n")
}

/// Write the brief.
///
/// Never fails: a model failure degrades to [`render_fallback`] and an
/// empty source set degrades to [`no_sources_document`]; both cases
/// surface a warning for the run's error ledger.
pub async fn synthesize(
    llm: &dyn LanguageModel,
    topic: &str,
    facts: Vec<Fact>,
    sources: Vec<CandidateSource>,
    config: &PipelineConfig,
) -> (Brief, Option<String>) {
    if sources.is_empty() {
        let brief = Brief {
            topic: topic.to_owned(),
            summary: "No sources found.".to_owned(),
            facts,
            sources,
            document: no_sources_document(topic),
        };
        return (brief, Some("no sources available for writing".to_owned()));
    }

    let prompt = writer_prompt(topic, &facts, &sources, config);
    let policy = config.retry_policy();

    match retry(&policy, || llm.complete(&prompt)).await {
        Ok(draft) => {
            let summary: String = draft.chars().take(WRITER_SUMMARY_CHAR_CAP).collect();
            let document = finalize_document(&draft, &sources);
            tracing::debug!(chars = document.len(), "brief synthesized");
            let brief = Brief {
                topic: topic.to_owned(),
                summary,
                facts,
                sources,
                document,
            };
            (brief, None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "writer model call failed, using fallback renderer");
            let document = render_fallback(topic, &facts, &sources);
            let brief = Brief {
                topic: topic.to_owned(),
                summary: "Summary unavailable; see references below.".to_owned(),
                facts,
                sources,
                document,
            };
            (brief, Some(format!("writing failed: {e}")))
        }
    }
}
