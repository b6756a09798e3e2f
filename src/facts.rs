//! Fact extraction — turn gathered source material into a small set of
//! structured, evidence-linked claims.
//!
//! The model is asked for a JSON list. Model output is unreliable, so
//! parsing is layered: strict parse of the whole reply, then the
//! bracketed substring, then progressively shorter bracketed prefixes.
//! When nothing parses, a single generic fact is synthesised so the
//! fact set is never empty.

use crate::config::PipelineConfig;
use crate::llm::LanguageModel;
use crate::retry::retry;
use crate::types::{CandidateSource, Fact};

/// Sources included in the prompt. More adds tokens, not signal.
const PROMPT_SOURCE_CAP: usize = 8;

/// Statement length cap applied during normalisation.
const STATEMENT_CHAR_CAP: usize = 600;

/// Confidence assigned when the model gives none or garbage.
const DEFAULT_CONFIDENCE: f64 = 0.6;

/// Confidence of the synthesised generic fact.
const FALLBACK_CONFIDENCE: f64 = 0.55;

/// Build the fact-extraction prompt from the top sources.
pub fn facts_prompt(topic: &str, sources: &[CandidateSource], snippet_char_budget: usize) -> String {
    let mut prompt = format!(
        "You are a market analyst. Extract the most important verifiable facts \
         about \"{topic}\" from the sources below.\n\
         Respond with ONLY a JSON list, no prose. Each item must be an object with \
         keys \"statement\" (string), \"evidence_url\" (string), and \"confidence\" \
         (number between 0 and 1).\n\nSources:\n"
    );

    for (i, source) in sources.iter().take(PROMPT_SOURCE_CAP).enumerate() {
        let body = if source.content.trim().is_empty() {
            &source.description
        } else {
            &source.content
        };
        let snippet: String = body.chars().take(snippet_char_budget).collect();
        prompt.push_str(&format!(
            "[{n}] {title} ({url})\n{snippet}\n\n",
            n = i + 1,
            title = source.title,
            url = source.url,
        ));
    }

    prompt
}

/// Extract facts for a topic, never returning an empty set.
///
/// The model call is retried per the configured policy. A failed call
/// or an unparsable reply degrades to the generic fallback fact, with
/// the reason returned for the run's error ledger.
pub async fn extract_facts(
    llm: &dyn LanguageModel,
    topic: &str,
    sources: &[CandidateSource],
    config: &PipelineConfig,
) -> (Vec<Fact>, Option<String>) {
    if sources.is_empty() {
        return (
            fallback_facts(topic, sources),
            Some("no sources available for fact extraction".to_owned()),
        );
    }

    let prompt = facts_prompt(topic, sources, config.snippet_char_budget);
    let policy = config.retry_policy();

    let reply = match retry(&policy, || llm.complete(&prompt)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "fact extraction model call failed");
            return (fallback_facts(topic, sources), Some(format!("fact extraction failed: {e}")));
        }
    };

    let facts = parse_facts(&reply, config.max_facts);
    if facts.is_empty() {
        tracing::warn!("model reply contained no parsable facts");
        return (
            fallback_facts(topic, sources),
            Some("model reply contained no parsable facts".to_owned()),
        );
    }

    tracing::debug!(count = facts.len(), "facts extracted");
    (facts, None)
}

/// Parse a model reply into normalised, validated facts.
pub fn parse_facts(raw: &str, max_facts: usize) -> Vec<Fact> {
    let Some(items) = parse_json_array(raw) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(normalize_fact)
        .filter(Fact::is_valid)
        .take(max_facts)
        .collect()
}

/// Locate and parse a JSON array inside arbitrary model prose.
fn parse_json_array(raw: &str) -> Option<Vec<serde_json::Value>> {
    if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(raw.trim()) {
        return Some(items);
    }

    // Models wrap JSON in prose or code fences; take the bracketed
    // span, shrinking from the right until something parses.
    let start = raw.find('[')?;
    let mut end = raw.len();
    while let Some(candidate_end) = raw[..end].rfind(']') {
        if candidate_end <= start {
            break;
        }
        if let Ok(items) =
            serde_json::from_str::<Vec<serde_json::Value>>(&raw[start..=candidate_end])
        {
            return Some(items);
        }
        end = candidate_end;
    }
    None
}

/// Normalise one JSON item into a [`Fact`], tolerating key aliases.
///
/// Statement comes from `statement`/`fact`/`text`, evidence from
/// `evidence_url`/`source`/`url`. Confidence accepts a number or a
/// numeric string and is clamped to `[0, 1]`.
fn normalize_fact(value: &serde_json::Value) -> Option<Fact> {
    let object = value.as_object()?;

    let statement = ["statement", "fact", "text"]
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(|v| v.as_str())?
        .trim();
    let statement: String = statement.chars().take(STATEMENT_CHAR_CAP).collect();

    let evidence_url = ["evidence_url", "source", "url"]
        .iter()
        .find_map(|key| object.get(*key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned);

    let confidence = object
        .get("confidence")
        .map(clamp_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    Some(Fact {
        statement,
        evidence_url,
        confidence,
    })
}

/// Coerce a confidence value: numbers and numeric strings clamp to
/// `[0, 1]`; anything else takes the default.
fn clamp_confidence(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map_or(DEFAULT_CONFIDENCE, |c| c.clamp(0.0, 1.0))
}

/// One generic fact used when extraction yields nothing usable.
pub fn fallback_facts(topic: &str, sources: &[CandidateSource]) -> Vec<Fact> {
    vec![Fact {
        statement: format!(
            "Coverage of {topic} was gathered from {} source(s); see the references for detail.",
            sources.len()
        ),
        evidence_url: sources.first().map(|s| s.url.clone()),
        confidence: FALLBACK_CONFIDENCE,
    }]
}
