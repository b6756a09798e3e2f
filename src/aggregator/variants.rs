//! Deterministic query variant expansion.
//!
//! A single topic string fans out into a small set of related queries
//! so that narrow providers still surface breadth. Expansion is purely
//! lexical, so the same topic always yields the same variants.

/// Suffixes appended to the topic to probe market-specific angles.
const MODIFIER_SUFFIXES: &[&str] = &["market size", "roadmap", "competitors", "adoption trends"];

/// Expand a topic into query variants, capped at `max_variants`.
///
/// In order: the literal topic, the quoted topic (multi-word topics
/// only), each comma/slash-delimited segment, then the topic combined
/// with each modifier suffix. Duplicates keep their first position.
pub fn query_variants(topic: &str, max_variants: usize) -> Vec<String> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Vec::new();
    }

    let mut variants: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        let candidate = candidate.trim().to_owned();
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    push(topic.to_owned());

    if topic.split_whitespace().count() > 1 {
        push(format!("\"{topic}\""));
    }

    for segment in topic.split([',', '/']) {
        push(segment.to_owned());
    }

    for suffix in MODIFIER_SUFFIXES {
        push(format!("{topic} {suffix}"));
    }

    variants.truncate(max_variants);
    variants
}
