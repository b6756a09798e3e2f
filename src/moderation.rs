//! Input guardrail for research topics.
//!
//! Rejecting a topic here is the only way a run aborts before any
//! provider call is made. The check is a simple word-boundary match
//! against a small blocklist.

const BLOCKED_WORDS: &[&str] = &["kill", "hate", "slur"];

/// Returns `true` if the topic passes the guardrail.
///
/// Empty text passes; the empty-topic check happens separately and
/// produces a different rejection message.
pub fn passes_moderation(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    !text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| {
            let lower = word.to_lowercase();
            BLOCKED_WORDS.contains(&lower.as_str())
        })
}
