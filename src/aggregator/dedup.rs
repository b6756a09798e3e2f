//! Cross-provider result deduplication.

use crate::aggregator::url_normalize::normalize_url;
use crate::types::CandidateSource;
use std::collections::HashSet;

/// Characters of the lowercased title taken into the dedup key.
const TITLE_KEY_LEN: usize = 64;

/// Remove duplicate candidates, keeping the first occurrence.
///
/// The key is the canonicalised URL paired with a lowercased title
/// prefix, so the same page reported by two providers (or under two
/// tracking-decorated URLs) collapses to one entry. Input order is
/// provider priority order, which makes first-wins the right policy.
/// Running dedup twice yields the same output as running it once.
pub fn dedup_sources(sources: Vec<CandidateSource>) -> Vec<CandidateSource> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(sources.len());

    for source in sources {
        let title_key: String = source
            .title
            .to_lowercase()
            .chars()
            .take(TITLE_KEY_LEN)
            .collect();
        let key = (title_key, normalize_url(&source.url));
        if seen.insert(key) {
            unique.push(source);
        }
    }

    unique
}
