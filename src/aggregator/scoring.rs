//! Relevance ranking and domain-diverse selection.
//!
//! Score is topic-term overlap plus a small recency bonus. Ranking is
//! a stable sort, so equally-scored candidates keep their provider
//! priority order from aggregation.

use crate::aggregator::url_normalize::domain_of;
use crate::types::CandidateSource;
use chrono::{DateTime, NaiveDate, Utc};

/// Weight of the recency term relative to one topic-term hit.
const RECENCY_WEIGHT: f64 = 0.1;

/// Topic terms used for overlap scoring: lowercase words longer than
/// two characters, so stopwords like "of" and "ai" articles drop out.
fn topic_terms(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(str::to_owned)
        .collect()
}

/// Relevance score for one candidate against the topic.
///
/// `term_hits + 0.1 * (1 / age_days)` where `term_hits` counts topic
/// terms appearing in the title or description and `age_days` is
/// clamped to at least one. A missing or unparsable timestamp
/// contributes no recency bonus.
pub fn score_source(source: &CandidateSource, terms: &[String], now: DateTime<Utc>) -> f64 {
    let haystack = format!("{} {}", source.title, source.description).to_lowercase();
    let term_hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count() as f64;

    let recency = source
        .published_at
        .as_deref()
        .and_then(|raw| parse_timestamp(raw))
        .map(|published| {
            let age_days = (now - published).num_seconds() as f64 / 86_400.0;
            RECENCY_WEIGHT / age_days.max(1.0)
        })
        .unwrap_or(0.0);

    term_hits + recency
}

/// Parse provider timestamps: RFC 3339 first, then a bare date.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Sort candidates by descending relevance score (stable).
pub fn rank_sources(mut sources: Vec<CandidateSource>, topic: &str) -> Vec<CandidateSource> {
    let terms = topic_terms(topic);
    let now = Utc::now();
    sources.sort_by(|a, b| {
        score_source(b, &terms, now).total_cmp(&score_source(a, &terms, now))
    });
    sources
}

/// Pick up to `max_sources` candidates, preferring domain diversity.
///
/// First pass takes the highest-ranked candidate per domain; if that
/// leaves room, remaining candidates backfill in rank order regardless
/// of domain.
pub fn select_diverse(ranked: Vec<CandidateSource>, max_sources: usize) -> Vec<CandidateSource> {
    let mut selected: Vec<CandidateSource> = Vec::new();
    let mut leftovers: Vec<CandidateSource> = Vec::new();
    let mut seen_domains = std::collections::HashSet::new();

    for source in ranked {
        if selected.len() >= max_sources {
            break;
        }
        if seen_domains.insert(domain_of(&source.url)) {
            selected.push(source);
        } else {
            leftovers.push(source);
        }
    }

    for source in leftovers {
        if selected.len() >= max_sources {
            break;
        }
        selected.push(source);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(title: &str, description: &str, url: &str) -> CandidateSource {
        CandidateSource::new(title, url, description, "Tavily")
    }

    #[test]
    fn term_hits_dominate() {
        let terms = topic_terms("edge ai chips");
        let relevant = source("Edge chips report", "chips market", "https://a.com");
        let unrelated = source("Gardening tips", "roses", "https://b.com");
        let now = Utc::now();
        assert!(score_source(&relevant, &terms, now) > score_source(&unrelated, &terms, now));
    }

    #[test]
    fn short_words_excluded_from_terms() {
        let terms = topic_terms("rise of ai in retail");
        assert_eq!(terms, vec!["rise", "retail"]);
    }

    #[test]
    fn fresh_source_outranks_stale_on_tie() {
        let terms = topic_terms("fintech");
        let now = Utc::now();
        let mut fresh = source("fintech update", "", "https://a.com");
        fresh.published_at = Some((now - chrono::Duration::days(2)).to_rfc3339());
        let mut stale = source("fintech update", "", "https://b.com");
        stale.published_at = Some((now - chrono::Duration::days(400)).to_rfc3339());
        assert!(score_source(&fresh, &terms, now) > score_source(&stale, &terms, now));
    }

    #[test]
    fn recency_bonus_capped_at_one_day() {
        let terms = topic_terms("fintech");
        let now = Utc::now();
        let mut future = source("fintech", "", "https://a.com");
        future.published_at = Some(now.to_rfc3339());
        let score = score_source(&future, &terms, now);
        assert!(score <= 1.0 + RECENCY_WEIGHT + f64::EPSILON);
    }

    #[test]
    fn unparsable_date_gets_no_bonus() {
        let terms = topic_terms("fintech");
        let now = Utc::now();
        let mut bad = source("fintech", "", "https://a.com");
        bad.published_at = Some("last Tuesday".into());
        let plain = source("fintech", "", "https://b.com");
        assert_eq!(
            score_source(&bad, &terms, now),
            score_source(&plain, &terms, now)
        );
    }

    #[test]
    fn bare_date_parses() {
        assert!(parse_timestamp("2025-03-10").is_some());
        assert!(parse_timestamp("2025-03-10T12:00:00Z").is_some());
        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn ranking_is_stable_for_equal_scores() {
        let a = source("fintech one", "", "https://a.com");
        let b = source("fintech two", "", "https://b.com");
        let ranked = rank_sources(vec![a, b], "fintech");
        assert_eq!(ranked[0].url, "https://a.com");
    }

    #[test]
    fn diverse_selection_prefers_new_domains() {
        let ranked = vec![
            source("A1", "", "https://a.com/1"),
            source("A2", "", "https://a.com/2"),
            source("B1", "", "https://b.com/1"),
        ];
        let selected = select_diverse(ranked, 2);
        let urls: Vec<&str> = selected.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/1", "https://b.com/1"]);
    }

    #[test]
    fn backfill_when_domains_run_out() {
        let ranked = vec![
            source("A1", "", "https://a.com/1"),
            source("A2", "", "https://a.com/2"),
            source("A3", "", "https://a.com/3"),
        ];
        let selected = select_diverse(ranked, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].url, "https://a.com/2");
    }
}
