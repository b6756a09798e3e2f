//! Search fan-out across the provider chain.

use crate::aggregator::dedup::dedup_sources;
use crate::aggregator::scoring::{rank_sources, select_diverse};
use crate::aggregator::variants::query_variants;
use crate::config::PipelineConfig;
use crate::retry::{retry, FailureTally};
use crate::search::SearchProvider;
use crate::types::CandidateSource;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

/// Run every query variant against every provider and return the
/// deduplicated, ranked, domain-diverse source set.
///
/// Every variant × provider pair contributes to the raw pool; a wide
/// pool is what gives dedup and ranking something to choose from, so
/// a productive early variant never cuts the fan-out short. Variants
/// run sequentially (the failure tally is checked between them), and
/// within a variant all providers are queried concurrently. Each
/// provider call is retried per the configured policy; a call that
/// exhausts its retries is recorded on `tally` and the remaining
/// providers still contribute. Cancellation stops new variants from
/// being issued.
pub async fn gather(
    providers: &[Box<dyn SearchProvider>],
    topic: &str,
    config: &PipelineConfig,
    tally: &FailureTally,
    cancel: &CancellationToken,
) -> Vec<CandidateSource> {
    let variants = query_variants(topic, config.max_query_variants);
    let policy = config.retry_policy();

    let mut pool: Vec<CandidateSource> = Vec::new();

    for (i, variant) in variants.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::debug!(variant_index = i, "search cancelled, stopping fan-out");
            break;
        }
        if i > 0 && tally.is_broken(config.failure_limit) {
            tracing::warn!(
                failures = tally.count(),
                "failure limit reached, skipping remaining query variants"
            );
            break;
        }

        tracing::trace!(variant = variant.as_str(), "querying providers");

        let calls = providers.iter().map(|provider| {
            let variant = variant.clone();
            let policy = &policy;
            async move {
                let outcome = retry(policy, || provider.search(&variant, config.max_sources)).await;
                (provider.name(), outcome)
            }
        });

        for (name, outcome) in join_all(calls).await {
            match outcome {
                Ok(results) => {
                    tracing::debug!(provider = name, count = results.len(), "provider results");
                    pool.extend(results);
                }
                Err(e) => {
                    let failures = tally.record();
                    tracing::warn!(provider = name, failures, error = %e, "provider failed");
                }
            }
        }
    }

    let unique = dedup_sources(pool);
    let ranked = rank_sources(unique, topic);
    let selected = select_diverse(ranked, config.max_sources);
    tracing::debug!(count = selected.len(), "source set selected");
    selected
}
