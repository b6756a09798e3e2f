//! Bounded retry with exponential backoff and the run-level failure tally.
//!
//! [`retry`] is the shared primitive wrapping every outbound provider
//! call: transient errors are retried with exponential backoff plus
//! random jitter, bounded by [`RetryPolicy::attempts`]. Empty results are
//! a caller concern — they are soft outcomes, not errors, and never
//! consume the retry budget.
//!
//! [`FailureTally`] counts hard failures across a whole run. Once the
//! count crosses the configured limit, callers skip optional outbound
//! work instead of retrying it (the circuit-breaker policy).

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Retry policy for one provider call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per call. Zero is treated as one.
    pub attempts: u32,
    /// Base backoff delay; attempt `n` waits `base × 2^n` plus jitter.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy capped to at most `attempts` tries, keeping the delay.
    ///
    /// Used by the content-extraction chain, where per-call latency is
    /// high and 1–2 attempts per link is the right budget.
    pub fn capped(&self, attempts: u32) -> Self {
        Self {
            attempts: self.attempts.min(attempts).max(1),
            base_delay: self.base_delay,
        }
    }

    /// Backoff delay before re-attempting after failure number `attempt`
    /// (0-based): `base × 2^attempt` plus random jitter of at most 20%
    /// of the base delay, to avoid thundering-herd retries against a
    /// single vendor.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter_ms = (self.base_delay.as_millis() as f64 * 0.2 * rand::random::<f64>()) as u64;
        exp + Duration::from_millis(jitter_ms)
    }
}

/// Run `op` up to `policy.attempts` times, sleeping between failures.
///
/// Returns the first `Ok`, or the last error once attempts are
/// exhausted. The operation is rebuilt for each attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(err);
                }
                tokio::time::sleep(policy.backoff_delay(attempt - 1)).await;
            }
        }
    }
}

/// Run-level hard-failure counter shared across concurrent provider calls.
///
/// Exhausted retries against a provider count as one hard failure. The
/// tally belongs to a single run; it is never shared between runs.
#[derive(Debug, Default)]
pub struct FailureTally {
    count: AtomicU32,
}

impl FailureTally {
    /// Record one hard failure and return the new count.
    pub fn record(&self) -> u32 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The number of hard failures recorded so far.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Whether the failure count has reached the circuit-breaker limit.
    pub fn is_broken(&self, limit: u32) -> bool {
        self.count() >= limit
    }
}
