//! HTTP client construction for outbound provider calls.
//!
//! Every search, extraction, and model request goes through a
//! [`reqwest::Client`] built here, so the per-call timeout bound holds
//! across the whole pipeline. Clients present a rotating browser
//! User-Agent and keep cookies, which the scraped providers need.

use crate::error::BriefError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Browser User-Agent strings the scraped endpoints are served with.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] with the given per-call timeout.
///
/// Redirects are capped at ten hops, cookies persist for the client's
/// lifetime (consent walls on scraped pages), brotli and gzip bodies
/// decompress transparently, and the User-Agent is drawn from the
/// rotation list.
///
/// # Errors
///
/// Returns [`BriefError::Http`] if the client cannot be constructed.
pub fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, BriefError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(random_user_agent())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| BriefError::Http(format!("failed to build HTTP client: {e}")))
}

/// Pick one User-Agent from the rotation list at random.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
