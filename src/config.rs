//! Pipeline configuration with sensible defaults.
//!
//! [`PipelineConfig`] controls source limits, timeouts, retry behaviour,
//! the circuit-breaker threshold, and provider connection details. It is
//! an explicit struct passed into the orchestrator constructor — nothing
//! in the core reads ambient process state. [`PipelineConfig::from_env`]
//! exists for the binary entry point, which is the only place environment
//! variables are consulted.

use crate::error::BriefError;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Connection details for the language capability.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL including `/v1` (e.g. `https://api.groq.com/openai/v1`).
    pub api_url: String,
    /// Bearer token. Empty selects the deterministic stub model.
    pub api_key: String,
    /// Model identifier sent in requests.
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1".to_owned(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_owned(),
        }
    }
}

/// API credentials for the keyed search/extraction providers.
///
/// Providers whose key is absent are simply left out of the fallback
/// chain — the keyless scrape and encyclopedic providers always remain.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub tavily_api_key: Option<String>,
    pub brave_api_key: Option<String>,
    pub news_api_key: Option<String>,
    /// Key for the hosted url-to-markdown conversion endpoint.
    pub rapidapi_key: Option<String>,
}

/// Configuration for one pipeline run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum sources in the final ranked source set.
    pub max_sources: usize,
    /// Floor below which the source set is flagged as degraded quality.
    /// Not a hard failure — the run proceeds and records a stage error.
    pub min_non_empty_sources: usize,
    /// Maximum facts extracted per run.
    pub max_facts: usize,
    /// Cap on deterministic query variant expansion.
    pub max_query_variants: usize,
    /// Per-call HTTP timeout in seconds for every outbound provider call.
    pub timeout_seconds: u64,
    /// Retry attempts per provider call for transient errors.
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds (doubled per attempt, ≤20% jitter).
    pub retry_base_delay_ms: u64,
    /// Hard provider failures tolerated before optional work is skipped.
    pub failure_limit: u32,
    /// Line cap per extracted section, bounding downstream prompt size.
    pub section_line_budget: usize,
    /// Character cap per source snippet in the fact-extraction prompt.
    pub snippet_char_budget: usize,
    /// Language capability connection.
    pub llm: LlmSettings,
    /// Search/extraction provider credentials.
    pub credentials: ProviderCredentials,
    /// Base URL overrides for provider endpoints. `None` means the
    /// provider's production endpoint; tests point these at a mock server.
    pub endpoints: EndpointOverrides,
}

/// Optional endpoint overrides, one per external service.
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    pub tavily: Option<String>,
    pub brave: Option<String>,
    pub newsapi: Option<String>,
    pub duckduckgo: Option<String>,
    pub wikipedia: Option<String>,
    pub reader: Option<String>,
    pub url2md: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sources: 10,
            min_non_empty_sources: 4,
            max_facts: 8,
            max_query_variants: 8,
            timeout_seconds: 15,
            retry_attempts: 3,
            retry_base_delay_ms: 500,
            failure_limit: 3,
            section_line_budget: 220,
            snippet_char_budget: 900,
            llm: LlmSettings::default(),
            credentials: ProviderCredentials::default(),
            endpoints: EndpointOverrides::default(),
        }
    }
}

impl PipelineConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_sources` must be greater than 0
    /// - `max_facts` must be greater than 0
    /// - `max_query_variants` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `min_non_empty_sources` must not exceed `max_sources`
    pub fn validate(&self) -> Result<(), BriefError> {
        if self.max_sources == 0 {
            return Err(BriefError::Config(
                "max_sources must be greater than 0".into(),
            ));
        }
        if self.max_facts == 0 {
            return Err(BriefError::Config(
                "max_facts must be greater than 0".into(),
            ));
        }
        if self.max_query_variants == 0 {
            return Err(BriefError::Config(
                "max_query_variants must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(BriefError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.min_non_empty_sources > self.max_sources {
            return Err(BriefError::Config(
                "min_non_empty_sources must not exceed max_sources".into(),
            ));
        }
        Ok(())
    }

    /// Retry policy derived from the configured attempt/delay knobs.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// Build a config from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    ///
    /// Recognised variables: `MAX_SOURCES`, `MIN_NON_EMPTY_SOURCES`,
    /// `HTTP_TIMEOUT`, `LLM_API_URL`, `LLM_API_KEY`, `LLM_MODEL`,
    /// `TAVILY_API_KEY`, `BRAVE_API_KEY`, `NEWS_API_KEY`,
    /// `RAPIDAPI_KEY`, `URL2MD_BASE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_parse::<usize>("MAX_SOURCES") {
            config.max_sources = v;
        }
        if let Some(v) = env_parse::<usize>("MIN_NON_EMPTY_SOURCES") {
            config.min_non_empty_sources = v;
        }
        if let Some(v) = env_parse::<u64>("HTTP_TIMEOUT") {
            config.timeout_seconds = v;
        }
        if let Some(v) = env_string("LLM_API_URL") {
            config.llm.api_url = v;
        }
        if let Some(v) = env_string("LLM_API_KEY") {
            config.llm.api_key = v;
        }
        if let Some(v) = env_string("LLM_MODEL") {
            config.llm.model = v;
        }
        config.credentials.tavily_api_key = env_string("TAVILY_API_KEY");
        config.credentials.brave_api_key = env_string("BRAVE_API_KEY");
        config.credentials.news_api_key = env_string("NEWS_API_KEY");
        config.credentials.rapidapi_key = env_string("RAPIDAPI_KEY");
        config.endpoints.url2md = env_string("URL2MD_BASE");
        config
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.parse().ok())
}
