//! # marketbrief
//!
//! Turn a free-text research topic into a cited market brief.
//!
//! The pipeline runs four stages: research (multi-provider search
//! aggregation), analyze (structured fact extraction), write (content
//! extraction and brief synthesis), and review (caps and terminal
//! guarantees). Providers are ordered fallback chains; every outbound
//! call goes through bounded retry, and a run-level failure tally
//! sheds optional work once too many providers have failed.
//!
//! ## Design
//!
//! - Search fan-out is concurrent per query variant and merges results
//!   from paid APIs, a keyless HTML scrape, and an encyclopedic
//!   fallback
//! - Results are deduplicated on canonicalised URLs and ranked by
//!   topic-term overlap with a small recency bonus
//! - Per-source content extraction walks a fallback chain and
//!   substitutes a placeholder document rather than failing
//! - Graceful degradation end to end: a run that starts always ends
//!   with a structurally valid brief, with problems recorded on the
//!   run report
//!
//! Works with no credentials at all: keyless providers cover search
//! and extraction, and a deterministic stub stands in for the language
//! model.

pub mod aggregator;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod extract;
pub mod facts;
pub mod http;
pub mod llm;
pub mod moderation;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod search;
pub mod types;

pub use config::PipelineConfig;
pub use error::{BriefError, Result};
pub use pipeline::{Orchestrator, RunReport, Stage, StageError};
pub use types::{Brief, CandidateSource, Fact, Section};

/// Run the full pipeline for one topic.
///
/// Convenience wrapper that builds an [`Orchestrator`] with the default
/// provider chains and runs it once.
///
/// # Errors
///
/// Returns [`BriefError::Config`] for an invalid configuration and
/// [`BriefError::InvalidTopic`] for an empty or moderated-out topic.
/// Provider and model failures never fail the run; they degrade the
/// brief and are recorded on the [`RunReport`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> marketbrief::Result<()> {
/// let config = marketbrief::PipelineConfig::default();
/// let report = marketbrief::run("solid state batteries", config).await?;
/// println!("{}", report.brief.document);
/// # Ok(())
/// # }
/// ```
pub async fn run(topic: &str, config: PipelineConfig) -> Result<RunReport> {
    let orchestrator = Orchestrator::new(config)?;
    orchestrator.run(topic).await
}
