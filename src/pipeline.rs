//! Pipeline orchestration: Research → Analyze → Write → Review.
//!
//! The stage machine advances unconditionally; stage failures degrade
//! the output and are recorded on the run report instead of aborting.
//! The only hard failures are an empty or moderated-out topic and an
//! invalid configuration. A completed run always carries a brief with
//! a non-empty document.

use crate::aggregator::gather;
use crate::config::PipelineConfig;
use crate::error::{BriefError, Result};
use crate::extract::{default_extractors, extract_with_fallback, ExtractProvider};
use crate::facts::{extract_facts, fallback_facts};
use crate::llm::{model_from_settings, LanguageModel};
use crate::moderation::passes_moderation;
use crate::report::{no_sources_document, render_fallback, synthesize, REVIEW_SUMMARY_CHAR_CAP};
use crate::retry::FailureTally;
use crate::search::{default_providers, wikipedia, SearchProvider};
use crate::types::{Brief, CandidateSource, Fact};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Research,
    Analyze,
    Write,
    Review,
    Done,
}

impl Stage {
    /// The stage that follows this one. Transitions are unconditional.
    pub fn next(self) -> Stage {
        match self {
            Stage::Research => Stage::Analyze,
            Stage::Analyze => Stage::Write,
            Stage::Write => Stage::Review,
            Stage::Review | Stage::Done => Stage::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Research => "research",
            Stage::Analyze => "analyze",
            Stage::Write => "write",
            Stage::Review => "review",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// One recoverable problem recorded during a run.
#[derive(Debug, Clone)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// The outcome of one pipeline run.
#[derive(Debug)]
pub struct RunReport {
    pub brief: Brief,
    /// Recoverable problems, in the order they occurred.
    pub stage_errors: Vec<StageError>,
    /// Hard provider failures counted by the circuit breaker.
    pub failure_count: u32,
}

impl RunReport {
    /// Whether the run completed without any degradation.
    pub fn is_clean(&self) -> bool {
        self.stage_errors.is_empty()
    }
}

/// The four-stage pipeline runner.
///
/// Holds the provider chains and the model; each [`run`] call is an
/// independent run with its own failure tally.
///
/// [`run`]: Orchestrator::run
pub struct Orchestrator {
    config: PipelineConfig,
    llm: Arc<dyn LanguageModel>,
    searchers: Vec<Box<dyn SearchProvider>>,
    extractors: Vec<Box<dyn ExtractProvider>>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Build an orchestrator with the default provider chains.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Config`] when the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let llm = model_from_settings(&config.llm, config.timeout_seconds);
        let searchers = default_providers(&config);
        let extractors = default_extractors(&config);
        Ok(Self {
            config,
            llm,
            searchers,
            extractors,
            cancel: CancellationToken::new(),
        })
    }

    /// Build an orchestrator with injected components. Used by tests
    /// and by callers bringing their own providers or model.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Config`] when the configuration is invalid.
    pub fn with_components(
        config: PipelineConfig,
        llm: Arc<dyn LanguageModel>,
        searchers: Vec<Box<dyn SearchProvider>>,
        extractors: Vec<Box<dyn ExtractProvider>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            llm,
            searchers,
            extractors,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that cancels in-flight runs. Once cancelled, no new
    /// outbound calls are issued; stages still complete with whatever
    /// data is already held.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline for one topic.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::InvalidTopic`] for an empty topic or one
    /// rejected by moderation. Every other failure is absorbed into
    /// the run report.
    pub async fn run(&self, topic: &str) -> Result<RunReport> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(BriefError::InvalidTopic("topic is empty".into()));
        }
        if !passes_moderation(topic) {
            return Err(BriefError::InvalidTopic(
                "topic rejected by moderation".into(),
            ));
        }

        tracing::info!(topic, "pipeline run starting");

        let tally = FailureTally::default();
        let mut errors: Vec<StageError> = Vec::new();
        let mut sources: Vec<CandidateSource> = Vec::new();
        let mut facts: Vec<Fact> = Vec::new();
        let mut brief: Option<Brief> = None;

        let mut stage = Stage::Research;
        while stage != Stage::Done {
            tracing::debug!(stage = %stage, "entering stage");
            match stage {
                Stage::Research => {
                    sources = self.research(topic, &tally, &mut errors).await;
                }
                Stage::Analyze => {
                    let (extracted, warning) = if self.cancel.is_cancelled() {
                        (
                            fallback_facts(topic, &sources),
                            Some("run cancelled before fact extraction".to_owned()),
                        )
                    } else {
                        extract_facts(self.llm.as_ref(), topic, &sources, &self.config).await
                    };
                    facts = extracted;
                    if let Some(message) = warning {
                        errors.push(StageError {
                            stage: Stage::Analyze,
                            message,
                        });
                    }
                }
                Stage::Write => {
                    self.fill_content(&mut sources, &tally, &mut errors).await;
                    let (written, warning) = if self.cancel.is_cancelled() {
                        let document = if sources.is_empty() {
                            no_sources_document(topic)
                        } else {
                            render_fallback(topic, &facts, &sources)
                        };
                        let brief = Brief {
                            topic: topic.to_owned(),
                            summary: "Summary unavailable; see references below.".to_owned(),
                            facts: facts.clone(),
                            sources: sources.clone(),
                            document,
                        };
                        (brief, Some("run cancelled before writing".to_owned()))
                    } else {
                        synthesize(
                            self.llm.as_ref(),
                            topic,
                            facts.clone(),
                            sources.clone(),
                            &self.config,
                        )
                        .await
                    };
                    brief = Some(written);
                    if let Some(message) = warning {
                        errors.push(StageError {
                            stage: Stage::Write,
                            message,
                        });
                    }
                }
                Stage::Review => {
                    brief = Some(self.review(topic, brief.take(), &facts, &sources));
                }
                Stage::Done => unreachable!("loop exits before Done runs"),
            }
            stage = stage.next();
        }

        let brief = match brief {
            Some(brief) => brief,
            // The Write stage always sets the brief; this is belt and
            // braces for the terminal guarantee.
            None => Brief {
                topic: topic.to_owned(),
                summary: "Summary unavailable; see references below.".to_owned(),
                facts: facts.clone(),
                sources: sources.clone(),
                document: render_fallback(topic, &facts, &sources),
            },
        };

        let failure_count = tally.count();
        tracing::info!(
            sources = brief.sources.len(),
            facts = brief.facts.len(),
            errors = errors.len(),
            failure_count,
            "pipeline run finished"
        );

        Ok(RunReport {
            brief,
            stage_errors: errors,
            failure_count,
        })
    }

    /// Research stage: gather the source set and enrich wikipedia
    /// candidates with article extracts.
    async fn research(
        &self,
        topic: &str,
        tally: &FailureTally,
        errors: &mut Vec<StageError>,
    ) -> Vec<CandidateSource> {
        let mut sources =
            gather(&self.searchers, topic, &self.config, tally, &self.cancel).await;

        let wiki_base = self
            .config
            .endpoints
            .wikipedia
            .clone()
            .unwrap_or_else(|| "https://en.wikipedia.org".to_owned());
        for source in &mut sources {
            if self.cancel.is_cancelled() {
                break;
            }
            if !source.content.trim().is_empty() || !wikipedia::is_article_url(&source.url) {
                continue;
            }
            match wikipedia::fetch_extract(&wiki_base, self.config.timeout_seconds, &source.url)
                .await
            {
                Ok(extract) if !extract.is_empty() => source.content = extract,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(url = %source.url, error = %e, "wikipedia enrichment failed");
                }
            }
        }

        let non_empty = sources.iter().filter(|s| s.has_text()).count();
        if non_empty < self.config.min_non_empty_sources {
            errors.push(StageError {
                stage: Stage::Research,
                message: format!(
                    "degraded source set: {non_empty} usable of {} required",
                    self.config.min_non_empty_sources
                ),
            });
        }

        sources
    }

    /// Fill in page content for sources that have none, through the
    /// extraction chain. Skipped wholesale once the failure limit is
    /// crossed or the run is cancelled; sections then fall back to the
    /// descriptions already held.
    async fn fill_content(
        &self,
        sources: &mut [CandidateSource],
        tally: &FailureTally,
        errors: &mut Vec<StageError>,
    ) {
        if sources.iter().all(|s| !s.content.trim().is_empty()) {
            return;
        }
        if tally.is_broken(self.config.failure_limit) {
            errors.push(StageError {
                stage: Stage::Write,
                message: format!(
                    "skipping content extraction after {} provider failures",
                    tally.count()
                ),
            });
            return;
        }
        if self.cancel.is_cancelled() {
            errors.push(StageError {
                stage: Stage::Write,
                message: "skipping content extraction: run cancelled".to_owned(),
            });
            return;
        }

        let policy = self.config.retry_policy();
        let extractions = sources
            .iter_mut()
            .filter(|s| s.content.trim().is_empty())
            .map(|source| {
            let policy = policy.clone();
            async move {
                let text =
                    extract_with_fallback(&self.extractors, &source.url, &policy, tally).await;
                source.content = text;
            }
        });
        join_all(extractions).await;
    }

    /// Review stage: enforce the summary cap and the terminal
    /// guarantee of a non-empty document.
    fn review(
        &self,
        topic: &str,
        brief: Option<Brief>,
        facts: &[Fact],
        sources: &[CandidateSource],
    ) -> Brief {
        let mut brief = brief.unwrap_or_else(|| Brief {
            topic: topic.to_owned(),
            summary: "Summary unavailable; see references below.".to_owned(),
            facts: facts.to_vec(),
            sources: sources.to_vec(),
            document: String::new(),
        });

        if brief.summary.chars().count() > REVIEW_SUMMARY_CHAR_CAP {
            brief.summary = brief.summary.chars().take(REVIEW_SUMMARY_CHAR_CAP).collect();
        }
        if brief.summary.trim().is_empty() {
            brief.summary = "Summary unavailable; see references below.".to_owned();
        }
        if brief.document.trim().is_empty() {
            brief.document = render_fallback(topic, &brief.facts, &brief.sources);
        }

        brief
    }
}
