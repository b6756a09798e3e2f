//! Language capability contract and implementations.
//!
//! The pipeline treats the language model as a pure text-completion
//! function with no guaranteed output structure — every structured
//! consumer (facts, references) parses defensively. Two implementations
//! are provided: an OpenAI-compatible HTTP client and a deterministic
//! stub that never fails, selected when no API key is configured so the
//! pipeline always runs end-to-end.

use crate::config::LlmSettings;
use crate::error::{BriefError, Result};
use crate::http;
use async_trait::async_trait;
use std::sync::Arc;

/// A black-box text-completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a prompt into free-form text.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError::Llm`] on transport failure or an empty
    /// completion. Callers must treat failure as recoverable.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Human-readable model name for logging.
    fn name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client.
///
/// Talks to any server exposing `/v1/chat/completions` (Groq, OpenAI,
/// OpenRouter, local servers) using the connection details from config.
pub struct ChatCompletionsModel {
    api_url: String,
    api_key: String,
    model: String,
    timeout_seconds: u64,
}

impl ChatCompletionsModel {
    pub fn new(settings: &LlmSettings, timeout_seconds: u64) -> Self {
        Self {
            api_url: settings.api_url.trim_end_matches('/').to_owned(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            timeout_seconds,
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let client = http::build_client(self.timeout_seconds)?;
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
            "stream": false,
        });

        let url = format!("{}/chat/completions", self.api_url);
        let mut request = client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BriefError::Llm(format!("completion request failed: {e}")))?
            .error_for_status()
            .map_err(|e| BriefError::Llm(format!("completion HTTP error: {e}")))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BriefError::Llm(format!("completion response read failed: {e}")))?;

        let text = value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_owned();

        if text.is_empty() {
            return Err(BriefError::Llm("empty completion".into()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Deterministic stub model that never fails.
///
/// Echoes the first lines of the prompt back as a degenerate summary.
/// Used when no API key is present, and in tests.
pub struct StubModel;

/// Lines of prompt echoed back by [`StubModel`].
const STUB_LINE_CAP: usize = 48;

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let lines: Vec<&str> = prompt
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(STUB_LINE_CAP)
            .collect();
        Ok(format!("{}\n\n(stub summary)", lines.join("\n")))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Select a model from config: HTTP when a key is present, stub otherwise.
pub fn model_from_settings(settings: &LlmSettings, timeout_seconds: u64) -> Arc<dyn LanguageModel> {
    if settings.api_key.trim().is_empty() {
        tracing::debug!("no LLM API key configured, using stub model");
        Arc::new(StubModel)
    } else {
        Arc::new(ChatCompletionsModel::new(settings, timeout_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_echoes_prompt_lines() {
        let text = StubModel
            .complete("first line\n\n  second line  \n")
            .await
            .expect("stub never fails");
        assert!(text.starts_with("first line\nsecond line"));
        assert!(text.ends_with("(stub summary)"));
    }

    #[tokio::test]
    async fn stub_caps_echoed_lines() {
        let prompt: String = (0..100).map(|i| format!("line {i}\n")).collect();
        let text = StubModel.complete(&prompt).await.expect("stub never fails");
        let echoed = text.lines().filter(|l| l.starts_with("line ")).count();
        assert_eq!(echoed, STUB_LINE_CAP);
    }

    #[test]
    fn empty_key_selects_stub() {
        let settings = LlmSettings::default();
        let model = model_from_settings(&settings, 15);
        assert_eq!(model.name(), "stub");
    }

    #[test]
    fn key_selects_http_model() {
        let settings = LlmSettings {
            api_key: "sk-test".into(),
            model: "test-model".into(),
            ..Default::default()
        };
        let model = model_from_settings(&settings, 15);
        assert_eq!(model.name(), "test-model");
    }

    #[test]
    fn http_model_trims_trailing_slash() {
        let settings = LlmSettings {
            api_url: "https://api.example.com/v1/".into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        let model = ChatCompletionsModel::new(&settings, 15);
        assert_eq!(model.api_url, "https://api.example.com/v1");
    }
}
