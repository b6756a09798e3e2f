//! Error types for the marketbrief pipeline.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.

/// Errors that can occur while producing a brief.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// The topic was empty or rejected by the input guardrail. This is
    /// the only error class surfaced before any provider call.
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// An HTTP request to an external provider failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A provider response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The language model call failed or returned unusable output.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for marketbrief results.
pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_topic() {
        let err = BriefError::InvalidTopic("topic is empty".into());
        assert_eq!(err.to_string(), "invalid topic: topic is empty");
    }

    #[test]
    fn display_http() {
        let err = BriefError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = BriefError::Parse("unexpected JSON shape".into());
        assert_eq!(err.to_string(), "parse error: unexpected JSON shape");
    }

    #[test]
    fn display_config() {
        let err = BriefError::Config("max_sources must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_sources must be > 0");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BriefError = io.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BriefError>();
    }
}
