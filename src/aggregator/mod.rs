//! Multi-provider search aggregation.
//!
//! Expands the topic into query variants, fans out across the provider
//! chain, then deduplicates, ranks, and selects a domain-diverse source
//! set. The pipeline's research stage is a thin wrapper over
//! [`gather`].

pub mod dedup;
pub mod scoring;
pub mod search;
pub mod url_normalize;
pub mod variants;

pub use dedup::dedup_sources;
pub use scoring::{rank_sources, select_diverse};
pub use search::gather;
pub use url_normalize::{domain_of, normalize_url};
pub use variants::query_variants;
