//! Artifact persistence: the rendered brief and its JSON twin.

use crate::error::{BriefError, Result};
use crate::types::Brief;
use std::path::{Path, PathBuf};

/// Write `brief.md` and `brief.json` into `dir`, creating it first.
///
/// The markdown file is the brief's document verbatim; the JSON file is
/// the pretty-printed serialization of the whole [`Brief`].
///
/// # Errors
///
/// Returns [`BriefError::Io`] on filesystem failure and
/// [`BriefError::Parse`] if serialization fails.
pub fn write_artifacts(dir: &Path, brief: &Brief) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;

    let markdown_path = dir.join("brief.md");
    std::fs::write(&markdown_path, &brief.document)?;

    let json_path = dir.join("brief.json");
    let json = serde_json::to_string_pretty(brief)
        .map_err(|e| BriefError::Parse(format!("brief serialization failed: {e}")))?;
    std::fs::write(&json_path, json)?;

    tracing::info!(dir = %dir.display(), "artifacts written");
    Ok((markdown_path, json_path))
}
