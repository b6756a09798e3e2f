//! Headless CLI: run one pipeline and write the artifacts.
//!
//! Usage: `brief <topic>` (or set `QUERY`). Configuration comes from
//! the environment; see [`marketbrief::PipelineConfig::from_env`].
//! All tracing output goes to stderr so that stdout stays clean for
//! the rendered brief.

use marketbrief::{artifacts, PipelineConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let topic = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_owned();
    let topic = if topic.is_empty() {
        std::env::var("QUERY").unwrap_or_default()
    } else {
        topic
    };
    if topic.trim().is_empty() {
        anyhow::bail!("usage: brief <topic> (or set QUERY)");
    }

    let out_dir: PathBuf = std::env::var("OUTPUT_DIR")
        .unwrap_or_else(|_| "artifacts".to_owned())
        .into();

    let config = PipelineConfig::from_env();
    let report = marketbrief::run(&topic, config).await.map_err(|e| {
        tracing::error!(error = %e, "pipeline failed");
        anyhow::anyhow!("pipeline failed: {e}")
    })?;

    for stage_error in &report.stage_errors {
        tracing::warn!(%stage_error, "run degraded");
    }

    let (markdown_path, json_path) = artifacts::write_artifacts(&out_dir, &report.brief)?;
    tracing::info!(
        markdown = %markdown_path.display(),
        json = %json_path.display(),
        "brief written"
    );

    println!("{}", report.brief.document);
    Ok(())
}
