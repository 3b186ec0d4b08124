//! Content build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rei_content::{BuildReport, ContentConfig, TreeSerializer};

/// Run one full build off the async runtime.
pub async fn build_once(root: PathBuf, config: ContentConfig) -> Result<BuildReport> {
    let report = tokio::task::spawn_blocking(move || TreeSerializer::new(root, config).build())
        .await
        .context("Build task failed")??;

    tracing::info!(
        "Built {} documents and {} files in {} directories in {}ms",
        report.documents,
        report.files,
        report.directories,
        report.duration_ms
    );
    if !report.warnings.is_empty() {
        tracing::warn!("{} entries were skipped or degraded", report.warnings.len());
    }
    tracing::info!("Index: {} ({})", report.index_path.display(), report.tree_url_path);

    Ok(report)
}

/// Run the build command.
pub async fn run(root: PathBuf, config: ContentConfig) -> Result<()> {
    tracing::info!("Building content from {}...", config.source_dir);

    build_once(root, config).await?;

    Ok(())
}
