//! Watch command: full rebuild on every source change.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rei_content::{ContentConfig, TreeSerializer};
use rei_server::{FileWatcher, WatchEvent};

use super::build::build_once;

/// Quiet period collapsing a burst of events into one rebuild.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// What changed during one burst of events.
#[derive(Debug, Default, PartialEq, Eq)]
struct ChangeSet {
    documents: usize,
    assets: usize,
    removed: usize,
}

impl ChangeSet {
    fn record(&mut self, event: &WatchEvent) {
        match event {
            WatchEvent::Markdown(path) => {
                tracing::debug!("Document changed: {}", path.display());
                self.documents += 1;
            }
            WatchEvent::Asset(path) => {
                tracing::debug!("Asset changed: {}", path.display());
                self.assets += 1;
            }
            WatchEvent::Removed(path) => {
                tracing::info!("Removed: {}", path.display());
                self.removed += 1;
            }
        }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} document, {} asset and {} removal events",
            self.documents, self.assets, self.removed
        )
    }
}

/// Run the watch command.
pub async fn run(root: PathBuf, config: ContentConfig) -> Result<()> {
    let layout = TreeSerializer::new(root.clone(), config.clone()).layout()?;

    anyhow::ensure!(
        layout.source_root.is_dir(),
        "Source directory {} does not exist",
        layout.source_root.display()
    );

    build_once(root.clone(), config.clone()).await?;

    let (_watcher, mut rx) =
        FileWatcher::new(&[layout.source_root.clone()]).context("Failed to watch sources")?;

    tracing::info!("Watching {} for changes", layout.source_root.display());

    while let Some(event) = rx.recv().await {
        let mut changes = ChangeSet::default();
        changes.record(&event);

        // Drain the rest of the burst before rebuilding.
        while let Ok(Some(event)) = tokio::time::timeout(DEBOUNCE, rx.recv()).await {
            changes.record(&event);
        }

        tracing::info!("Rebuilding after {}", changes);

        // Rebuilds run one at a time: the next one starts only after this await.
        if let Err(e) = build_once(root.clone(), config.clone()).await {
            tracing::error!("Rebuild failed: {:#}", e);
        }
    }

    Ok(())
}
