//! Source directory watching for rebuilds.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Markdown document was created or modified
    Markdown(PathBuf),

    /// Any other file or directory was created or modified
    Asset(PathBuf),

    /// Something was removed
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Markdown(path) | Self::Asset(path) | Self::Removed(path) => path,
        }
    }
}

/// File watcher for detecting source changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events. Fails with
    /// `NotFound` if any path does not exist.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if !path.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Cannot watch missing path {}", path.display()),
                ));
            }
            watcher
                .watch(path, RecursiveMode::Recursive)
                .map_err(std::io::Error::other)?;
        }

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind) {
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let is_markdown = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));

    match kind {
        EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
        EventKind::Create(_) | EventKind::Modify(_) if is_markdown => {
            Some(WatchEvent::Markdown(path.to_path_buf()))
        }
        EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Asset(path.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::EventKind;
    use tempfile::tempdir;

    #[test]
    fn classifies_events() {
        let md = Path::new("content/blog/post.MD");
        let png = Path::new("content/logo.png");

        assert_eq!(
            classify_event(md, &EventKind::Modify(ModifyKind::Any)),
            Some(WatchEvent::Markdown(md.to_path_buf()))
        );
        assert_eq!(
            classify_event(png, &EventKind::Create(CreateKind::File)),
            Some(WatchEvent::Asset(png.to_path_buf()))
        );
        assert_eq!(
            classify_event(md, &EventKind::Remove(RemoveKind::File)),
            Some(WatchEvent::Removed(md.to_path_buf()))
        );
        assert_eq!(classify_event(md, &EventKind::Any), None);
    }

    #[test]
    fn missing_path_is_an_error() {
        let temp = tempdir().unwrap();

        let err = FileWatcher::new(&[temp.path().join("nope")]).err().unwrap();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let test_file = temp.path().join("post.md");

        let (watcher, mut rx) = FileWatcher::new(&[temp.path().to_path_buf()]).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "# Created").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert!(event.unwrap().is_some(), "channel should not be closed");
    }
}
