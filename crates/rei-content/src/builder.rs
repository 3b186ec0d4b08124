//! Full content build: validate, clean, walk, persist the index.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use rei_meta::format_iso;

use crate::config::ContentConfig;
use crate::layout::ContentLayout;
use crate::path::ConfigError;
use crate::tree::{ContentTreeNode, IndexEnvelope};
use crate::walker::{ContentWalker, WalkWarning};

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Absolute path of the written index
    pub index_path: PathBuf,

    /// URL under which the index is served
    pub tree_url_path: String,

    /// Number of directories below the root
    pub directories: usize,

    /// Number of markdown documents converted
    pub documents: usize,

    /// Number of other files copied
    pub files: usize,

    /// Problems that were recovered from
    pub warnings: Vec<WalkWarning>,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Rejected before anything was deleted or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to clean output directory {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builds the mirrored output tree and its index envelope.
///
/// Must not run twice concurrently against the same output directory.
pub struct TreeSerializer {
    project_root: PathBuf,
    config: ContentConfig,
}

impl TreeSerializer {
    /// `project_root` must be absolute; all configured directories are
    /// resolved against it.
    pub fn new(project_root: impl Into<PathBuf>, config: ContentConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Validate the configuration without touching the filesystem.
    pub fn layout(&self) -> Result<ContentLayout, ConfigError> {
        ContentLayout::resolve(&self.project_root, &self.config)
    }

    /// Run one full build.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        let layout = self.layout()?;

        if self.config.clean_output {
            match fs::remove_dir_all(&layout.output_root) {
                Ok(()) => tracing::debug!("Removed {}", layout.output_root.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(BuildError::Clean {
                        path: layout.output_root.clone(),
                        source,
                    })
                }
            }
        }

        fs::create_dir_all(&layout.output_root).map_err(|source| BuildError::Write {
            path: layout.output_root.clone(),
            source,
        })?;

        tracing::info!(
            "Walking {} into {}",
            layout.source_root.display(),
            layout.output_root.display()
        );

        let output = ContentWalker::new(&layout).walk(&layout.source_root, "");
        for warning in &output.warnings {
            tracing::warn!("{}", warning);
        }

        let stats = output.tree.stats();
        let envelope = IndexEnvelope {
            prefix: layout.prefix.clone(),
            route_base: layout.route_base.clone(),
            source_dir: layout.source_dir.clone(),
            output_dir: layout.output_dir.clone(),
            generated_at: format_iso(Utc::now()),
            tree_url_path: layout.tree_url_path(),
            tree: ContentTreeNode::Dir(output.tree),
        };

        let index_path = layout.index_path();
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(&index_path, json).map_err(|source| BuildError::Write {
            path: index_path.clone(),
            source,
        })?;

        Ok(BuildReport {
            index_path,
            tree_url_path: envelope.tree_url_path,
            directories: stats.directories,
            documents: stats.documents,
            files: stats.files,
            warnings: output.warnings,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
