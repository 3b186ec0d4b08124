//! Resolved, validated locations for one content configuration.

use std::path::{Path, PathBuf};

use crate::config::{ContentConfig, DEFAULT_PREFIX};
use crate::path::{
    assert_output_confinement, normalize_route_base, resolve_safe_dir, sanitize_prefix, to_posix,
    to_url_path, ConfigError,
};
use crate::tree::index_file_name;

/// Name of the served public directory under the project root.
pub const PUBLIC_DIR: &str = "public";

/// Name of the blog directory directly under the content root.
pub const BLOG_DIR: &str = "blog";

/// Absolute locations and normalized names derived from a [`ContentConfig`].
///
/// Building a layout performs no filesystem access, so it is safe to use as
/// the validation step before anything destructive happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    /// Absolute source directory
    pub source_root: PathBuf,

    /// Absolute output directory
    pub output_root: PathBuf,

    /// Absolute `public/` directory
    pub public_root: PathBuf,

    /// Sanitized prefix
    pub prefix: String,

    /// Normalized route base
    pub route_base: String,

    /// Source directory as configured, slash-separated
    pub source_dir: String,

    /// Output directory as configured, slash-separated
    pub output_dir: String,

    /// `_{prefix}_tree.json`
    pub index_file_name: String,
}

impl ContentLayout {
    /// Validate `config` against `project_root` (which must be absolute).
    pub fn resolve(project_root: &Path, config: &ContentConfig) -> Result<Self, ConfigError> {
        let source_root = resolve_safe_dir(project_root, &config.source_dir)?;
        let output_root = resolve_safe_dir(project_root, &config.output_dir)?;

        let public_root = project_root.join(PUBLIC_DIR);
        assert_output_confinement(&output_root, &public_root)?;

        let prefix = sanitize_prefix(&config.prefix, DEFAULT_PREFIX);
        let index_file_name = index_file_name(&prefix);

        Ok(Self {
            source_root,
            output_root,
            public_root,
            prefix,
            route_base: normalize_route_base(&config.route_base),
            source_dir: posix_dir(&config.source_dir),
            output_dir: posix_dir(&config.output_dir),
            index_file_name,
        })
    }

    /// Absolute path of the persisted index.
    pub fn index_path(&self) -> PathBuf {
        self.output_root.join(&self.index_file_name)
    }

    /// URL under which the index is served.
    pub fn tree_url_path(&self) -> String {
        to_url_path(&self.route_base, &self.index_file_name)
    }

    /// Absolute directory holding blog artifacts.
    pub fn blog_dir(&self) -> PathBuf {
        self.output_root.join(BLOG_DIR)
    }

    /// Name of the root tree node: the last segment of the source directory.
    pub fn root_name(&self) -> String {
        self.source_dir
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .last()
            .unwrap_or("content")
            .to_string()
    }
}

fn posix_dir(dir: &str) -> String {
    let posix = to_posix(dir.trim());
    let trimmed = posix.trim_end_matches('/');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    trimmed.to_string()
}
