//! Configuration layering: defaults, rei.toml, environment, command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rei_content::ContentConfig;
use serde::Deserialize;

/// Configuration file structure (rei.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    content: ContentConfig,
}

/// Command-line overrides for the content configuration.
#[derive(Debug, Default, Args)]
pub struct ContentOverrides {
    /// Index file name prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Source directory, relative to the project root
    #[arg(long)]
    pub source: Option<String>,

    /// Output directory under public/, relative to the project root
    #[arg(long)]
    pub output: Option<String>,

    /// Route base under which the output directory is served
    #[arg(long)]
    pub route_base: Option<String>,

    /// Keep the existing output directory instead of deleting it first
    #[arg(long)]
    pub no_clean: bool,
}

impl ContentOverrides {
    fn apply(&self, mut config: ContentConfig) -> ContentConfig {
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(route_base) = &self.route_base {
            config.route_base = route_base.clone();
        }
        if self.no_clean {
            config.clean_output = false;
        }
        config
    }
}

/// Absolute project root.
pub fn project_root(root: &Path) -> Result<PathBuf> {
    fs::canonicalize(root).with_context(|| format!("Project root not found: {}", root.display()))
}

/// Load the effective configuration using the process environment.
pub fn load(root: &Path, config_path: &Path, overrides: &ContentOverrides) -> Result<ContentConfig> {
    load_with(root, config_path, overrides, |key| std::env::var(key).ok())
}

fn load_with<F>(
    root: &Path,
    config_path: &Path,
    overrides: &ContentOverrides,
    lookup: F,
) -> Result<ContentConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = root.join(config_path);
    let file = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        file
    } else {
        ConfigFile::default()
    };

    Ok(overrides.apply(file.content.overlay_env(lookup)))
}
