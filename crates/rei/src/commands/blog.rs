//! Blog inspection commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use rei_content::{ContentConfig, ContentLayout};
use rei_server::BlogReader;

fn reader(root: &Path, config: &ContentConfig) -> Result<BlogReader> {
    let layout = ContentLayout::resolve(root, config)?;
    Ok(BlogReader::from_layout(&layout))
}

/// Print all summaries as JSON.
pub fn list(root: &Path, config: &ContentConfig) -> Result<()> {
    let posts = reader(root, config)?.list_summaries();
    println!("{}", serde_json::to_string_pretty(&posts)?);
    Ok(())
}

/// Print one post as JSON.
pub fn show(root: &Path, config: &ContentConfig, slug: &str) -> Result<()> {
    let reader = reader(root, config)?;
    let Some(post) = reader.read_one(slug) else {
        bail!("Blog post not found: {}", slug);
    };
    let json = serde_json::to_string_pretty(&post).context("Failed to encode post")?;
    println!("{json}");
    Ok(())
}
