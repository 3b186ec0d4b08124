//! Serve command: blog API plus the public directory.

use std::path::PathBuf;

use anyhow::Result;
use rei_content::{ContentConfig, TreeSerializer};
use rei_server::{BlogReader, ContentServer, ServerConfig};

use super::build::build_once;

/// Run the serve command.
pub async fn run(
    root: PathBuf,
    config: ContentConfig,
    host: String,
    port: u16,
    build: bool,
) -> Result<()> {
    let layout = TreeSerializer::new(root.clone(), config.clone()).layout()?;

    if build {
        build_once(root, config).await?;
    } else if !layout.index_path().exists() {
        tracing::warn!(
            "No index at {}. Run 'rei build' first.",
            layout.index_path().display()
        );
    }

    let server_config = ServerConfig {
        public_dir: layout.public_root.clone(),
        port,
        host,
    };

    ContentServer::new(server_config, BlogReader::from_layout(&layout))
        .start()
        .await?;

    Ok(())
}
