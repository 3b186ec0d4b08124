//! rei CLI - builds and serves a mirrored content tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod settings;

use settings::ContentOverrides;

#[derive(Parser)]
#[command(name = "rei")]
#[command(about = "Builds a served content tree and JSON index from markdown sources")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root that all content paths are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Path to rei.toml config file, relative to the project root
    #[arg(short, long, default_value = "rei.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the output tree and index once
    Build {
        #[command(flatten)]
        content: ContentOverrides,
    },

    /// Build, then rebuild whenever the sources change
    Watch {
        #[command(flatten)]
        content: ContentOverrides,
    },

    /// Serve the blog API and the public directory
    Serve {
        #[command(flatten)]
        content: ContentOverrides,

        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Serve the existing output without building first
        #[arg(long)]
        no_build: bool,
    },

    /// Inspect blog posts from the built index
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },
}

#[derive(Subcommand)]
enum BlogAction {
    /// Print post summaries, newest first, as JSON
    List,

    /// Print one post as JSON
    Show {
        /// Post slug (file name without .md)
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let root = settings::project_root(&cli.root)?;

    // Execute command
    match cli.command {
        Commands::Build { content } => {
            let config = settings::load(&root, &cli.config, &content)?;
            commands::build::run(root, config).await?;
        }
        Commands::Watch { content } => {
            let config = settings::load(&root, &cli.config, &content)?;
            commands::watch::run(root, config).await?;
        }
        Commands::Serve {
            content,
            port,
            host,
            no_build,
        } => {
            let config = settings::load(&root, &cli.config, &content)?;
            commands::serve::run(root, config, host, port, !no_build).await?;
        }
        Commands::Blog { action } => {
            let config = settings::load(&root, &cli.config, &ContentOverrides::default())?;
            match action {
                BlogAction::List => commands::blog::list(&root, &config)?,
                BlogAction::Show { slug } => commands::blog::show(&root, &config, &slug)?,
            }
        }
    }

    Ok(())
}
