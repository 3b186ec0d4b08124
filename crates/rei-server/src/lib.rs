//! Read layer and HTTP surface for rei content.
//!
//! Reads the index envelope and post artifacts written by `rei-content`,
//! serves them over HTTP, and watches sources for rebuilds.

pub mod blog;
pub mod server;
pub mod watcher;

pub use blog::{BlogPost, BlogPostSummary, BlogReader, ReadError};
pub use server::{router, ContentServer, ServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
