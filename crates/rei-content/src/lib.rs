//! Content tree builder for rei.
//!
//! Mirrors a directory of markdown documents and static assets into a served
//! output tree, converting markdown to JSON artifacts, and persists a single
//! index envelope describing the whole tree.

pub mod builder;
pub mod config;
pub mod layout;
pub mod path;
pub mod tree;
pub mod walker;

pub use builder::{BuildError, BuildReport, TreeSerializer};
pub use config::{parse_bool, ContentConfig};
pub use layout::{ContentLayout, BLOG_DIR, PUBLIC_DIR};
pub use path::ConfigError;
pub use tree::{ContentTreeNode, DirNode, FileNode, IndexEnvelope, MarkdownNode, TreeStats};
pub use walker::{ContentWalker, WalkOutput, WalkWarning};
