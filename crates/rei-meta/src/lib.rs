//! Front matter extraction and metadata normalization.
//!
//! This crate splits markdown documents into their YAML front matter and body,
//! and maps arbitrary front matter values into the fixed [`DocMeta`] shape.

pub mod date;
pub mod frontmatter;
pub mod meta;

pub use date::{format_iso, parse_date};
pub use frontmatter::{parse_document, split_frontmatter, FrontmatterError, ParsedDoc};
pub use meta::{normalize, DocMeta};
