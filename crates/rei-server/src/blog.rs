//! Read layer over a persisted content index.
//!
//! Lists blog summaries from the index envelope and loads single posts from
//! their JSON artifacts. Failures never escape: a missing or corrupt index
//! lists as empty, and a missing or invalid post reads as `None`.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rei_content::{ContentLayout, BLOG_DIR};
use rei_meta::parse_date;

/// Title length above which a warning is logged.
const TITLE_SOFT_LIMIT: usize = 100;
/// Description length above which a warning is logged.
const DESCRIPTION_SOFT_LIMIT: usize = 160;

/// A post as listed on index pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Route of the post page
    pub to: String,
}

/// A full post, as stored in its JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub content: String,
}

/// Why a read failed. Logged, never returned from the public read API.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid blog post structure: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Index tree root is not a directory")]
    MalformedIndex,
}

/// Outcome of validating a post artifact.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a parsed artifact for the fields a [`BlogPost`] requires.
pub fn validate_blog_post(value: &Value) -> Validation {
    let mut report = Validation::default();

    let Some(post) = value.as_object() else {
        report.errors.push("Blog post must be an object".into());
        return report;
    };

    let text = |key: &str| post.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

    match text("title") {
        None => report.errors.push("Title is required and must be a string".into()),
        Some(title) if title.chars().count() > TITLE_SOFT_LIMIT => report.warnings.push(format!(
            "Title is longer than {TITLE_SOFT_LIMIT} characters, consider shortening"
        )),
        Some(_) => {}
    }

    match text("date") {
        None => report.errors.push("Date is required and must be a string".into()),
        Some(date) if parse_date(date).is_none() => {
            report.errors.push("Date must be a valid date string".into())
        }
        Some(_) => {}
    }

    match text("description") {
        None => report
            .errors
            .push("Description is required and must be a string".into()),
        Some(desc) if desc.chars().count() > DESCRIPTION_SOFT_LIMIT => {
            report.warnings.push(format!(
                "Description is longer than {DESCRIPTION_SOFT_LIMIT} characters, consider shortening"
            ))
        }
        Some(_) => {}
    }

    if text("content").is_none() {
        report.errors.push("Content is required and must be a string".into());
    }

    match post.get("tags") {
        Some(Value::Array(tags)) => {
            if tags.iter().any(|tag| !tag.is_string()) {
                report.errors.push("All tags must be strings".into());
            } else if tags.is_empty() {
                report.warnings.push("No tags provided".into());
            }
        }
        _ => report.errors.push("Tags must be an array".into()),
    }

    if post.get("cover").is_some_and(|cover| !cover.is_string()) {
        report.errors.push("Cover must be a string if provided".into());
    }

    report
}

/// Parse and validate a post artifact.
pub fn parse_blog_post(json: &str) -> Result<BlogPost, ReadError> {
    let value: Value = serde_json::from_str(json)?;

    let validation = validate_blog_post(&value);
    if !validation.is_valid() {
        return Err(ReadError::Invalid(validation.errors));
    }
    for warning in &validation.warnings {
        tracing::warn!("Blog post: {}", warning);
    }

    Ok(serde_json::from_value(value)?)
}

/// Whether `slug` can safely name a file inside the blog directory.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.trim().is_empty() && slug != ".." && !slug.contains(['/', '\\', '\0'])
}

/// Slug of a markdown file name: the name without its `.md` suffix.
fn slug_of(name: &str) -> &str {
    let cut = name.len().saturating_sub(3);
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".md") => &name[..cut],
        _ => name,
    }
}

fn children(node: &Value) -> &[Value] {
    node.get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn is_type(node: &Value, kind: &str) -> bool {
    node.get("type").and_then(Value::as_str) == Some(kind)
}

/// A scalar metadata value as text; empty strings and non-scalars are `None`.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn meta_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => scalar(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Summary of one markdown node, read field by field so a damaged node
/// cannot take its siblings down with it.
fn project(node: &Value) -> Option<BlogPostSummary> {
    let Some(name) = node
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
    else {
        tracing::warn!("Skipping blog index entry without a name: {}", node);
        return None;
    };

    let meta = match node.get("meta") {
        Some(meta @ Value::Object(_)) => Some(meta),
        None | Some(Value::Null) => None,
        Some(other) => {
            tracing::warn!("Ignoring malformed metadata of {}: {}", name, other);
            None
        }
    };
    let field = |key: &str| meta.and_then(|m| m.get(key)).and_then(scalar);

    let slug = slug_of(name).to_string();
    Some(BlogPostSummary {
        to: format!("/{BLOG_DIR}/{slug}"),
        slug,
        title: field("title").unwrap_or_default(),
        date: field("date").unwrap_or_default(),
        description: field("description").unwrap_or_default(),
        tags: meta_tags(meta.and_then(|m| m.get("tags"))),
        cover: field("cover"),
    })
}

/// Project the `blog` directory of an index into summaries, newest first.
///
/// Posts with equal dates keep tree (name) order; posts without a parseable
/// date follow all dated posts, also in tree order.
pub fn summarize(index: &Value) -> Vec<BlogPostSummary> {
    let Some(tree) = index.get("tree") else {
        return Vec::new();
    };
    let Some(blog) = children(tree).iter().find(|child| {
        is_type(child, "dir") && child.get("name").and_then(Value::as_str) == Some(BLOG_DIR)
    }) else {
        return Vec::new();
    };

    let mut posts: Vec<_> = children(blog)
        .iter()
        .filter(|child| is_type(child, "md"))
        .filter_map(project)
        .map(|summary| (parse_date(&summary.date), summary))
        .collect();

    posts.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    posts.into_iter().map(|(_, summary)| summary).collect()
}

/// Reads blog data produced by a content build.
///
/// Holds no state between calls; safe to share and call concurrently.
#[derive(Debug, Clone)]
pub struct BlogReader {
    index_path: PathBuf,
    blog_dir: PathBuf,
}

impl BlogReader {
    pub fn new(index_path: impl Into<PathBuf>, blog_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            blog_dir: blog_dir.into(),
        }
    }

    /// Reader for the output of a build with this layout.
    pub fn from_layout(layout: &ContentLayout) -> Self {
        Self::new(layout.index_path(), layout.blog_dir())
    }

    /// Load the index as raw JSON, checking only that its tree is a directory.
    ///
    /// Nodes are not decoded here; [`summarize`] reads each one on its own.
    pub fn load_index(&self) -> Result<Value, ReadError> {
        let json = fs::read_to_string(&self.index_path).map_err(|source| ReadError::Io {
            path: self.index_path.clone(),
            source,
        })?;
        let index: Value = serde_json::from_str(&json)?;
        if !index.get("tree").is_some_and(|tree| is_type(tree, "dir")) {
            return Err(ReadError::MalformedIndex);
        }
        Ok(index)
    }

    /// All blog posts, newest first. Empty when the index is unusable.
    pub fn list_summaries(&self) -> Vec<BlogPostSummary> {
        match self.load_index() {
            Ok(index) => summarize(&index),
            Err(e) => {
                tracing::warn!("Failed to read blog posts: {}", e);
                Vec::new()
            }
        }
    }

    /// Load one post, reporting why it could not be read.
    pub fn try_read_one(&self, slug: &str) -> Result<BlogPost, ReadError> {
        if !is_valid_slug(slug) {
            return Err(ReadError::InvalidSlug(slug.to_string()));
        }

        let path = self.blog_dir.join(format!("{slug}.json"));
        let json = fs::read_to_string(&path).map_err(|source| ReadError::Io { path, source })?;
        parse_blog_post(&json)
    }

    /// Load one post; `None` when it is missing, unreadable or invalid.
    pub fn read_one(&self, slug: &str) -> Option<BlogPost> {
        match self.try_read_one(slug) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!("Failed to read blog post {}: {}", slug, e);
                None
            }
        }
    }
}
