//! Recursive content walker.
//!
//! Turns a source directory into a [`DirNode`] while writing the mirrored
//! output tree: markdown becomes a JSON artifact, everything else is copied.
//! Sibling entries are visited in parallel; each visit only touches its own
//! source entry and its own mirrored output path. When two siblings map to
//! the same output file, the last one in name order owns it and the others
//! are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rei_meta::parse_document;

use crate::layout::ContentLayout;
use crate::path::to_url_path;
use crate::tree::{ContentTreeNode, DirNode, DocArtifact, FileNode, MarkdownNode};

/// Deepest directory nesting the walker descends into.
pub const MAX_DEPTH: usize = 64;

/// A recovered problem encountered while walking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkWarning {
    #[error("Cannot read directory {path}: {message}")]
    UnreadableDir { path: String, message: String },

    #[error("Cannot read {path}: {message}")]
    UnreadableFile { path: String, message: String },

    #[error("Cannot write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Front matter in {path}: {message}")]
    Frontmatter { path: String, message: String },

    #[error("{path} is nested deeper than {limit} directories")]
    TooDeep { path: String, limit: usize },

    #[error("{path} skipped: its output is written by {owner}")]
    OutputCollision { path: String, owner: String },
}

impl WalkWarning {
    /// Source-relative path the warning refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::UnreadableDir { path, .. }
            | Self::UnreadableFile { path, .. }
            | Self::WriteFailed { path, .. }
            | Self::Frontmatter { path, .. }
            | Self::TooDeep { path, .. }
            | Self::OutputCollision { path, .. } => path,
        }
    }
}

/// Result of a walk: the root directory node plus recovered problems.
#[derive(Debug)]
pub struct WalkOutput {
    pub tree: DirNode,
    pub warnings: Vec<WalkWarning>,
}

/// Outcome of visiting one entry.
struct Visited {
    node: Option<ContentTreeNode>,
    warnings: Vec<WalkWarning>,
}

impl Visited {
    fn node(node: ContentTreeNode, warnings: Vec<WalkWarning>) -> Self {
        Self {
            node: Some(node),
            warnings,
        }
    }

    fn skipped(warning: WalkWarning) -> Self {
        Self {
            node: None,
            warnings: vec![warning],
        }
    }
}

/// Walks a source tree and materializes its mirror under the output root.
pub struct ContentWalker {
    output_root: PathBuf,
    source_dir: String,
    output_dir: String,
    route_base: String,
    root_name: String,
}

impl ContentWalker {
    pub fn new(layout: &ContentLayout) -> Self {
        Self {
            output_root: layout.output_root.clone(),
            source_dir: layout.source_dir.clone(),
            output_dir: layout.output_dir.clone(),
            route_base: layout.route_base.clone(),
            root_name: layout.root_name(),
        }
    }

    /// Walk `dir`, whose path relative to the source root is `rel`.
    ///
    /// Pass an empty `rel` for the source root itself. Never fails: entries
    /// that cannot be processed are skipped and reported as warnings.
    pub fn walk(&self, dir: &Path, rel: &str) -> WalkOutput {
        let depth = rel.split('/').filter(|s| !s.is_empty()).count();
        let (tree, mut warnings) = self.visit_dir(dir, rel, depth);
        warnings.sort_by(|a, b| a.path().cmp(b.path()));
        WalkOutput { tree, warnings }
    }

    fn dir_name(&self, rel: &str) -> String {
        match rel.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => self.root_name.clone(),
        }
    }

    fn visit_dir(&self, dir: &Path, rel: &str, depth: usize) -> (DirNode, Vec<WalkWarning>) {
        let mut node = DirNode {
            name: self.dir_name(rel),
            path: rel.to_string(),
            children: Vec::new(),
        };
        let mut warnings = Vec::new();

        if depth > MAX_DEPTH {
            warnings.push(WalkWarning::TooDeep {
                path: rel.to_string(),
                limit: MAX_DEPTH,
            });
            return (node, warnings);
        }

        let mut entries = Vec::new();
        match fs::read_dir(dir) {
            Ok(read_dir) => {
                for entry in read_dir {
                    match entry {
                        Ok(entry) => {
                            let name = entry.file_name().to_string_lossy().into_owned();
                            let path = entry.path();
                            let is_dir = path.is_dir();
                            entries.push((name, path, is_dir));
                        }
                        Err(e) => warnings.push(WalkWarning::UnreadableDir {
                            path: rel.to_string(),
                            message: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => warnings.push(WalkWarning::UnreadableDir {
                path: rel.to_string(),
                message: e.to_string(),
            }),
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let owners: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _, is_dir))| (output_name(name, *is_dir), i))
            .collect();

        let visited: Vec<Visited> = entries
            .par_iter()
            .enumerate()
            .map(|(i, (name, path, is_dir))| {
                let owner = owners
                    .get(&output_name(name, *is_dir))
                    .filter(|&&owner| owner != i)
                    .map(|&owner| entries[owner].0.as_str());
                self.visit_entry(name, path, rel, depth, owner)
            })
            .collect();

        for v in visited {
            node.children.extend(v.node);
            warnings.extend(v.warnings);
        }
        node.sort_children();

        (node, warnings)
    }

    /// `owner` names the sibling that writes this entry's output file, if not itself.
    fn visit_entry(
        &self,
        name: &str,
        path: &Path,
        parent_rel: &str,
        depth: usize,
        owner: Option<&str>,
    ) -> Visited {
        let rel = if parent_rel.is_empty() {
            name.to_string()
        } else {
            format!("{parent_rel}/{name}")
        };

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                return Visited::skipped(WalkWarning::UnreadableFile {
                    path: rel,
                    message: e.to_string(),
                })
            }
        };

        if let Some(owner) = owner {
            return Visited::skipped(WalkWarning::OutputCollision {
                path: rel,
                owner: owner.to_string(),
            });
        }

        if metadata.is_dir() {
            let (dir, warnings) = self.visit_dir(path, &rel, depth + 1);
            return Visited::node(ContentTreeNode::Dir(dir), warnings);
        }

        if is_markdown(name) {
            self.emit_markdown(name, path, rel)
        } else {
            self.copy_file(name, path, rel)
        }
    }

    fn emit_markdown(&self, name: &str, source: &Path, rel: String) -> Visited {
        let raw = match fs::read(source) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                return Visited::skipped(WalkWarning::UnreadableFile {
                    path: rel,
                    message: e.to_string(),
                })
            }
        };

        let doc = parse_document(&raw);
        let mut warnings = Vec::new();
        if let Some(issue) = &doc.issue {
            warnings.push(WalkWarning::Frontmatter {
                path: rel.clone(),
                message: issue.to_string(),
            });
        }

        let out_rel = swap_extension(&rel);
        let out_abs = self.output_root.join(&out_rel);
        let artifact = DocArtifact {
            meta: &doc.meta,
            content: &doc.content,
        };
        let written = serde_json::to_string_pretty(&artifact)
            .map_err(|e| e.to_string())
            .and_then(|json| write_file(&out_abs, json.as_bytes()).map_err(|e| e.to_string()));
        if let Err(message) = written {
            warnings.push(WalkWarning::WriteFailed {
                path: out_rel,
                message,
            });
            return Visited {
                node: None,
                warnings,
            };
        }

        tracing::debug!("Wrote {}", out_abs.display());

        Visited::node(
            ContentTreeNode::Markdown(MarkdownNode {
                name: name.to_string(),
                source_path: format!("{}/{}", self.source_dir, rel),
                output_path: format!("{}/{}", self.output_dir, out_rel),
                url_path: to_url_path(&self.route_base, &out_rel),
                path: rel,
                meta: doc.meta,
            }),
            warnings,
        )
    }

    fn copy_file(&self, name: &str, source: &Path, rel: String) -> Visited {
        let out_abs = self.output_root.join(&rel);
        let copied = ensure_parent_dir(&out_abs).and_then(|_| fs::copy(source, &out_abs));
        if let Err(e) = copied {
            return Visited::skipped(WalkWarning::WriteFailed {
                path: rel,
                message: e.to_string(),
            });
        }

        tracing::debug!("Copied {}", out_abs.display());

        Visited::node(
            ContentTreeNode::File(FileNode {
                name: name.to_string(),
                source_path: format!("{}/{}", self.source_dir, rel),
                output_path: format!("{}/{}", self.output_dir, rel),
                url_path: to_url_path(&self.route_base, &rel),
                path: rel,
            }),
            Vec::new(),
        )
    }
}

fn is_markdown(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Name an entry is written under in the output tree.
fn output_name(name: &str, is_dir: bool) -> String {
    if !is_dir && is_markdown(name) {
        swap_extension(name)
    } else {
        name.to_string()
    }
}

/// `blog/Post.MD` -> `blog/Post.json`
fn swap_extension(rel: &str) -> String {
    format!("{}.json", &rel[..rel.len() - 3])
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents)
}
