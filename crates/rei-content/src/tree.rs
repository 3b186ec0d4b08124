//! Content tree and index envelope types.

use rei_meta::DocMeta;
use serde::{Deserialize, Serialize};

/// Suffix of the persisted index file name.
pub const TREE_FILE_SUFFIX: &str = "_tree.json";

/// Index file name for a sanitized prefix: `_{prefix}_tree.json`.
pub fn index_file_name(prefix: &str) -> String {
    format!("_{prefix}{TREE_FILE_SUFFIX}")
}

/// A node in the mirrored content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentTreeNode {
    #[serde(rename = "dir")]
    Dir(DirNode),

    #[serde(rename = "md")]
    Markdown(MarkdownNode),

    #[serde(rename = "file")]
    File(FileNode),
}

/// A directory and its children, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirNode {
    #[serde(default)]
    pub name: String,
    /// Slash-separated path relative to the source root (empty for the root)
    pub path: String,
    #[serde(default)]
    pub children: Vec<ContentTreeNode>,
}

/// A markdown document converted to a JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownNode {
    #[serde(default)]
    pub name: String,
    pub path: String,
    pub source_path: String,
    pub output_path: String,
    pub url_path: String,
    #[serde(default)]
    pub meta: DocMeta,
}

/// Any other file, copied byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    #[serde(default)]
    pub name: String,
    pub path: String,
    pub source_path: String,
    pub output_path: String,
    pub url_path: String,
}

impl ContentTreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Dir(node) => &node.name,
            Self::Markdown(node) => &node.name,
            Self::File(node) => &node.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Dir(node) => &node.path,
            Self::Markdown(node) => &node.path,
            Self::File(node) => &node.path,
        }
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            Self::Dir(node) => Some(node),
            Self::Markdown(_) | Self::File(_) => None,
        }
    }
}

/// Node counts for a tree, excluding the root directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub directories: usize,
    pub documents: usize,
    pub files: usize,
}

impl DirNode {
    /// Order children by name (byte order of the UTF-8 name).
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Immediate child directory with the given name.
    pub fn child_dir(&self, name: &str) -> Option<&DirNode> {
        self.children
            .iter()
            .filter_map(ContentTreeNode::as_dir)
            .find(|dir| dir.name == name)
    }

    /// Immediate markdown children, in tree order.
    pub fn markdown_children(&self) -> impl Iterator<Item = &MarkdownNode> {
        self.children.iter().filter_map(|child| match child {
            ContentTreeNode::Markdown(node) => Some(node),
            ContentTreeNode::Dir(_) | ContentTreeNode::File(_) => None,
        })
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for child in &self.children {
            match child {
                ContentTreeNode::Dir(dir) => {
                    let nested = dir.stats();
                    stats.directories += 1 + nested.directories;
                    stats.documents += nested.documents;
                    stats.files += nested.files;
                }
                ContentTreeNode::Markdown(_) => stats.documents += 1,
                ContentTreeNode::File(_) => stats.files += 1,
            }
        }
        stats
    }
}

/// The persisted index: build metadata wrapping the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEnvelope {
    pub prefix: String,
    pub route_base: String,
    pub source_dir: String,
    pub output_dir: String,
    pub generated_at: String,
    pub tree_url_path: String,
    pub tree: ContentTreeNode,
}

/// Per-document artifact: metadata fields followed by the body.
#[derive(Debug, Serialize)]
pub struct DocArtifact<'a> {
    #[serde(flatten)]
    pub meta: &'a DocMeta,
    pub content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markdown(name: &str) -> ContentTreeNode {
        ContentTreeNode::Markdown(MarkdownNode {
            name: name.to_string(),
            path: format!("blog/{name}"),
            source_path: format!("content/blog/{name}"),
            output_path: format!("public/content/blog/{}", name.replace(".md", ".json")),
            url_path: format!("/content/blog/{}", name.replace(".md", ".json")),
            meta: DocMeta {
                title: Some("Hello".into()),
                ..Default::default()
            },
        })
    }

    #[test]
    fn serializes_with_type_tags() {
        let node = markdown("hello.md");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "md");
        assert_eq!(json["outputPath"], "public/content/blog/hello.json");
        assert_eq!(json["urlPath"], "/content/blog/hello.json");
        assert_eq!(json["meta"], serde_json::json!({ "title": "Hello" }));
    }

    #[test]
    fn reads_back_partial_nodes() {
        let node: ContentTreeNode = serde_json::from_str(r#"{"type":"dir","path":""}"#).unwrap();

        assert_eq!(node, ContentTreeNode::Dir(DirNode::default()));
    }

    #[test]
    fn sorts_children_and_finds_dirs() {
        let mut root = DirNode {
            name: "content".into(),
            path: String::new(),
            children: vec![
                markdown("b.md"),
                ContentTreeNode::Dir(DirNode {
                    name: "blog".into(),
                    path: "blog".into(),
                    children: vec![markdown("a.md")],
                }),
                markdown("a.md"),
            ],
        };
        root.sort_children();

        let names: Vec<&str> = root.children.iter().map(ContentTreeNode::name).collect();
        assert_eq!(names, vec!["a.md", "b.md", "blog"]);
        assert!(root.child_dir("blog").is_some());
        assert!(root.child_dir("a.md").is_none());
        assert_eq!(
            root.stats(),
            TreeStats {
                directories: 1,
                documents: 3,
                files: 0
            }
        );
    }

    #[test]
    fn artifact_flattens_meta_before_content() {
        let meta = DocMeta {
            title: Some("Hello".into()),
            tags: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        let json = serde_json::to_string(&DocArtifact {
            meta: &meta,
            content: "# Hi",
        })
        .unwrap();

        assert_eq!(json, r##"{"title":"Hello","tags":["a","b"],"content":"# Hi"}"##);
    }
}
