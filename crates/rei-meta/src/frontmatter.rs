//! Front matter extraction.

use serde_yaml::Value;

use crate::meta::{normalize, DocMeta};

/// A markdown document split into normalized metadata and body text.
#[derive(Debug)]
pub struct ParsedDoc {
    /// Normalized metadata (empty when the front matter was absent or broken)
    pub meta: DocMeta,

    /// Body text with `\n` line endings
    pub content: String,

    /// Front matter problem that was recovered from, if any
    pub issue: Option<FrontmatterError>,
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed front matter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),
}

/// Locate the front matter block.
///
/// Returns the raw YAML text and the body that follows the closing delimiter,
/// or `None` when the document does not open with a `---` line.
fn locate(source: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let Some(rest) = source.strip_prefix("---") else {
        return Ok(None);
    };

    let (opening_tail, after_open) = match rest.find('\n') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };
    if !opening_tail.trim().is_empty() {
        return Ok(None);
    }

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok(Some((&after_open[..offset], &after_open[offset + line.len()..])));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

fn parse_yaml(yaml: &str) -> Result<Option<Value>, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(yaml)
        .map(Some)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))
}

/// Split front matter from the body.
///
/// Expects `\n` line endings. Returns the parsed YAML (if a non-empty block is
/// present) and the remaining body.
pub fn split_frontmatter(source: &str) -> Result<(Option<Value>, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    match locate(source)? {
        Some((yaml, body)) => Ok((parse_yaml(yaml)?, body)),
        None => Ok((None, source)),
    }
}

/// Parse a markdown document into metadata and body.
///
/// Never fails: a broken front matter block degrades to empty metadata and is
/// reported through [`ParsedDoc::issue`].
pub fn parse_document(raw: &str) -> ParsedDoc {
    let normalized = raw.replace("\r\n", "\n");
    let text = normalized
        .strip_prefix('\u{feff}')
        .unwrap_or(normalized.as_str());

    match locate(text) {
        Ok(None) => ParsedDoc {
            meta: DocMeta::default(),
            content: text.to_string(),
            issue: None,
        },
        Ok(Some((yaml, body))) => match parse_yaml(yaml) {
            Ok(data) => ParsedDoc {
                meta: data.as_ref().map(normalize).unwrap_or_default(),
                content: body.to_string(),
                issue: None,
            },
            Err(e) => ParsedDoc {
                meta: DocMeta::default(),
                content: body.to_string(),
                issue: Some(e),
            },
        },
        Err(e) => ParsedDoc {
            meta: DocMeta::default(),
            content: text.to_string(),
            issue: Some(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = "---\ntitle: Button\ndescription: A clickable button\n---\n# Button\n";

        let (data, body) = split_frontmatter(source).unwrap();
        let data = data.unwrap();

        assert_eq!(data["title"].as_str(), Some("Button"));
        assert_eq!(data["description"].as_str(), Some("A clickable button"));
        assert_eq!(body, "# Button\n");
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo front matter here.";

        let (data, body) = split_frontmatter(source).unwrap();

        assert!(data.is_none());
        assert_eq!(body, source);
    }

    #[test]
    fn horizontal_rule_is_not_frontmatter() {
        let source = "----\ntitle: nope\n----\n";

        let (data, body) = split_frontmatter(source).unwrap();

        assert!(data.is_none());
        assert_eq!(body, source);
    }

    #[test]
    fn empty_block_yields_no_data() {
        let (data, body) = split_frontmatter("---\n---\nbody").unwrap();

        assert!(data.is_none());
        assert_eq!(body, "body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = split_frontmatter("---\ntitle: Test\n# No closing");

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = split_frontmatter("---\ntitle: [invalid yaml\n---\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn parse_normalizes_line_endings() {
        let doc = parse_document("---\r\ntitle: Hello\r\ntags: \"a, b\"\r\n---\r\n# Hi\r\n\r\nText");

        assert!(doc.issue.is_none());
        assert_eq!(doc.meta.title.as_deref(), Some("Hello"));
        assert_eq!(doc.meta.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(doc.content, "# Hi\n\nText");
    }

    #[test]
    fn invalid_yaml_degrades_to_empty_meta() {
        let doc = parse_document("---\ntitle: [broken\n---\nBody");

        assert_eq!(doc.meta, DocMeta::default());
        assert_eq!(doc.content, "Body");
        assert!(matches!(doc.issue, Some(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn unclosed_block_keeps_whole_text() {
        let doc = parse_document("---\ntitle: Test\nBody");

        assert_eq!(doc.meta, DocMeta::default());
        assert_eq!(doc.content, "---\ntitle: Test\nBody");
        assert!(matches!(doc.issue, Some(FrontmatterError::Unclosed)));
    }
}
