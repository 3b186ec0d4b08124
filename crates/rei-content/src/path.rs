//! Path confinement and normalization rules.
//!
//! Everything here is lexical: no function touches the filesystem, so a
//! rejected configuration never causes a read or write.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static PREFIX_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("prefix pattern is valid"));

/// Default route base used when the configured one is blank.
pub const DEFAULT_ROUTE_BASE: &str = "/content";

/// Unsafe or invalid path and route configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Directory path is required")]
    MissingPath,

    #[error("Absolute paths are not allowed: {0}")]
    AbsolutePath(String),

    #[error("Path must be within project root: {0}")]
    EscapesRoot(String),

    #[error("Output directory must be inside 'public': {0}")]
    OutsidePublicRoot(String),

    #[error("Output directory must not be the 'public' root: {0}")]
    PublicRoot(String),
}

/// Convert host path separators to forward slashes.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolve `relative` against `root`, refusing anything that leaves `root`.
///
/// `root` must already be absolute. The result is a strict descendant of
/// `root`; a path that resolves to `root` itself is rejected too.
pub fn resolve_safe_dir(root: &Path, relative: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = relative.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingPath);
    }

    let posix = to_posix(trimmed);
    let rel = Path::new(&posix);
    if rel.has_root() || rel.is_absolute() {
        return Err(ConfigError::AbsolutePath(relative.to_string()));
    }

    let mut segments = Vec::new();
    for component in rel.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(ConfigError::EscapesRoot(relative.to_string()));
                }
            }
            Component::Normal(segment) => segments.push(segment),
            Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::AbsolutePath(relative.to_string()));
            }
        }
    }

    if segments.is_empty() {
        return Err(ConfigError::EscapesRoot(relative.to_string()));
    }

    Ok(segments
        .into_iter()
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment)))
}

/// Whether `target` is a strict descendant of `base`.
pub fn is_within(base: &Path, target: &Path) -> bool {
    match target.strip_prefix(base) {
        Ok(rest) => {
            let mut components = rest.components().peekable();
            components.peek().is_some()
                && components.all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        }
        Err(_) => false,
    }
}

/// Refuse output directories that are not strictly inside the public root.
///
/// This guards the clean step, which deletes the output directory.
pub fn assert_output_confinement(output_abs: &Path, public_root_abs: &Path) -> Result<(), ConfigError> {
    if output_abs == public_root_abs {
        return Err(ConfigError::PublicRoot(output_abs.display().to_string()));
    }
    if !is_within(public_root_abs, output_abs) {
        return Err(ConfigError::OutsidePublicRoot(output_abs.display().to_string()));
    }
    Ok(())
}

/// Keep only `[A-Za-z0-9_-]`, collapsing every other run into one `_`.
pub fn sanitize_prefix(prefix: &str, default: &str) -> String {
    let sanitized = PREFIX_DISALLOWED.replace_all(prefix.trim(), "_");
    if sanitized.is_empty() {
        default.to_string()
    } else {
        sanitized.into_owned()
    }
}

/// Ensure a leading `/` and strip a trailing `/` (except for the root `/`).
pub fn normalize_route_base(route_base: &str) -> String {
    let trimmed = match route_base.trim() {
        "" => DEFAULT_ROUTE_BASE,
        other => other,
    };

    let with_slash = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    match with_slash.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => with_slash,
    }
}

/// Join a route base and a slash-separated relative path into a URL path.
pub fn to_url_path(route_base: &str, rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    if rel.is_empty() {
        route_base.to_string()
    } else if route_base.ends_with('/') {
        format!("{route_base}{rel}")
    } else {
        format!("{route_base}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/project")
    }

    #[test]
    fn resolves_nested_relative_paths() {
        assert_eq!(
            resolve_safe_dir(&root(), "public/content").unwrap(),
            root().join("public").join("content")
        );
        assert_eq!(
            resolve_safe_dir(&root(), "./content/../docs").unwrap(),
            root().join("docs")
        );
    }

    #[test]
    fn rejects_absolute_paths() {
        assert_eq!(
            resolve_safe_dir(&root(), "/etc"),
            Err(ConfigError::AbsolutePath("/etc".into()))
        );
    }

    #[test]
    fn rejects_traversal() {
        for input in ["../../etc", "..", "content/../../x", "..\\..\\etc"] {
            assert!(
                matches!(resolve_safe_dir(&root(), input), Err(ConfigError::EscapesRoot(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_root_itself_and_blank() {
        assert!(matches!(resolve_safe_dir(&root(), "."), Err(ConfigError::EscapesRoot(_))));
        assert!(matches!(resolve_safe_dir(&root(), "content/.."), Err(ConfigError::EscapesRoot(_))));
        assert_eq!(resolve_safe_dir(&root(), "  "), Err(ConfigError::MissingPath));
    }

    #[test]
    fn rejection_touches_no_filesystem() {
        // The root does not exist; validation is purely lexical.
        let missing = PathBuf::from("/definitely/not/here");
        assert!(resolve_safe_dir(&missing, "../x").is_err());
        assert!(resolve_safe_dir(&missing, "x").is_ok());
        assert!(!missing.exists());
    }

    #[test]
    fn confinement_requires_strict_descendant() {
        let public = root().join("public");

        assert!(assert_output_confinement(&public.join("content"), &public).is_ok());
        assert!(matches!(
            assert_output_confinement(&public, &public),
            Err(ConfigError::PublicRoot(_))
        ));
        assert!(matches!(
            assert_output_confinement(&root().join("dist"), &public),
            Err(ConfigError::OutsidePublicRoot(_))
        ));
        assert!(matches!(
            assert_output_confinement(&root().join("publicity"), &public),
            Err(ConfigError::OutsidePublicRoot(_))
        ));
    }

    #[test]
    fn sanitizes_prefix() {
        assert_eq!(sanitize_prefix("my site!!v2", "rei"), "my_site_v2");
        assert_eq!(sanitize_prefix("ok-name_1", "rei"), "ok-name_1");
        assert_eq!(sanitize_prefix("   ", "rei"), "rei");
        assert_eq!(sanitize_prefix("../..", "rei"), "_");
    }

    #[test]
    fn normalizes_route_base() {
        assert_eq!(normalize_route_base("content/"), "/content");
        assert_eq!(normalize_route_base("/docs"), "/docs");
        assert_eq!(normalize_route_base("/"), "/");
        assert_eq!(normalize_route_base(""), "/content");
    }

    #[test]
    fn builds_url_paths() {
        assert_eq!(to_url_path("/content", "blog/a.json"), "/content/blog/a.json");
        assert_eq!(to_url_path("/", "a.json"), "/a.json");
        assert_eq!(to_url_path("/content", ""), "/content");
    }
}
