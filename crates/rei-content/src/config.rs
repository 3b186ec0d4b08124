//! Build configuration and its environment variable adapter.

use serde::Deserialize;

/// Default index file name prefix.
pub const DEFAULT_PREFIX: &str = "rei";
/// Default content source directory, relative to the project root.
pub const DEFAULT_SOURCE_DIR: &str = "content";
/// Default output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "public/content";
/// Default route base for served artifacts.
pub const DEFAULT_ROUTE_BASE: &str = crate::path::DEFAULT_ROUTE_BASE;

/// Environment variable names, highest priority first.
pub mod env_keys {
    pub const PREFIX: &[&str] = &["REI_GLOBAL_PREFIX_NAME", "REI_PUBLIC_APP_PREFIX_NAME"];
    pub const SOURCE_DIR: &[&str] = &["REI_CONTENT_SOURCE_DIR", "REI_PUBLIC_APP_CONTENT_SOURCE_DIR"];
    pub const OUTPUT_DIR: &[&str] = &["REI_CONTENT_OUTPUT_DIR", "REI_PUBLIC_APP_CONTENT_OUTPUT_DIR"];
    pub const ROUTE_BASE: &[&str] = &["REI_CONTENT_ROUTE_BASE", "REI_PUBLIC_APP_CONTENT_ROUTE_BASE"];
    pub const CLEAN_OUTPUT: &[&str] = &[
        "REI_CONTENT_CLEAN_OUTPUT",
        "REI_PUBLIC_APP_CONTENT_CLEAN_OUTPUT",
    ];
}

/// Configuration for one content build.
///
/// Directory values are relative to the project root and validated at build
/// time, not here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Namespace token for the index file name
    pub prefix: String,

    /// Markdown and asset source directory
    pub source_dir: String,

    /// Mirrored output directory (must live under `public/`)
    pub output_dir: String,

    /// URL prefix under which the output directory is served
    pub route_base: String,

    /// Delete the output directory before building
    pub clean_output: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            route_base: DEFAULT_ROUTE_BASE.to_string(),
            clean_output: true,
        }
    }
}

impl ContentConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` onto this configuration.
    ///
    /// For each field the first key with a non-blank value wins. Unparseable
    /// booleans leave the current value untouched.
    pub fn overlay_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        if let Some(prefix) = first(env_keys::PREFIX) {
            self.prefix = prefix;
        }
        if let Some(source_dir) = first(env_keys::SOURCE_DIR) {
            self.source_dir = source_dir;
        }
        if let Some(output_dir) = first(env_keys::OUTPUT_DIR) {
            self.output_dir = output_dir;
        }
        if let Some(route_base) = first(env_keys::ROUTE_BASE) {
            self.route_base = route_base;
        }
        if let Some(clean) = first(env_keys::CLEAN_OUTPUT).as_deref().and_then(parse_bool) {
            self.clean_output = clean;
        }

        self
    }
}

/// Parse a boolean-ish string (`true/1/yes/on`, `false/0/no/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ContentConfig::default();

        assert_eq!(config.prefix, "rei");
        assert_eq!(config.source_dir, "content");
        assert_eq!(config.output_dir, "public/content");
        assert_eq!(config.route_base, "/content");
        assert!(config.clean_output);
    }

    #[test]
    fn first_key_takes_priority() {
        let config = ContentConfig::default().overlay_env(lookup(&[
            ("REI_GLOBAL_PREFIX_NAME", "site"),
            ("REI_PUBLIC_APP_PREFIX_NAME", "ignored"),
            ("REI_PUBLIC_APP_CONTENT_SOURCE_DIR", "docs"),
        ]));

        assert_eq!(config.prefix, "site");
        assert_eq!(config.source_dir, "docs");
        assert_eq!(config.output_dir, "public/content");
    }

    #[test]
    fn blank_values_fall_through() {
        let config = ContentConfig::default().overlay_env(lookup(&[
            ("REI_CONTENT_OUTPUT_DIR", "   "),
            ("REI_PUBLIC_APP_CONTENT_OUTPUT_DIR", "public/posts"),
        ]));

        assert_eq!(config.output_dir, "public/posts");
    }

    #[test]
    fn parses_clean_output_flag() {
        let off = ContentConfig::default().overlay_env(lookup(&[("REI_CONTENT_CLEAN_OUTPUT", "OFF")]));
        assert!(!off.clean_output);

        let junk = ContentConfig::default().overlay_env(lookup(&[("REI_CONTENT_CLEAN_OUTPUT", "maybe")]));
        assert!(junk.clean_output);
    }

    #[test]
    fn parses_bool_variants() {
        for yes in ["true", "1", "YES", "On"] {
            assert_eq!(parse_bool(yes), Some(true));
        }
        for no in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(no), Some(false));
        }
        assert_eq!(parse_bool("2"), None);
    }
}
