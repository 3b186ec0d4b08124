//! Normalization of front matter into document metadata.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::date::{format_iso, parse_timestamp};

/// Metadata attached to every markdown document.
///
/// Absent or empty inputs are always `None`, never an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// ISO-8601 string when the source was a timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Map raw front matter data into [`DocMeta`].
///
/// Anything other than a mapping yields empty metadata.
pub fn normalize(data: &Value) -> DocMeta {
    let Value::Mapping(map) = data else {
        return DocMeta::default();
    };

    DocMeta {
        title: text(map.get("title")),
        date: date(map.get("date")),
        description: text(map.get("description")),
        tags: tags(map.get("tags")),
        cover: text(map.get("cover")),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.is_nan() {
                    "NaN".to_string()
                } else if f.is_infinite() {
                    let sign = if f > 0.0 { "" } else { "-" };
                    format!("{sign}Infinity")
                } else if f.fract() == 0.0 && f.abs() < 1e21 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
        }
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Mapping(_) => serde_json::to_string(value).unwrap_or_default(),
        Value::Tagged(tagged) => stringify(&tagged.value),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value
        .filter(|v| is_truthy(v))
        .map(stringify)
        .filter(|s| !s.is_empty())
}

fn date(value: Option<&Value>) -> Option<String> {
    let value = value.filter(|v| is_truthy(v))?;

    if let Value::String(s) = value {
        if let Some(ts) = parse_timestamp(s) {
            return Some(format_iso(ts));
        }
    }

    Some(stringify(value)).filter(|s| !s.is_empty())
}

fn tags(value: Option<&Value>) -> Option<Vec<String>> {
    let value = value.filter(|v| is_truthy(v))?;

    match value {
        // A null element is kept as the word "null", like any other scalar.
        Value::Sequence(items) => Some(
            items
                .iter()
                .map(|v| match v {
                    Value::Null => "null".to_string(),
                    other => stringify(other),
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
        other => Some(vec![stringify(other)]).filter(|v| !v[0].is_empty()),
    }
}
