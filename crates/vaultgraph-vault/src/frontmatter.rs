//! YAML frontmatter and wikilink helpers.
//!
//! A note with frontmatter looks like:
//!
//! ```text
//! ---
//! parent: "[[Statistics]]"
//! uses:
//!   - "[[Do-Calculus]]"
//! ---
//! body...
//! ```

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

use crate::VaultError;

fn frontmatter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*\r?\n(.*)\z")
            .expect("frontmatter pattern is valid")
    })
}

/// Split a note into `(frontmatter yaml, body)`; `None` when there is no
/// frontmatter block.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let caps = frontmatter_re().captures(content)?;
    let yaml = caps.get(1)?.as_str();
    let body = caps.get(2).map_or("", |m| m.as_str());
    Some((yaml, body))
}

/// Parse a frontmatter block. Empty or `null` documents yield `None`.
pub fn parse_frontmatter(yaml: &str) -> Result<Option<Mapping>, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(None);
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(Some(mapping)),
        Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "expected a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

/// Reassemble a note; mapping key order is preserved.
pub fn render_note(frontmatter: &Mapping, body: &str) -> Result<String, VaultError> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{yaml}---\n{body}"))
}

/// `[[Entity]]` → `Entity`. Plain names pass through trimmed.
pub fn clean_wikilink(s: &str) -> String {
    s.replace("[[", "").replace("]]", "").trim().to_string()
}

pub fn format_wikilink(s: &str) -> String {
    format!("[[{s}]]")
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
