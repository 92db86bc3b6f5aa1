//! Vault configuration.
//!
//! Everything has a default, so a config file only needs the fields it changes:
//!
//! ```json
//! { "exclude_dirs": [".obsidian", "templates"] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::VaultError;

/// Frontmatter key → relation tag.
///
/// When `inverted` is set the note is the *object* of the fact: `parent: [[X]]`
/// in note `Y` means `PARENT_OF(X, Y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMapping {
    pub key: String,
    pub relation: String,
    #[serde(default)]
    pub inverted: bool,
}

impl RelationMapping {
    pub fn new(key: &str, relation: &str, inverted: bool) -> Self {
        Self {
            key: key.to_string(),
            relation: relation.to_string(),
            inverted,
        }
    }
}

pub fn default_relation_mappings() -> Vec<RelationMapping> {
    vec![
        RelationMapping::new("parent", "PARENT_OF", true),
        RelationMapping::new("type_model", "IS_A", false),
        RelationMapping::new("part_of", "PART_OF", false),
        RelationMapping::new("used_in", "USED_IN", false),
        RelationMapping::new("uses", "USES", false),
        RelationMapping::new("known_for", "CREATED", false),
        RelationMapping::new("created_by", "CREATED", true),
        RelationMapping::new("field", "WORKS_IN", false),
        RelationMapping::new("used_for", "USED_FOR", false),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Note file extension, without the dot.
    pub extension: String,
    /// Directory names skipped anywhere below the vault root.
    pub exclude_dirs: Vec<String>,
    pub relation_mappings: Vec<RelationMapping>,
    /// Marker value written under `inferred_by` in notes the persister touches.
    pub inferred_by: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            exclude_dirs: vec![".obsidian".to_string()],
            relation_mappings: default_relation_mappings(),
            inferred_by: "reasoner".to_string(),
        }
    }
}

impl VaultConfig {
    pub fn from_json_str(json: &str) -> Result<Self, VaultError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, VaultError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn mapping(&self, key: &str) -> Option<&RelationMapping> {
        self.relation_mappings.iter().find(|m| m.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = VaultConfig::from_json_str(r#"{"exclude_dirs": [".obsidian", "templates"]}"#)
            .unwrap();
        assert_eq!(config.extension, "md");
        assert_eq!(config.exclude_dirs.len(), 2);
        assert_eq!(config.relation_mappings, default_relation_mappings());
    }

    #[test]
    fn test_inverted_mappings() {
        let config = VaultConfig::default();
        assert!(config.mapping("parent").unwrap().inverted);
        assert!(config.mapping("created_by").unwrap().inverted);
        assert!(!config.mapping("known_for").unwrap().inverted);
        assert_eq!(config.mapping("field").unwrap().relation, "WORKS_IN");
        assert!(config.mapping("aliases").is_none());
    }

    #[test]
    fn test_mapping_inverted_defaults_to_false() {
        let config = VaultConfig::from_json_str(
            r#"{"relation_mappings": [{"key": "mentor", "relation": "COLLABORATES_WITH"}]}"#,
        )
        .unwrap();
        assert_eq!(
            config.relation_mappings,
            vec![RelationMapping::new("mentor", "COLLABORATES_WITH", false)]
        );
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(VaultConfig::from_json_str(r#"{"exclude_dirs": 3}"#).is_err());
    }
}
