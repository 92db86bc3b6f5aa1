//! Fact extraction from note frontmatter.
//!
//! For a note `Causal Inference.md` with
//!
//! ```text
//! ---
//! parent: "[[Statistics]]"
//! uses: ["[[Do-Calculus]]", "[[Potential Outcomes]]"]
//! ---
//! ```
//!
//! the default mappings emit:
//!
//! - `PARENT_OF(Statistics, Causal Inference)` (inverted mapping)
//! - `USES(Causal Inference, Do-Calculus)`
//! - `USES(Causal Inference, Potential Outcomes)`

use std::path::Path;

use serde_yaml::Value;
use vaultgraph_reasoner::Fact;

use crate::config::RelationMapping;
use crate::frontmatter::{clean_wikilink, parse_frontmatter, split_frontmatter};
use crate::vault::Vault;
use crate::VaultError;

pub struct FactExtractor<'a> {
    vault: &'a Vault,
    mappings: Vec<RelationMapping>,
}

impl<'a> FactExtractor<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self {
            vault,
            mappings: vault.config().relation_mappings.clone(),
        }
    }

    pub fn with_mappings(mut self, mappings: Vec<RelationMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    /// Extract facts from every note. Notes that fail are skipped.
    pub fn extract_facts(&self) -> Vec<Fact> {
        let mut facts = Vec::new();
        let mut skipped = 0usize;
        let notes = self.vault.notes();

        for path in &notes {
            match self.extract_from_file(path) {
                Ok(file_facts) => facts.extend(file_facts),
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping note during fact extraction"
                    );
                }
            }
        }

        tracing::info!(
            notes = notes.len(),
            skipped,
            facts = facts.len(),
            "extracted facts from vault"
        );
        facts
    }

    pub fn extract_from_file(&self, path: &Path) -> Result<Vec<Fact>, VaultError> {
        let content = std::fs::read_to_string(path)?;
        let Some(subject) = Vault::entity_name(path) else {
            return Ok(Vec::new());
        };
        self.extract(&subject, &content, path)
    }

    /// Extract facts from note text, with `subject` as the note's entity name.
    pub fn extract_from_str(&self, subject: &str, content: &str) -> Result<Vec<Fact>, VaultError> {
        self.extract(subject, content, Path::new(subject))
    }

    fn extract(&self, subject: &str, content: &str, path: &Path) -> Result<Vec<Fact>, VaultError> {
        let mut facts = Vec::new();

        let Some((yaml, _body)) = split_frontmatter(content) else {
            return Ok(facts);
        };
        let Some(frontmatter) = parse_frontmatter(yaml)? else {
            return Ok(facts);
        };

        for (key, value) in &frontmatter {
            let Some(key) = key.as_str() else {
                continue;
            };
            let Some(mapping) = self.mappings.iter().find(|m| m.key == key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let mut targets = Vec::new();
            if !collect_targets(value, &mut targets) {
                return Err(VaultError::UnsupportedValue {
                    key: key.to_string(),
                    path: path.to_path_buf(),
                });
            }

            for target in targets {
                let target = clean_wikilink(target);
                let fact = if mapping.inverted {
                    Fact::new(mapping.relation.as_str(), target, subject)
                } else {
                    Fact::new(mapping.relation.as_str(), subject, target)
                };
                facts.push(fact);
            }
        }

        Ok(facts)
    }
}

/// Gather string targets from a scalar or a (possibly nested) list.
///
/// Unquoted `[[X]]` parses as a nested list, so nesting is flattened. Any
/// non-string leaf makes the whole value unsupported.
fn collect_targets<'v>(value: &'v Value, out: &mut Vec<&'v str>) -> bool {
    match value {
        Value::String(s) => {
            out.push(s.as_str());
            true
        }
        Value::Sequence(items) => items.iter().all(|item| collect_targets(item, out)),
        _ => false,
    }
}
