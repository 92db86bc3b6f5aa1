//! Discovery persistence: write inferred facts back into note frontmatter.
//!
//! Facts are grouped by subject; each subject's note receives one frontmatter key
//! per derived relation (see [`RELATION_TO_KEY`]), holding wikilinks to the
//! objects. Existing values under the same key are merged, never dropped.
//!
//! Relations without a key are discarded here; the reasoner itself never filters.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use vaultgraph_reasoner::relation::*;
use vaultgraph_reasoner::Fact;

use crate::frontmatter::{
    clean_wikilink, format_wikilink, parse_frontmatter, render_note, split_frontmatter,
};
use crate::vault::Vault;
use crate::VaultError;

/// Derived relation → frontmatter key.
pub const RELATION_TO_KEY: [(&str, &str); 15] = [
    (ANCESTOR_OF, "ancestor_of"),
    (THEORY_APPLIED_BY, "theory_applied_by"),
    (DOMAIN_ENCOMPASSES, "domain_encompasses"),
    (CONTRIBUTED_TO, "contributed_to"),
    (INDIRECTLY_USES, "indirectly_uses"),
    (TRANSITIVELY_PART_OF, "transitively_part_of"),
    (COAUTHOR_OF, "coauthor_of"),
    (COLLABORATES_WITH, "collaborates_with"),
    (CREATED_BY, "created_by"),
    (USED_BY, "used_by"),
    (HAS_PART, "has_part"),
    (INHERITS_METHODOLOGY_FROM, "inherits_methodology_from"),
    (CONTRIBUTED_TO_FIELD, "contributed_to_field"),
    (BRIDGES_DOMAIN, "bridges_domain"),
    (REQUIRES_UNDERSTANDING, "requires_understanding"),
];

const INFERRED_BY_KEY: &str = "inferred_by";

pub fn frontmatter_key(relation: &str) -> Option<&'static str> {
    RELATION_TO_KEY
        .iter()
        .find(|(r, _)| *r == relation)
        .map(|(_, key)| *key)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PersistOptions {
    /// Compute stats without writing any note.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistStats {
    pub updated_files: usize,
    /// Subjects with no matching note.
    pub skipped_entities: usize,
    /// Facts whose relation has no frontmatter key.
    pub unmapped_facts: usize,
    /// Notes that could not be read, parsed or written.
    pub failed_notes: usize,
    pub total_facts: usize,
    pub updated_notes: Vec<PathBuf>,
}

/// `subject -> relation -> {objects}`
type Discoveries<'f> = BTreeMap<&'f str, BTreeMap<&'f str, BTreeSet<&'f str>>>;

pub struct DiscoveryPersister<'a> {
    vault: &'a Vault,
    options: PersistOptions,
}

impl<'a> DiscoveryPersister<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self {
            vault,
            options: PersistOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PersistOptions) -> Self {
        self.options = options;
        self
    }

    pub fn persist(&self, facts: &[Fact]) -> PersistStats {
        let mut stats = PersistStats {
            total_facts: facts.len(),
            ..PersistStats::default()
        };

        let mut discoveries: Discoveries<'_> = BTreeMap::new();
        for fact in facts {
            if frontmatter_key(&fact.relation).is_none() {
                stats.unmapped_facts += 1;
                continue;
            }
            discoveries
                .entry(fact.subject.as_str())
                .or_default()
                .entry(fact.relation.as_str())
                .or_default()
                .insert(fact.object.as_str());
        }
        if stats.unmapped_facts > 0 {
            tracing::debug!(
                unmapped = stats.unmapped_facts,
                "dropping facts without a frontmatter key"
            );
        }

        let notes = self.vault.note_index();
        for (entity, relations) in &discoveries {
            let Some(path) = notes.get(*entity) else {
                stats.skipped_entities += 1;
                continue;
            };

            match self.update_note(path, relations) {
                Ok(true) => {
                    stats.updated_files += 1;
                    stats.updated_notes.push(path.clone());
                }
                Ok(false) => {}
                Err(err) => {
                    stats.failed_notes += 1;
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to persist discoveries"
                    );
                }
            }
        }

        tracing::info!(
            updated = stats.updated_files,
            skipped = stats.skipped_entities,
            failed = stats.failed_notes,
            dry_run = self.options.dry_run,
            "persisted discoveries"
        );
        stats
    }

    /// Returns whether the note changed (or would change, on a dry run).
    fn update_note(
        &self,
        path: &Path,
        relations: &BTreeMap<&str, BTreeSet<&str>>,
    ) -> Result<bool, VaultError> {
        let content = std::fs::read_to_string(path)?;
        let Some((yaml, body)) = split_frontmatter(&content) else {
            return Ok(false);
        };
        let mut frontmatter = parse_frontmatter(yaml)?.unwrap_or_default();

        let written = merge_discoveries(
            &mut frontmatter,
            relations,
            &self.vault.config().inferred_by,
            path,
        )?;
        if written == 0 {
            return Ok(false);
        }

        if !self.options.dry_run {
            std::fs::write(path, render_note(&frontmatter, body)?)?;
        }
        tracing::debug!(path = %path.display(), keys = written, "updated note");
        Ok(true)
    }
}

/// Merge `relation -> {objects}` into a frontmatter mapping; returns the number of
/// keys written.
///
/// A key whose existing value already names every object is left untouched.
/// Otherwise it becomes the sorted, deduplicated union of its old and new
/// wikilinks: a scalar when there is one, a list otherwise. `inferred_by` is only
/// stamped when some key was written.
pub fn merge_discoveries(
    frontmatter: &mut Mapping,
    relations: &BTreeMap<&str, BTreeSet<&str>>,
    inferred_by: &str,
    path: &Path,
) -> Result<usize, VaultError> {
    let mut written = 0usize;

    for (relation, objects) in relations {
        let Some(key) = frontmatter_key(relation) else {
            continue;
        };
        if objects.is_empty() {
            continue;
        }
        let mut merged = match frontmatter.get(key) {
            Some(existing) => {
                existing_links(existing).ok_or_else(|| VaultError::UnsupportedValue {
                    key: key.to_string(),
                    path: path.to_path_buf(),
                })?
            }
            None => BTreeSet::new(),
        };

        // Already recorded, possibly as `X` or `[[ X ]]`: leave the key as written.
        let known: BTreeSet<String> = merged.iter().map(|link| clean_wikilink(link)).collect();
        if objects.iter().all(|o| known.contains(*o)) {
            continue;
        }
        merged.extend(objects.iter().map(|o| format_wikilink(o)));

        let mut links: Vec<Value> = merged.into_iter().map(Value::String).collect();
        let value = if links.len() == 1 {
            links.remove(0)
        } else {
            Value::Sequence(links)
        };
        frontmatter.insert(Value::from(key), value);
        written += 1;
    }

    if written > 0 && !frontmatter.contains_key(INFERRED_BY_KEY) {
        frontmatter.insert(Value::from(INFERRED_BY_KEY), Value::from(inferred_by));
    }
    Ok(written)
}

fn existing_links(value: &Value) -> Option<BTreeSet<String>> {
    match value {
        Value::Null => Some(BTreeSet::new()),
        Value::String(s) => Some(BTreeSet::from([s.clone()])),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
