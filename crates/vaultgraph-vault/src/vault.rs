//! Vault layout: which files are notes, and which note names an entity.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::VaultConfig;

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    config: VaultConfig,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, VaultConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: VaultConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// All note files below the root, sorted.
    ///
    /// Excluded directories are pruned wherever they appear. Entries that cannot
    /// be read are skipped with a warning.
    pub fn notes(&self) -> Vec<PathBuf> {
        let exclude: BTreeSet<&str> = self.config.exclude_dirs.iter().map(String::as_str).collect();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !exclude.contains(name.as_ref())
            });

        let mut notes = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            notes.push(path.to_path_buf());
        }
        notes.sort();
        notes
    }

    /// The first note (in sorted order) whose file stem is `entity`.
    pub fn find_note(&self, entity: &str) -> Option<PathBuf> {
        self.notes()
            .into_iter()
            .find(|path| Self::entity_name(path).as_deref() == Some(entity))
    }

    /// `entity -> note` for every note; on duplicate stems the first note wins.
    pub fn note_index(&self) -> BTreeMap<String, PathBuf> {
        let mut index = BTreeMap::new();
        for path in self.notes() {
            let Some(name) = Self::entity_name(&path) else {
                continue;
            };
            index.entry(name).or_insert(path);
        }
        index
    }

    /// A note names the entity in its file stem.
    pub fn entity_name(path: &Path) -> Option<String> {
        path.file_stem().map(|s| s.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_notes_skip_excluded_dirs_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Statistics.md");
        touch(dir.path(), "methods/Do-Calculus.md");
        touch(dir.path(), ".obsidian/workspace.md");
        touch(dir.path(), "methods/.obsidian/cache.md");
        touch(dir.path(), "attachments/diagram.png");

        let vault = Vault::new(dir.path());
        let names: Vec<_> = vault
            .notes()
            .iter()
            .filter_map(|p| Vault::entity_name(p))
            .collect();
        assert_eq!(names, vec!["Statistics", "Do-Calculus"]);
    }

    #[test]
    fn test_find_note_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "people/Judea Pearl.md");

        let vault = Vault::new(dir.path());
        let found = vault.find_note("Judea Pearl").unwrap();
        assert!(found.ends_with("people/Judea Pearl.md"));
        assert!(vault.find_note("judea pearl").is_none());
        assert_eq!(vault.note_index().len(), 1);
    }

    #[test]
    fn test_missing_root_yields_no_notes() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path().join("nope"));
        assert!(vault.notes().is_empty());
    }
}
