//! Vault I/O for Vaultgraph
//!
//! The reasoner only sees triples. This crate is the glue on both sides of it:
//!
//! - [`FactExtractor`]: walks a vault, reads YAML frontmatter, resolves
//!   `[[wikilinks]]` and emits [`Fact`]s (the fact source)
//! - [`DiscoveryPersister`]: writes inferred facts back into the frontmatter of
//!   the note named by each fact's subject (the fact sink)
//!
//! Both sides degrade per note: a note that cannot be read or parsed is logged and
//! skipped, and the run continues.

pub mod config;
pub mod extractor;
pub mod frontmatter;
pub mod persister;
pub mod vault;

pub use config::*;
pub use extractor::FactExtractor;
pub use frontmatter::{clean_wikilink, format_wikilink, parse_frontmatter, render_note, split_frontmatter};
pub use persister::{
    frontmatter_key, merge_discoveries, DiscoveryPersister, PersistOptions, PersistStats,
    RELATION_TO_KEY,
};
pub use vault::Vault;

pub use vaultgraph_reasoner::Fact;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported value under `{key}` in {}", .path.display())]
    UnsupportedValue { key: String, path: PathBuf },
}
