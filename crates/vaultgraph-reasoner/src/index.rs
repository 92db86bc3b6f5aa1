//! RelationIndex: category-bucketed lookup tables for one inference run.
//!
//! Each fact lands in at most one bucket (see [`classify`]):
//!
//! - `category -> subject -> {objects}`
//!
//! Buckets are multi-valued and deduplicated. Ordered maps keep rule iteration,
//! and therefore logs and reports, deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::fact::Fact;
use crate::relation::{classify, RelationCategory};

/// `subject -> {objects}` for one category.
pub type Bucket = BTreeMap<String, BTreeSet<String>>;

static EMPTY_BUCKET: Bucket = BTreeMap::new();

#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    buckets: BTreeMap<RelationCategory, Bucket>,
    /// Facts that matched a category (duplicates included).
    indexed: usize,
    /// Facts whose tag matched no category.
    ignored: usize,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> Self {
        let mut out = Self::new();
        for fact in facts {
            out.insert(fact);
        }
        tracing::debug!(
            indexed = out.indexed,
            ignored = out.ignored,
            entries = out.len(),
            "built relation index"
        );
        out
    }

    /// Index a single fact; returns the bucket it went into, if any.
    pub fn insert(&mut self, fact: &Fact) -> Option<RelationCategory> {
        let Some(category) = classify(&fact.relation) else {
            self.ignored += 1;
            return None;
        };
        self.buckets
            .entry(category)
            .or_default()
            .entry(fact.subject.clone())
            .or_default()
            .insert(fact.object.clone());
        self.indexed += 1;
        Some(category)
    }

    /// The bucket for `category` (empty when nothing was indexed there).
    pub fn bucket(&self, category: RelationCategory) -> &Bucket {
        self.buckets.get(&category).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn objects(&self, category: RelationCategory, subject: &str) -> Option<&BTreeSet<String>> {
        self.bucket(category).get(subject)
    }

    pub fn contains(&self, category: RelationCategory, subject: &str, object: &str) -> bool {
        self.objects(category, subject)
            .is_some_and(|objects| objects.contains(object))
    }

    /// `(subject, object)` pairs of one bucket, in order.
    pub fn pairs(&self, category: RelationCategory) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.bucket(category).iter().flat_map(|(subject, objects)| {
            objects
                .iter()
                .map(move |object| (subject.as_str(), object.as_str()))
        })
    }

    /// Number of distinct `(category, subject, object)` entries.
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indexed_facts(&self) -> usize {
        self.indexed
    }

    pub fn ignored_facts(&self) -> usize {
        self.ignored
    }
}
