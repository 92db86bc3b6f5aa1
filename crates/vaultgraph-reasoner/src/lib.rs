//! Vaultgraph reasoner
//!
//! A small forward-chaining engine over `(relation, subject, object)` triples:
//!
//! ```text
//!   facts ──► RelationIndex ──► rule battery ──► inferred facts (set)
//!             (category buckets)  (one hop each)
//! ```
//!
//! - Relation tags are bucketed into a closed set of [`RelationCategory`] values.
//! - Every [`Rule`] reads the immutable index and returns the triples it derives.
//! - The engine unions rule outputs; inferred facts are never fed back into the
//!   rules, so one call is exactly one round of composition.
//!
//! The engine is total: unknown tags, cycles, self-loops and empty input are all
//! valid and never produce errors.

pub mod engine;
pub mod fact;
pub mod index;
pub mod relation;
pub mod rules;

pub use engine::{Inference, Reasoner, RuleCount};
pub use fact::{facts_with_relation, Fact};
pub use index::{Bucket, RelationIndex};
pub use relation::*;
pub use rules::{
    core_rules, extended_rules, ChainRule, CrossDomainBridge, InverseRule, Rule, RuleSet,
    TheoryApplication, UnknownRuleSet,
};

use std::collections::BTreeSet;

/// Run the full (extended) rule battery once over `facts`.
pub fn infer(facts: &[Fact]) -> BTreeSet<Fact> {
    Reasoner::default().infer(facts)
}
