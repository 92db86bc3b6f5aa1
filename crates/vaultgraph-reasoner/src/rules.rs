//! The rule battery.
//!
//! A [`Rule`] reads a [`RelationIndex`] and returns the triples it derives. Rules
//! never see each other's output, so the battery can run in any order (or in
//! parallel) and the engine merges results by set union.
//!
//! Most rules are one of a few shapes:
//!
//! - [`ChainRule`]: `first[A] ∋ B, second[B] ∋ C  ⟹  derived(A, C)`
//! - [`InverseRule`]: `category[A] ∋ B  ⟹  derived(B, A)` (symmetric when the
//!   derived tag names the same relation)
//! - [`TheoryApplication`] and [`CrossDomainBridge`] are bespoke.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::index::RelationIndex;
use crate::relation::*;

pub trait Rule: Send + Sync {
    /// Stable identifier used in logs and per-rule statistics.
    fn name(&self) -> &'static str;

    fn infer(&self, index: &RelationIndex) -> BTreeSet<Fact>;
}

// ============================================================================
// Rule shapes
// ============================================================================

/// Two-step composition of category buckets.
#[derive(Debug, Clone, Copy)]
pub struct ChainRule {
    pub name: &'static str,
    pub first: RelationCategory,
    pub second: RelationCategory,
    pub derived: &'static str,
}

impl Rule for ChainRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn infer(&self, index: &RelationIndex) -> BTreeSet<Fact> {
        let second = index.bucket(self.second);
        let mut out = BTreeSet::new();
        for (start, middles) in index.bucket(self.first) {
            for middle in middles {
                let Some(ends) = second.get(middle) else {
                    continue;
                };
                for end in ends {
                    out.insert(Fact::new(self.derived, start.as_str(), end.as_str()));
                }
            }
        }
        out
    }
}

/// Swaps subject and object for each `(category, derived)` pair.
#[derive(Debug, Clone, Copy)]
pub struct InverseRule {
    pub name: &'static str,
    pub pairs: &'static [(RelationCategory, &'static str)],
}

impl Rule for InverseRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn infer(&self, index: &RelationIndex) -> BTreeSet<Fact> {
        let mut out = BTreeSet::new();
        for &(category, derived) in self.pairs {
            for (subject, object) in index.pairs(category) {
                out.insert(Fact::new(derived, object, subject));
            }
        }
        out
    }
}

/// `created[A] ∋ T` and some `U` with `uses[U] ∋ T`  ⟹  `THEORY_APPLIED_BY(A, U)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TheoryApplication;

impl Rule for TheoryApplication {
    fn name(&self) -> &'static str {
        "theory_applied"
    }

    fn infer(&self, index: &RelationIndex) -> BTreeSet<Fact> {
        // used thing -> users
        let mut users_of: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (user, used) in index.pairs(RelationCategory::Uses) {
            users_of.entry(used).or_default().push(user);
        }

        let mut out = BTreeSet::new();
        for (creator, creation) in index.pairs(RelationCategory::Created) {
            let Some(users) = users_of.get(creation) else {
                continue;
            };
            for user in users {
                out.insert(Fact::new(THEORY_APPLIED_BY, creator, *user));
            }
        }
        out
    }
}

/// A user whose used things span at least `min_fields` distinct fields bridges
/// every one of them.
#[derive(Debug, Clone, Copy)]
pub struct CrossDomainBridge {
    pub min_fields: usize,
}

impl Default for CrossDomainBridge {
    fn default() -> Self {
        Self { min_fields: 2 }
    }
}

impl Rule for CrossDomainBridge {
    fn name(&self) -> &'static str {
        "cross_domain_bridge"
    }

    fn infer(&self, index: &RelationIndex) -> BTreeSet<Fact> {
        let works_in = index.bucket(RelationCategory::WorksIn);
        let mut out = BTreeSet::new();

        for (method, theories) in index.bucket(RelationCategory::Uses) {
            let fields: BTreeSet<&String> = theories
                .iter()
                .filter_map(|theory| works_in.get(theory))
                .flatten()
                .collect();

            if fields.len() < self.min_fields {
                continue;
            }
            for field in fields {
                out.insert(Fact::new(BRIDGES_DOMAIN, method.as_str(), field.as_str()));
            }
        }
        out
    }
}

// ============================================================================
// Battery
// ============================================================================

const SYMMETRIC_PAIRS: &[(RelationCategory, &str)] = &[
    (RelationCategory::CoauthorOf, COAUTHOR_OF),
    (RelationCategory::CollaboratesWith, COLLABORATES_WITH),
];

const INVERSE_PAIRS: &[(RelationCategory, &str)] = &[
    (RelationCategory::Created, CREATED_BY),
    (RelationCategory::Uses, USED_BY),
    (RelationCategory::PartOf, HAS_PART),
];

/// Rules 1-6: transitive and compositional chains.
pub fn core_rules() -> Vec<Box<dyn Rule>> {
    use RelationCategory::*;

    vec![
        Box::new(ChainRule {
            name: "transitive_parent",
            first: ParentOf,
            second: ParentOf,
            derived: ANCESTOR_OF,
        }),
        Box::new(ChainRule {
            name: "transitive_part_of",
            first: PartOf,
            second: PartOf,
            derived: TRANSITIVELY_PART_OF,
        }),
        Box::new(ChainRule {
            name: "contributed_to",
            first: Created,
            second: PartOf,
            derived: CONTRIBUTED_TO,
        }),
        Box::new(ChainRule {
            name: "indirect_uses",
            first: Uses,
            second: Uses,
            derived: INDIRECTLY_USES,
        }),
        Box::new(ChainRule {
            name: "domain_encompasses",
            first: ParentOf,
            second: PartOf,
            derived: DOMAIN_ENCOMPASSES,
        }),
        Box::new(TheoryApplication),
    ]
}

/// Rules 1-12: the core chains plus symmetric/inverse properties, property
/// chains through `is_a`/`works_in`, domain bridges and prerequisite chains.
pub fn extended_rules() -> Vec<Box<dyn Rule>> {
    use RelationCategory::*;

    let mut rules = core_rules();
    rules.push(Box::new(InverseRule {
        name: "symmetric_collaboration",
        pairs: SYMMETRIC_PAIRS,
    }));
    rules.push(Box::new(InverseRule {
        name: "inverse_properties",
        pairs: INVERSE_PAIRS,
    }));
    rules.push(Box::new(ChainRule {
        name: "methodology_inheritance",
        first: IsA,
        second: Uses,
        derived: INHERITS_METHODOLOGY_FROM,
    }));
    rules.push(Box::new(ChainRule {
        name: "field_contribution",
        first: Created,
        second: WorksIn,
        derived: CONTRIBUTED_TO_FIELD,
    }));
    rules.push(Box::new(CrossDomainBridge::default()));
    rules.push(Box::new(ChainRule {
        name: "prerequisite_chain",
        first: Uses,
        second: Uses,
        derived: REQUIRES_UNDERSTANDING,
    }));
    rules
}

/// Which battery a [`crate::Reasoner`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// The six compositional chains (rules 1-6).
    Core,
    /// All twelve rules.
    #[default]
    Extended,
}

impl RuleSet {
    pub fn rules(self) -> Vec<Box<dyn Rule>> {
        match self {
            RuleSet::Core => core_rules(),
            RuleSet::Extended => extended_rules(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleSet::Core => "core",
            RuleSet::Extended => "extended",
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule set `{0}` (expected `core` or `extended`)")]
pub struct UnknownRuleSet(pub String);

impl FromStr for RuleSet {
    type Err = UnknownRuleSet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(RuleSet::Core),
            "extended" | "all" => Ok(RuleSet::Extended),
            other => Err(UnknownRuleSet(other.to_string())),
        }
    }
}
