//! Relation categories and derived relation tags.
//!
//! Input relation tags are an open vocabulary (`PARENT_OF`, `USES`, `WORKS_IN`, ...).
//! The engine only reasons over a closed set of categories; [`classify`] maps a raw
//! tag to at most one of them.
//!
//! Classification lowercases the tag and tests each category's needles in the
//! fixed order of [`RelationCategory::ALL`]; the first category with a matching
//! needle wins. This ordering has sharp edges that are kept on purpose:
//!
//! - `USED_IN`, `USED_FOR` and even `CAUSES` contain `use` and land in `Uses`
//! - `IS_ALGORITHM_FOR` contains `is_a` and lands in `IsA`
//! - a tag containing both `parent` and `uses` is only ever a `ParentOf`

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationCategory {
    ParentOf,
    PartOf,
    Uses,
    Created,
    IsA,
    WorksIn,
    CoauthorOf,
    CollaboratesWith,
}

impl RelationCategory {
    /// Classification order.
    pub const ALL: [RelationCategory; 8] = [
        RelationCategory::ParentOf,
        RelationCategory::PartOf,
        RelationCategory::Uses,
        RelationCategory::Created,
        RelationCategory::IsA,
        RelationCategory::WorksIn,
        RelationCategory::CoauthorOf,
        RelationCategory::CollaboratesWith,
    ];

    /// Lowercase substrings that put a tag into this category.
    pub fn needles(self) -> &'static [&'static str] {
        match self {
            RelationCategory::ParentOf => &["parent"],
            RelationCategory::PartOf => &["part_of", "part-of"],
            RelationCategory::Uses => &["uses", "use"],
            RelationCategory::Created => &["created"],
            RelationCategory::IsA => &["is_a", "is-a"],
            RelationCategory::WorksIn => &["works_in", "field"],
            RelationCategory::CoauthorOf => &["coauthor"],
            RelationCategory::CollaboratesWith => &["collaborates"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationCategory::ParentOf => "parent_of",
            RelationCategory::PartOf => "part_of",
            RelationCategory::Uses => "uses",
            RelationCategory::Created => "created",
            RelationCategory::IsA => "is_a",
            RelationCategory::WorksIn => "works_in",
            RelationCategory::CoauthorOf => "coauthor_of",
            RelationCategory::CollaboratesWith => "collaborates_with",
        }
    }
}

impl fmt::Display for RelationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw relation tag to its category, or `None` when the tag is inert.
pub fn classify(tag: &str) -> Option<RelationCategory> {
    let lower = tag.to_lowercase();
    RelationCategory::ALL
        .into_iter()
        .find(|category| category.needles().iter().any(|n| lower.contains(n)))
}

// ============================================================================
// Derived relation tags
// ============================================================================

pub const ANCESTOR_OF: &str = "ANCESTOR_OF";
pub const TRANSITIVELY_PART_OF: &str = "TRANSITIVELY_PART_OF";
pub const CONTRIBUTED_TO: &str = "CONTRIBUTED_TO";
pub const INDIRECTLY_USES: &str = "INDIRECTLY_USES";
pub const DOMAIN_ENCOMPASSES: &str = "DOMAIN_ENCOMPASSES";
pub const THEORY_APPLIED_BY: &str = "THEORY_APPLIED_BY";
pub const COAUTHOR_OF: &str = "COAUTHOR_OF";
pub const COLLABORATES_WITH: &str = "COLLABORATES_WITH";
pub const CREATED_BY: &str = "CREATED_BY";
pub const USED_BY: &str = "USED_BY";
pub const HAS_PART: &str = "HAS_PART";
pub const INHERITS_METHODOLOGY_FROM: &str = "INHERITS_METHODOLOGY_FROM";
pub const CONTRIBUTED_TO_FIELD: &str = "CONTRIBUTED_TO_FIELD";
pub const BRIDGES_DOMAIN: &str = "BRIDGES_DOMAIN";
pub const REQUIRES_UNDERSTANDING: &str = "REQUIRES_UNDERSTANDING";

/// Every tag the extended rule battery can emit.
pub const DERIVED_RELATIONS: [&str; 15] = [
    ANCESTOR_OF,
    THEORY_APPLIED_BY,
    DOMAIN_ENCOMPASSES,
    CONTRIBUTED_TO,
    INDIRECTLY_USES,
    TRANSITIVELY_PART_OF,
    COAUTHOR_OF,
    COLLABORATES_WITH,
    CREATED_BY,
    USED_BY,
    HAS_PART,
    INHERITS_METHODOLOGY_FROM,
    CONTRIBUTED_TO_FIELD,
    BRIDGES_DOMAIN,
    REQUIRES_UNDERSTANDING,
];
