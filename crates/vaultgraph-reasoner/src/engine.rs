//! Reasoner: runs a rule battery over one relation index.

use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::fact::Fact;
use crate::index::RelationIndex;
use crate::rules::{Rule, RuleSet};

/// A stateless rule battery. The rule list is fixed at construction.
pub struct Reasoner {
    rules: Vec<Box<dyn Rule>>,
}

/// Derivations of one rule, counted before cross-rule deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    pub rule: &'static str,
    pub derived: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Inference {
    pub facts: BTreeSet<Fact>,
    pub rule_counts: Vec<RuleCount>,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::with_rule_set(RuleSet::Extended)
    }
}

impl fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reasoner")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl Reasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule_set(rule_set: RuleSet) -> Self {
        Self::with_rules(rule_set.rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Apply every rule once; returns only the newly derived triples.
    pub fn infer(&self, facts: &[Fact]) -> BTreeSet<Fact> {
        self.infer_with_stats(facts).facts
    }

    pub fn infer_with_stats(&self, facts: &[Fact]) -> Inference {
        let index = RelationIndex::build(facts);
        self.infer_index(&index)
    }

    pub fn infer_index(&self, index: &RelationIndex) -> Inference {
        let mut out = Inference::default();
        for rule in &self.rules {
            let derived = rule.infer(index);
            tracing::debug!(rule = rule.name(), derived = derived.len(), "applied rule");
            out.rule_counts.push(RuleCount {
                rule: rule.name(),
                derived: derived.len(),
            });
            out.facts.extend(derived);
        }
        tracing::debug!(
            rules = self.rules.len(),
            inferred = out.facts.len(),
            "inference complete"
        );
        out
    }

    /// Same result as [`Reasoner::infer`], with rules evaluated on the rayon pool.
    pub fn infer_parallel(&self, facts: &[Fact]) -> BTreeSet<Fact> {
        let index = RelationIndex::build(facts);
        self.rules
            .par_iter()
            .map(|rule| rule.infer(&index))
            .reduce(BTreeSet::new, |mut acc, derived| {
                acc.extend(derived);
                acc
            })
    }
}

impl Inference {
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn into_facts(self) -> Vec<Fact> {
        self.facts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{ANCESTOR_OF, INDIRECTLY_USES, USED_BY};

    #[test]
    fn test_empty_input() {
        let reasoner = Reasoner::new();
        assert!(reasoner.infer(&[]).is_empty());
        assert!(reasoner.infer_parallel(&[]).is_empty());
    }

    #[test]
    fn test_rule_counts_follow_battery_order() {
        let reasoner = Reasoner::with_rule_set(RuleSet::Core);
        let facts = vec![
            Fact::new("PARENT_OF", "A", "B"),
            Fact::new("PARENT_OF", "B", "C"),
        ];
        let inference = reasoner.infer_with_stats(&facts);
        assert_eq!(inference.rule_counts.len(), 6);
        assert_eq!(
            inference.rule_counts[0],
            RuleCount {
                rule: "transitive_parent",
                derived: 1
            }
        );
        assert!(inference.rule_counts[1..].iter().all(|c| c.derived == 0));
        assert_eq!(
            inference.into_facts(),
            vec![Fact::new(ANCESTOR_OF, "A", "C")]
        );
    }

    #[test]
    fn test_custom_battery() {
        let reasoner = Reasoner::with_rules(Vec::new());
        assert!(reasoner.rule_names().is_empty());
        assert!(reasoner.infer(&[Fact::new("USES", "A", "B")]).is_empty());
    }

    #[test]
    fn test_core_battery_has_no_inverses() {
        let facts = vec![Fact::new("USES", "A", "B"), Fact::new("USES", "B", "C")];
        let core = Reasoner::with_rule_set(RuleSet::Core).infer(&facts);
        assert!(core.contains(&Fact::new(INDIRECTLY_USES, "A", "C")));
        assert!(!core.contains(&Fact::new(USED_BY, "B", "A")));

        let extended = Reasoner::new().infer(&facts);
        assert!(extended.contains(&Fact::new(USED_BY, "B", "A")));
        assert!(core.is_subset(&extended));
    }

    #[test]
    fn test_debug_lists_rule_names() {
        let debug = format!("{:?}", Reasoner::with_rule_set(RuleSet::Core));
        assert!(debug.contains("transitive_parent"));
        assert!(debug.contains("theory_applied"));
    }
}
