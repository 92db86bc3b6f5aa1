//! Vault analysis report: what the vault states, what the reasoner derives from
//! it, and which entities sit at the center of the resulting graph.

use colored::Colorize;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use vaultgraph_reasoner::{Fact, Inference, RuleCount};

/// Inferred facts shown per relation in text output.
pub const SAMPLE_SIZE: usize = 10;

// =============================================================================
// Report format
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub rule_set: String,
    pub total_facts: usize,
    pub total_inferred: usize,
    pub unique_entities: usize,
    /// `relation -> count` over extracted facts.
    pub facts_by_relation: BTreeMap<String, usize>,
    pub inferred_by_relation: BTreeMap<String, RelationSample>,
    pub rule_counts: Vec<RuleCount>,
    pub top_entities: Vec<EntityDegree>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationSample {
    pub count: usize,
    pub sample: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDegree {
    pub entity: String,
    /// Fact endpoints (stated or inferred) naming the entity; a self-loop counts
    /// twice.
    pub degree: usize,
}

// =============================================================================
// Building
// =============================================================================

pub fn build_report(
    rule_set: &str,
    facts: &[Fact],
    inference: &Inference,
    top: usize,
) -> AnalysisReport {
    let mut facts_by_relation: BTreeMap<String, usize> = BTreeMap::new();
    for fact in facts {
        *facts_by_relation.entry(fact.relation.clone()).or_default() += 1;
    }

    let mut inferred_by_relation: BTreeMap<String, RelationSample> = BTreeMap::new();
    for fact in &inference.facts {
        let entry = inferred_by_relation.entry(fact.relation.clone()).or_default();
        entry.count += 1;
        if entry.sample.len() < SAMPLE_SIZE {
            entry.sample.push(fact.clone());
        }
    }

    let mut entities: BTreeSet<&str> = BTreeSet::new();
    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    for fact in facts.iter().chain(inference.facts.iter()) {
        entities.insert(&fact.subject);
        entities.insert(&fact.object);
        *degree.entry(&fact.subject).or_default() += 1;
        *degree.entry(&fact.object).or_default() += 1;
    }

    let mut top_entities: Vec<EntityDegree> = degree
        .into_iter()
        .map(|(entity, degree)| EntityDegree {
            entity: entity.to_string(),
            degree,
        })
        .collect();
    // Highest degree first; ties by name.
    top_entities.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.entity.cmp(&b.entity)));
    top_entities.truncate(top);

    AnalysisReport {
        rule_set: rule_set.to_string(),
        total_facts: facts.len(),
        total_inferred: inference.facts.len(),
        unique_entities: entities.len(),
        facts_by_relation,
        inferred_by_relation,
        rule_counts: inference.rule_counts.clone(),
        top_entities,
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_report_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Vault analysis".green().bold());
    let _ = writeln!(out, "  Rule set: {}", report.rule_set.cyan());
    let _ = writeln!(out, "  Facts: {}", report.total_facts);
    let _ = writeln!(out, "  Inferred: {}", report.total_inferred);
    let _ = writeln!(out, "  Entities: {}", report.unique_entities);

    let _ = writeln!(out, "\n{}", "Facts by relation".bold());
    for (relation, count) in &report.facts_by_relation {
        let _ = writeln!(out, "  {:<28} {count}", relation.yellow());
    }

    let _ = writeln!(out, "\n{}", "Rules".bold());
    for RuleCount { rule, derived } in &report.rule_counts {
        let _ = writeln!(out, "  {rule:<28} {derived}");
    }

    let _ = writeln!(out, "\n{}", "Inferred by relation".bold());
    for (relation, sample) in &report.inferred_by_relation {
        let _ = writeln!(out, "  {} ({})", relation.yellow(), sample.count);
        for fact in &sample.sample {
            let _ = writeln!(out, "    {fact}");
        }
        if sample.count > sample.sample.len() {
            let more = sample.count - sample.sample.len();
            let _ = writeln!(out, "    {}", format!("... {more} more").dimmed());
        }
    }

    if !report.top_entities.is_empty() {
        let _ = writeln!(out, "\n{}", "Most connected entities".bold());
        for (i, e) in report.top_entities.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {} ({})", i + 1, e.entity.cyan(), e.degree);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultgraph_reasoner::{Reasoner, RuleSet};

    fn facts() -> Vec<Fact> {
        vec![
            Fact::new("PARENT_OF", "Statistics", "Causal Inference"),
            Fact::new("PARENT_OF", "Causal Inference", "SCM"),
            Fact::new("USES", "DoWhy", "SCM"),
            Fact::new("USES", "CausalNex", "SCM"),
        ]
    }

    #[test]
    fn test_report_counts() {
        let facts = facts();
        let inference = Reasoner::with_rule_set(RuleSet::Core).infer_with_stats(&facts);
        let report = build_report("core", &facts, &inference, 3);

        assert_eq!(report.total_facts, 4);
        assert_eq!(report.facts_by_relation.get("PARENT_OF"), Some(&2));
        assert_eq!(report.facts_by_relation.get("USES"), Some(&2));
        assert_eq!(report.unique_entities, 5);
        assert_eq!(report.total_inferred, inference.facts.len());
        assert_eq!(report.inferred_by_relation["ANCESTOR_OF"].count, 1);
        assert_eq!(report.rule_counts.len(), 6);
    }

    #[test]
    fn test_top_entities_ordered_by_degree_then_name() {
        let facts = facts();
        let report = build_report("core", &facts, &Inference::default(), 2);
        assert_eq!(
            report.top_entities,
            vec![
                EntityDegree {
                    entity: "SCM".into(),
                    degree: 3
                },
                EntityDegree {
                    entity: "Causal Inference".into(),
                    degree: 2
                },
            ]
        );
    }

    #[test]
    fn test_self_loop_counts_both_endpoints() {
        let facts = vec![Fact::new("PARENT_OF", "Ouroboros", "Ouroboros")];
        let report = build_report("core", &facts, &Inference::default(), 1);
        assert_eq!(
            report.top_entities,
            vec![EntityDegree {
                entity: "Ouroboros".into(),
                degree: 2
            }]
        );
        assert_eq!(report.unique_entities, 1);
    }

    #[test]
    fn test_sample_is_capped() {
        let facts: Vec<Fact> = (0..15)
            .map(|i| Fact::new("USES", format!("Tool{i:02}"), "SCM"))
            .collect();
        let inference = Reasoner::default().infer_with_stats(&facts);
        let report = build_report("extended", &facts, &inference, 5);

        let used_by = &report.inferred_by_relation["USED_BY"];
        assert_eq!(used_by.count, 15);
        assert_eq!(used_by.sample.len(), SAMPLE_SIZE);

        let text = render_report_text(&report);
        assert!(text.contains("USED_BY"));
        assert!(text.contains("5 more"));
    }
}
