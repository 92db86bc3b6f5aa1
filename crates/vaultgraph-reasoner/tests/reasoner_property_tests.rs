use std::collections::BTreeSet;

use proptest::prelude::*;
use vaultgraph_reasoner::*;

fn entity() -> impl Strategy<Value = String> {
    // A small alphabet so chains and collisions actually happen.
    prop_oneof![
        Just("A".to_string()),
        Just("B".to_string()),
        Just("C".to_string()),
        Just("D".to_string()),
        Just("E".to_string()),
    ]
}

fn relation() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("PARENT_OF".to_string()),
        Just("PART_OF".to_string()),
        Just("USES".to_string()),
        Just("USED_IN".to_string()),
        Just("CREATED".to_string()),
        Just("IS_A".to_string()),
        Just("WORKS_IN".to_string()),
        Just("COAUTHOR_OF".to_string()),
        Just("COLLABORATES_WITH".to_string()),
        Just("FOO_BAR".to_string()),
        proptest::string::string_regex("[A-Z_]{1,12}").unwrap(),
    ]
}

fn fact() -> impl Strategy<Value = Fact> {
    (relation(), entity(), entity()).prop_map(|(r, s, o)| Fact::new(r, s, o))
}

fn facts() -> impl Strategy<Value = Vec<Fact>> {
    proptest::collection::vec(fact(), 0..24)
}

proptest! {
    #[test]
    fn classification_is_deterministic(tag in "[A-Za-z_-]{0,16}") {
        prop_assert_eq!(classify(&tag), classify(&tag));
        prop_assert_eq!(classify(&tag), classify(&tag.to_uppercase()));
    }

    #[test]
    fn inference_ignores_input_order(mut base in facts()) {
        let forward = infer(&base);
        base.reverse();
        prop_assert_eq!(forward, infer(&base));
    }

    #[test]
    fn inference_ignores_duplicates(base in facts()) {
        let mut doubled = base.clone();
        doubled.extend(base.iter().cloned());
        prop_assert_eq!(infer(&base), infer(&doubled));
    }

    #[test]
    fn parallel_matches_sequential(base in facts()) {
        let reasoner = Reasoner::new();
        prop_assert_eq!(reasoner.infer(&base), reasoner.infer_parallel(&base));
    }

    #[test]
    fn core_is_subset_of_extended(base in facts()) {
        let core = Reasoner::with_rule_set(RuleSet::Core).infer(&base);
        let extended = Reasoner::with_rule_set(RuleSet::Extended).infer(&base);
        prop_assert!(core.is_subset(&extended));
    }

    #[test]
    fn only_derived_relations_are_emitted(base in facts()) {
        for fact in infer(&base) {
            prop_assert!(DERIVED_RELATIONS.contains(&fact.relation.as_str()));
        }
    }

    #[test]
    fn adding_facts_never_removes_inferences(base in facts(), extra in facts()) {
        // Every rule is monotone in the index.
        let before = infer(&base);
        let mut grown = base.clone();
        grown.extend(extra);
        let after = infer(&grown);
        prop_assert!(before.is_subset(&after));
    }

    #[test]
    fn inverse_rule_mirrors_every_use(base in facts()) {
        let index = RelationIndex::build(&base);
        let inferred = infer(&base);
        for (user, used) in index.pairs(RelationCategory::Uses) {
            prop_assert!(inferred.contains(&Fact::new(USED_BY, used, user)));
        }
    }

    #[test]
    fn unknown_tags_are_absent_from_index(base in facts()) {
        let index = RelationIndex::build(&base);
        let known: usize = base.iter().filter(|f| classify(&f.relation).is_some()).count();
        prop_assert_eq!(index.indexed_facts(), known);
        prop_assert_eq!(index.ignored_facts(), base.len() - known);

        let distinct: BTreeSet<(RelationCategory, &str, &str)> = base
            .iter()
            .filter_map(|f| classify(&f.relation).map(|c| (c, f.subject.as_str(), f.object.as_str())))
            .collect();
        prop_assert_eq!(index.len(), distinct.len());
    }
}
