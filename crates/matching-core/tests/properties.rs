//! Algebraic properties of the matching engine.

use proptest::prelude::*;

use matching_core::config::MatchConfig;
use matching_core::language::remove_stopwords;
use matching_core::merge::{merge_entities, merge_government_ids};
use matching_core::normalize::{normalize_identifier, Normalizer};
use matching_core::phonetics::soundex;
use matching_core::scorer::EntityScorer;
use matching_core::similarity::{best_pair_jaro_winkler, custom_jaro_winkler, jaro};
use matching_core::text::lower_and_strip_punctuation;
use matching_core::trace::ScoringContext;
use std::sync::Arc;
use watchgate_core::{Entity, EntityKind, GovernmentId, IdKind, PersonInfo, SourceList};

fn name_word() -> impl Strategy<Value = String> {
    "[a-z]{2,10}"
}

fn name_words(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name_word(), 1..=max)
}

fn person_entity(name: &str) -> Entity {
    let mut e = Entity::new(
        format!("id-{name}"),
        "1",
        name,
        EntityKind::Person,
        SourceList::OfacSdn,
    );
    e.person = Some(PersonInfo::default());
    e
}

fn engine() -> (Normalizer, EntityScorer) {
    let config = Arc::new(MatchConfig::default());
    (
        Normalizer::new(config.clone()),
        EntityScorer::new(config).unwrap(),
    )
}

proptest! {
    #[test]
    fn normalization_is_idempotent(words in name_words(4)) {
        let (normalizer, _) = engine();
        let raw = person_entity(&words.join(" "));
        let once = normalizer.normalize(raw).unwrap();
        let twice = normalizer.normalize(once.clone()).unwrap();
        prop_assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn self_score_is_reflexive(words in name_words(4)) {
        let (normalizer, scorer) = engine();
        let entity = normalizer.normalize(person_entity(&words.join(" "))).unwrap();
        let breakdown = scorer
            .score(&entity, &entity, &ScoringContext::disabled())
            .unwrap()
            .expect("self comparison must not early-exit");
        prop_assert!(breakdown.total_weighted_score >= 0.99);
        // High confidence needs at least two surviving name tokens.
        if entity.prepared.as_ref().unwrap().name_tokens.len() >= 2 {
            prop_assert!(breakdown.high_confidence);
        }
    }

    #[test]
    fn similarity_scores_are_bounded(a in "[a-zA-Z0-9 -]{0,24}", b in "[a-zA-Z0-9 -]{0,24}") {
        let config = MatchConfig::default();
        for score in [
            jaro(&a, &b),
            custom_jaro_winkler(&a, &b, &config),
        ] {
            prop_assert!((0.0..=1.0).contains(&score), "score {score} for {a:?} vs {b:?}");
        }
    }

    #[test]
    fn aggregate_scores_are_bounded(qa in name_words(3), qb in name_words(3)) {
        let (normalizer, scorer) = engine();
        let query = normalizer.normalize(person_entity(&qa.join(" "))).unwrap();
        let candidate = normalizer.normalize(person_entity(&qb.join(" "))).unwrap();
        if let Some(breakdown) = scorer
            .score(&query, &candidate, &ScoringContext::disabled())
            .unwrap()
        {
            prop_assert!((0.0..=1.0).contains(&breakdown.total_weighted_score));
            for piece in &breakdown.pieces {
                prop_assert!((0.0..=1.0).contains(&piece.score));
            }
        }
    }

    #[test]
    fn adding_a_matching_token_never_hurts_beyond_the_penalty(words in name_words(4)) {
        let config = MatchConfig::default();
        let index = words.clone();
        let query: Vec<String> = words.iter().take(words.len() - 1).cloned().collect();
        prop_assume!(!query.is_empty());

        let before = best_pair_jaro_winkler(&query, &index, &config);
        let mut extended = query;
        extended.push(index.last().unwrap().clone());
        let after = best_pair_jaro_winkler(&extended, &index, &config);
        prop_assert!(after >= before - config.unmatched_index_token_weight - 1e-9);
    }

    #[test]
    fn numeric_tokens_survive_stopword_removal(
        words in name_words(3),
        number in "[0-9]{1,6}",
    ) {
        let mut tokens = words;
        tokens.push(number.clone());
        let kept = remove_stopwords(tokens, "en");
        prop_assert!(kept.contains(&number));
    }

    #[test]
    fn stopword_removal_is_stable(words in name_words(4)) {
        let once = remove_stopwords(words.clone(), "en");
        let twice = remove_stopwords(once.clone(), "en");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn identifier_comparison_is_symmetric(
        ids_a in prop::collection::vec(("[A-Z0-9]{3,9}", prop::option::of("[a-z]{4,10}")), 0..3),
        ids_b in prop::collection::vec(("[A-Z0-9]{3,9}", prop::option::of("[a-z]{4,10}")), 0..3),
    ) {
        let build = |ids: &[(String, Option<String>)], tag: &str| {
            let mut e = person_entity(&format!("holder {tag}"));
            e.government_ids = ids
                .iter()
                .map(|(identifier, country)| GovernmentId {
                    kind: IdKind::Passport,
                    identifier: identifier.clone(),
                    country: country.clone(),
                })
                .collect();
            e
        };
        let a = build(&ids_a, "a");
        let b = build(&ids_b, "b");

        use matching_core::compare::identifiers::compare_identifiers;
        let ab = compare_identifiers(&a, &b).map(|p| p.score);
        let ba = compare_identifiers(&b, &a).map(|p| p.score);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn soundex_is_fixed_width(word in "[a-zA-Z]{1,16}") {
        let code = soundex(&word);
        prop_assert_eq!(code.len(), 4);
        prop_assert!(code.chars().next().unwrap().is_ascii_uppercase());
        prop_assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn folding_is_idempotent(s in "\\PC{0,40}") {
        let once = lower_and_strip_punctuation(&s);
        let twice = lower_and_strip_punctuation(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn identifier_normalization_is_idempotent(s in "[a-zA-Z0-9 -]{0,20}") {
        let once = normalize_identifier(&s);
        prop_assert_eq!(once.clone(), normalize_identifier(&once));
    }

    #[test]
    fn merged_government_ids_have_no_duplicates(
        ids in prop::collection::vec(("[A-Za-z0-9]{2,6}", prop::option::of("[a-z]{4,8}")), 0..6),
    ) {
        let list: Vec<GovernmentId> = ids
            .iter()
            .map(|(identifier, country)| GovernmentId {
                kind: IdKind::Passport,
                identifier: identifier.clone(),
                country: country.clone(),
            })
            .collect();
        let merged = merge_government_ids(list.clone(), list);
        for (i, a) in merged.iter().enumerate() {
            for b in merged.iter().skip(i + 1) {
                let same = a.kind == b.kind
                    && a.identifier.eq_ignore_ascii_case(&b.identifier)
                    && match (a.country.as_deref(), b.country.as_deref()) {
                        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
                        (None, None) => true,
                        _ => false,
                    };
                prop_assert!(!same, "duplicate id survived merge: {:?}", a.identifier);
            }
        }
    }

    #[test]
    fn merging_rows_preserves_each_key_once(names in prop::collection::vec(name_word(), 1..6)) {
        let rows: Vec<Entity> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut e = person_entity(name);
                e.id = format!("row-{i}");
                e.source_id = format!("key-{}", i % 2);
                e
            })
            .collect();
        let merged = merge_entities(rows);
        let mut source_ids: Vec<String> = merged.iter().map(|e| e.source_id.clone()).collect();
        let before = source_ids.len();
        source_ids.sort();
        source_ids.dedup();
        prop_assert_eq!(before, source_ids.len());
    }
}
