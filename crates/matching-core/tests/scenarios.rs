//! End-to-end screening scenarios against the public API with default
//! configuration and the phonetic gate enabled.

use chrono::NaiveDate;
use matching_core::{CancelToken, MatchConfig, SearchOptions, SearchService};
use watchgate_core::{
    BusinessInfo, Entity, EntityKind, GovernmentId, IdKind, OrganizationInfo, PersonInfo,
    SourceList,
};

fn service_with(entities: Vec<Entity>) -> SearchService {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let service = SearchService::new(MatchConfig::default()).unwrap();
    service.load(entities).unwrap();
    service
}

fn person(id: &str, name: &str, source: SourceList) -> Entity {
    let mut e = Entity::new(id, id, name, EntityKind::Person, source);
    e.person = Some(PersonInfo::default());
    e
}

fn business(id: &str, name: &str, source: SourceList) -> Entity {
    let mut e = Entity::new(id, id, name, EntityKind::Business, source);
    e.business = Some(BusinessInfo::default());
    e
}

fn organization(id: &str, name: &str, source: SourceList) -> Entity {
    let mut e = Entity::new(id, id, name, EntityKind::Organization, source);
    e.organization = Some(OrganizationInfo::default());
    e
}

fn search(service: &SearchService, query: Entity, options: &SearchOptions) -> Vec<(String, f64, f64)> {
    service
        .search(query, options, &CancelToken::new())
        .unwrap()
        .results
        .into_iter()
        .map(|r| (r.entity_id, r.breakdown.name_score, r.score))
        .collect()
}

#[test]
fn reordered_person_name_surfaces_the_sdn_entry() {
    let service = service_with(vec![
        person("sdn-maduro", "MADURO MOROS, Nicolas", SourceList::OfacSdn),
        person("sdn-other", "Vladimir Petrov", SourceList::OfacSdn),
    ]);

    let results = search(
        &service,
        Entity::query("Nicolas Maduro", EntityKind::Person),
        &SearchOptions::default(),
    );
    assert_eq!(results[0].0, "sdn-maduro");
    assert!(results[0].1 >= 0.90, "name score {}", results[0].1);
}

#[test]
fn exact_business_name_is_an_exact_hit() {
    let service = service_with(vec![business("sdn-gpb", "GAZPROMBANK", SourceList::OfacSdn)]);

    let response = service
        .search(
            Entity::query("GAZPROMBANK", EntityKind::Business),
            &SearchOptions::default(),
            &CancelToken::new(),
        )
        .unwrap();
    let top = &response.results[0];
    assert!(top.score >= 0.99, "score {}", top.score);
    assert!(top.breakdown.is_exact());
}

#[test]
fn word_combinations_bridge_concatenated_names() {
    let service = service_with(vec![business("csl-argument", "JSCARGUMENT", SourceList::UsCsl)]);

    let results = search(
        &service,
        Entity::query("JSC ARGUMENT", EntityKind::Business),
        &SearchOptions::default(),
    );
    assert_eq!(results[0].0, "csl-argument");
    assert!(results[0].1 >= 0.92, "name score {}", results[0].1);
}

#[test]
fn company_suffix_stripping_matches_bare_organization_name() {
    let service = service_with(vec![organization("sdn-taliban", "Taliban", SourceList::OfacSdn)]);

    let results = search(
        &service,
        Entity::query("Taliban Organization", EntityKind::Organization),
        &SearchOptions::default(),
    );
    assert_eq!(results[0].0, "sdn-taliban");
    assert!(results[0].1 >= 0.85, "name score {}", results[0].1);
}

#[test]
fn unlisted_name_produces_no_results_at_high_min_match() {
    let service = service_with(vec![
        person("sdn-1", "Alicia Jonson", SourceList::OfacSdn),
        person("sdn-2", "Nicolas Maduro", SourceList::OfacSdn),
        business("sdn-3", "GAZPROMBANK", SourceList::OfacSdn),
    ]);

    let options = SearchOptions {
        min_match: 0.9,
        ..Default::default()
    };
    let results = search(&service, Entity::query("Alice Johnson", EntityKind::Unknown), &options);
    assert!(results.is_empty(), "unexpected results: {results:?}");
}

#[test]
fn single_letter_typos_stay_above_threshold() {
    let service = service_with(vec![business(
        "sdn-aero",
        "AEROCARIBBEAN AIRLINES",
        SourceList::OfacSdn,
    )]);

    let results = search(
        &service,
        Entity::query("AEROCARRIBEAN AIRLINES", EntityKind::Business),
        &SearchOptions::default(),
    );
    assert_eq!(results[0].0, "sdn-aero");
    assert!(results[0].1 >= 0.93, "name score {}", results[0].1);
}

#[test]
fn identical_person_with_identifier_is_high_confidence() {
    let mut listed = person("sdn-smith", "John Smith", SourceList::OfacSdn);
    listed.person.as_mut().unwrap().birth_date = NaiveDate::from_ymd_opt(1965, 3, 15);
    listed.government_ids = vec![GovernmentId {
        kind: IdKind::Passport,
        identifier: "V123".to_string(),
        country: Some("US".to_string()),
    }];
    let service = service_with(vec![listed.clone()]);

    let mut query = Entity::query("John Smith", EntityKind::Person);
    query.person.as_mut().unwrap().birth_date = NaiveDate::from_ymd_opt(1965, 3, 15);
    query.government_ids = listed.government_ids.clone();

    let response = service
        .search(query, &SearchOptions::default(), &CancelToken::new())
        .unwrap();
    let top = &response.results[0];
    assert!(top.score >= 0.99, "score {}", top.score);
    assert!(top.breakdown.high_confidence);
}

#[test]
fn contradicted_birth_date_blocks_an_exact_match() {
    let mut listed = person("sdn-smith", "John Smith", SourceList::OfacSdn);
    listed.person.as_mut().unwrap().birth_date = NaiveDate::from_ymd_opt(1970, 6, 20);
    let service = service_with(vec![listed]);

    let mut query = Entity::query("John Smith", EntityKind::Person);
    query.person.as_mut().unwrap().birth_date = NaiveDate::from_ymd_opt(1965, 3, 15);

    let response = service
        .search(query, &SearchOptions::default(), &CancelToken::new())
        .unwrap();
    let top = &response.results[0];
    assert_eq!(top.breakdown.date_score, 0.0);
    assert!(top.score < 0.99, "score {}", top.score);
}

#[test]
fn stopwords_of_the_detected_language_do_not_shift_the_score() {
    let service = service_with(vec![business(
        "sdn-bank",
        "Bank East Trading",
        SourceList::OfacSdn,
    )]);

    let plain = search(
        &service,
        Entity::query("Bank East Trading", EntityKind::Business),
        &SearchOptions::default(),
    );
    let padded = search(
        &service,
        Entity::query("Bank of the East Trading", EntityKind::Business),
        &SearchOptions::default(),
    );
    assert!((plain[0].1 - padded[0].1).abs() < 1e-9);
}

#[test]
fn alias_queries_find_the_canonical_entry() {
    let mut listed = person("sdn-hussein", "Saddam Hussein Al-Tikriti", SourceList::EuCsl);
    listed.alt_names = vec!["Abu Ali".to_string()];
    let service = service_with(vec![listed]);

    let options = SearchOptions {
        min_match: 0.5,
        ..Default::default()
    };
    let response = service
        .search(Entity::query("Abu Ali", EntityKind::Person), &options, &CancelToken::new())
        .unwrap();
    let top = &response.results[0];
    assert_eq!(top.entity_id, "sdn-hussein");
    assert_eq!(top.breakdown.alt_names_score, 1.0);
}
