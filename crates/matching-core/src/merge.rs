//! Consolidates the row-per-fact shape of the EU and UK consolidated
//! lists: several partial records sharing (source, source id, kind)
//! collapse into one entity. Lists deduplicate case-insensitively with
//! insertion order preserved; scalars keep the first non-empty value.

use std::collections::HashMap;

use watchgate_core::{Address, CryptoAddress, Entity, GovernmentId};

/// Merges sibling rows into single entities. Input order is preserved
/// for first-seen keys; merged entities lose their `prepared` fields and
/// must be re-normalized before indexing.
pub fn merge_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut order: Vec<(watchgate_core::SourceList, String, watchgate_core::EntityKind)> =
        Vec::new();
    let mut merged: HashMap<(watchgate_core::SourceList, String, watchgate_core::EntityKind), Entity> =
        HashMap::new();

    for entity in entities {
        let (source, source_id, kind) = entity.merge_key();
        let key = (source, source_id.to_string(), kind);
        match merged.get_mut(&key) {
            Some(existing) => merge_into(existing, entity),
            None => {
                order.push(key.clone());
                merged.insert(key, entity);
            }
        }
    }

    let count = order.len();
    let mut out = Vec::with_capacity(count);
    for key in order {
        if let Some(mut entity) = merged.remove(&key) {
            dedupe_in_place(&mut entity);
            entity.prepared = None;
            out.push(entity);
        }
    }
    tracing::debug!(merged = count, "merged sibling entity rows");
    out
}

fn merge_into(base: &mut Entity, other: Entity) {
    base.alt_names = merge_strings(std::mem::take(&mut base.alt_names), other.alt_names);
    // The other row's primary name becomes an alias when it differs.
    if !other.name.trim().is_empty() && !base.name.trim().eq_ignore_ascii_case(other.name.trim()) {
        base.alt_names = merge_strings(std::mem::take(&mut base.alt_names), vec![other.name]);
    }

    base.addresses = merge_addresses(std::mem::take(&mut base.addresses), other.addresses);
    base.government_ids =
        merge_government_ids(std::mem::take(&mut base.government_ids), other.government_ids);
    base.crypto_addresses =
        merge_crypto_addresses(std::mem::take(&mut base.crypto_addresses), other.crypto_addresses);
    base.programs = merge_strings(std::mem::take(&mut base.programs), other.programs);

    for entry in other.historical_info {
        let duplicate = base.historical_info.iter().any(|existing| {
            existing.value_type.eq_ignore_ascii_case(&entry.value_type)
                && existing.value.trim().eq_ignore_ascii_case(entry.value.trim())
        });
        if !duplicate && !entry.value.trim().is_empty() {
            base.historical_info.push(entry);
        }
    }

    if base.remarks.as_deref().map(str::trim).unwrap_or("").is_empty() {
        base.remarks = other.remarks;
    }
    if base.sanctions_info.is_none() {
        base.sanctions_info = other.sanctions_info;
    }
    match (&mut base.contact_info, other.contact_info) {
        (Some(existing), Some(incoming)) => {
            if existing.email_address.is_none() {
                existing.email_address = incoming.email_address;
            }
            if existing.phone_number.is_none() {
                existing.phone_number = incoming.phone_number;
            }
            if existing.fax_number.is_none() {
                existing.fax_number = incoming.fax_number;
            }
        }
        (slot @ None, Some(incoming)) => *slot = Some(incoming),
        _ => {}
    }

    merge_details(base, other.person, other.business, other.organization, other.vessel, other.aircraft);
    base.prepared = None;
}

#[allow(clippy::too_many_arguments)]
fn merge_details(
    base: &mut Entity,
    person: Option<watchgate_core::PersonInfo>,
    business: Option<watchgate_core::BusinessInfo>,
    organization: Option<watchgate_core::OrganizationInfo>,
    vessel: Option<watchgate_core::VesselInfo>,
    aircraft: Option<watchgate_core::AircraftInfo>,
) {
    match (&mut base.person, person) {
        (Some(existing), Some(incoming)) => {
            if existing.gender.is_none() {
                existing.gender = incoming.gender;
            }
            if existing.birth_date.is_none() {
                existing.birth_date = incoming.birth_date;
            }
            if existing.death_date.is_none() {
                existing.death_date = incoming.death_date;
            }
            existing.titles = merge_strings(std::mem::take(&mut existing.titles), incoming.titles);
            for affiliation in incoming.affiliations {
                let duplicate = existing.affiliations.iter().any(|a| {
                    a.entity_name.trim().eq_ignore_ascii_case(affiliation.entity_name.trim())
                        && a.relationship.trim().eq_ignore_ascii_case(affiliation.relationship.trim())
                });
                if !duplicate {
                    existing.affiliations.push(affiliation);
                }
            }
        }
        (slot @ None, incoming @ Some(_)) => *slot = incoming,
        _ => {}
    }

    match (&mut base.business, business) {
        (Some(existing), Some(incoming)) => {
            if existing.created.is_none() {
                existing.created = incoming.created;
            }
            if existing.dissolved.is_none() {
                existing.dissolved = incoming.dissolved;
            }
        }
        (slot @ None, incoming @ Some(_)) => *slot = incoming,
        _ => {}
    }

    match (&mut base.organization, organization) {
        (Some(existing), Some(incoming)) => {
            if existing.created.is_none() {
                existing.created = incoming.created;
            }
            if existing.dissolved.is_none() {
                existing.dissolved = incoming.dissolved;
            }
        }
        (slot @ None, incoming @ Some(_)) => *slot = incoming,
        _ => {}
    }

    match (&mut base.vessel, vessel) {
        (Some(existing), Some(incoming)) => {
            if existing.imo_number.is_none() {
                existing.imo_number = incoming.imo_number;
            }
            if existing.call_sign.is_none() {
                existing.call_sign = incoming.call_sign;
            }
            if existing.mmsi.is_none() {
                existing.mmsi = incoming.mmsi;
            }
            if existing.flag.is_none() {
                existing.flag = incoming.flag;
            }
            if existing.vessel_type.is_none() {
                existing.vessel_type = incoming.vessel_type;
            }
            if existing.tonnage.is_none() {
                existing.tonnage = incoming.tonnage;
            }
            if existing.owner.is_none() {
                existing.owner = incoming.owner;
            }
            if existing.built.is_none() {
                existing.built = incoming.built;
            }
        }
        (slot @ None, incoming @ Some(_)) => *slot = incoming,
        _ => {}
    }

    match (&mut base.aircraft, aircraft) {
        (Some(existing), Some(incoming)) => {
            if existing.serial_number.is_none() {
                existing.serial_number = incoming.serial_number;
            }
            if existing.icao_code.is_none() {
                existing.icao_code = incoming.icao_code;
            }
            if existing.model.is_none() {
                existing.model = incoming.model;
            }
            if existing.operator.is_none() {
                existing.operator = incoming.operator;
            }
            if existing.flag.is_none() {
                existing.flag = incoming.flag;
            }
            if existing.built.is_none() {
                existing.built = incoming.built;
            }
        }
        (slot @ None, incoming @ Some(_)) => *slot = incoming,
        _ => {}
    }
}

/// Trim-and-casefold dedup preserving insertion order; blanks dropped.
pub fn merge_strings(base: Vec<String>, incoming: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(base.len() + incoming.len());
    for value in base.into_iter().chain(incoming) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Deduplicates by (line1, line2); colliding records fill each other's
/// missing sub-fields.
pub fn merge_addresses(base: Vec<Address>, incoming: Vec<Address>) -> Vec<Address> {
    let mut out: Vec<Address> = Vec::with_capacity(base.len() + incoming.len());
    for address in base.into_iter().chain(incoming) {
        if address.is_empty() {
            continue;
        }
        let existing = out.iter_mut().find(|candidate| {
            option_eq_ignore_case(candidate.line1.as_deref(), address.line1.as_deref())
                && option_eq_ignore_case(candidate.line2.as_deref(), address.line2.as_deref())
        });
        match existing {
            Some(slot) => {
                if slot.city.is_none() {
                    slot.city = address.city;
                }
                if slot.state.is_none() {
                    slot.state = address.state;
                }
                if slot.postal_code.is_none() {
                    slot.postal_code = address.postal_code;
                }
                if slot.country.is_none() {
                    slot.country = address.country;
                }
            }
            None => out.push(address),
        }
    }
    out
}

pub fn merge_government_ids(base: Vec<GovernmentId>, incoming: Vec<GovernmentId>) -> Vec<GovernmentId> {
    let mut out: Vec<GovernmentId> = Vec::with_capacity(base.len() + incoming.len());
    for id in base.into_iter().chain(incoming) {
        if id.identifier.trim().is_empty() {
            continue;
        }
        let duplicate = out.iter().any(|existing| {
            existing.kind == id.kind
                && existing.identifier.eq_ignore_ascii_case(id.identifier.trim())
                && option_eq_ignore_case(existing.country.as_deref(), id.country.as_deref())
        });
        if !duplicate {
            out.push(id);
        }
    }
    out
}

pub fn merge_crypto_addresses(
    base: Vec<CryptoAddress>,
    incoming: Vec<CryptoAddress>,
) -> Vec<CryptoAddress> {
    let mut out: Vec<CryptoAddress> = Vec::with_capacity(base.len() + incoming.len());
    for crypto in base.into_iter().chain(incoming) {
        if crypto.address.trim().is_empty() {
            continue;
        }
        let duplicate = out.iter().any(|existing| {
            existing.address.eq_ignore_ascii_case(crypto.address.trim())
                && option_eq_ignore_case(existing.currency.as_deref(), crypto.currency.as_deref())
        });
        if !duplicate {
            out.push(crypto);
        }
    }
    out
}

/// Applies the list-dedup rules to a single entity so no duplicates
/// survive the merge pass even inside one row.
fn dedupe_in_place(entity: &mut Entity) {
    entity.alt_names = merge_strings(std::mem::take(&mut entity.alt_names), Vec::new());
    entity.programs = merge_strings(std::mem::take(&mut entity.programs), Vec::new());
    entity.addresses = merge_addresses(std::mem::take(&mut entity.addresses), Vec::new());
    entity.government_ids =
        merge_government_ids(std::mem::take(&mut entity.government_ids), Vec::new());
    entity.crypto_addresses =
        merge_crypto_addresses(std::mem::take(&mut entity.crypto_addresses), Vec::new());
}

fn option_eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchgate_core::{EntityKind, IdKind, SourceList};

    fn row(id: &str, source_id: &str, name: &str) -> Entity {
        Entity::new(id, source_id, name, EntityKind::Person, SourceList::EuCsl)
    }

    #[test]
    fn rows_sharing_a_key_collapse() {
        let mut a = row("eu-1a", "EU.27.28", "Saddam Hussein Al-Tikriti");
        a.alt_names = vec!["Abu Ali".to_string()];
        let mut b = row("eu-1b", "EU.27.28", "Saddam Hussein Al-Tikriti");
        b.alt_names = vec!["abu ali".to_string(), "Abou Ali".to_string()];

        let merged = merge_entities(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].alt_names, vec!["Abu Ali", "Abou Ali"]);
    }

    #[test]
    fn differing_primary_name_becomes_an_alias() {
        let a = row("eu-1a", "EU.27.28", "Saddam Hussein");
        let b = row("eu-1b", "EU.27.28", "Abu Ali");
        let merged = merge_entities(vec![a, b]);
        assert_eq!(merged[0].name, "Saddam Hussein");
        assert_eq!(merged[0].alt_names, vec!["Abu Ali"]);
    }

    #[test]
    fn distinct_keys_stay_separate_in_order() {
        let merged = merge_entities(vec![
            row("a", "1", "First"),
            row("b", "2", "Second"),
            row("c", "1", "First Again"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source_id, "1");
        assert_eq!(merged[1].source_id, "2");
    }

    #[test]
    fn government_ids_dedupe_case_insensitively() {
        let ids = merge_government_ids(
            vec![GovernmentId {
                kind: IdKind::Passport,
                identifier: "AB123".to_string(),
                country: Some("iraq".to_string()),
            }],
            vec![
                GovernmentId {
                    kind: IdKind::Passport,
                    identifier: "ab123".to_string(),
                    country: Some("IRAQ".to_string()),
                },
                GovernmentId {
                    kind: IdKind::TaxId,
                    identifier: "AB123".to_string(),
                    country: Some("iraq".to_string()),
                },
            ],
        );
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn addresses_fill_missing_fields_on_collision() {
        let merged = merge_addresses(
            vec![Address {
                line1: Some("1 main st".to_string()),
                city: Some("baghdad".to_string()),
                ..Default::default()
            }],
            vec![Address {
                line1: Some("1 MAIN ST".to_string()),
                country: Some("iraq".to_string()),
                ..Default::default()
            }],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].city.as_deref(), Some("baghdad"));
        assert_eq!(merged[0].country.as_deref(), Some("iraq"));
    }

    #[test]
    fn scalars_keep_first_non_empty() {
        let mut a = row("a1", "1", "Name");
        a.remarks = Some("  ".to_string());
        let mut b = row("a2", "1", "Name");
        b.remarks = Some("linked to front companies".to_string());
        let merged = merge_entities(vec![a, b]);
        assert_eq!(merged[0].remarks.as_deref(), Some("linked to front companies"));
    }

    #[test]
    fn merge_clears_prepared_fields() {
        let a = row("a1", "1", "Name");
        let b = row("a2", "1", "Name Two");
        let merged = merge_entities(vec![a, b]);
        assert!(merged[0].prepared.is_none());
    }
}
