//! Exact identifier comparison: government documents plus the fixed
//! identifiers vessels and aircraft carry (IMO, call sign, MMSI, serial
//! number, ICAO code). Identifiers arrive already normalized (uppercase,
//! separators stripped), so a hit is plain string equality; the country
//! attached to a document shades the score.

use watchgate_core::{Entity, EntityKind, GovernmentId, PieceKind, ScorePiece};

use super::{EXACT_THRESHOLD, ID_WEIGHT, MATCH_THRESHOLD};

const BOTH_COUNTRIES_MATCH: f64 = 1.0;
const COUNTRY_MISSING: f64 = 0.9;
const COUNTRIES_DIFFER: f64 = 0.7;

const VESSEL_IMO_WEIGHT: f64 = 15.0;
const VESSEL_CALL_SIGN_WEIGHT: f64 = 12.0;
const VESSEL_MMSI_WEIGHT: f64 = 12.0;
const AIRCRAFT_SERIAL_WEIGHT: f64 = 15.0;
const AIRCRAFT_ICAO_WEIGHT: f64 = 12.0;

fn id_pair_score(query: &GovernmentId, candidate: &GovernmentId) -> Option<f64> {
    if query.identifier.is_empty() || query.identifier != candidate.identifier {
        return None;
    }
    Some(match (query.country.as_deref(), candidate.country.as_deref()) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => BOTH_COUNTRIES_MATCH,
        (Some(_), Some(_)) => COUNTRIES_DIFFER,
        _ => COUNTRY_MISSING,
    })
}

/// Best government-id score across both lists, or `None` when nothing
/// can be compared.
fn best_government_id_score(query: &[GovernmentId], candidate: &[GovernmentId]) -> Option<f64> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }
    let mut best: Option<f64> = None;
    for q in query {
        for c in candidate {
            if let Some(score) = id_pair_score(q, c) {
                best = Some(best.map_or(score, |b: f64| b.max(score)));
            }
        }
    }
    // Both sides had documents; no shared identifier means a zero score,
    // not a skipped comparison.
    Some(best.unwrap_or(0.0))
}

/// Weighted equality fraction over the asset identifier fields present
/// on both sides.
fn asset_id_score(query: &Entity, candidate: &Entity) -> Option<(f64, u32)> {
    let fields: Vec<(Option<&str>, Option<&str>, f64)> = match candidate.kind {
        EntityKind::Vessel => {
            let q = query.vessel.as_ref()?;
            let c = candidate.vessel.as_ref()?;
            vec![
                (q.imo_number.as_deref(), c.imo_number.as_deref(), VESSEL_IMO_WEIGHT),
                (q.call_sign.as_deref(), c.call_sign.as_deref(), VESSEL_CALL_SIGN_WEIGHT),
                (q.mmsi.as_deref(), c.mmsi.as_deref(), VESSEL_MMSI_WEIGHT),
            ]
        }
        EntityKind::Aircraft => {
            let q = query.aircraft.as_ref()?;
            let c = candidate.aircraft.as_ref()?;
            vec![
                (q.serial_number.as_deref(), c.serial_number.as_deref(), AIRCRAFT_SERIAL_WEIGHT),
                (q.icao_code.as_deref(), c.icao_code.as_deref(), AIRCRAFT_ICAO_WEIGHT),
            ]
        }
        _ => return None,
    };

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    let mut compared = 0u32;
    for (q, c, weight) in fields {
        if let (Some(q), Some(c)) = (q, c) {
            weighted += if q.eq_ignore_ascii_case(c) { weight } else { 0.0 };
            weight_sum += weight;
            compared += 1;
        }
    }
    if compared == 0 {
        None
    } else {
        Some((weighted / weight_sum, compared))
    }
}

pub fn compare_identifiers(query: &Entity, candidate: &Entity) -> Option<ScorePiece> {
    let government = best_government_id_score(&query.government_ids, &candidate.government_ids);
    let asset = asset_id_score(query, candidate);

    let (score, fields_compared) = match (government, asset) {
        (Some(g), Some((a, compared))) => (g.max(a), 1 + compared),
        (Some(g), None) => (g, 1),
        (None, Some((a, compared))) => (a, compared),
        (None, None) => return None,
    };

    let mut piece = ScorePiece::new(PieceKind::GovernmentId, score, ID_WEIGHT);
    piece.matched = score >= MATCH_THRESHOLD;
    piece.exact = score > EXACT_THRESHOLD;
    piece.fields_compared = fields_compared;
    Some(piece)
}
