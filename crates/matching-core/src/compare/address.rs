//! Address comparison. Street lines and cities match fuzzily, the
//! structured fields (state, postal code, country) match on equality.
//! Fields missing on either side drop out of both the numerator and the
//! denominator.

use strsim::jaro_winkler;
use watchgate_core::{Address, PieceKind, ScorePiece};

use super::{ADDRESS_WEIGHT, EXACT_THRESHOLD, MATCH_THRESHOLD};

const ADDRESS_EARLY_EXIT: f64 = 0.92;

const LINE1_WEIGHT: f64 = 5.0;
const CITY_WEIGHT: f64 = 4.0;
const COUNTRY_WEIGHT: f64 = 4.0;
const POSTAL_WEIGHT: f64 = 3.0;
const LINE2_WEIGHT: f64 = 2.0;
const STATE_WEIGHT: f64 = 2.0;

fn fuzzy_field(a: Option<&str>, b: Option<&str>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(jaro_winkler(a, b)),
        _ => None,
    }
}

fn equality_field(a: Option<&str>, b: Option<&str>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.eq_ignore_ascii_case(b) { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn score_pair(query: &Address, candidate: &Address) -> Option<(f64, u32)> {
    let fields = [
        (fuzzy_field(query.line1.as_deref(), candidate.line1.as_deref()), LINE1_WEIGHT),
        (fuzzy_field(query.line2.as_deref(), candidate.line2.as_deref()), LINE2_WEIGHT),
        (fuzzy_field(query.city.as_deref(), candidate.city.as_deref()), CITY_WEIGHT),
        (equality_field(query.state.as_deref(), candidate.state.as_deref()), STATE_WEIGHT),
        (
            equality_field(query.postal_code.as_deref(), candidate.postal_code.as_deref()),
            POSTAL_WEIGHT,
        ),
        (equality_field(query.country.as_deref(), candidate.country.as_deref()), COUNTRY_WEIGHT),
    ];

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    let mut compared = 0u32;
    for (score, weight) in fields {
        if let Some(s) = score {
            weighted += s * weight;
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

/// Best pairing across both address lists, early-exiting once a pair
/// clears 0.92.
pub fn compare_addresses(
    query: &[Address],
    candidate: &[Address],
) -> Option<ScorePiece> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }

    let mut best: Option<(f64, u32)> = None;
    'outer: for q in query {
        if q.is_empty() {
            continue;
        }
        for c in candidate {
            if c.is_empty() {
                continue;
            }
            if let Some((score, compared)) = score_pair(q, c) {
                if best.map_or(true, |(b, _)| score > b) {
                    best = Some((score, compared));
                }
                if score >= ADDRESS_EARLY_EXIT {
                    break 'outer;
                }
            }
        }
    }

    let (score, compared) = best?;
    let mut piece = ScorePiece::new(PieceKind::Address, score, ADDRESS_WEIGHT);
    piece.matched = score >= MATCH_THRESHOLD;
    piece.exact = score > EXACT_THRESHOLD;
    piece.fields_compared = compared;
    Some(piece)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(line1: &str, city: &str, country: &str) -> Address {
        Address {
            line1: Some(line1.to_string()),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn identical_addresses_score_one() {
        let a = vec![address("av urdaneta 23", "caracas", "venezuela")];
        let piece = compare_addresses(&a, &a).unwrap();
        assert_eq!(piece.score, 1.0);
        assert!(piece.exact);
        assert_eq!(piece.fields_compared, 3);
    }

    #[test]
    fn country_mismatch_drags_the_weighted_sum() {
        let q = vec![address("av urdaneta 23", "caracas", "venezuela")];
        let c = vec![address("av urdaneta 23", "caracas", "colombia")];
        let piece = compare_addresses(&q, &c).unwrap();
        // line1 (5) + city (4) match, country (4) does not: 9/13.
        assert!((piece.score - 9.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn best_pair_wins_across_lists() {
        let q = vec![address("1 main st", "london", "united kingdom")];
        let c = vec![
            address("99 other road", "paris", "france"),
            address("1 main st", "london", "united kingdom"),
        ];
        let piece = compare_addresses(&q, &c).unwrap();
        assert_eq!(piece.score, 1.0);
    }

    #[test]
    fn disjoint_fields_are_skipped() {
        let q = vec![Address {
            postal_code: Some("1010".to_string()),
            ..Default::default()
        }];
        let c = vec![Address {
            city: Some("caracas".to_string()),
            ..Default::default()
        }];
        assert!(compare_addresses(&q, &c).is_none());
    }

    #[test]
    fn missing_lists_yield_none() {
        assert!(compare_addresses(&[], &[]).is_none());
    }
}
