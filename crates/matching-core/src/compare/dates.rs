//! Date comparison. Year, month, and day contribute 40/30/30 with
//! typo-tolerant component scoring; a composite under 0.5 is reported as
//! a mismatch (score 0) so contradictory dates drag the aggregate
//! instead of padding it. Persons compare birth and death, businesses
//! and organizations created and dissolved, vessels and aircraft the
//! build date.

use chrono::{Datelike, NaiveDate};
use watchgate_core::{Entity, EntityKind, PieceKind, ScorePiece};

use super::{DATE_WEIGHT, EXACT_THRESHOLD, MATCH_THRESHOLD};

const YEAR_SHARE: f64 = 0.4;
const MONTH_SHARE: f64 = 0.3;
const DAY_SHARE: f64 = 0.3;

/// Composites below this count as contradicting dates.
const MISMATCH_FLOOR: f64 = 0.5;

/// Plausible lifespan ratio between the two sides before the pair is
/// considered logically inconsistent.
const LIFESPAN_RATIO_LIMIT: f64 = 1.21;

fn year_score(a: i32, b: i32) -> f64 {
    let diff = (a - b).unsigned_abs();
    if diff <= 5 {
        1.0 - 0.1 * diff as f64
    } else {
        0.2
    }
}

fn month_score(a: u32, b: u32) -> f64 {
    if a == b {
        return 1.0;
    }
    // 1 vs 10/11/12 is the classic dropped-digit typo.
    if (a == 1 && b >= 10) || (b == 1 && a >= 10) {
        return 0.7;
    }
    if a.abs_diff(b) <= 1 {
        0.9
    } else {
        0.2
    }
}

fn day_score(a: u32, b: u32) -> f64 {
    if a == b {
        return 1.0;
    }
    let diff = a.abs_diff(b);
    let linear = if diff <= 3 { 1.0 - diff as f64 / 6.0 } else { 0.2 };
    // Repeated-digit and transposed-digit patterns (1↔11, 12↔21, 13↔31).
    let repeated = (a < 10 && b == a * 11) || (b < 10 && a == b * 11);
    let transposed = a == (b % 10) * 10 + b / 10;
    if repeated || transposed {
        linear.max(0.8)
    } else {
        linear
    }
}

/// Similarity of two full dates; 0.0 when the composite lands below the
/// mismatch floor.
pub fn score_date_pair(a: NaiveDate, b: NaiveDate) -> f64 {
    let composite = YEAR_SHARE * year_score(a.year(), b.year())
        + MONTH_SHARE * month_score(a.month(), b.month())
        + DAY_SHARE * day_score(a.day(), b.day());
    if composite < MISMATCH_FLOOR {
        0.0
    } else {
        composite
    }
}

fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Birth must precede death on both sides, and the two lifespans must be
/// within a plausible ratio of each other.
fn person_dates_logical(
    birth_a: NaiveDate,
    death_a: NaiveDate,
    birth_b: NaiveDate,
    death_b: NaiveDate,
) -> bool {
    let span_a = span_days(birth_a, death_a);
    let span_b = span_days(birth_b, death_b);
    if span_a <= 0 || span_b <= 0 {
        return false;
    }
    let ratio = span_a.max(span_b) as f64 / span_a.min(span_b) as f64;
    ratio <= LIFESPAN_RATIO_LIMIT
}

struct DatePairs {
    scores: Vec<f64>,
    illogical: bool,
}

fn collect_pairs(query: &Entity, candidate: &Entity) -> DatePairs {
    let mut scores = Vec::new();
    let mut illogical = false;

    match candidate.kind {
        EntityKind::Person => {
            let q = query.person.as_ref();
            let c = candidate.person.as_ref();
            let q_birth = q.and_then(|p| p.birth_date);
            let c_birth = c.and_then(|p| p.birth_date);
            let q_death = q.and_then(|p| p.death_date);
            let c_death = c.and_then(|p| p.death_date);

            if let (Some(a), Some(b)) = (q_birth, c_birth) {
                scores.push(score_date_pair(a, b));
            }
            if let (Some(a), Some(b)) = (q_death, c_death) {
                scores.push(score_date_pair(a, b));
            }
            if let (Some(ba), Some(da), Some(bb), Some(db)) = (q_birth, q_death, c_birth, c_death) {
                illogical = !person_dates_logical(ba, da, bb, db);
            }
        }
        EntityKind::Business | EntityKind::Organization => {
            let (q_created, q_dissolved) = business_dates(query);
            let (c_created, c_dissolved) = business_dates(candidate);
            if let (Some(a), Some(b)) = (q_created, c_created) {
                scores.push(score_date_pair(a, b));
            }
            if let (Some(a), Some(b)) = (q_dissolved, c_dissolved) {
                scores.push(score_date_pair(a, b));
            }
        }
        EntityKind::Vessel => {
            let q = query.vessel.as_ref().and_then(|v| v.built);
            let c = candidate.vessel.as_ref().and_then(|v| v.built);
            if let (Some(a), Some(b)) = (q, c) {
                scores.push(score_date_pair(a, b));
            }
        }
        EntityKind::Aircraft => {
            let q = query.aircraft.as_ref().and_then(|a| a.built);
            let c = candidate.aircraft.as_ref().and_then(|a| a.built);
            if let (Some(a), Some(b)) = (q, c) {
                scores.push(score_date_pair(a, b));
            }
        }
        EntityKind::Unknown => {}
    }

    DatePairs { scores, illogical }
}

fn business_dates(entity: &Entity) -> (Option<NaiveDate>, Option<NaiveDate>) {
    if let Some(b) = entity.business.as_ref() {
        (b.created, b.dissolved)
    } else if let Some(o) = entity.organization.as_ref() {
        (o.created, o.dissolved)
    } else {
        (None, None)
    }
}

pub fn compare_dates(query: &Entity, candidate: &Entity) -> Option<ScorePiece> {
    let pairs = collect_pairs(query, candidate);
    if pairs.scores.is_empty() {
        return None;
    }

    let mut score = pairs.scores.iter().sum::<f64>() / pairs.scores.len() as f64;
    if pairs.illogical {
        score *= 0.5;
    }

    let mut piece = ScorePiece::new(PieceKind::Date, score.clamp(0.0, 1.0), DATE_WEIGHT);
    piece.matched = score >= MATCH_THRESHOLD;
    piece.exact = score > EXACT_THRESHOLD;
    piece.fields_compared = pairs.scores.len() as u32;
    Some(piece)
}
