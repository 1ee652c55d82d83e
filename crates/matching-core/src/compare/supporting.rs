//! Supporting information: sanctions program overlap, historical values,
//! and the kind-specific soft signals (titles for persons, affiliations
//! for businesses and organizations). Components that produced nothing
//! are excluded from the mean rather than averaged in as zeros.

use std::collections::HashSet;

use strsim::jaro_winkler;
use watchgate_core::{Entity, EntityKind, HistoricalEntry, PieceKind, ScorePiece};

use crate::config::MatchConfig;
use crate::text::lower_and_strip_punctuation;

use super::affiliation::{best_affiliation_score, AFFILIATION_MATCH_THRESHOLD};
use super::title::best_title_score;
use super::{EXACT_THRESHOLD, MATCH_THRESHOLD, SUPPORTING_WEIGHT};

/// Secondary-sanctions flags disagreeing shave the program score.
const SECONDARY_FLAG_PENALTY: f64 = 0.8;

/// Case-insensitive overlap ratio of program names, penalized when the
/// secondary-sanctions flags disagree.
fn program_score(query: &Entity, candidate: &Entity) -> Option<f64> {
    if query.programs.is_empty() || candidate.programs.is_empty() {
        return None;
    }

    let normalize = |programs: &[String]| -> HashSet<String> {
        programs
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect()
    };
    let q = normalize(&query.programs);
    let c = normalize(&candidate.programs);
    if q.is_empty() || c.is_empty() {
        return None;
    }

    let intersection = q.intersection(&c).count() as f64;
    let union = q.union(&c).count() as f64;
    let mut score = intersection / union;

    let q_secondary = query.sanctions_info.as_ref().map(|s| s.secondary).unwrap_or(false);
    let c_secondary = candidate.sanctions_info.as_ref().map(|s| s.secondary).unwrap_or(false);
    if q_secondary != c_secondary {
        score *= SECONDARY_FLAG_PENALTY;
    }

    Some(score)
}

/// Best Jaro-Winkler over historical values whose types agree.
fn historical_score(query: &[HistoricalEntry], candidate: &[HistoricalEntry]) -> Option<f64> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }

    let mut best: Option<f64> = None;
    for q in query {
        for c in candidate {
            if !q.value_type.eq_ignore_ascii_case(&c.value_type) {
                continue;
            }
            let score = jaro_winkler(
                &lower_and_strip_punctuation(&q.value),
                &lower_and_strip_punctuation(&c.value),
            );
            best = Some(best.map_or(score, |b: f64| b.max(score)));
        }
    }
    best
}

pub fn compare_supporting_info(
    query: &Entity,
    candidate: &Entity,
    config: &MatchConfig,
) -> Option<ScorePiece> {
    let mut components: Vec<(f64, bool)> = Vec::with_capacity(4);

    if let Some(score) = program_score(query, candidate) {
        components.push((score, score >= MATCH_THRESHOLD));
    }
    if let Some(score) = historical_score(&query.historical_info, &candidate.historical_info) {
        components.push((score, score >= MATCH_THRESHOLD));
    }

    match candidate.kind {
        EntityKind::Person => {
            let q_titles = query.person.as_ref().map(|p| p.titles.as_slice()).unwrap_or(&[]);
            let c_titles = candidate.person.as_ref().map(|p| p.titles.as_slice()).unwrap_or(&[]);
            if let Some(score) = best_title_score(q_titles, c_titles, config) {
                components.push((score, score >= MATCH_THRESHOLD));
            }
        }
        EntityKind::Business | EntityKind::Organization => {
            let q_affs = query
                .business
                .as_ref()
                .map(|b| b.affiliations.as_slice())
                .or_else(|| query.organization.as_ref().map(|o| o.affiliations.as_slice()))
                .unwrap_or(&[]);
            let c_affs = candidate
                .business
                .as_ref()
                .map(|b| b.affiliations.as_slice())
                .or_else(|| candidate.organization.as_ref().map(|o| o.affiliations.as_slice()))
                .unwrap_or(&[]);
            if let Some(score) = best_affiliation_score(q_affs, c_affs) {
                components.push((score, score >= AFFILIATION_MATCH_THRESHOLD));
            }
        }
        _ => {}
    }

    if components.is_empty() {
        return None;
    }

    let non_zero: Vec<f64> = components.iter().map(|(s, _)| *s).filter(|s| *s > 0.0).collect();
    let score = if non_zero.is_empty() {
        0.0
    } else {
        non_zero.iter().sum::<f64>() / non_zero.len() as f64
    };

    let mut piece = ScorePiece::new(PieceKind::SupportingInfo, score.clamp(0.0, 1.0), SUPPORTING_WEIGHT);
    piece.matched = components.iter().any(|(_, matched)| *matched);
    piece.exact = score > EXACT_THRESHOLD;
    piece.fields_compared = components.len() as u32;
    Some(piece)
}
