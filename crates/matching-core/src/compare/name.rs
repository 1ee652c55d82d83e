//! Name scoring: primary vs primary through the combination-aware
//! best-pair matcher, alt names cross-compared against both sides, and
//! the blend of the two. This is the heaviest-weighted piece and the one
//! that gates whether a candidate is scored at all.

use watchgate_core::{EntityKind, PieceKind, PreparedFields, ScorePiece};

use crate::config::MatchConfig;
use crate::similarity::{
    best_pair_jaro_winkler, best_pair_over_combinations, custom_jaro_winkler,
    jaro_winkler_with_favoritism,
};

use super::{EXACT_THRESHOLD, MATCH_THRESHOLD, NAME_WEIGHT};

/// Candidates whose best achievable name score falls below this are
/// dropped before any other comparator runs.
pub const NAME_EARLY_EXIT: f64 = 0.4;

#[derive(Debug, Clone, Copy)]
pub struct NameScore {
    pub piece: ScorePiece,
    pub primary_score: f64,
    pub alt_score: f64,
    /// Query primary tokens with a strong counterpart in the candidate's
    /// primary or alt names.
    pub matched_tokens: u32,
}

pub fn compare_names(
    query: &PreparedFields,
    candidate: &PreparedFields,
    kind: EntityKind,
    config: &MatchConfig,
) -> NameScore {
    let mut primary_score =
        best_pair_over_combinations(&query.name_combinations, &candidate.name_combinations, config);

    // Company names additionally run the positional favoritism variant;
    // the better of the two signals wins.
    if matches!(kind, EntityKind::Business | EntityKind::Organization) {
        primary_score = primary_score.max(jaro_winkler_with_favoritism(
            &candidate.normalized_name,
            &query.normalized_name,
            config.exact_match_favoritism,
            config,
        ));
    }

    let alt_score = best_alt_score(query, candidate, config);

    let combined = if primary_score > 0.0 && alt_score > 0.0 {
        (primary_score + alt_score) / 2.0
    } else {
        primary_score.max(alt_score)
    };

    let exact = !query.normalized_name.is_empty()
        && query.normalized_name == candidate.normalized_name;
    let fields_compared = 1
        + u32::from(!query.normalized_alt_names.is_empty() || !candidate.normalized_alt_names.is_empty());

    let mut piece = ScorePiece::new(PieceKind::Name, combined.clamp(0.0, 1.0), NAME_WEIGHT);
    piece.matched = combined >= MATCH_THRESHOLD;
    piece.exact = exact || combined > EXACT_THRESHOLD;
    piece.fields_compared = fields_compared;

    NameScore {
        piece,
        primary_score,
        alt_score,
        matched_tokens: count_matched_tokens(query, candidate, config),
    }
}

/// Best alt-name pairing: every comparison in which at least one side is
/// an alias, including alias-vs-primary in both directions.
fn best_alt_score(
    query: &PreparedFields,
    candidate: &PreparedFields,
    config: &MatchConfig,
) -> f64 {
    let mut best = 0.0f64;

    for q_alt in &query.alt_name_tokens {
        best = best.max(best_pair_jaro_winkler(q_alt, &candidate.name_tokens, config));
        for c_alt in &candidate.alt_name_tokens {
            best = best.max(best_pair_jaro_winkler(q_alt, c_alt, config));
        }
    }
    for c_alt in &candidate.alt_name_tokens {
        best = best.max(best_pair_jaro_winkler(&query.name_tokens, c_alt, config));
    }

    best
}

fn count_matched_tokens(
    query: &PreparedFields,
    candidate: &PreparedFields,
    config: &MatchConfig,
) -> u32 {
    let mut matched = 0u32;
    for q in &query.name_tokens {
        let strong_primary = candidate
            .name_tokens
            .iter()
            .any(|c| custom_jaro_winkler(q, c, config) >= 0.85);
        let strong_alt = || {
            candidate
                .alt_name_tokens
                .iter()
                .flatten()
                .any(|c| custom_jaro_winkler(q, c, config) >= 0.85)
        };
        if strong_primary || strong_alt() {
            matched += 1;
        }
    }
    matched
}
