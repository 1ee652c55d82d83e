//! Affiliation comparison for businesses and organizations. Relationship
//! types collapse into four groups; the name similarity carries the
//! score and the type relation shifts it. Multiple affiliations combine
//! through a squared-weight average so one strong link outweighs several
//! weak ones.

use phf::phf_map;
use strsim::jaro_winkler;
use watchgate_core::Affiliation;

use crate::normalize::normalize_name;

/// Affiliations report `matched` only at or above this score. Stricter
/// than the engine-wide 0.5 on purpose; kept as-is from the source
/// semantics rather than unified.
pub const AFFILIATION_MATCH_THRESHOLD: f64 = 0.85;

const EXACT_TYPE_BONUS: f64 = 0.15;
const RELATED_TYPE_BONUS: f64 = 0.08;
const TYPE_MISMATCH_PENALTY: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationGroup {
    Ownership,
    Control,
    Association,
    Leadership,
}

static RELATION_GROUPS: phf::Map<&'static str, RelationGroup> = phf_map! {
    "owner of" => RelationGroup::Ownership,
    "owned by" => RelationGroup::Ownership,
    "parent of" => RelationGroup::Ownership,
    "subsidiary of" => RelationGroup::Ownership,
    "holding of" => RelationGroup::Ownership,
    "shareholder of" => RelationGroup::Ownership,
    "beneficial owner of" => RelationGroup::Ownership,
    "controlled by" => RelationGroup::Control,
    "controls" => RelationGroup::Control,
    "managed by" => RelationGroup::Control,
    "manages" => RelationGroup::Control,
    "operated by" => RelationGroup::Control,
    "operates" => RelationGroup::Control,
    "directed by" => RelationGroup::Control,
    "linked to" => RelationGroup::Association,
    "associated with" => RelationGroup::Association,
    "affiliated with" => RelationGroup::Association,
    "related to" => RelationGroup::Association,
    "member of" => RelationGroup::Association,
    "supporter of" => RelationGroup::Association,
    "acting for" => RelationGroup::Association,
    "agent of" => RelationGroup::Association,
    "leader of" => RelationGroup::Leadership,
    "head of" => RelationGroup::Leadership,
    "chairman of" => RelationGroup::Leadership,
    "director of" => RelationGroup::Leadership,
    "president of" => RelationGroup::Leadership,
    "founder of" => RelationGroup::Leadership,
};

pub fn classify_relationship(relationship: &str) -> Option<RelationGroup> {
    RELATION_GROUPS
        .get(relationship.trim().to_lowercase().as_str())
        .copied()
}

/// Best score for one query affiliation against the candidate's list.
/// Ties on the combined score break toward the better type relation.
fn best_single_score(query: &Affiliation, candidates: &[Affiliation]) -> f64 {
    let query_name = normalize_name(&query.entity_name, true, None);
    let query_group = classify_relationship(&query.relationship);

    let mut best_combined = 0.0f64;
    let mut best_type_shift = f64::MIN;

    for candidate in candidates {
        let candidate_name = normalize_name(&candidate.entity_name, true, None);
        let name_score = jaro_winkler(&query_name, &candidate_name);

        let candidate_group = classify_relationship(&candidate.relationship);
        let same_type = query
            .relationship
            .trim()
            .eq_ignore_ascii_case(candidate.relationship.trim());
        let type_shift = if same_type {
            EXACT_TYPE_BONUS
        } else {
            match (query_group, candidate_group) {
                (Some(a), Some(b)) if a == b => RELATED_TYPE_BONUS,
                (Some(_), Some(_)) => -TYPE_MISMATCH_PENALTY,
                _ => 0.0,
            }
        };

        let combined = (name_score + type_shift).clamp(0.0, 1.0);
        if combined > best_combined || (combined == best_combined && type_shift > best_type_shift) {
            best_combined = combined;
            best_type_shift = type_shift;
        }
    }

    best_combined
}

/// Squared-weight average over the best score of each query affiliation:
/// Σ(s³) / Σ(s²). Emphasizes quality matches over quantity; this shape
/// is deliberate and load-bearing.
pub fn best_affiliation_score(query: &[Affiliation], candidates: &[Affiliation]) -> Option<f64> {
    if query.is_empty() || candidates.is_empty() {
        return None;
    }

    let mut cubed_sum = 0.0;
    let mut squared_sum = 0.0;
    for q in query {
        let s = best_single_score(q, candidates);
        cubed_sum += s * s * s;
        squared_sum += s * s;
    }

    if squared_sum == 0.0 {
        None
    } else {
        Some((cubed_sum / squared_sum).clamp(0.0, 1.0))
    }
}
