//! Weighted aggregation of the per-field comparators into one bounded
//! score per query/candidate pair. Zero scores are excluded from the
//! weighted mean so quantity never dilutes quality; what zero scores do
//! instead is mark contradicted fields, which penalize multiplicatively.

use std::sync::Arc;

use watchgate_core::{
    Entity, EntityKind, PieceKind, ScoreBreakdown, ScorePiece, ScreenError, TracePhase,
};

use crate::compare::name::{compare_names, NAME_EARLY_EXIT};
use crate::compare::{address, contact, crypto, dates, identifiers, supporting};
use crate::config::MatchConfig;
use crate::trace::ScoringContext;

/// Per-kind caps on the coverage denominator.
fn available_field_cap(kind: EntityKind) -> u32 {
    match kind {
        EntityKind::Person => 14,
        EntityKind::Business | EntityKind::Organization => 12,
        EntityKind::Vessel => 17,
        EntityKind::Aircraft => 15,
        EntityKind::Unknown => 10,
    }
}

const SPARSE_COVERAGE_FLOOR: f64 = 0.35;
const SPARSE_COVERAGE_PENALTY: f64 = 0.95;
const CRITICAL_COVERAGE_FLOOR: f64 = 0.7;
const CRITICAL_COVERAGE_PENALTY: f64 = 0.90;
const FEW_FIELDS_PENALTY: f64 = 0.90;
const NAME_ONLY_PENALTY: f64 = 0.95;
const CONTRADICTED_FIELD_PENALTY: f64 = 0.95;
const QUALITY_PENALTY: f64 = 0.8;
const EXACTNESS_BONUS: f64 = 1.15;
const HIGH_CONFIDENCE_FLOOR: f64 = 0.85;

pub struct EntityScorer {
    config: Arc<MatchConfig>,
}

impl EntityScorer {
    /// Fails fast on a broken config; the scorer cannot exist without one.
    pub fn new(config: Arc<MatchConfig>) -> Result<Self, ScreenError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Scores one candidate. `Ok(None)` means the candidate fell under
    /// the name early-exit floor and no further comparators ran.
    pub fn score(
        &self,
        query: &Entity,
        candidate: &Entity,
        ctx: &ScoringContext,
    ) -> Result<Option<ScoreBreakdown>, ScreenError> {
        let query_prepared = query.prepared.as_ref().ok_or_else(|| {
            ScreenError::invalid_entity(&query.id, "scored before normalization")
        })?;
        let candidate_prepared = candidate.prepared.as_ref().ok_or_else(|| {
            ScreenError::invalid_entity(&candidate.id, "scored before normalization")
        })?;

        let name = ctx.traced(TracePhase::NameComparison, "primary and alt names", || {
            compare_names(query_prepared, candidate_prepared, candidate.kind, &self.config)
        });
        ctx.record_with(TracePhase::AltNameComparison, "alt name blend", || {
            serde_json::json!({
                "primary": name.primary_score,
                "alt": name.alt_score,
                "combined": name.piece.score,
            })
        });

        if name.piece.score < NAME_EARLY_EXIT {
            ctx.record_with(TracePhase::Filtering, "dropped below name floor", || {
                serde_json::json!({ "candidate": candidate.id, "name_score": name.piece.score })
            });
            return Ok(None);
        }

        let mut pieces: Vec<ScorePiece> = vec![name.piece];
        let comparisons: [Option<ScorePiece>; 5] = [
            ctx.traced(TracePhase::DateComparison, "dates", || {
                dates::compare_dates(query, candidate)
            }),
            ctx.traced(TracePhase::GovIdComparison, "identifiers", || {
                identifiers::compare_identifiers(query, candidate)
            }),
            ctx.traced(TracePhase::CryptoComparison, "crypto addresses", || {
                crypto::compare_crypto_addresses(&query.crypto_addresses, &candidate.crypto_addresses)
            }),
            ctx.traced(TracePhase::ContactComparison, "contact info", || {
                contact::compare_contact_info(
                    query.contact_info.as_ref(),
                    candidate.contact_info.as_ref(),
                )
            }),
            ctx.traced(TracePhase::AddressComparison, "addresses", || {
                address::compare_addresses(&query.addresses, &candidate.addresses)
            }),
        ];
        pieces.extend(comparisons.into_iter().flatten());
        if let Some(piece) = ctx.traced(TracePhase::Aggregation, "supporting info", || {
            supporting::compare_supporting_info(query, candidate, &self.config)
        }) {
            pieces.push(piece);
        }

        // A comparator that produced a non-finite value contributes
        // nothing; the failure goes to the trace and the rest of the
        // pieces carry the score.
        for piece in pieces.iter_mut() {
            if !piece.score.is_finite() {
                let kind = piece.piece;
                ctx.record_with(TracePhase::Aggregation, "comparison failure absorbed", || {
                    serde_json::json!({ "piece": kind.as_str() })
                });
                tracing::warn!(
                    piece = kind.as_str(),
                    candidate = %candidate.id,
                    "non-finite comparator score absorbed"
                );
                piece.score = 0.0;
                piece.weight = 0.0;
                piece.matched = false;
                piece.exact = false;
            }
        }

        let breakdown = ctx.traced(TracePhase::Aggregation, "weighted aggregation", || {
            self.aggregate(query, query_prepared, &name, pieces)
        });
        Ok(Some(breakdown))
    }

    fn aggregate(
        &self,
        query: &Entity,
        query_prepared: &watchgate_core::PreparedFields,
        name: &crate::compare::name::NameScore,
        pieces: Vec<ScorePiece>,
    ) -> ScoreBreakdown {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for piece in pieces.iter().filter(|p| p.score > 0.0 && p.weight > 0.0) {
            weighted_sum += piece.score * piece.weight;
            weight_sum += piece.weight;
        }
        let raw = if weight_sum > 0.0 { weighted_sum / weight_sum } else { 0.0 };

        let availability = QueryAvailability::of(query);
        let available = availability.total.min(available_field_cap(query.kind)).max(1);
        let compared_fields: u32 = pieces.iter().map(|p| p.fields_compared).sum();
        let coverage = (compared_fields as f64 / available as f64).min(1.0);

        let piece_compared = |kind: PieceKind| {
            pieces.iter().any(|p| p.piece == kind && p.fields_compared > 0)
        };
        let critical_compared = u32::from(piece_compared(PieceKind::Name))
            + u32::from(piece_compared(PieceKind::GovernmentId))
            + u32::from(piece_compared(PieceKind::Address));
        let critical_coverage = critical_compared as f64 / availability.critical.max(1) as f64;

        let mut score = raw;

        // Multi-token queries that only matched one token are suspect
        // unless the name was exact.
        if query_prepared.name_tokens.len() >= 2 && name.matched_tokens < 2 && !name.piece.exact {
            score *= QUALITY_PENALTY;
        }

        if coverage < SPARSE_COVERAGE_FLOOR {
            score *= SPARSE_COVERAGE_PENALTY;
        }
        if critical_coverage < CRITICAL_COVERAGE_FLOOR {
            score *= CRITICAL_COVERAGE_PENALTY;
        }
        let compared_pieces = pieces.iter().filter(|p| p.fields_compared > 0).count();
        if compared_pieces < 2 && availability.total >= 2 {
            score *= FEW_FIELDS_PENALTY;
        }
        let id_or_address_compared =
            piece_compared(PieceKind::GovernmentId) || piece_compared(PieceKind::Address);
        if !id_or_address_compared && (availability.has_id || availability.has_address) {
            score *= NAME_ONLY_PENALTY;
        }
        let contradicted = pieces
            .iter()
            .filter(|p| p.fields_compared > 0 && p.score == 0.0)
            .count();
        score *= CONTRADICTED_FIELD_PENALTY.powi(contradicted as i32);

        let id_matched = pieces
            .iter()
            .any(|p| p.piece == PieceKind::GovernmentId && p.matched);
        if name.piece.matched
            && id_matched
            && critical_coverage >= 1.0
            && coverage > 0.7
            && raw > 0.95
        {
            score = (score * EXACTNESS_BONUS).min(1.0);
        }

        let score = score.clamp(0.0, 1.0);
        let piece_score = |kind: PieceKind| {
            pieces
                .iter()
                .find(|p| p.piece == kind)
                .map(|p| p.score)
                .unwrap_or(0.0)
        };

        ScoreBreakdown {
            name_score: name.primary_score,
            alt_names_score: name.alt_score,
            address_score: piece_score(PieceKind::Address),
            government_id_score: piece_score(PieceKind::GovernmentId),
            crypto_address_score: piece_score(PieceKind::Crypto),
            contact_score: piece_score(PieceKind::Contact),
            date_score: piece_score(PieceKind::Date),
            supporting_score: piece_score(PieceKind::SupportingInfo),
            total_weighted_score: score,
            matched_token_count: name.matched_tokens,
            high_confidence: name.matched_tokens >= 2 && score > HIGH_CONFIDENCE_FLOOR,
            pieces,
        }
    }
}

/// Which comparable field groups the query itself carries. Coverage is
/// measured against what the caller gave us, capped by the per-kind
/// table; a name-only query is fully covered by a name-only comparison.
struct QueryAvailability {
    total: u32,
    critical: u32,
    has_id: bool,
    has_address: bool,
}

impl QueryAvailability {
    fn of(query: &Entity) -> Self {
        let mut total = 1u32; // primary name
        if !query.alt_names.is_empty() {
            total += 1;
        }

        match query.kind {
            EntityKind::Person => {
                if let Some(p) = query.person.as_ref() {
                    total += u32::from(p.birth_date.is_some());
                    total += u32::from(p.death_date.is_some());
                    total += u32::from(!p.titles.is_empty());
                    total += u32::from(!p.affiliations.is_empty());
                    total += u32::from(p.gender.is_some());
                }
            }
            EntityKind::Business | EntityKind::Organization => {
                let (created, dissolved, affiliations) = query
                    .business
                    .as_ref()
                    .map(|b| (b.created, b.dissolved, b.affiliations.len()))
                    .or_else(|| {
                        query
                            .organization
                            .as_ref()
                            .map(|o| (o.created, o.dissolved, o.affiliations.len()))
                    })
                    .unwrap_or((None, None, 0));
                total += u32::from(created.is_some());
                total += u32::from(dissolved.is_some());
                total += u32::from(affiliations > 0);
            }
            EntityKind::Vessel => {
                if let Some(v) = query.vessel.as_ref() {
                    total += u32::from(v.imo_number.is_some());
                    total += u32::from(v.call_sign.is_some());
                    total += u32::from(v.mmsi.is_some());
                    total += u32::from(v.built.is_some());
                    total += u32::from(v.flag.is_some());
                    total += u32::from(v.owner.is_some());
                }
            }
            EntityKind::Aircraft => {
                if let Some(a) = query.aircraft.as_ref() {
                    total += u32::from(a.serial_number.is_some());
                    total += u32::from(a.icao_code.is_some());
                    total += u32::from(a.built.is_some());
                    total += u32::from(a.model.is_some());
                    total += u32::from(a.operator.is_some());
                }
            }
            EntityKind::Unknown => {}
        }

        let has_gov_id = !query.government_ids.is_empty();
        let has_asset_id = query
            .vessel
            .as_ref()
            .map(|v| v.imo_number.is_some() || v.call_sign.is_some() || v.mmsi.is_some())
            .or_else(|| {
                query
                    .aircraft
                    .as_ref()
                    .map(|a| a.serial_number.is_some() || a.icao_code.is_some())
            })
            .unwrap_or(false);
        let has_id = has_gov_id || has_asset_id;
        let has_address = query.addresses.iter().any(|a| !a.is_empty());

        total += u32::from(has_gov_id);
        total += u32::from(!query.crypto_addresses.is_empty());
        total += u32::from(query.contact_info.as_ref().map(|c| !c.is_empty()).unwrap_or(false));
        total += u32::from(has_address);
        total += u32::from(!query.programs.is_empty());
        total += u32::from(!query.historical_info.is_empty());

        let critical = 1 + u32::from(has_id) + u32::from(has_address);

        Self {
            total,
            critical,
            has_id,
            has_address,
        }
    }
}
