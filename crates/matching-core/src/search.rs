//! Search orchestration: candidate selection, the phonetic gate, the
//! scoring loop with cooperative cancellation, ranking, and result
//! shaping. This is the only place the trace context, the scorer, and
//! the index meet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use validator::Validate;
use watchgate_core::{
    new_request_id, Address, Entity, EntityKind, RiskLevel, ScoreBreakdown, ScreenError,
    SearchRequest, SearchResponse, SearchResult, SourceList, TracePhase,
};

use crate::config::MatchConfig;
use crate::index::EntityIndex;
use crate::merge::merge_entities;
use crate::normalize::Normalizer;
use crate::phonetics::phonetically_compatible;
use crate::scorer::EntityScorer;
use crate::trace::ScoringContext;

const MAX_LIMIT: usize = 100;

/// Cooperative cancellation flag checked between candidates. Cloning
/// shares the flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub source: Option<SourceList>,
    pub kind: Option<EntityKind>,
    pub limit: usize,
    pub min_match: f64,
    pub trace: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            source: None,
            kind: None,
            limit: 10,
            min_match: 0.85,
            trace: false,
        }
    }
}

impl SearchOptions {
    pub fn from_request(request: &SearchRequest) -> Self {
        Self {
            source: request.source,
            kind: request.kind,
            limit: request.limit,
            min_match: request.min_match,
            trace: request.trace,
        }
    }
}

pub struct SearchService {
    config: Arc<MatchConfig>,
    index: Arc<EntityIndex>,
    normalizer: Normalizer,
    scorer: EntityScorer,
}

impl SearchService {
    /// Refuses to construct on a broken config.
    pub fn new(config: MatchConfig) -> Result<Self, ScreenError> {
        config.validate()?;
        let config = Arc::new(config);
        Ok(Self {
            normalizer: Normalizer::new(config.clone()),
            scorer: EntityScorer::new(config.clone())?,
            index: Arc::new(EntityIndex::new()),
            config,
        })
    }

    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Normalizes, merges, re-normalizes, and installs a fresh list as
    /// one atomic replacement. Invalid records are logged and skipped so
    /// one bad row cannot block a refresh.
    pub fn load(&self, entities: Vec<Entity>) -> Result<usize, ScreenError> {
        let mut normalized = Vec::with_capacity(entities.len());
        for entity in entities {
            match self.normalizer.normalize(entity) {
                Ok(entity) => normalized.push(entity),
                Err(e) => tracing::warn!(error = %e, "skipping invalid entity"),
            }
        }

        let mut installed = Vec::new();
        for entity in merge_entities(normalized) {
            match self.normalizer.normalize(entity) {
                Ok(entity) => installed.push(entity),
                Err(e) => tracing::warn!(error = %e, "skipping unmergeable entity"),
            }
        }

        let count = installed.len();
        self.index.replace_all(installed);
        Ok(count)
    }

    /// Validates and runs a caller-facing request.
    pub fn search_request(
        &self,
        request: SearchRequest,
        cancel: &CancelToken,
    ) -> Result<SearchResponse, ScreenError> {
        request.validate().map_err(|e| ScreenError::InvalidEntity {
            id: "search-request".to_string(),
            reason: e.to_string(),
        })?;

        let options = SearchOptions::from_request(&request);
        let country = request.country.clone();
        let mut query = request.into_query();
        if let Some(country) = country {
            query.addresses.push(Address {
                country: Some(country),
                ..Default::default()
            });
        }
        self.search(query, &options, cancel)
    }

    pub fn search(
        &self,
        query: Entity,
        options: &SearchOptions,
        cancel: &CancelToken,
    ) -> Result<SearchResponse, ScreenError> {
        if self.index.is_empty() {
            return Err(ScreenError::IndexEmpty);
        }

        let request_id = new_request_id();
        let ctx = if options.trace {
            ScoringContext::enabled(request_id.clone())
        } else {
            ScoringContext::disabled()
        };
        let limit = options.limit.clamp(1, MAX_LIMIT);

        let query = ctx.try_traced(TracePhase::Normalization, "normalize query", || {
            self.normalizer.normalize(query)
        })?;
        let query_class = query
            .prepared
            .as_ref()
            .map(|p| p.phonetic_class.clone())
            .unwrap_or_default();

        let candidates = self.index.candidates(options.source, options.kind);
        ctx.record_with(TracePhase::Filtering, "candidate selection", || {
            serde_json::json!({ "candidates": candidates.len() })
        });

        let candidates = ctx.traced(TracePhase::PhoneticFilter, "soundex gate", || {
            self.phonetic_gate(candidates, &query_class)
        });

        let mut scored: Vec<(Arc<Entity>, ScoreBreakdown)> = Vec::new();
        let mut cancelled = false;
        for candidate in candidates {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            match self.scorer.score(&query, &candidate, &ctx) {
                Ok(Some(breakdown)) if breakdown.total_weighted_score >= options.min_match => {
                    scored.push((candidate, breakdown));
                }
                Ok(_) => {}
                Err(e) => {
                    // One unscoreable candidate must not fail the search.
                    tracing::warn!(candidate = %candidate.id, error = %e, "candidate skipped");
                }
            }
        }

        scored.sort_by(|(entity_a, a), (entity_b, b)| {
            b.total_weighted_score
                .partial_cmp(&a.total_weighted_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| entity_a.id.cmp(&entity_b.id))
        });
        scored.truncate(limit);

        if let Some((_, top)) = scored.first() {
            ctx.with_breakdown(top);
        }
        ctx.with_metadata("result_count", &scored.len().to_string());

        let results: Vec<SearchResult> = scored
            .into_iter()
            .map(|(entity, breakdown)| {
                let explanation = breakdown.explain(&entity.name);
                SearchResult {
                    entity_id: entity.id.clone(),
                    source_id: entity.source_id.clone(),
                    matched_name: entity.name.clone(),
                    kind: entity.kind,
                    source: entity.source,
                    score: breakdown.total_weighted_score,
                    risk_level: RiskLevel::classify(
                        breakdown.total_weighted_score,
                        self.config.hit_threshold,
                        self.config.review_threshold,
                    ),
                    breakdown,
                    explanation,
                }
            })
            .collect();

        tracing::debug!(
            request_id = %request_id,
            results = results.len(),
            cancelled,
            "search completed"
        );

        // Cancelled searches return what they had without finalizing a
        // trace.
        let trace = if cancelled { None } else { ctx.finish() };
        Ok(SearchResponse {
            request_id,
            results,
            cancelled,
            trace,
        })
    }

    /// Drops candidates whose primary and alt phonetic classes are all
    /// incompatible with the query's. Candidates without prepared fields
    /// pass through; the scorer reports them properly.
    fn phonetic_gate(&self, candidates: Vec<Arc<Entity>>, query_class: &str) -> Vec<Arc<Entity>> {
        if self.config.phonetic_filtering_disabled || query_class.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|candidate| match candidate.prepared.as_ref() {
                Some(prepared) => {
                    phonetically_compatible(query_class, &prepared.phonetic_class, &self.config)
                        || prepared
                            .alt_phonetic_classes
                            .iter()
                            .any(|class| phonetically_compatible(query_class, class, &self.config))
                }
                None => true,
            })
            .collect()
    }
}
