use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::{Entity, EntityKind, SourceList};
use crate::score::{RiskLevel, ScoreBreakdown};
use crate::trace::ScoringTrace;

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Screening query as received from a caller. The engine turns this into a
/// transient `Entity` and runs it through the same normalization pipeline
/// as indexed records.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    pub reference_id: Option<String>,
    #[validate(length(min = 1))]
    pub name: String,
    pub kind: Option<EntityKind>,
    pub source: Option<SourceList>,
    #[validate(length(min = 2, max = 2))]
    pub country: Option<String>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: usize,
    #[serde(default = "default_min_match")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_match: f64,
    #[serde(default)]
    pub trace: bool,
}

fn default_limit() -> usize {
    10
}

fn default_min_match() -> f64 {
    0.85
}

impl SearchRequest {
    pub fn for_name(name: impl Into<String>) -> Self {
        Self {
            reference_id: None,
            name: name.into(),
            kind: None,
            source: None,
            country: None,
            limit: default_limit(),
            min_match: default_min_match(),
            trace: false,
        }
    }

    pub fn into_query(self) -> Entity {
        Entity::query(self.name, self.kind.unwrap_or(EntityKind::Unknown))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub request_id: String,
    pub results: Vec<SearchResult>,
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<ScoringTrace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub entity_id: String,
    pub source_id: String,
    pub matched_name: String,
    pub kind: EntityKind,
    pub source: SourceList,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    pub explanation: Vec<String>,
}
