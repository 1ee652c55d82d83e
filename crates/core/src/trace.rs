use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::score::ScoreBreakdown;

/// Pipeline phases a scoring trace can attribute work to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TracePhase {
    Normalization,
    Tokenization,
    PhoneticFilter,
    NameComparison,
    AltNameComparison,
    GovIdComparison,
    CryptoComparison,
    ContactComparison,
    AddressComparison,
    DateComparison,
    Aggregation,
    Filtering,
}

/// One recorded scoring event. `duration_ms` is only present for timed
/// operations; `ok` only for operations that can fail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceEvent {
    pub phase: TracePhase,
    pub description: String,
    /// Milliseconds since the trace session started.
    pub at_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Immutable record of one scoring session. Produced by finishing an
/// enabled scoring context; never constructed piecemeal by callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringTrace {
    pub session_id: String,
    pub duration_ms: f64,
    pub events: Vec<TraceEvent>,
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}
