use thiserror::Error;

/// Failure classes of the screening core.
///
/// Only `ConfigurationMissing` and `IndexEmpty` ever surface to a caller as
/// a hard failure; the per-entity and per-piece classes are absorbed during
/// normalization and scoring so one bad record cannot take the service down.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("scoring configuration missing or invalid: {0}")]
    ConfigurationMissing(String),

    #[error("invalid entity {id}: {reason}")]
    InvalidEntity { id: String, reason: String },

    #[error("normalization failed for {field}: {reason}")]
    NormalizationFailure { field: String, reason: String },

    #[error("comparison failed in {piece}: {reason}")]
    ComparisonFailure { piece: &'static str, reason: String },

    #[error("search cancelled")]
    Cancelled,

    #[error("entity index is empty")]
    IndexEmpty,
}

impl ScreenError {
    pub fn invalid_entity(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
