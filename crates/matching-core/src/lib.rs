//! The watchlist matching engine: normalization, fuzzy name similarity,
//! per-field comparators, weighted aggregation, and the in-memory entity
//! index behind the search service.
//!
//! Entities flow in from the source parsers, are normalized and merged,
//! and are installed into the index as one atomic snapshot. Queries run
//! through the same normalization pipeline and are scored against the
//! candidates the index and the phonetic gate let through.

pub mod compare;
pub mod config;
pub mod index;
pub mod language;
pub mod merge;
pub mod normalize;
pub mod phonetics;
pub mod scorer;
pub mod search;
pub mod similarity;
pub mod text;
pub mod trace;

pub use config::MatchConfig;
pub use index::EntityIndex;
pub use normalize::Normalizer;
pub use scorer::EntityScorer;
pub use search::{CancelToken, SearchOptions, SearchService};
pub use trace::ScoringContext;
