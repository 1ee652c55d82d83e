//! Per-field comparators. Each produces a `ScorePiece` when both sides
//! carry comparable data and `None` otherwise; missing data is never a
//! mismatch. Aggregation weights live here so every comparator and the
//! scorer agree on them.

pub mod address;
pub mod affiliation;
pub mod contact;
pub mod crypto;
pub mod dates;
pub mod identifiers;
pub mod name;
pub mod supporting;
pub mod title;

/// Default piece weights.
pub const NAME_WEIGHT: f64 = 40.0;
pub const SUPPORTING_WEIGHT: f64 = 15.0;
pub const ID_WEIGHT: f64 = 15.0;
pub const CRYPTO_WEIGHT: f64 = 15.0;
pub const DATE_WEIGHT: f64 = 15.0;
pub const ADDRESS_WEIGHT: f64 = 10.0;
pub const CONTACT_WEIGHT: f64 = 5.0;

/// Score at which a comparator reports `matched`. Affiliations use their
/// own, stricter threshold; see `affiliation::AFFILIATION_MATCH_THRESHOLD`.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Scores above this are treated as exact for reporting purposes.
pub const EXACT_THRESHOLD: f64 = 0.99;
