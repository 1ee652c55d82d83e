use std::env;

use watchgate_core::ScreenError;

/// Tunable parameters of the matching algorithms, loaded from the
/// environment with typed defaults. The similarity layer takes this by
/// reference everywhere; nothing in the engine falls back to a default
/// config behind the caller's back.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Floor on base Jaro below which the Winkler prefix boost is skipped.
    pub jaro_winkler_boost_threshold: f64,
    /// Longest prefix the Winkler boost scores.
    pub jaro_winkler_prefix_size: usize,
    /// Length ratio below which the length penalty applies.
    pub length_difference_cutoff_factor: f64,
    /// Multiplicative penalty weight for length mismatch.
    pub length_difference_penalty_weight: f64,
    /// Score multiplier when first letters differ.
    pub different_letter_penalty_weight: f64,
    /// Bonus for perfect word matches in the favoritism variant.
    pub exact_match_favoritism: f64,
    /// Deduction weight for indexed tokens no query token selected.
    pub unmatched_index_token_weight: f64,
    /// Skip the Soundex prefilter entirely.
    pub phonetic_filtering_disabled: bool,
    /// Leave stopwords in place during normalization.
    pub keep_stopwords: bool,
    /// Score at or above which a result is classified Hit.
    pub hit_threshold: f64,
    /// Score at or above which a result is classified Review.
    pub review_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            jaro_winkler_boost_threshold: 0.7,
            jaro_winkler_prefix_size: 4,
            length_difference_cutoff_factor: 0.9,
            length_difference_penalty_weight: 0.3,
            different_letter_penalty_weight: 0.9,
            exact_match_favoritism: 0.0,
            unmatched_index_token_weight: 0.15,
            phonetic_filtering_disabled: false,
            keep_stopwords: false,
            hit_threshold: 0.95,
            review_threshold: 0.85,
        }
    }
}

impl MatchConfig {
    /// Reads `WATCHGATE_*` overrides on top of the defaults. A present but
    /// unparseable value is a startup failure, not a silent fallback.
    pub fn from_env() -> Result<Self, ScreenError> {
        let defaults = Self::default();
        Ok(Self {
            jaro_winkler_boost_threshold: read_f64(
                "WATCHGATE_JARO_WINKLER_BOOST_THRESHOLD",
                defaults.jaro_winkler_boost_threshold,
            )?,
            jaro_winkler_prefix_size: read_usize(
                "WATCHGATE_JARO_WINKLER_PREFIX_SIZE",
                defaults.jaro_winkler_prefix_size,
            )?,
            length_difference_cutoff_factor: read_f64(
                "WATCHGATE_LENGTH_DIFFERENCE_CUTOFF_FACTOR",
                defaults.length_difference_cutoff_factor,
            )?,
            length_difference_penalty_weight: read_f64(
                "WATCHGATE_LENGTH_DIFFERENCE_PENALTY_WEIGHT",
                defaults.length_difference_penalty_weight,
            )?,
            different_letter_penalty_weight: read_f64(
                "WATCHGATE_DIFFERENT_LETTER_PENALTY_WEIGHT",
                defaults.different_letter_penalty_weight,
            )?,
            exact_match_favoritism: read_f64(
                "WATCHGATE_EXACT_MATCH_FAVORITISM",
                defaults.exact_match_favoritism,
            )?,
            unmatched_index_token_weight: read_f64(
                "WATCHGATE_UNMATCHED_INDEX_TOKEN_WEIGHT",
                defaults.unmatched_index_token_weight,
            )?,
            phonetic_filtering_disabled: read_bool(
                "WATCHGATE_PHONETIC_FILTERING_DISABLED",
                defaults.phonetic_filtering_disabled,
            )?,
            keep_stopwords: read_bool("WATCHGATE_KEEP_STOPWORDS", defaults.keep_stopwords)?,
            hit_threshold: read_f64("WATCHGATE_HIT_THRESHOLD", defaults.hit_threshold)?,
            review_threshold: read_f64("WATCHGATE_REVIEW_THRESHOLD", defaults.review_threshold)?,
        })
    }

    /// Sanity bounds. Called by the layers that refuse to construct on a
    /// broken config.
    pub fn validate(&self) -> Result<(), ScreenError> {
        let unit_bounded = [
            ("jaro_winkler_boost_threshold", self.jaro_winkler_boost_threshold),
            ("length_difference_cutoff_factor", self.length_difference_cutoff_factor),
            ("length_difference_penalty_weight", self.length_difference_penalty_weight),
            ("different_letter_penalty_weight", self.different_letter_penalty_weight),
            ("unmatched_index_token_weight", self.unmatched_index_token_weight),
            ("hit_threshold", self.hit_threshold),
            ("review_threshold", self.review_threshold),
        ];
        for (name, value) in unit_bounded {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScreenError::ConfigurationMissing(format!(
                    "{name} must be in [0,1], got {value}"
                )));
            }
        }
        if self.exact_match_favoritism < 0.0 {
            return Err(ScreenError::ConfigurationMissing(
                "exact_match_favoritism must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

fn read_f64(key: &str, default: f64) -> Result<f64, ScreenError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScreenError::ConfigurationMissing(format!("{key}={raw} is not a float"))),
        Err(_) => Ok(default),
    }
}

fn read_usize(key: &str, default: usize) -> Result<usize, ScreenError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScreenError::ConfigurationMissing(format!("{key}={raw} is not an integer"))),
        Err(_) => Ok(default),
    }
}

fn read_bool(key: &str, default: bool) -> Result<bool, ScreenError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ScreenError::ConfigurationMissing(format!(
                "{key}={raw} is not a boolean"
            ))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = MatchConfig::default();
        assert!((c.jaro_winkler_boost_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(c.jaro_winkler_prefix_size, 4);
        assert!((c.length_difference_cutoff_factor - 0.9).abs() < f64::EPSILON);
        assert!((c.length_difference_penalty_weight - 0.3).abs() < f64::EPSILON);
        assert!((c.different_letter_penalty_weight - 0.9).abs() < f64::EPSILON);
        assert!((c.unmatched_index_token_weight - 0.15).abs() < f64::EPSILON);
        assert_eq!(c.exact_match_favoritism, 0.0);
        assert!(!c.phonetic_filtering_disabled);
        assert!(!c.keep_stopwords);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let c = MatchConfig {
            unmatched_index_token_weight: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ScreenError::ConfigurationMissing(_))
        ));
    }
}
