use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    Name,
    Title,
    Affiliation,
    Address,
    Date,
    GovernmentId,
    Crypto,
    Contact,
    SupportingInfo,
}

impl PieceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PieceKind::Name => "name",
            PieceKind::Title => "title",
            PieceKind::Affiliation => "affiliation",
            PieceKind::Address => "address",
            PieceKind::Date => "date",
            PieceKind::GovernmentId => "government_id",
            PieceKind::Crypto => "crypto",
            PieceKind::Contact => "contact",
            PieceKind::SupportingInfo => "supporting_info",
        }
    }
}

/// One comparator's contribution to an aggregate score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScorePiece {
    pub score: f64,
    pub weight: f64,
    pub matched: bool,
    pub exact: bool,
    pub fields_compared: u32,
    pub piece: PieceKind,
}

impl ScorePiece {
    pub fn new(piece: PieceKind, score: f64, weight: f64) -> Self {
        Self {
            score,
            weight,
            matched: false,
            exact: false,
            fields_compared: 0,
            piece,
        }
    }
}

/// Per-field scores for one query/candidate pair, plus the weighted
/// aggregate. All values are bounded [0.0, 1.0].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name_score: f64,
    pub alt_names_score: f64,
    pub address_score: f64,
    pub government_id_score: f64,
    pub crypto_address_score: f64,
    pub contact_score: f64,
    pub date_score: f64,
    pub supporting_score: f64,
    pub total_weighted_score: f64,
    pub matched_token_count: u32,
    pub high_confidence: bool,
    #[serde(default)]
    pub pieces: Vec<ScorePiece>,
}

impl ScoreBreakdown {
    pub fn is_exact(&self) -> bool {
        self.pieces.iter().any(|p| p.piece == PieceKind::Name && p.exact)
    }

    /// Human-readable account of why this pair scored the way it did.
    /// Compliance reviewers see these verbatim.
    pub fn explain(&self, matched_name: &str) -> Vec<String> {
        let mut explanations = Vec::new();

        if self.name_score >= 0.95 {
            explanations.push(format!(
                "Name '{}' is a very close match ({:.0}%)",
                matched_name,
                self.name_score * 100.0
            ));
        } else if self.name_score >= 0.8 {
            explanations.push(format!(
                "Name '{}' is similar ({:.0}%)",
                matched_name,
                self.name_score * 100.0
            ));
        } else {
            explanations.push(format!(
                "Name '{}' partially matches ({:.0}%)",
                matched_name,
                self.name_score * 100.0
            ));
        }
        if self.alt_names_score > 0.0 {
            explanations.push(format!(
                "A listed alias matches ({:.0}%)",
                self.alt_names_score * 100.0
            ));
        }
        if self.government_id_score >= 1.0 {
            explanations.push("A government identifier matches exactly".to_string());
        } else if self.government_id_score > 0.0 {
            explanations.push("A government identifier matches".to_string());
        }
        if self.crypto_address_score > 0.0 {
            explanations.push("A crypto address matches".to_string());
        }
        if self.date_score >= 1.0 {
            explanations.push("Dates match exactly".to_string());
        } else if self.date_score >= 0.5 {
            explanations.push("Dates are close".to_string());
        }
        if self.address_score >= 0.92 {
            explanations.push("Address matches".to_string());
        }
        if self.contact_score > 0.0 {
            explanations.push("Contact details match".to_string());
        }
        if self.high_confidence {
            explanations.push("High-confidence match".to_string());
        }

        explanations
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Hit,
    Review,
    None,
}

impl RiskLevel {
    pub fn classify(score: f64, hit_threshold: f64, review_threshold: f64) -> Self {
        if score >= hit_threshold {
            RiskLevel::Hit
        } else if score >= review_threshold {
            RiskLevel::Review
        } else {
            RiskLevel::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_both_thresholds() {
        assert_eq!(RiskLevel::classify(0.97, 0.95, 0.85), RiskLevel::Hit);
        assert_eq!(RiskLevel::classify(0.90, 0.95, 0.85), RiskLevel::Review);
        assert_eq!(RiskLevel::classify(0.50, 0.95, 0.85), RiskLevel::None);
    }

    #[test]
    fn explain_mentions_identifier_hits() {
        let breakdown = ScoreBreakdown {
            name_score: 0.97,
            government_id_score: 1.0,
            ..Default::default()
        };
        let lines = breakdown.explain("GAZPROMBANK");
        assert!(lines.iter().any(|l| l.contains("very close match")));
        assert!(lines.iter().any(|l| l.contains("identifier matches exactly")));
    }
}
