//! Title comparison for persons. Titles come in abbreviated and spelled
//! out forms ("CEO" vs "Chief Executive Officer"), so both sides expand
//! through a fixed table before token scoring.

use phf::phf_map;

use crate::config::MatchConfig;
use crate::similarity::best_pair_jaro_winkler;

const TITLE_EARLY_EXIT: f64 = 0.92;
const TOKEN_COUNT_PENALTY: f64 = 0.1;

static TITLE_ABBREVIATIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "ceo" => "chief executive officer",
    "cfo" => "chief financial officer",
    "coo" => "chief operating officer",
    "cto" => "chief technology officer",
    "pres" => "president",
    "vp" => "vice president",
    "dir" => "director",
    "exec" => "executive",
    "mgr" => "manager",
    "sr" => "senior",
    "jr" => "junior",
    "asst" => "assistant",
    "assoc" => "associate",
    "tech" => "technical",
    "admin" => "administrative",
    "eng" => "engineer",
    "dev" => "developer",
    "gen" => "general",
    "sec" => "secretary",
    "dep" => "deputy",
};

/// Lowercases, strips punctuation except hyphens, expands abbreviations,
/// and drops tokens shorter than two characters.
pub fn normalize_title(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens = Vec::new();
    for token in cleaned.split_whitespace() {
        match TITLE_ABBREVIATIONS.get(token) {
            Some(expansion) => tokens.extend(expansion.split_whitespace().map(str::to_string)),
            None => tokens.push(token.to_string()),
        }
    }
    tokens.retain(|t| t.chars().count() >= 2);
    tokens
}

/// Best pairwise title similarity, or `None` when either side has no
/// titles. A token-count mismatch costs 0.1 per differing token.
pub fn best_title_score(query: &[String], candidate: &[String], config: &MatchConfig) -> Option<f64> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }

    let mut best = 0.0f64;
    'outer: for q in query {
        let q_tokens = normalize_title(q);
        if q_tokens.is_empty() {
            continue;
        }
        for c in candidate {
            let c_tokens = normalize_title(c);
            if c_tokens.is_empty() {
                continue;
            }
            let similarity = best_pair_jaro_winkler(&q_tokens, &c_tokens, config);
            let penalty = TOKEN_COUNT_PENALTY * q_tokens.len().abs_diff(c_tokens.len()) as f64;
            let score = (similarity - penalty).clamp(0.0, 1.0);
            if score > best {
                best = score;
            }
            if best >= TITLE_EARLY_EXIT {
                break 'outer;
            }
        }
    }

    if best > 0.0 {
        Some(best)
    } else {
        None
    }
}
