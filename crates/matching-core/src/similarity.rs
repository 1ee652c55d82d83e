//! The Jaro-Winkler family used for every fuzzy comparison in the engine.
//!
//! All functions return scores in [0.0, 1.0]. The tunables (boost
//! threshold, prefix size, penalty weights) come from `MatchConfig`;
//! comparators that need no tunables use `strsim::jaro_winkler` directly.

use crate::config::MatchConfig;

const WINKLER_SCALING: f64 = 0.1;

/// Standard Jaro similarity: matching window max(|a|,|b|)/2 - 1,
/// transpositions counted half.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && *ca == b[j] {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut j = 0usize;
    for (i, matched) in a_matched.iter().enumerate() {
        if !matched {
            continue;
        }
        while !b_matched[j] {
            j += 1;
        }
        if a[i] != b[j] {
            transpositions += 1;
        }
        j += 1;
    }

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64 / 2.0) / m) / 3.0
}

/// Jaro with the Winkler prefix boost, gated on the configured base
/// threshold and prefix cap.
pub fn jaro_winkler(a: &str, b: &str, config: &MatchConfig) -> f64 {
    let base = jaro(a, b);
    if base < config.jaro_winkler_boost_threshold {
        return base;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(config.jaro_winkler_prefix_size)
        .take_while(|(x, y)| x == y)
        .count();
    (base + prefix as f64 * WINKLER_SCALING * (1.0 - base)).min(1.0)
}

/// Token-level Jaro-Winkler with the two list-matching penalties: a
/// length-ratio cutoff and a first-letter mismatch. Each applies exactly
/// once, here at the token level.
pub fn custom_jaro_winkler(a: &str, b: &str, config: &MatchConfig) -> f64 {
    let mut score = jaro_winkler(a, b, config);
    if score == 0.0 {
        return 0.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let (shorter, longer) = if len_a < len_b { (len_a, len_b) } else { (len_b, len_a) };
    if longer > 0 && (shorter as f64 / longer as f64) < config.length_difference_cutoff_factor {
        score *= 1.0 - config.length_difference_penalty_weight;
    }

    if a.chars().next() != b.chars().next() {
        score *= config.different_letter_penalty_weight;
    }

    score.clamp(0.0, 1.0)
}

/// Best-pair token matching: every query token picks its best indexed
/// token (reuse allowed), the best scores are averaged, and indexed
/// tokens nothing selected deduct proportionally.
pub fn best_pair_jaro_winkler(query: &[String], index: &[String], config: &MatchConfig) -> f64 {
    if query.is_empty() || index.is_empty() {
        return 0.0;
    }

    let mut selected = vec![false; index.len()];
    let mut sum = 0.0;
    for q in query {
        let mut best = 0.0;
        let mut best_idx = None;
        for (i, t) in index.iter().enumerate() {
            let s = custom_jaro_winkler(q, t, config);
            if s > best {
                best = s;
                best_idx = Some(i);
            }
        }
        if let Some(i) = best_idx {
            selected[i] = true;
        }
        sum += best;
    }

    let average = sum / query.len() as f64;
    let unmatched = selected.iter().filter(|s| !**s).count();
    let deduction = config.unmatched_index_token_weight * unmatched as f64 / index.len() as f64;
    (average - deduction).clamp(0.0, 1.0)
}

/// Up to three token-list variants: the original, a forward pass merging
/// each short token (≤ 3 chars) into the token after it, and a backward
/// pass that migrates a short token's first character onto the token
/// before it. The backward variant is only emitted when the forward pass
/// produced one. Catches "JSC ARGUMENT" vs "JSCARGUMENT" and split
/// particles like "de Silva".
pub fn generate_word_combinations(tokens: &[String]) -> Vec<Vec<String>> {
    let mut variants = vec![tokens.to_vec()];
    if tokens.len() < 2 {
        return variants;
    }

    let mut forward: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].chars().count() <= 3 && i + 1 < tokens.len() {
            forward.push(format!("{}{}", tokens[i], tokens[i + 1]));
            i += 2;
        } else {
            forward.push(tokens[i].clone());
            i += 1;
        }
    }
    if forward == variants[0] {
        return variants;
    }
    variants.push(forward);

    let mut backward: Vec<String> = Vec::with_capacity(tokens.len());
    for (i, t) in tokens.iter().enumerate() {
        let mut chars = t.chars();
        match chars.next() {
            Some(head) if i > 0 && t.chars().count() <= 3 => {
                let rest: String = chars.collect();
                if let Some(prev) = backward.last_mut() {
                    prev.push(head);
                }
                if !rest.is_empty() {
                    backward.push(rest);
                }
            }
            _ => backward.push(t.clone()),
        }
    }
    if backward != variants[0] && backward != variants[1] {
        variants.push(backward);
    }
    variants
}

/// Max of `best_pair_jaro_winkler` over the Cartesian product of both
/// sides' word combinations. No further penalty afterwards; the pairwise
/// penalties are already embedded.
pub fn best_pair_combination_jaro_winkler(
    query: &[String],
    index: &[String],
    config: &MatchConfig,
) -> f64 {
    let query_combos = generate_word_combinations(query);
    let index_combos = generate_word_combinations(index);
    best_pair_over_combinations(&query_combos, &index_combos, config)
}

/// Same as above over combination lists the normalizer already cached.
pub fn best_pair_over_combinations(
    query_combos: &[Vec<String>],
    index_combos: &[Vec<String>],
    config: &MatchConfig,
) -> f64 {
    let mut best: f64 = 0.0;
    for q in query_combos {
        for i in index_combos {
            best = best.max(best_pair_jaro_winkler(q, i, config));
        }
    }
    best
}

/// Positional word matching with a bonus for perfect word hits. Each
/// indexed word looks for its best query word within a positional
/// distance of 3; a multi-word indexed name against a single-word query
/// is capped at 0.9; long queries keep only their top scores.
pub fn jaro_winkler_with_favoritism(
    index_term: &str,
    query: &str,
    favoritism: f64,
    config: &MatchConfig,
) -> f64 {
    let index_words: Vec<&str> = index_term.split_whitespace().collect();
    let query_words: Vec<&str> = query.split_whitespace().collect();
    if index_words.is_empty() || query_words.is_empty() {
        return 0.0;
    }

    let mut scores: Vec<f64> = Vec::with_capacity(index_words.len());
    for (pos, iw) in index_words.iter().enumerate() {
        let mut best = 0.0f64;
        for (qpos, qw) in query_words.iter().enumerate() {
            if pos.abs_diff(qpos) > 3 {
                continue;
            }
            let mut s = custom_jaro_winkler(iw, qw, config);
            if iw == qw {
                s += favoritism;
            }
            best = best.max(s);
        }
        scores.push(best);
    }

    let mut score = if index_words.len() > query_words.len() && query_words.len() > 5 {
        scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let kept = &scores[..query_words.len()];
        kept.iter().sum::<f64>() / kept.len() as f64
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    if index_words.len() > 1 && query_words.len() == 1 {
        score = score.min(0.9);
    }
    score.min(1.0)
}
