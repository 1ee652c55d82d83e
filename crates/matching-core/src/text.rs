//! Unicode folding and tokenization shared by every normalization step.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Folds a string down to its comparable form: NFD, combining marks
/// dropped, NFC, lowercased, every non letter/digit/hyphen/whitespace
/// character replaced by a space, whitespace collapsed. Hyphens inside
/// words survive ("Vice-President").
pub fn lower_and_strip_punctuation(s: &str) -> String {
    let folded: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .nfc()
        .collect::<String>()
        .to_lowercase();

    let replaced: String = folded
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace().map(|t| t.to_string()).collect()
}

/// True for tokens made of digits, dots, commas, and hyphens ending in a
/// digit — registration numbers, dates, house numbers. These survive
/// stopword removal in every language.
pub fn is_numeric_token(token: &str) -> bool {
    let mut chars = token.chars().peekable();
    if chars.peek().is_none() {
        return false;
    }
    let mut last = ' ';
    for c in chars {
        if !(c.is_ascii_digit() || c == '.' || c == ',' || c == '-') {
            return false;
        }
        last = c;
    }
    last.is_ascii_digit()
}
