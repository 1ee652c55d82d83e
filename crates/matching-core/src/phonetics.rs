//! Soundex codes and the cheap phonetic compatibility gate that runs
//! before any Jaro-Winkler work. Advisory only: the gate can drop a
//! candidate, never score one.

use crate::config::MatchConfig;

fn consonant_code(c: char) -> Option<u8> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some(b'1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some(b'2'),
        'd' | 't' => Some(b'3'),
        'l' => Some(b'4'),
        'm' | 'n' => Some(b'5'),
        'r' => Some(b'6'),
        _ => None,
    }
}

/// Classic Soundex: first letter plus up to three digits, H/W ignored,
/// adjacent duplicate codes collapsed, zero-padded to four characters.
/// Characters outside a-z (after the caller's fold) are skipped.
pub fn soundex(word: &str) -> String {
    let mut letters = word.chars().filter(|c| c.is_ascii_alphabetic());
    let first = match letters.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return String::new(),
    };

    let mut code = String::with_capacity(4);
    code.push(first);
    let mut previous = consonant_code(first.to_ascii_lowercase());

    for c in letters {
        let c = c.to_ascii_lowercase();
        if c == 'h' || c == 'w' {
            continue;
        }
        match consonant_code(c) {
            Some(digit) => {
                if previous != Some(digit) {
                    code.push(digit as char);
                    if code.len() == 4 {
                        break;
                    }
                }
                previous = Some(digit);
            }
            None => previous = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}

/// First-letter compatibility gate over the Soundex classes of each
/// side's leading token. Equal codes are trivially compatible; beyond
/// that only the leading letter is compared, so token splits like
/// "JSC ARGUMENT" vs "JSCARGUMENT" survive the gate. Empty classes (no
/// usable token) never disqualify a candidate, and the config switch
/// turns the gate off entirely.
pub fn phonetically_compatible(query_class: &str, candidate_class: &str, config: &MatchConfig) -> bool {
    if config.phonetic_filtering_disabled {
        return true;
    }
    match (query_class.chars().next(), candidate_class.chars().next()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_codes() {
        assert_eq!(soundex("robert"), "R163");
        assert_eq!(soundex("rupert"), "R163");
        assert_eq!(soundex("ashcraft"), "A261");
        assert_eq!(soundex("tymczak"), "T522");
        assert_eq!(soundex("pfister"), "P236");
        assert_eq!(soundex("honeyman"), "H555");
    }

    #[test]
    fn nicolas_variants_share_a_code() {
        assert_eq!(soundex("nicolas"), soundex("nikolas"));
    }

    #[test]
    fn empty_and_non_alpha_input() {
        assert_eq!(soundex(""), "");
        assert_eq!(soundex("123"), "");
    }

    #[test]
    fn gate_respects_config_switch() {
        let mut config = MatchConfig::default();
        assert!(!phonetically_compatible("N242", "M636", &config));
        config.phonetic_filtering_disabled = true;
        assert!(phonetically_compatible("N242", "M636", &config));
    }

    #[test]
    fn gate_compares_leading_letters_only() {
        let config = MatchConfig::default();
        assert!(phonetically_compatible(&soundex("jsc"), &soundex("jscargument"), &config));
        assert!(!phonetically_compatible(&soundex("jsc"), &soundex("argument"), &config));
    }

    #[test]
    fn empty_class_is_compatible() {
        let config = MatchConfig::default();
        assert!(phonetically_compatible("", "M636", &config));
    }
}
