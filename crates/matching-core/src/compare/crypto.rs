//! Crypto address comparison. When both sides know the currency it must
//! agree along with the address; an address-only record matches on the
//! address alone. Wallet addresses are effectively unique, so any hit is
//! exact.

use watchgate_core::{CryptoAddress, PieceKind, ScorePiece};

use super::{CRYPTO_WEIGHT, MATCH_THRESHOLD};

fn pair_matches(query: &CryptoAddress, candidate: &CryptoAddress) -> bool {
    if query.address.is_empty() || candidate.address.is_empty() {
        return false;
    }
    if !query.address.eq_ignore_ascii_case(&candidate.address) {
        return false;
    }
    match (query.currency.as_deref(), candidate.currency.as_deref()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => true,
    }
}

pub fn compare_crypto_addresses(
    query: &[CryptoAddress],
    candidate: &[CryptoAddress],
) -> Option<ScorePiece> {
    if query.is_empty() || candidate.is_empty() {
        return None;
    }

    let hit = query
        .iter()
        .any(|q| candidate.iter().any(|c| pair_matches(q, c)));

    let score = if hit { 1.0 } else { 0.0 };
    let mut piece = ScorePiece::new(PieceKind::Crypto, score, CRYPTO_WEIGHT);
    piece.matched = score >= MATCH_THRESHOLD;
    piece.exact = hit;
    piece.fields_compared = 1;
    Some(piece)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(currency: Option<&str>, address: &str) -> CryptoAddress {
        CryptoAddress {
            currency: currency.map(str::to_string),
            address: address.to_string(),
        }
    }

    #[test]
    fn currency_and_address_must_both_match_when_known() {
        let q = vec![wallet(Some("xbt"), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")];
        let same = vec![wallet(Some("XBT"), "1a1zp1ep5qgefi2dmptftl5slmv7divfna")];
        let other_currency = vec![wallet(Some("eth"), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")];

        assert_eq!(compare_crypto_addresses(&q, &same).unwrap().score, 1.0);
        assert_eq!(compare_crypto_addresses(&q, &other_currency).unwrap().score, 0.0);
    }

    #[test]
    fn missing_currency_matches_on_address_alone() {
        let q = vec![wallet(None, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")];
        let c = vec![wallet(Some("xbt"), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")];
        let piece = compare_crypto_addresses(&q, &c).unwrap();
        assert_eq!(piece.score, 1.0);
        assert!(piece.exact);
    }

    #[test]
    fn empty_addresses_are_skipped() {
        let q = vec![wallet(Some("xbt"), "")];
        let c = vec![wallet(Some("xbt"), "")];
        assert_eq!(compare_crypto_addresses(&q, &c).unwrap().score, 0.0);
    }

    #[test]
    fn empty_lists_yield_none() {
        assert!(compare_crypto_addresses(&[], &[wallet(None, "abc")]).is_none());
    }
}
