//! Contact comparison: equality over email, phone, and fax, averaged
//! across the fields both sides carry. Phones and faxes arrive already
//! normalized to bare digits.

use watchgate_core::{ContactInfo, PieceKind, ScorePiece};

use super::{CONTACT_WEIGHT, EXACT_THRESHOLD};

pub fn compare_contact_info(
    query: Option<&ContactInfo>,
    candidate: Option<&ContactInfo>,
) -> Option<ScorePiece> {
    let (query, candidate) = match (query, candidate) {
        (Some(q), Some(c)) if !q.is_empty() && !c.is_empty() => (q, c),
        _ => return None,
    };

    let fields = [
        (query.email_address.as_deref(), candidate.email_address.as_deref()),
        (query.phone_number.as_deref(), candidate.phone_number.as_deref()),
        (query.fax_number.as_deref(), candidate.fax_number.as_deref()),
    ];

    let mut sum = 0.0;
    let mut compared = 0u32;
    let mut any_match = false;
    for (q, c) in fields {
        if let (Some(q), Some(c)) = (q, c) {
            let equal = q.eq_ignore_ascii_case(c);
            sum += if equal { 1.0 } else { 0.0 };
            compared += 1;
            any_match |= equal;
        }
    }

    if compared == 0 {
        return None;
    }

    let score = sum / compared as f64;
    let mut piece = ScorePiece::new(PieceKind::Contact, score, CONTACT_WEIGHT);
    // Any equal field counts as matched; contact has no score threshold.
    piece.matched = any_match;
    piece.exact = score > EXACT_THRESHOLD;
    piece.fields_compared = compared;
    Some(piece)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: Option<&str>, phone: Option<&str>, fax: Option<&str>) -> ContactInfo {
        ContactInfo {
            email_address: email.map(str::to_string),
            phone_number: phone.map(str::to_string),
            fax_number: fax.map(str::to_string),
        }
    }

    #[test]
    fn all_fields_equal_is_exact() {
        let a = contact(Some("x@example.com"), Some("582125550123"), None);
        let piece = compare_contact_info(Some(&a), Some(&a)).unwrap();
        assert_eq!(piece.score, 1.0);
        assert!(piece.exact);
        assert_eq!(piece.fields_compared, 2);
    }

    #[test]
    fn partial_overlap_averages() {
        let q = contact(Some("x@example.com"), Some("111"), None);
        let c = contact(Some("x@example.com"), Some("222"), None);
        let piece = compare_contact_info(Some(&q), Some(&c)).unwrap();
        assert!((piece.score - 0.5).abs() < 1e-9);
        assert!(piece.matched);
        assert!(!piece.exact);
    }

    #[test]
    fn single_field_hit_out_of_three_still_counts_as_matched() {
        let q = contact(Some("x@example.com"), Some("111"), Some("333"));
        let c = contact(Some("x@example.com"), Some("222"), Some("444"));
        let piece = compare_contact_info(Some(&q), Some(&c)).unwrap();
        assert!((piece.score - 1.0 / 3.0).abs() < 1e-9);
        assert!(piece.matched);
    }

    #[test]
    fn email_comparison_ignores_case() {
        let q = contact(Some("X@Example.COM"), None, None);
        let c = contact(Some("x@example.com"), None, None);
        assert_eq!(compare_contact_info(Some(&q), Some(&c)).unwrap().score, 1.0);
    }

    #[test]
    fn disjoint_fields_yield_none() {
        let q = contact(Some("x@example.com"), None, None);
        let c = contact(None, Some("111"), None);
        assert!(compare_contact_info(Some(&q), Some(&c)).is_none());
    }

    #[test]
    fn absent_contact_yields_none() {
        let c = contact(Some("x@example.com"), None, None);
        assert!(compare_contact_info(None, Some(&c)).is_none());
    }
}
