//! Phone number normalization and Brazilian line-type classification.
//!
//! Directory listings carry phones in whatever shape the source printed them
//! (`"(11) 98765-4321"`, `"+55 11 3214-5678"`, ...). Everything downstream
//! compares the digits-only form produced by [`normalize_phone`].

use serde::{Deserialize, Serialize};

/// Line type inferred from the digits of a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneKind {
    Mobile,
    Landline,
    Unclassified,
}

/// Strips every non-digit character.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Classifies a phone by the shape of its digits.
///
/// - 11 digits with `9` as the third digit (area code + mobile prefix) is
///   [`PhoneKind::Mobile`].
/// - 10 digits with `2`..=`5` as the third digit is [`PhoneKind::Landline`].
/// - Anything else, including numbers carrying a country code, is
///   [`PhoneKind::Unclassified`].
#[must_use]
pub fn classify_phone(raw: &str) -> PhoneKind {
    let digits = normalize_phone(raw);
    let third = digits.as_bytes().get(2).copied();
    match (digits.len(), third) {
        (11, Some(b'9')) => PhoneKind::Mobile,
        (10, Some(b'2'..=b'5')) => PhoneKind::Landline,
        _ => PhoneKind::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_spaces() {
        assert_eq!(normalize_phone("(11) 98765-4321"), "11987654321");
        assert_eq!(normalize_phone("+55 11 3214.5678"), "551132145678");
    }

    #[test]
    fn normalize_empty_and_non_digit_input() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("n/a"), "");
    }

    #[test]
    fn classifies_mobile() {
        assert_eq!(classify_phone("11987654321"), PhoneKind::Mobile);
        assert_eq!(classify_phone("(21) 99999-0000"), PhoneKind::Mobile);
    }

    #[test]
    fn classifies_landline() {
        assert_eq!(classify_phone("1132145678"), PhoneKind::Landline);
        assert_eq!(classify_phone("(31) 2555-0101"), PhoneKind::Landline);
        assert_eq!(classify_phone("4142001234"), PhoneKind::Landline);
        assert_eq!(classify_phone("5153001234"), PhoneKind::Landline);
    }

    #[test]
    fn short_numbers_are_unclassified() {
        assert_eq!(classify_phone("123"), PhoneKind::Unclassified);
        assert_eq!(classify_phone(""), PhoneKind::Unclassified);
    }

    #[test]
    fn eleven_digits_without_nine_is_unclassified() {
        assert_eq!(classify_phone("11887654321"), PhoneKind::Unclassified);
    }

    #[test]
    fn ten_digits_with_mobile_like_prefix_is_unclassified() {
        assert_eq!(classify_phone("1192145678"), PhoneKind::Unclassified);
        assert_eq!(classify_phone("1162145678"), PhoneKind::Unclassified);
    }

    #[test]
    fn country_code_prefix_is_unclassified() {
        assert_eq!(classify_phone("+55 11 98765-4321"), PhoneKind::Unclassified);
    }
}
