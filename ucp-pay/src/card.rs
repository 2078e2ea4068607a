//! Card network detection from PAN prefixes.
//!
//! Classification uses ordered prefix/length rules over the sanitized card
//! number. An unrecognized prefix yields `None` rather than an error —
//! callers decide whether an unknown network is acceptable.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A payment card network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum CardBrand {
    /// Visa (leading 4).
    Visa,
    /// Mastercard (51-55 and 2221-2720 ranges).
    Mastercard,
    /// American Express (34 / 37).
    Amex,
    /// Discover (6011, 622126-622925, 644-649, 65).
    Discover,
}

impl CardBrand {
    /// Returns the wire-format name of this network.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "VISA",
            Self::Mastercard => "MASTERCARD",
            Self::Amex => "AMEX",
            Self::Discover => "DISCOVER",
        }
    }
}

impl Display for CardBrand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the card network from a PAN.
///
/// Whitespace is stripped before matching. Returns `None` when no rule
/// matches or the input is not purely numeric; this is not an error.
#[must_use]
pub fn detect_card_brand(pan: &str) -> Option<CardBrand> {
    let digits: String = pan.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if in_range(&digits, 2, 34, 34) || in_range(&digits, 2, 37, 37) {
        return Some(CardBrand::Amex);
    }
    if digits.starts_with('4') {
        return Some(CardBrand::Visa);
    }
    if in_range(&digits, 2, 51, 55) || in_range(&digits, 4, 2221, 2720) {
        return Some(CardBrand::Mastercard);
    }
    if in_range(&digits, 4, 6011, 6011)
        || in_range(&digits, 6, 622126, 622925)
        || in_range(&digits, 3, 644, 649)
        || in_range(&digits, 2, 65, 65)
    {
        return Some(CardBrand::Discover);
    }
    None
}

/// Returns `true` if the first `len` digits parse to a value in `lo..=hi`.
fn in_range(digits: &str, len: usize, lo: u32, hi: u32) -> bool {
    digits
        .get(..len)
        .and_then(|prefix| prefix.parse::<u32>().ok())
        .is_some_and(|value| (lo..=hi).contains(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_visa() {
        assert_eq!(detect_card_brand("4111111111111111"), Some(CardBrand::Visa));
        assert_eq!(detect_card_brand("4000056655665556"), Some(CardBrand::Visa));
    }

    #[test]
    fn detects_mastercard_in_both_ranges() {
        assert_eq!(
            detect_card_brand("5105105105105100"),
            Some(CardBrand::Mastercard)
        );
        assert_eq!(
            detect_card_brand("2221000000000009"),
            Some(CardBrand::Mastercard)
        );
        assert_eq!(
            detect_card_brand("2720990000000007"),
            Some(CardBrand::Mastercard)
        );
    }

    #[test]
    fn detects_amex() {
        assert_eq!(detect_card_brand("371449635398431"), Some(CardBrand::Amex));
        assert_eq!(detect_card_brand("340000000000009"), Some(CardBrand::Amex));
    }

    #[test]
    fn detects_discover() {
        assert_eq!(
            detect_card_brand("6011111111111117"),
            Some(CardBrand::Discover)
        );
        assert_eq!(
            detect_card_brand("6221261111111111"),
            Some(CardBrand::Discover)
        );
        assert_eq!(
            detect_card_brand("6445111111111111"),
            Some(CardBrand::Discover)
        );
        assert_eq!(
            detect_card_brand("6500000000000002"),
            Some(CardBrand::Discover)
        );
    }

    #[test]
    fn strips_whitespace_before_matching() {
        assert_eq!(
            detect_card_brand("4111 1111 1111 1111"),
            Some(CardBrand::Visa)
        );
    }

    #[test]
    fn unknown_prefixes_return_none() {
        assert_eq!(detect_card_brand("9999999999999999"), None);
        assert_eq!(detect_card_brand("1234567890123456"), None);
        assert_eq!(detect_card_brand(""), None);
        assert_eq!(detect_card_brand("not-a-pan"), None);
    }

    #[test]
    fn detection_is_deterministic() {
        let pan = "5555555555554444";
        let first = detect_card_brand(pan);
        for _ in 0..100 {
            assert_eq!(detect_card_brand(pan), first);
        }
    }

    #[test]
    fn mastercard_range_boundaries_are_exclusive() {
        // 2220 and 2721 sit just outside the 2221-2720 range.
        assert_eq!(detect_card_brand("2220990000000000"), None);
        assert_eq!(detect_card_brand("2721000000000000"), None);
    }
}
