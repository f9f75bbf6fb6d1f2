//! Phone number normalization.
//!
//! Numbers are reduced to digit-only E.164 (no leading `+`), the form the
//! pairing API expects. A strict parse is tried first; when it fails, the
//! raw input is stripped down to its digits instead.

use phonenumber::{country, Mode};
use std::fmt;
use tracing::debug;

/// Outcome of normalizing a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedNumber {
    /// Parsed and validated; E.164 digits.
    Strict(String),
    /// Not parseable as a valid number; digits of the raw input, leading
    /// zeros removed. May be empty.
    Fallback(String),
}

impl NormalizedNumber {
    pub fn digits(&self) -> &str {
        match self {
            NormalizedNumber::Strict(d) | NormalizedNumber::Fallback(d) => d,
        }
    }

    pub fn into_digits(self) -> String {
        match self {
            NormalizedNumber::Strict(d) | NormalizedNumber::Fallback(d) => d,
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, NormalizedNumber::Strict(_))
    }

    /// Label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizedNumber::Strict(_) => "strict",
            NormalizedNumber::Fallback(_) => "fallback",
        }
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.digits())
    }
}

/// Unknown region code in configuration.
#[derive(Debug, thiserror::Error)]
#[error("Unknown region code: {0}")]
pub struct UnknownRegion(pub String);

/// Normalizes phone numbers, optionally assuming a default region for
/// numbers written without a country code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneNormalizer {
    default_region: Option<country::Id>,
}

impl PhoneNormalizer {
    /// Normalizer that only accepts numbers with an explicit country code
    /// in the strict stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer assuming `region` (ISO 3166 alpha-2, e.g. "LK").
    pub fn with_region(region: &str) -> Result<Self, UnknownRegion> {
        let id = region
            .trim()
            .to_ascii_uppercase()
            .parse::<country::Id>()
            .map_err(|_| UnknownRegion(region.to_string()))?;

        Ok(Self {
            default_region: Some(id),
        })
    }

    /// Build from an optional region setting.
    pub fn from_region(region: Option<&str>) -> Result<Self, UnknownRegion> {
        match region {
            Some(region) => Self::with_region(region),
            None => Ok(Self::new()),
        }
    }

    pub fn normalize(&self, raw: &str) -> NormalizedNumber {
        match self.strict(raw) {
            Some(e164) => NormalizedNumber::Strict(e164),
            None => NormalizedNumber::Fallback(digits_only(raw)),
        }
    }

    fn strict(&self, raw: &str) -> Option<String> {
        let number = match phonenumber::parse(self.default_region, raw) {
            Ok(number) => number,
            Err(e) => {
                debug!(error = %e, "Strict phone number parse failed");
                return None;
            }
        };

        if !phonenumber::is_valid(&number) {
            debug!("Parsed phone number is not valid");
            return None;
        }

        let e164 = number.format().mode(Mode::E164).to_string();
        Some(e164.trim_start_matches('+').to_string())
    }
}

/// Strip every non-digit, then any leading zeros.
fn digits_only(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_international() {
        let normalizer = PhoneNormalizer::new();
        let result = normalizer.normalize("+1 650-253-0000");

        assert_eq!(result, NormalizedNumber::Strict("16502530000".into()));
        assert!(result.is_strict());
    }

    #[test]
    fn test_fallback_without_country_code() {
        let normalizer = PhoneNormalizer::new();
        let result = normalizer.normalize("071-234-5678");

        assert_eq!(result, NormalizedNumber::Fallback("712345678".into()));
        assert_eq!(result.kind(), "fallback");
    }

    #[test]
    fn test_default_region_applies_to_national_numbers() {
        let normalizer = PhoneNormalizer::with_region("us").unwrap();
        let result = normalizer.normalize("(650) 253-0000");

        assert_eq!(result, NormalizedNumber::Strict("16502530000".into()));
    }

    #[test]
    fn test_canonical_digits_are_idempotent() {
        let normalizer = PhoneNormalizer::new();

        let first = normalizer.normalize("+16502530000").into_digits();
        assert_eq!(first, "16502530000");

        let second = normalizer.normalize(&first).into_digits();
        assert_eq!(second, first);

        let third = normalizer.normalize(&format!("+{}", second)).into_digits();
        assert_eq!(third, first);
    }

    #[test]
    fn test_garbage_input() {
        let normalizer = PhoneNormalizer::new();

        assert_eq!(normalizer.normalize("").digits(), "");
        assert_eq!(normalizer.normalize("not a number").digits(), "");
        assert_eq!(normalizer.normalize("0000").digits(), "");
        assert_eq!(
            normalizer.normalize("call me: 12ab34"),
            NormalizedNumber::Fallback("1234".into())
        );
    }

    #[test]
    fn test_unknown_region() {
        assert!(PhoneNormalizer::with_region("XX").is_err());
        assert!(PhoneNormalizer::from_region(None).is_ok());
        assert!(PhoneNormalizer::from_region(Some("LK")).is_ok());
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+94 (077) 123-4567"), "940771234567");
        assert_eq!(digits_only("0094771234567"), "94771234567");
    }
}
