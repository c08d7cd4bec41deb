//! Payment credential types: card numbers, expiry dates, CVVs and UPI IDs.
//!
//! Full card numbers and CVVs only ever live on the stack while a form is
//! validated. Nothing here is persisted except [`CardNumber::last_four`],
//! the detected [`CardBrand`] and the expiry.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Errors produced by payment field validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Card number must be 16 digits.")]
    CardNumberLength,
    #[error("Card number is not valid.")]
    CardNumberChecksum,
    #[error("CVV must be 3 or 4 digits.")]
    InvalidCvv,
    #[error("Enter a valid month (01-12).")]
    InvalidExpiryMonth,
    #[error("Enter a valid 4-digit year.")]
    InvalidExpiryYear,
    #[error("This card has expired.")]
    Expired,
    #[error("Enter a valid UPI ID (e.g. name@bank).")]
    InvalidUpiId,
}

/// A validated 16-digit card number.
///
/// `Debug` only reveals the last four digits.
#[derive(Clone, PartialEq, Eq)]
pub struct CardNumber(String);

impl CardNumber {
    /// Parse a card number. Spaces and dashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::CardNumberLength`] unless exactly 16 digits
    /// remain, and [`PaymentError::CardNumberChecksum`] when the Luhn check
    /// fails.
    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        let digits: String = s
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();
        if digits.len() != 16 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PaymentError::CardNumberLength);
        }
        if !luhn_valid(&digits) {
            return Err(PaymentError::CardNumberChecksum);
        }
        Ok(Self(digits))
    }

    /// The last four digits, the only part of the number that is stored.
    #[must_use]
    pub fn last_four(&self) -> &str {
        self.0.get(self.0.len().saturating_sub(4)..).unwrap_or("")
    }

    /// Detect the card network from the number's prefix.
    #[must_use]
    pub fn brand(&self) -> CardBrand {
        CardBrand::detect(&self.0)
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber(****{})", self.last_four())
    }
}

/// Luhn (mod 10) checksum over an all-digit string.
fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Card network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    RuPay,
    AmericanExpress,
    Discover,
}

impl CardBrand {
    /// Detect the network from leading digits. Unknown prefixes are
    /// labelled Visa.
    #[must_use]
    pub fn detect(digits: &str) -> Self {
        let prefix = |n: usize| -> u32 {
            digits
                .get(..n)
                .and_then(|p| p.parse().ok())
                .unwrap_or(0)
        };

        let p2 = prefix(2);
        let p3 = prefix(3);
        let p4 = prefix(4);

        if digits.starts_with('4') {
            Self::Visa
        } else if p2 == 34 || p2 == 37 {
            Self::AmericanExpress
        } else if (51..=55).contains(&p2) || (2221..=2720).contains(&p4) {
            Self::Mastercard
        } else if p4 == 6011 {
            Self::Discover
        } else if p4 == 6521 || p4 == 6522 {
            Self::RuPay
        } else if (644..=649).contains(&p3) || p2 == 65 {
            Self::Discover
        } else if p2 == 60 || p2 == 81 || p2 == 82 || p3 == 508 {
            Self::RuPay
        } else {
            Self::Visa
        }
    }

    /// Label stored in `saved_card.card_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::RuPay => "RuPay",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card expiry date, month `01`-`12` and a four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiry {
    month: u32,
    year: u32,
}

impl CardExpiry {
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidExpiryMonth`] or
    /// [`PaymentError::InvalidExpiryYear`] for malformed input.
    pub fn parse(month: &str, year: &str) -> Result<Self, PaymentError> {
        let month = month.trim();
        let year = year.trim();

        let month: u32 = (!month.is_empty()
            && month.len() <= 2
            && month.bytes().all(|b| b.is_ascii_digit()))
        .then(|| month.parse().ok())
        .flatten()
        .filter(|m| (1..=12).contains(m))
        .ok_or(PaymentError::InvalidExpiryMonth)?;

        let year: u32 = (year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
            .then(|| year.parse().ok())
            .flatten()
            .ok_or(PaymentError::InvalidExpiryYear)?;

        Ok(Self { month, year })
    }

    /// A card is valid through the last day of its expiry month.
    #[must_use]
    pub const fn is_expired_at(&self, year: u32, month: u32) -> bool {
        self.year < year || (self.year == year && self.month < month)
    }

    /// Reject expiries before the given current month.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Expired`].
    pub const fn ensure_not_expired(self, year: u32, month: u32) -> Result<Self, PaymentError> {
        if self.is_expired_at(year, month) {
            Err(PaymentError::Expired)
        } else {
            Ok(self)
        }
    }

    /// Reject expiries before the month containing `today`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Expired`].
    pub fn ensure_valid_on(self, today: NaiveDate) -> Result<Self, PaymentError> {
        self.ensure_not_expired(today.year().unsigned_abs(), today.month())
    }

    /// Two-digit month, e.g. `07`.
    #[must_use]
    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    /// Four-digit year.
    #[must_use]
    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }
}

/// Validate a CVV. The value is never stored.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidCvv`] unless the input is 3 or 4 digits.
pub fn validate_cvv(cvv: &str) -> Result<(), PaymentError> {
    let cvv = cvv.trim();
    if (3..=4).contains(&cvv.len()) && cvv.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PaymentError::InvalidCvv)
    }
}

/// A UPI virtual payment address such as `asha@okaxis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpiId(String);

impl UpiId {
    /// Column width in the database.
    pub const MAX_LENGTH: usize = 255;

    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidUpiId`] unless the input is
    /// `handle@provider` where the handle is 2+ characters of letters,
    /// digits, `.`, `-` or `_`, and the provider is 2+ letters.
    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        let s = s.trim();
        if s.len() > Self::MAX_LENGTH {
            return Err(PaymentError::InvalidUpiId);
        }
        let (handle, provider) = s.split_once('@').ok_or(PaymentError::InvalidUpiId)?;

        let handle_ok = handle.len() >= 2
            && handle
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        let provider_ok = provider.len() >= 2 && provider.chars().all(|c| c.is_ascii_alphabetic());

        if handle_ok && provider_ok {
            Ok(Self(s.to_owned()))
        } else {
            Err(PaymentError::InvalidUpiId)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VISA_TEST: &str = "4111 1111 1111 1111";

    #[test]
    fn test_card_number_accepts_luhn_valid() {
        let card = CardNumber::parse(VISA_TEST).unwrap();
        assert_eq!(card.last_four(), "1111");
        assert_eq!(card.brand(), CardBrand::Visa);
    }

    #[test]
    fn test_card_number_rejects_bad_checksum() {
        assert_eq!(
            CardNumber::parse("4111111111111112"),
            Err(PaymentError::CardNumberChecksum)
        );
    }

    #[test]
    fn test_card_number_rejects_wrong_length() {
        assert_eq!(
            CardNumber::parse("411111111111111"),
            Err(PaymentError::CardNumberLength)
        );
        assert_eq!(
            CardNumber::parse("4111x11111111111"),
            Err(PaymentError::CardNumberLength)
        );
    }

    #[test]
    fn test_card_number_debug_is_masked() {
        let card = CardNumber::parse(VISA_TEST).unwrap();
        assert_eq!(format!("{card:?}"), "CardNumber(****1111)");
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardBrand::detect("5555555555554444"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("2223003122003222"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("6011111111111117"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("6521000000000000"), CardBrand::RuPay);
        assert_eq!(CardBrand::detect("6080000000000000"), CardBrand::RuPay);
        assert_eq!(CardBrand::detect("3782822463100050"), CardBrand::AmericanExpress);
        assert_eq!(CardBrand::detect("9999999999999999"), CardBrand::Visa);
    }

    #[test]
    fn test_expiry_parse() {
        let expiry = CardExpiry::parse("7", "2031").unwrap();
        assert_eq!(expiry.month_str(), "07");
        assert_eq!(expiry.year_str(), "2031");

        assert_eq!(
            CardExpiry::parse("13", "2031"),
            Err(PaymentError::InvalidExpiryMonth)
        );
        assert_eq!(
            CardExpiry::parse("00", "2031"),
            Err(PaymentError::InvalidExpiryMonth)
        );
        assert_eq!(
            CardExpiry::parse("12", "31"),
            Err(PaymentError::InvalidExpiryYear)
        );
    }

    #[test]
    fn test_expiry_is_valid_through_its_month() {
        let expiry = CardExpiry::parse("06", "2026").unwrap();
        assert!(!expiry.is_expired_at(2026, 6));
        assert!(expiry.is_expired_at(2026, 7));
        assert!(expiry.is_expired_at(2027, 1));
        assert!(!expiry.is_expired_at(2025, 12));
        assert_eq!(
            expiry.ensure_not_expired(2026, 7),
            Err(PaymentError::Expired)
        );

        let june_end = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
        assert!(expiry.ensure_valid_on(june_end).is_ok());
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn test_upi_id() {
        assert_eq!(UpiId::parse(" asha.k@okaxis ").unwrap().as_str(), "asha.k@okaxis");
        assert!(UpiId::parse("asha").is_err());
        assert!(UpiId::parse("a@okaxis").is_err());
        assert!(UpiId::parse("asha@ok1").is_err());
        assert!(UpiId::parse("asha@@okaxis").is_err());
    }
}
