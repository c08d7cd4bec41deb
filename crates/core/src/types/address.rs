//! Indian postal data: states and union territories, pincodes and mobile
//! numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced by address field validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Enter a valid 6-digit pincode.")]
    InvalidPincode,
    #[error("Enter a valid 10-digit mobile number.")]
    InvalidPhoneNumber,
    #[error("Select a valid state.")]
    UnknownState,
}

/// States and union territories as `(code, name)` pairs, in form order.
pub const INDIAN_STATES: [(&str, &str); 36] = [
    ("AP", "Andhra Pradesh"),
    ("AR", "Arunachal Pradesh"),
    ("AS", "Assam"),
    ("BR", "Bihar"),
    ("CT", "Chhattisgarh"),
    ("GA", "Goa"),
    ("GJ", "Gujarat"),
    ("HR", "Haryana"),
    ("HP", "Himachal Pradesh"),
    ("JH", "Jharkhand"),
    ("KA", "Karnataka"),
    ("KL", "Kerala"),
    ("MP", "Madhya Pradesh"),
    ("MH", "Maharashtra"),
    ("MN", "Manipur"),
    ("ML", "Meghalaya"),
    ("MZ", "Mizoram"),
    ("NL", "Nagaland"),
    ("OR", "Odisha"),
    ("PB", "Punjab"),
    ("RJ", "Rajasthan"),
    ("SK", "Sikkim"),
    ("TN", "Tamil Nadu"),
    ("TS", "Telangana"),
    ("TR", "Tripura"),
    ("UP", "Uttar Pradesh"),
    ("UK", "Uttarakhand"),
    ("WB", "West Bengal"),
    ("AN", "Andaman and Nicobar Islands"),
    ("CH", "Chandigarh"),
    ("DD", "Dadra and Nagar Haveli and Daman and Diu"),
    ("DL", "Delhi"),
    ("JK", "Jammu and Kashmir"),
    ("LA", "Ladakh"),
    ("LD", "Lakshadweep"),
    ("PY", "Puducherry"),
];

/// Look up the display name for a state code.
#[must_use]
pub fn state_name(code: &str) -> Option<&'static str> {
    INDIAN_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Validate a state code against [`INDIAN_STATES`].
///
/// # Errors
///
/// Returns [`AddressError::UnknownState`] for codes not in the list.
pub fn validate_state(code: &str) -> Result<&'static str, AddressError> {
    INDIAN_STATES
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(c, _)| *c)
        .ok_or(AddressError::UnknownState)
}

/// A six-digit Indian postal code. The first digit is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidPincode`] unless the trimmed input is
    /// exactly six ASCII digits with a non-zero first digit.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let valid = s.len() == 6
            && s.bytes().all(|b| b.is_ascii_digit())
            && !s.starts_with('0');
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(AddressError::InvalidPincode)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ten-digit Indian mobile number, stored without prefix or separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a mobile number. Spaces and dashes are ignored, and a leading
    /// `+91`, `91` (on 12-digit input) or `0` is stripped.
    ///
    /// ```
    /// use zestify_core::PhoneNumber;
    ///
    /// let phone = PhoneNumber::parse("+91 98765-43210").unwrap();
    /// assert_eq!(phone.as_str(), "9876543210");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidPhoneNumber`] unless what remains is
    /// ten digits starting with 6, 7, 8 or 9.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();

        let digits = compact.strip_prefix('+').map_or(compact.as_str(), |rest| {
            rest.strip_prefix("91").unwrap_or(rest)
        });
        let digits = if digits.len() == 12 {
            digits.strip_prefix("91").unwrap_or(digits)
        } else if digits.len() == 11 {
            digits.strip_prefix('0').unwrap_or(digits)
        } else {
            digits
        };

        let valid = digits.len() == 10
            && digits.bytes().all(|b| b.is_ascii_digit())
            && matches!(digits.as_bytes().first(), Some(b'6'..=b'9'));
        if valid {
            Ok(Self(digits.to_owned()))
        } else {
            Err(AddressError::InvalidPhoneNumber)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_list_is_complete_and_unique() {
        assert_eq!(INDIAN_STATES.len(), 36);
        let mut codes: Vec<_> = INDIAN_STATES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 36);
    }

    #[test]
    fn test_state_lookup() {
        assert_eq!(state_name("KA"), Some("Karnataka"));
        assert_eq!(state_name("XX"), None);
        assert_eq!(validate_state(" TN "), Ok("TN"));
        assert_eq!(validate_state("tn"), Err(AddressError::UnknownState));
    }

    #[test]
    fn test_pincode() {
        assert_eq!(Pincode::parse(" 560001 ").unwrap().as_str(), "560001");
        assert!(Pincode::parse("056001").is_err());
        assert!(Pincode::parse("56001").is_err());
        assert!(Pincode::parse("5600a1").is_err());
    }

    #[test]
    fn test_phone_number_accepts_common_formats() {
        for input in ["9876543210", "+919876543210", "+91 98765 43210", "09876543210", "919876543210"] {
            assert_eq!(
                PhoneNumber::parse(input).unwrap().as_str(),
                "9876543210",
                "input {input}"
            );
        }
    }

    #[test]
    fn test_phone_number_rejects_invalid() {
        assert!(PhoneNumber::parse("1234567890").is_err());
        assert!(PhoneNumber::parse("98765").is_err());
        assert!(PhoneNumber::parse("98765432ab").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }
}
