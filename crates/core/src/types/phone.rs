//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, dashes and a
    /// leading plus sign.
    #[error("phone number may only contain digits, dashes and a leading +")]
    InvalidCharacter,
    /// The input has fewer than ten digits.
    #[error("phone number must contain at least {min} digits")]
    TooShort {
        /// Minimum number of digits.
        min: usize,
    },
    /// The input has more than fifteen digits (E.164 limit).
    #[error("phone number must contain at most {max} digits")]
    TooLong {
        /// Maximum number of digits.
        max: usize,
    },
}

/// A phone number.
///
/// Spaces are stripped on parse; the stored form keeps any dashes and a
/// leading plus sign as typed. Digit count is bounded rather than matched
/// against regional formats - the backend sees the same string the user
/// typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits in a phone number.
    pub const MIN_DIGITS: usize = 10;

    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits, dashes, spaces and a leading `+`, or its digit count is
    /// outside 10..=15.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.is_empty() {
            return Err(PhoneError::Empty);
        }

        for (i, c) in compact.chars().enumerate() {
            let valid = c.is_ascii_digit() || c == '-' || (c == '+' && i == 0);
            if !valid {
                return Err(PhoneError::InvalidCharacter);
            }
        }

        let digits = compact.chars().filter(char::is_ascii_digit).count();
        if digits < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }
        if digits > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(compact))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phones() {
        assert!(Phone::parse("+79161234567").is_ok());
        assert!(Phone::parse("8-916-123-45-67").is_ok());
        assert!(Phone::parse("89161234567").is_ok());
    }

    #[test]
    fn test_spaces_are_stripped() {
        let phone = Phone::parse("+7 916 123 45 67").unwrap();
        assert_eq!(phone.as_str(), "+79161234567");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(Phone::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            Phone::parse("phone-me"),
            Err(PhoneError::InvalidCharacter)
        ));
        // Plus sign only allowed at the start
        assert!(matches!(
            Phone::parse("79+161234567"),
            Err(PhoneError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            Phone::parse("123456789"),
            Err(PhoneError::TooShort { .. })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Phone::parse("1234567890123456"),
            Err(PhoneError::TooLong { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("+79161234567").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+79161234567\"");

        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }
}
