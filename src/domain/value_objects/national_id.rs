//! # National Identity Number
//!
//! The DNI value object: 8 to 10 ASCII digits, unique per person.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static NATIONAL_ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8,10}$").ok());

/// Error returned when a DNI does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("national id must be 8 to 10 digits: '{0}'")]
pub struct InvalidNationalIdError(pub String);

/// A national identity number (DNI).
///
/// # Invariants
///
/// - Only ASCII digits `0-9`
/// - Between 8 and 10 characters, no surrounding whitespace
///
/// # Examples
///
/// ```
/// use registro::domain::value_objects::NationalId;
///
/// assert!(NationalId::parse("12345678").is_ok());
/// assert!(NationalId::parse("123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    /// Validates and wraps a DNI.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNationalIdError`] if the value is not 8 to 10 ASCII digits.
    pub fn parse(value: &str) -> Result<Self, InvalidNationalIdError> {
        let matches = NATIONAL_ID_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(value));
        if matches {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidNationalIdError(value.to_string()))
        }
    }

    /// Returns the digits.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NationalId {
    type Error = InvalidNationalIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NationalId> for String {
    fn from(value: NationalId) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_eight_to_ten_digits() {
        assert!(NationalId::parse("12345678").is_ok());
        assert!(NationalId::parse("123456789").is_ok());
        assert!(NationalId::parse("0102030405").is_ok());
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert!(NationalId::parse("123").is_err());
        assert!(NationalId::parse("1234567").is_err());
        assert!(NationalId::parse("12345678901").is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(NationalId::parse("1234567a").is_err());
        assert!(NationalId::parse(" 12345678").is_err());
        assert!(NationalId::parse("12345678\n").is_err());
        assert!(NationalId::parse("١٢٣٤٥٦٧٨").is_err());
    }

    #[test]
    fn serde_validates_on_input() {
        let id: NationalId = serde_json::from_str("\"0102030405\"").unwrap();
        assert_eq!(id.as_str(), "0102030405");
        assert!(serde_json::from_str::<NationalId>("\"12\"").is_err());
    }
}
