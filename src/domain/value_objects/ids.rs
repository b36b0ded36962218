//! # Identifiers
//!
//! Identity types for persisted records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a stored person.
///
/// Assigned by the repository on creation. In-memory and SQLite stores use
/// decimal integers, MongoDB uses 24-character hex object ids; callers never
/// interpret the value.
///
/// # Examples
///
/// ```
/// use registro::domain::value_objects::PersonId;
///
/// let id = PersonId::new("42");
/// assert_eq!(id.as_str(), "42");
/// assert_eq!(id.as_integer(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Creates an identifier from its string form.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates an identifier from an integer key.
    #[must_use]
    pub fn from_integer(value: i64) -> Self {
        Self(value.to_string())
    }

    /// Returns the string form.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the integer key, if this identifier is the canonical decimal
    /// form of one (no sign, no leading zeros).
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids() {
        assert_eq!(PersonId::from_integer(7).as_str(), "7");
        assert_eq!(PersonId::new("7").as_integer(), Some(7));
        assert_eq!(PersonId::new("65a1f0c2e4b0a1b2c3d4e5f6").as_integer(), None);
    }

    #[test]
    fn non_canonical_integers_are_not_keys() {
        for alias in ["01", "+1", "-0", "1 ", ""] {
            assert_eq!(PersonId::new(alias).as_integer(), None, "{alias:?}");
        }
        assert_eq!(PersonId::new("0").as_integer(), Some(0));
    }

    #[test]
    fn display_matches_inner() {
        assert_eq!(PersonId::from("abc").to_string(), "abc");
    }
}
