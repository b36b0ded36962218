//! # Timestamp Value Object
//!
//! DateTime wrapper with domain-specific methods.
//!
//! This module provides the [`Timestamp`] type used for birth dates and
//! registration/update times. Timestamps carry millisecond precision so that
//! every storage backend round-trips them exactly.
//!
//! # Examples
//!
//! ```
//! use registro::domain::value_objects::timestamp::Timestamp;
//!
//! let now = Timestamp::now();
//! let earlier = now.add_millis(-1);
//!
//! assert!(earlier.is_before(&now));
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a recognised ISO-8601 date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ISO-8601 date: {0}")]
pub struct ParseTimestampError(pub String);

/// A UTC timestamp with millisecond precision.
///
/// Wraps `chrono::DateTime<Utc>`.
///
/// # Invariants
///
/// - Always in UTC timezone
/// - Sub-millisecond components are always zero
///
/// # Examples
///
/// ```
/// use registro::domain::value_objects::timestamp::Timestamp;
///
/// let ts = Timestamp::parse_iso("1990-01-01").unwrap();
/// assert_eq!(ts.to_iso_string(), "1990-01-01T00:00:00.000Z");
/// assert_eq!(ts.to_date_string(), "1990-01-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Calendar-date format accepted on input and used by form fields.
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// Date-time layout without an offset.
    const LOCAL_DATETIME_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Creates a timestamp for the current moment, truncated to milliseconds.
    #[must_use]
    pub fn now() -> Self {
        Self::truncated(Utc::now())
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Returns `None` if the value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use registro::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1704067200000).unwrap();
    /// assert_eq!(ts.timestamp_millis(), 1704067200000);
    /// ```
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }

    /// Parses an ISO-8601 value.
    ///
    /// Accepts a full RFC 3339 timestamp (`1990-01-01T10:30:00.000Z`, any
    /// offset), a date-time without offset (`1990-01-01T10:30:00`, read as
    /// UTC) or a bare calendar date (`1990-01-01`), which is taken as
    /// midnight UTC. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTimestampError`] if the value matches neither form.
    pub fn parse_iso(value: &str) -> Result<Self, ParseTimestampError> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::truncated(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, Self::LOCAL_DATETIME_FORMAT) {
            return Ok(Self::truncated(naive.and_utc()));
        }
        NaiveDate::parse_from_str(value, Self::DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| ParseTimestampError(value.to_string()))
    }

    /// Returns the Unix timestamp in milliseconds.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Adds milliseconds to the timestamp.
    ///
    /// # Arguments
    ///
    /// * `millis` - Number of milliseconds to add (can be negative)
    ///
    /// # Examples
    ///
    /// ```
    /// use registro::domain::value_objects::timestamp::Timestamp;
    ///
    /// let ts = Timestamp::from_millis(1000).unwrap();
    /// assert_eq!(ts.add_millis(500).timestamp_millis(), 1500);
    /// ```
    #[must_use]
    pub fn add_millis(&self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }

    /// Adds whole days to the timestamp.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns true if this timestamp is strictly before another.
    #[inline]
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    /// Returns true if this timestamp is strictly after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Formats the timestamp as ISO 8601 with milliseconds and a `Z` suffix.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Formats the calendar date part (`YYYY-MM-DD`).
    #[must_use]
    pub fn to_date_string(&self) -> String {
        self.0.format(Self::DATE_FORMAT).to_string()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    fn truncated(dt: DateTime<Utc>) -> Self {
        Utc.timestamp_millis_opt(dt.timestamp_millis())
            .single()
            .map_or(Self(dt), Self)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::truncated(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_iso(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn now_has_millisecond_precision() {
            let ts = Timestamp::now();
            assert_eq!(ts.as_datetime().timestamp_subsec_nanos() % 1_000_000, 0);
        }

        #[test]
        fn from_millis_works() {
            let ts = Timestamp::from_millis(1704067200000).unwrap();
            assert_eq!(ts.timestamp_millis(), 1704067200000);
        }

        #[test]
        fn from_datetime_truncates() {
            let dt = Utc.timestamp_opt(10, 123_456_789).single().unwrap();
            let ts = Timestamp::from(dt);
            assert_eq!(ts.timestamp_millis(), 10_123);
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn bare_date_is_midnight_utc() {
            let ts = Timestamp::parse_iso("1990-01-01").unwrap();
            assert_eq!(ts.to_iso_string(), "1990-01-01T00:00:00.000Z");
        }

        #[test]
        fn rfc3339_with_offset_is_normalised() {
            let ts = Timestamp::parse_iso("1990-01-01T05:00:00-05:00").unwrap();
            assert_eq!(ts.to_iso_string(), "1990-01-01T10:00:00.000Z");
        }

        #[test]
        fn datetime_without_offset_is_utc() {
            let ts = Timestamp::parse_iso("1990-01-01T10:00:00").unwrap();
            assert_eq!(ts.to_iso_string(), "1990-01-01T10:00:00.000Z");

            let ts = Timestamp::parse_iso("1990-01-01T10:00:00.1234").unwrap();
            assert_eq!(ts.to_iso_string(), "1990-01-01T10:00:00.123Z");
        }

        #[test]
        fn javascript_iso_string_round_trips() {
            let ts: Timestamp = "2024-03-05T12:34:56.789Z".parse().unwrap();
            assert_eq!(ts.to_iso_string(), "2024-03-05T12:34:56.789Z");
        }

        #[test]
        fn garbage_is_rejected() {
            assert!(Timestamp::parse_iso("not a date").is_err());
            assert!(Timestamp::parse_iso("1990-13-01").is_err());
            assert!(Timestamp::parse_iso("").is_err());
        }
    }

    mod comparison {
        use super::*;

        #[test]
        fn is_before_is_strict() {
            let ts = Timestamp::from_millis(1000).unwrap();
            assert!(!ts.is_before(&ts));
            assert!(ts.add_millis(-1).is_before(&ts));
            assert!(ts.add_millis(1).is_after(&ts));
        }

        #[test]
        fn date_string_drops_time() {
            let ts = Timestamp::parse_iso("2001-09-09T01:46:40Z").unwrap();
            assert_eq!(ts.to_date_string(), "2001-09-09");
        }
    }

    mod serde_format {
        use super::*;

        #[test]
        fn serializes_as_iso_string() {
            let ts = Timestamp::from_millis(0).unwrap();
            let json = serde_json::to_string(&ts).unwrap();
            assert_eq!(json, "\"1970-01-01T00:00:00.000Z\"");
        }

        #[test]
        fn deserializes_bare_dates() {
            let ts: Timestamp = serde_json::from_str("\"1970-01-02\"").unwrap();
            assert_eq!(ts.timestamp_millis(), 86_400_000);
        }
    }
}
