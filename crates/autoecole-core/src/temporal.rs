//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds precision.
//! Transition logs, document records, and API payloads all use the same
//! textual form (`YYYY-MM-DDTHH:MM:SSZ`), so equality on timestamps is
//! equality on what clients actually see.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an RFC 3339 string, converting to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any timezone
    /// offset and converting to UTC with seconds precision.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if the string is not
    /// valid RFC 3339.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ValidationError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(dt.with_timezone(&Utc).trunc_subsecs(0)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// RFC 3339 text with `Z` suffix and no sub-seconds.
    pub fn to_rfc3339(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn parse_accepts_z_suffix() {
        let ts = Timestamp::parse("2025-03-01T12:30:45Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T12:30:45Z");
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let ts = Timestamp::parse("2025-03-01T13:30:45+01:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T12:30:45Z");
    }

    #[test]
    fn parse_truncates_subseconds() {
        let ts = Timestamp::parse("2025-03-01T12:30:45.987Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T12:30:45Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday at noon").is_err());
    }

    #[test]
    fn display_matches_rfc3339() {
        let ts = Timestamp::parse("2025-03-01T12:30:45Z").unwrap();
        assert_eq!(ts.to_string(), ts.to_rfc3339());
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::parse("2025-03-01T12:00:00Z").unwrap();
        let b = Timestamp::parse("2025-03-01T12:00:01Z").unwrap();
        assert!(a < b);
    }
}
