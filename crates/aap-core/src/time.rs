//! Server timestamps.
//!
//! The service renders every timestamp in one canonical shape:
//! `YYYY-MM-DDTHH:MM:SS.ffffff`, UTC, microsecond precision, no trailing `Z`.
//! Clients echo these strings back as point-in-time cutoffs, so the rendered
//! form must parse back to exactly the instant it came from.

use std::fmt;

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC instant truncated to microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerTimestamp(Timestamp);

impl ServerTimestamp {
    pub fn now() -> Self {
        Self::from_jiff(Timestamp::now())
    }

    /// Truncates to whole microseconds.
    pub fn from_jiff(ts: Timestamp) -> Self {
        match Timestamp::from_microsecond(ts.as_microsecond()) {
            Ok(truncated) => Self(truncated),
            Err(_) => Self(ts),
        }
    }

    pub fn as_jiff(&self) -> Timestamp {
        self.0
    }

    /// The timestamp for a new event appended after `previous`.
    ///
    /// Strictly greater than `previous` even when the wall clock has not
    /// advanced (or went backwards) since the previous event.
    pub fn next_after(previous: Option<ServerTimestamp>) -> Self {
        let now = Self::now();
        match previous {
            Some(prev) if now <= prev => prev
                .0
                .checked_add(SignedDuration::from_micros(1))
                .map(Self)
                .unwrap_or(now),
            _ => now,
        }
    }

    /// Parse a client-supplied timestamp.
    ///
    /// Accepts the canonical form, the same with fewer (or no) fractional
    /// digits, and RFC 3339 strings carrying an offset or `Z`. Strings without
    /// an offset are read as UTC.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        if let Ok(ts) = trimmed.parse::<Timestamp>() {
            return Ok(Self::from_jiff(ts));
        }

        let invalid = |e: jiff::Error| CoreError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        };
        let civil: DateTime = trimmed.parse().map_err(invalid)?;
        let zoned = civil.to_zoned(TimeZone::UTC).map_err(invalid)?;
        Ok(Self::from_jiff(zoned.timestamp()))
    }
}

impl fmt::Display for ServerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.0.to_zoned(TimeZone::UTC).datetime();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
            dt.subsec_nanosecond() / 1_000,
        )
    }
}

impl Serialize for ServerTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServerTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ServerTimestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}
