//! Time window type for reading retrieval.
//!
//! This module provides [`TimeWindow`] for defining the query range sent to
//! the vendor: always `[now - lookback, now]`, with the lookback taken from
//! configuration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format expected by the vendor's query parameters.
///
/// Dexcom accepts second-resolution timestamps without a timezone suffix.
const VENDOR_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A time window for querying glucose readings.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window ending at `end` and reaching `lookback` into the past.
    pub fn lookback_from(end: DateTime<Utc>, lookback: Duration) -> Self {
        Self::new(end - lookback, end)
    }

    /// Creates a window ending now and reaching `lookback` into the past.
    pub fn lookback(lookback: Duration) -> Self {
        Self::lookback_from(Utc::now(), lookback)
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Formats the window start in the vendor's timestamp format.
    pub fn start_param(&self) -> String {
        self.start.format(VENDOR_TIMESTAMP_FORMAT).to_string()
    }

    /// Formats the window end in the vendor's timestamp format.
    pub fn end_param(&self) -> String {
        self.end.format(VENDOR_TIMESTAMP_FORMAT).to_string()
    }
}
