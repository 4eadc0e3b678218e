//! Row-level data: historical observations loaded from a table and the
//! ephemeral live reading fetched from the weather service.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single historical temperature measurement for a city.
///
/// Identity is `(city, timestamp)`. Uniqueness is assumed from the source data,
/// not enforced. The `season` label is an opaque grouping key taken verbatim
/// from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// City name as it appears in the input (e.g. "Berlin").
    pub city: String,
    /// Wall-clock time of the measurement, in the timestamp's own timezone.
    pub timestamp: NaiveDateTime,
    /// Season label (e.g. "winter").
    pub season: String,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Any extra input columns, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Observation {
    pub fn new(
        city: impl Into<String>,
        timestamp: NaiveDateTime,
        season: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            city: city.into(),
            timestamp,
            season: season.into(),
            temperature,
            extra: BTreeMap::new(),
        }
    }

    /// Calendar year of the timestamp, without any timezone conversion.
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

/// Current temperature for a city as reported by the weather service.
///
/// Only lives for the duration of one live check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    pub city: String,
    pub temperature: f64,
    pub fetched_at: DateTime<Utc>,
}
