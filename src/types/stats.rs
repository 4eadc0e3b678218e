//! Aggregate statistics produced by the stats engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anomaly band for a (city, season) group: `mean ± sigma · std`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// Derives the band from a group's mean and standard deviation.
    ///
    /// Returns `None` when `std` is undefined or not finite, or when `sigma`
    /// is negative or not finite, so that an undefined band never turns into
    /// an always-true or always-false comparison further down the line.
    pub fn from_mean_std(mean: f64, std: Option<f64>, sigma: f64) -> Option<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return None;
        }
        let std = std.filter(|s| s.is_finite())?;
        Some(Self {
            lower: mean - sigma * std,
            upper: mean + sigma * std,
        })
    }

    /// Inclusive on both ends: a value exactly on a bound is normal.
    pub fn contains(&self, temperature: f64) -> bool {
        self.lower <= temperature && temperature <= self.upper
    }
}

/// Descriptive statistics for one (city, season) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalStats {
    pub city: String,
    pub season: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for groups with fewer than two rows.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// `None` whenever `std` is `None`.
    pub bounds: Option<Bounds>,
}

impl SeasonalStats {
    pub fn lower_bound(&self) -> Option<f64> {
        self.bounds.map(|b| b.lower)
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.bounds.map(|b| b.upper)
    }
}

/// Descriptive statistics for one (city, calendar year) group. Informational
/// only, no bounds are derived from these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub city: String,
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Explicit `(city, season) -> SeasonalStats` lookup.
///
/// Iteration order is sorted by city, then season, independent of the order
/// in which entries were inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonalIndex {
    entries: BTreeMap<(String, String), SeasonalStats>,
}

impl SeasonalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, stats: SeasonalStats) {
        self.entries
            .insert((stats.city.clone(), stats.season.clone()), stats);
    }

    pub fn get(&self, city: &str, season: &str) -> Option<&SeasonalStats> {
        self.entries.get(&(city.to_string(), season.to_string()))
    }

    /// All seasons recorded for `city`, sorted by season label.
    pub fn for_city(&self, city: &str) -> impl Iterator<Item = &SeasonalStats> {
        let city = city.to_string();
        self.entries
            .values()
            .filter(move |stats| stats.city == city)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeasonalStats> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Extend<SeasonalStats> for SeasonalIndex {
    fn extend<T: IntoIterator<Item = SeasonalStats>>(&mut self, iter: T) {
        for stats in iter {
            self.insert(stats);
        }
    }
}

impl FromIterator<SeasonalStats> for SeasonalIndex {
    fn from_iter<T: IntoIterator<Item = SeasonalStats>>(iter: T) -> Self {
        let mut index = SeasonalIndex::new();
        index.extend(iter);
        index
    }
}
