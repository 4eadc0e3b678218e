//! Entry point tying the pieces together: load a table once, compute every
//! historical result eagerly, then classify live readings on demand.

use crate::anomaly::classifier::{annotate, classify_live};
use crate::anomaly::summary::{summarize, AnomalySummary};
use crate::error::TempwatchError;
use crate::live::error::WeatherError;
use crate::live::gate::LiveTemperatureGate;
use crate::rolling::error::InvalidWindowError;
use crate::rolling::smoother::{compute_rolling_means, RollingSeries, DEFAULT_WINDOW};
use crate::stats::engine::{compute_seasonal_stats, compute_yearly_stats_for_city, DEFAULT_SIGMA};
use crate::stats::error::{InvalidSigmaError, StatsError};
use crate::table::loader::{load_table, Table};
use crate::types::annotated::AnnotatedObservation;
use crate::types::observation::LiveReading;
use crate::types::season::SeasonCalendar;
use crate::types::stats::{Bounds, SeasonalIndex, SeasonalStats, YearlyStats};
use crate::types::verdict::Verdict;
use crate::view::TimeSeriesView;
use bon::Builder;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the season of a live check comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonSource {
    /// Resolve the season from the date of the reading.
    Calendar(SeasonCalendar),
    /// Use the season label of the city's first row in the table, regardless
    /// of the current date.
    FirstObservation,
}

impl Default for SeasonSource {
    fn default() -> Self {
        SeasonSource::Calendar(SeasonCalendar::default())
    }
}

/// Settings for a [`Pipeline`].
///
/// # Examples
///
/// ```
/// use tempwatch::{PipelineConfig, SeasonSource};
///
/// let config = PipelineConfig::builder()
///     .rolling_window(7)
///     .season_source(SeasonSource::FirstObservation)
///     .build();
/// assert_eq!(config.rolling_window, 7);
/// assert_eq!(config.sigma, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct PipelineConfig {
    /// Number of observations in each trailing rolling mean.
    #[builder(default = DEFAULT_WINDOW)]
    pub rolling_window: usize,
    /// Half-width of the anomaly band, in standard deviations.
    #[builder(default = DEFAULT_SIGMA)]
    pub sigma: f64,
    #[builder(default)]
    pub season_source: SeasonSource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::builder().build()
    }
}

/// A per-city computation that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityFailure {
    pub city: String,
    pub message: String,
}

/// Turns raw table bytes into an [`Analysis`].
///
/// # Examples
///
/// ```
/// use tempwatch::{Pipeline, PipelineConfig, Verdict};
///
/// # fn main() -> Result<(), tempwatch::TempwatchError> {
/// let csv = "city,timestamp,season,temperature\n\
///            Berlin,2010-01-01,winter,-2\n\
///            Berlin,2010-01-02,winter,0\n\
///            Berlin,2010-01-03,winter,2\n";
///
/// let pipeline = Pipeline::new(PipelineConfig::builder().rolling_window(2).build())?;
/// let analysis = pipeline.analyze(csv.as_bytes())?;
///
/// assert_eq!(analysis.seasonal.get("Berlin", "winter").unwrap().mean, 0.0);
/// assert!(analysis.annotated.iter().all(|a| a.verdict == Verdict::Normal));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns [`TempwatchError::InvalidWindow`] if `config.rolling_window` is
    /// zero, and [`TempwatchError::InvalidSigma`] if `config.sigma` is negative
    /// or not finite.
    pub fn new(config: PipelineConfig) -> Result<Self, TempwatchError> {
        if config.rolling_window == 0 {
            return Err(InvalidWindowError(config.rolling_window).into());
        }
        if !config.sigma.is_finite() || config.sigma < 0.0 {
            return Err(InvalidSigmaError(config.sigma).into());
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads `bytes` as CSV and analyses the resulting table.
    pub fn analyze(&self, bytes: &[u8]) -> Result<Analysis, TempwatchError> {
        let table = load_table(bytes)?;
        self.analyze_table(table)
    }

    /// Computes seasonal and yearly statistics, anomaly verdicts and rolling
    /// means for an already loaded table.
    ///
    /// Statistics are computed city by city from each city's full history. A
    /// city whose statistics fail is logged, recorded in
    /// [`Analysis::failures`] and skipped; its rows are then annotated as
    /// insufficient data while other cities proceed normally.
    pub fn analyze_table(&self, table: Table) -> Result<Analysis, TempwatchError> {
        let observations = table.observations();

        let cities = table.cities();
        let mut failures = Vec::new();
        let seasonal: SeasonalIndex = per_city(&cities, "Seasonal", &mut failures, |city| {
            compute_seasonal_stats(observations, city, self.config.sigma)
        })
        .into_iter()
        .collect();
        let mut yearly = per_city(&cities, "Yearly", &mut failures, |city| {
            compute_yearly_stats_for_city(observations, city)
        });
        yearly.sort_by(|a: &YearlyStats, b: &YearlyStats| {
            a.city.cmp(&b.city).then(a.year.cmp(&b.year))
        });

        let annotated = annotate(observations, &seasonal);
        let rolling = compute_rolling_means(observations, self.config.rolling_window)?;

        info!(
            "Analysed {} observations: {} seasonal groups, {} yearly groups, {} failures",
            observations.len(),
            seasonal.len(),
            yearly.len(),
            failures.len()
        );

        Ok(Analysis {
            table,
            seasonal,
            yearly,
            annotated,
            rolling,
            failures,
            config: self.config.clone(),
        })
    }
}

/// Runs `compute` for every city, collecting the successes and recording each
/// failed city in `failures` without stopping the others.
fn per_city<T>(
    cities: &[&str],
    label: &str,
    failures: &mut Vec<CityFailure>,
    mut compute: impl FnMut(&str) -> Result<Vec<T>, StatsError>,
) -> Vec<T> {
    let mut results = Vec::new();
    for &city in cities {
        match compute(city) {
            Ok(stats) => results.extend(stats),
            Err(e) => {
                warn!("{} statistics for {} failed: {}", label, city, e);
                failures.push(CityFailure {
                    city: city.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    results
}

/// Everything derived from one loaded table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: Table,
    pub seasonal: SeasonalIndex,
    /// Sorted by city, then year.
    pub yearly: Vec<YearlyStats>,
    /// Same order as [`Table::observations`].
    pub annotated: Vec<AnnotatedObservation>,
    pub rolling: BTreeMap<String, RollingSeries>,
    pub failures: Vec<CityFailure>,
    config: PipelineConfig,
}

impl Analysis {
    pub fn cities(&self) -> Vec<&str> {
        self.table.cities()
    }

    pub fn seasonal_for(&self, city: &str) -> Vec<&SeasonalStats> {
        self.seasonal.for_city(city).collect()
    }

    pub fn yearly_for(&self, city: &str) -> Vec<&YearlyStats> {
        self.yearly.iter().filter(|y| y.city == city).collect()
    }

    pub fn summary(&self) -> Vec<AnomalySummary> {
        summarize(&self.annotated)
    }

    pub fn time_series(&self, city: &str) -> TimeSeriesView {
        TimeSeriesView::for_city(&self.annotated, self.rolling.get(city), city)
    }

    /// The season label a live reading for `city` taken on `today` is
    /// compared against.
    ///
    /// With [`SeasonSource::FirstObservation`] this is `None` for a city that
    /// is not in the table.
    pub fn current_season(&self, city: &str, today: NaiveDate) -> Option<String> {
        match &self.config.season_source {
            SeasonSource::Calendar(calendar) => Some(calendar.season_for(today).to_string()),
            SeasonSource::FirstObservation => self
                .table
                .for_city(city)
                .first()
                .map(|o| o.season.clone()),
        }
    }

    /// Classifies `reading` against the bounds of its city's current season.
    ///
    /// The calendar season is taken from the UTC date of
    /// [`LiveReading::fetched_at`]. Near midnight that can differ from the
    /// city's local date; use [`Self::classify_reading_on`] to pass the local
    /// date instead.
    pub fn classify_reading(&self, reading: LiveReading) -> LiveCheck {
        let today = reading.fetched_at.date_naive();
        self.classify_reading_on(reading, today)
    }

    /// Like [`Self::classify_reading`], with the season resolved for `today`.
    pub fn classify_reading_on(&self, reading: LiveReading, today: NaiveDate) -> LiveCheck {
        let season = self.current_season(&reading.city, today);
        let stats = season
            .as_deref()
            .and_then(|season| self.seasonal.get(&reading.city, season));
        let status = classify_live(&reading, stats);
        LiveCheck {
            bounds: stats.and_then(|s| s.bounds),
            season,
            status,
            reading,
        }
    }

    /// Fetches the current temperature of `city` and classifies it.
    ///
    /// Only the network call can fail; the historical results are untouched
    /// either way.
    pub fn check_live(
        &self,
        gate: &LiveTemperatureGate,
        city: &str,
        api_key: &str,
    ) -> Result<LiveCheck, WeatherError> {
        let reading = gate.fetch_reading(city, api_key)?;
        Ok(self.classify_reading(reading))
    }
}

/// Result of classifying one live reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveCheck {
    pub reading: LiveReading,
    pub season: Option<String>,
    pub bounds: Option<Bounds>,
    pub status: Verdict,
}

impl LiveCheck {
    pub fn message(&self) -> String {
        let season = self.season.as_deref().unwrap_or("the current season");
        match self.status {
            Verdict::Normal => format!(
                "Current temperature in {} is {} °C, normal for {}.",
                self.reading.city, self.reading.temperature, season
            ),
            Verdict::Anomalous => format!(
                "Current temperature in {} is {} °C, anomalous for {}.",
                self.reading.city, self.reading.temperature, season
            ),
            Verdict::InsufficientData => format!(
                "Current temperature in {} is {} °C; not enough history for {} to judge it.",
                self.reading.city, self.reading.temperature, season
            ),
        }
    }
}
