//! Grouped temperature statistics.
//!
//! Statistics are always computed one city at a time from that city's full
//! history, so a group's bounds only ever reflect its own city's climate.
//! Rows are put in a canonical order before aggregation, which makes the
//! output bit-for-bit identical for any permutation of the input.

use crate::stats::error::StatsError;
use crate::table::loader::TEMPERATURE;
use crate::types::observation::Observation;
use crate::types::stats::{Bounds, SeasonalIndex, SeasonalStats, YearlyStats};
use log::debug;
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Width of the anomaly band in standard deviations.
pub const DEFAULT_SIGMA: f64 = 2.0;

const KEY: &str = "key";
const COUNT: &str = "count";
const MEAN: &str = "mean";
const STD: &str = "std";
const MIN: &str = "min";
const MAX: &str = "max";

const SEASONAL: &str = "seasonal";
const YEARLY: &str = "yearly";

/// Aggregates of one group, in the row order of the aggregated frame.
struct Aggregate {
    count: usize,
    mean: f64,
    std: Option<f64>,
    min: f64,
    max: f64,
}

/// Computes per-season statistics for a single city.
///
/// Only observations of `city` are considered. A city without observations
/// yields an empty vector. Seasons with a single observation get `std: None`
/// and `bounds: None`.
///
/// The result is sorted by season label.
pub fn compute_seasonal_stats(
    observations: &[Observation],
    city: &str,
    sigma: f64,
) -> Result<Vec<SeasonalStats>, StatsError> {
    let mut rows: Vec<(&str, OrderedFloat<f64>)> = observations
        .iter()
        .filter(|o| o.city == city)
        .map(|o| (o.season.as_str(), OrderedFloat(o.temperature)))
        .collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    rows.sort();

    let keys: Vec<&str> = rows.iter().map(|(season, _)| *season).collect();
    let temperatures: Vec<f64> = rows.iter().map(|(_, t)| t.into_inner()).collect();
    let frame = df!(KEY => keys, TEMPERATURE => temperatures).map_err(|e| {
        StatsError::FrameBuild {
            city: city.to_string(),
            grouping: SEASONAL,
            source: e,
        }
    })?;

    let (aggregated, aggregates) = aggregate(frame, city, SEASONAL)?;
    let seasons = aggregated
        .column(KEY)
        .and_then(|c| c.str())
        .map_err(|e| StatsError::Aggregation {
            city: city.to_string(),
            grouping: SEASONAL,
            source: e,
        })?;

    let mut stats = Vec::with_capacity(aggregates.len());
    for (row, agg) in aggregates.into_iter().enumerate() {
        let season = seasons.get(row).ok_or_else(|| StatsError::MissingAggregate {
            city: city.to_string(),
            grouping: SEASONAL,
            column: KEY,
            row,
        })?;
        if agg.std.is_none() {
            debug!(
                "Season '{}' of {} has {} observation(s), no bounds",
                season, city, agg.count
            );
        }
        stats.push(SeasonalStats {
            city: city.to_string(),
            season: season.to_string(),
            count: agg.count,
            mean: agg.mean,
            std: agg.std,
            min: agg.min,
            max: agg.max,
            bounds: Bounds::from_mean_std(agg.mean, agg.std, sigma),
        });
    }
    stats.sort_by(|a, b| a.season.cmp(&b.season));
    Ok(stats)
}

/// Computes seasonal statistics for every city in `observations`.
///
/// Each city is computed independently via [`compute_seasonal_stats`]; the
/// first failing city aborts this call. Use the per-city function directly
/// to keep going past a failing city.
pub fn compute_seasonal_index(
    observations: &[Observation],
    sigma: f64,
) -> Result<SeasonalIndex, StatsError> {
    let mut index = SeasonalIndex::new();
    for city in distinct_cities(observations) {
        index.extend(compute_seasonal_stats(observations, city, sigma)?);
    }
    debug!("Computed {} seasonal groups", index.len());
    Ok(index)
}

/// Computes per-calendar-year statistics for a single city, sorted by year.
///
/// The year is taken from each timestamp as written, without any timezone
/// conversion.
pub fn compute_yearly_stats_for_city(
    observations: &[Observation],
    city: &str,
) -> Result<Vec<YearlyStats>, StatsError> {
    let mut rows: Vec<(i32, OrderedFloat<f64>)> = observations
        .iter()
        .filter(|o| o.city == city)
        .map(|o| (o.year(), OrderedFloat(o.temperature)))
        .collect();
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    rows.sort();

    let keys: Vec<i32> = rows.iter().map(|(year, _)| *year).collect();
    let temperatures: Vec<f64> = rows.iter().map(|(_, t)| t.into_inner()).collect();
    let frame = df!(KEY => keys, TEMPERATURE => temperatures).map_err(|e| {
        StatsError::FrameBuild {
            city: city.to_string(),
            grouping: YEARLY,
            source: e,
        }
    })?;

    let (aggregated, aggregates) = aggregate(frame, city, YEARLY)?;
    let years = aggregated
        .column(KEY)
        .and_then(|c| c.i32())
        .map_err(|e| StatsError::Aggregation {
            city: city.to_string(),
            grouping: YEARLY,
            source: e,
        })?;

    let mut stats = Vec::with_capacity(aggregates.len());
    for (row, agg) in aggregates.into_iter().enumerate() {
        let year = years.get(row).ok_or_else(|| StatsError::MissingAggregate {
            city: city.to_string(),
            grouping: YEARLY,
            column: KEY,
            row,
        })?;
        stats.push(YearlyStats {
            city: city.to_string(),
            year,
            count: agg.count,
            mean: agg.mean,
            std: agg.std,
            min: agg.min,
            max: agg.max,
        });
    }
    stats.sort_by_key(|s| s.year);
    Ok(stats)
}

/// Computes yearly statistics for every city, sorted by city then year.
pub fn compute_yearly_stats(observations: &[Observation]) -> Result<Vec<YearlyStats>, StatsError> {
    let mut stats = Vec::new();
    for city in distinct_cities(observations) {
        stats.extend(compute_yearly_stats_for_city(observations, city)?);
    }
    Ok(stats)
}

pub(crate) fn distinct_cities(observations: &[Observation]) -> BTreeSet<&str> {
    observations.iter().map(|o| o.city.as_str()).collect()
}

/// Groups `frame` by its `key` column and reads back the temperature
/// aggregates row by row.
fn aggregate(
    frame: DataFrame,
    city: &str,
    grouping: &'static str,
) -> Result<(DataFrame, Vec<Aggregate>), StatsError> {
    let aggregation_error = |e: PolarsError| StatsError::Aggregation {
        city: city.to_string(),
        grouping,
        source: e,
    };

    let aggregated = frame
        .lazy()
        .group_by_stable([col(KEY)])
        .agg([
            col(TEMPERATURE).count().cast(DataType::Int64).alias(COUNT),
            col(TEMPERATURE).mean().alias(MEAN),
            col(TEMPERATURE).std(1).alias(STD),
            col(TEMPERATURE).min().alias(MIN),
            col(TEMPERATURE).max().alias(MAX),
        ])
        .collect()
        .map_err(aggregation_error)?;

    let counts = aggregated
        .column(COUNT)
        .and_then(|c| c.i64())
        .map_err(aggregation_error)?;
    let float_column = |name: &str| {
        aggregated
            .column(name)
            .and_then(|c| c.f64())
            .map_err(aggregation_error)
    };
    let means = float_column(MEAN)?;
    let stds = float_column(STD)?;
    let mins = float_column(MIN)?;
    let maxs = float_column(MAX)?;

    let missing = |column: &'static str, row: usize| StatsError::MissingAggregate {
        city: city.to_string(),
        grouping,
        column,
        row,
    };

    let mut aggregates = Vec::with_capacity(aggregated.height());
    for row in 0..aggregated.height() {
        let count = counts.get(row).ok_or_else(|| missing(COUNT, row))? as usize;
        aggregates.push(Aggregate {
            count,
            mean: means.get(row).ok_or_else(|| missing(MEAN, row))?,
            std: if count < 2 {
                None
            } else {
                stds.get(row).filter(|s| s.is_finite())
            },
            min: mins.get(row).ok_or_else(|| missing(MIN, row))?,
            max: maxs.get(row).ok_or_else(|| missing(MAX, row))?,
        });
    }
    Ok((aggregated, aggregates))
}
