//! Parses uploaded CSV bytes into typed observations.
//!
//! Every column is read as a string first so that a bad temperature or
//! timestamp in one row is reported for that row only, instead of failing
//! schema inference for the whole file.

use crate::table::error::{CorruptRowError, LoadError};
use crate::types::observation::Observation;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{info, warn};
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;

pub(crate) const CITY: &str = "city";
pub(crate) const TIMESTAMP: &str = "timestamp";
pub(crate) const SEASON: &str = "season";
pub(crate) const TEMPERATURE: &str = "temperature";

const REQUIRED_COLUMNS: [&str; 4] = [CITY, TIMESTAMP, SEASON, TEMPERATURE];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// The in-memory result of loading one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    observations: Vec<Observation>,
    corrupt_rows: Vec<CorruptRowError>,
}

impl Table {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            corrupt_rows: Vec::new(),
        }
    }

    /// Observations in file order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Rows that were skipped, in file order.
    pub fn corrupt_rows(&self) -> &[CorruptRowError] {
        &self.corrupt_rows
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct cities in order of first appearance.
    pub fn cities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.observations
            .iter()
            .map(|o| o.city.as_str())
            .filter(|city| seen.insert(*city))
            .collect()
    }

    /// The observations of a single city, in file order.
    pub fn for_city(&self, city: &str) -> Vec<&Observation> {
        self.observations.iter().filter(|o| o.city == city).collect()
    }

    /// Fails with the first corrupt row, if any.
    pub fn ensure_clean(&self) -> Result<(), LoadError> {
        match self.corrupt_rows.first() {
            Some(row) => Err(LoadError::CorruptRow(row.clone())),
            None => Ok(()),
        }
    }
}

/// Parses CSV bytes with a header row into a [`Table`].
///
/// The header must contain `city`, `timestamp`, `season` and `temperature`, in
/// any order. Other columns are kept per observation in
/// [`Observation::extra`].
///
/// # Errors
///
/// * [`LoadError::MalformedInput`] if the bytes cannot be parsed as CSV at all.
/// * [`LoadError::MissingColumn`] if a required column is absent, which is also
///   what a file with the wrong delimiter looks like.
///
/// Rows with an empty city or season, an unparseable timestamp or a
/// non-numeric temperature do not fail the load. They are reported through
/// [`Table::corrupt_rows`].
pub fn load_table(bytes: &[u8]) -> Result<Table, LoadError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(LoadError::MalformedInput)?;

    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut required = BTreeMap::new();
    for column in REQUIRED_COLUMNS {
        let actual = header
            .iter()
            .find(|name| name.trim() == column)
            .ok_or_else(|| LoadError::MissingColumn {
                column: column.to_string(),
                found: header.clone(),
            })?;
        required.insert(column, string_cells(&df, actual)?);
    }

    let mut extras = Vec::new();
    for name in header
        .iter()
        .filter(|name| !REQUIRED_COLUMNS.iter().any(|column| *column == name.trim()))
    {
        extras.push((name.trim().to_string(), string_cells(&df, name)?));
    }

    let mut table = Table::default();
    for idx in 0..df.height() {
        let cell = |column: &'static str| {
            required
                .get(column)
                .and_then(|cells| cells[idx].as_deref())
                .map(str::trim)
        };
        match parse_row(idx + 1, cell(CITY), cell(TIMESTAMP), cell(SEASON), cell(TEMPERATURE)) {
            Ok(mut observation) => {
                for (name, cells) in &extras {
                    if let Some(value) = &cells[idx] {
                        observation.extra.insert(name.clone(), value.clone());
                    }
                }
                table.observations.push(observation);
            }
            Err(corrupt) => {
                warn!("Skipping corrupt row: {}", corrupt);
                table.corrupt_rows.push(corrupt);
            }
        }
    }

    info!(
        "Loaded {} observations for {} cities ({} corrupt rows skipped)",
        table.observations.len(),
        table.cities().len(),
        table.corrupt_rows.len()
    );
    Ok(table)
}

fn string_cells(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, LoadError> {
    let cells = df
        .column(column)
        .and_then(|c| c.str())
        .map_err(|e| LoadError::ColumnAccess {
            column: column.to_string(),
            source: e,
        })?;
    Ok(cells
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn parse_row(
    row: usize,
    city: Option<&str>,
    timestamp: Option<&str>,
    season: Option<&str>,
    temperature: Option<&str>,
) -> Result<Observation, CorruptRowError> {
    let corrupt = |column: &str, value: Option<&str>, reason: &str| CorruptRowError {
        row,
        column: column.to_string(),
        value: value.unwrap_or_default().to_string(),
        reason: reason.to_string(),
    };

    let city = city
        .filter(|c| !c.is_empty())
        .ok_or_else(|| corrupt(CITY, city, "empty"))?;
    let season = season
        .filter(|s| !s.is_empty())
        .ok_or_else(|| corrupt(SEASON, season, "empty"))?;
    let parsed_timestamp = timestamp
        .and_then(parse_timestamp)
        .ok_or_else(|| corrupt(TIMESTAMP, timestamp, "not a date or datetime"))?;
    let parsed_temperature = temperature
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .ok_or_else(|| corrupt(TEMPERATURE, temperature, "not a finite number"))?;

    Ok(Observation::new(
        city,
        parsed_timestamp,
        season,
        parsed_temperature,
    ))
}

/// Parses a date or datetime, keeping the wall-clock time of the value's own
/// offset when one is present.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
