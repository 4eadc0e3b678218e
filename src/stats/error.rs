use polars::error::PolarsError;
use thiserror::Error;

/// The anomaly band half-width must be a finite, non-negative number of
/// standard deviations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Sigma must be a finite, non-negative number, got {0}")]
pub struct InvalidSigmaError(pub f64);

/// Failures of the aggregation machinery itself.
///
/// A group that is too small for a standard deviation is *not* an error; it
/// yields `std: None` and no bounds.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to build {grouping} frame for city '{city}'")]
    FrameBuild {
        city: String,
        grouping: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to aggregate {grouping} statistics for city '{city}'")]
    Aggregation {
        city: String,
        grouping: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Aggregated column '{column}' has no value at row {row} ({grouping} statistics for city '{city}')")]
    MissingAggregate {
        city: String,
        grouping: &'static str,
        column: &'static str,
        row: usize,
    },
}

impl StatsError {
    /// The city whose computation failed.
    pub fn city(&self) -> &str {
        match self {
            StatsError::FrameBuild { city, .. }
            | StatsError::Aggregation { city, .. }
            | StatsError::MissingAggregate { city, .. } => city,
        }
    }
}
