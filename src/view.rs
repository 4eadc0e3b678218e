//! Chart-ready view of one city's history.

use crate::rolling::smoother::RollingSeries;
use crate::types::annotated::AnnotatedObservation;
use crate::types::verdict::Verdict;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub rolling_mean: Option<f64>,
    pub verdict: Verdict,
}

/// A city's observations in chronological order, each with its rolling mean
/// and verdict. Anomalous points are the ones to highlight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesView {
    pub city: String,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeriesView {
    /// Builds the view for `city`.
    ///
    /// `rolling` must be the series computed from the same observations as
    /// `annotated`; if its length does not line up, rolling means are left out.
    pub fn for_city(
        annotated: &[AnnotatedObservation],
        rolling: Option<&RollingSeries>,
        city: &str,
    ) -> Self {
        let mut rows: Vec<&AnnotatedObservation> = annotated
            .iter()
            .filter(|a| a.observation.city == city)
            .collect();
        // Same stable ordering as the smoother, so positions line up.
        rows.sort_by_key(|a| a.observation.timestamp);

        let means = rolling
            .filter(|series| series.points.len() == rows.len())
            .map(RollingSeries::means);

        let points = rows
            .iter()
            .enumerate()
            .map(|(i, a)| SeriesPoint {
                timestamp: a.observation.timestamp,
                temperature: a.observation.temperature,
                rolling_mean: means.as_ref().and_then(|m| m[i]),
                verdict: a.verdict,
            })
            .collect();

        Self {
            city: city.to_string(),
            points,
        }
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points
            .iter()
            .filter(|p| p.verdict == Verdict::Anomalous)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
