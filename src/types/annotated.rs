use crate::types::observation::Observation;
use crate::types::verdict::Verdict;
use serde::Serialize;

/// An observation joined with the statistics of its (city, season) group.
///
/// The group fields are `None` when the group is missing from the index or has
/// too few rows for a standard deviation; `verdict` is then
/// [`Verdict::InsufficientData`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedObservation {
    #[serde(flatten)]
    pub observation: Observation,
    pub mean_temperature: Option<f64>,
    pub std_temperature: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub verdict: Verdict,
}

impl AnnotatedObservation {
    pub fn is_anomaly(&self) -> Option<bool> {
        self.verdict.is_anomaly()
    }
}
