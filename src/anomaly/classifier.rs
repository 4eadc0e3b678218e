//! Bound comparisons: tagging historical rows and classifying a live reading.

use crate::types::annotated::AnnotatedObservation;
use crate::types::observation::{LiveReading, Observation};
use crate::types::stats::{SeasonalIndex, SeasonalStats};
use crate::types::verdict::Verdict;
use log::debug;

/// Compares `temperature` against the bounds of `stats`.
///
/// Anything strictly outside `[lower, upper]` is anomalous. Missing stats or
/// missing bounds give [`Verdict::InsufficientData`].
fn verdict_for(temperature: f64, stats: Option<&SeasonalStats>) -> Verdict {
    match stats.and_then(|s| s.bounds) {
        Some(bounds) if bounds.contains(temperature) => Verdict::Normal,
        Some(_) => Verdict::Anomalous,
        None => Verdict::InsufficientData,
    }
}

/// Joins every observation with its `(city, season)` entry in `index` and
/// tags it.
///
/// Observations without a matching entry, or whose entry has no bounds,
/// keep `None` for the missing fields and get [`Verdict::InsufficientData`].
/// Output order follows input order.
pub fn annotate(observations: &[Observation], index: &SeasonalIndex) -> Vec<AnnotatedObservation> {
    let annotated: Vec<AnnotatedObservation> = observations
        .iter()
        .map(|observation| {
            let stats = index.get(&observation.city, &observation.season);
            AnnotatedObservation {
                observation: observation.clone(),
                mean_temperature: stats.map(|s| s.mean),
                std_temperature: stats.and_then(|s| s.std),
                lower_bound: stats.and_then(SeasonalStats::lower_bound),
                upper_bound: stats.and_then(SeasonalStats::upper_bound),
                verdict: verdict_for(observation.temperature, stats),
            }
        })
        .collect();

    debug!(
        "Annotated {} observations, {} anomalous",
        annotated.len(),
        annotated
            .iter()
            .filter(|a| a.verdict == Verdict::Anomalous)
            .count()
    );
    annotated
}

/// Classifies a live reading against the stats of the season in effect for
/// its city.
///
/// `stats` is the `(city, season)` entry chosen by the caller; `None` (no
/// history for that season) yields [`Verdict::InsufficientData`], as does an
/// entry without bounds.
pub fn classify_live(reading: &LiveReading, stats: Option<&SeasonalStats>) -> Verdict {
    verdict_for(reading.temperature, stats)
}
