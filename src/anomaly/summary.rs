use crate::types::annotated::AnnotatedObservation;
use crate::types::verdict::Verdict;
use serde::Serialize;
use std::collections::BTreeMap;

/// Verdict counts for one city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalySummary {
    pub city: String,
    pub normal: usize,
    pub anomalous: usize,
    pub insufficient_data: usize,
}

impl AnomalySummary {
    pub fn total(&self) -> usize {
        self.normal + self.anomalous + self.insufficient_data
    }

    /// Share of classified rows that are anomalous. `None` when no row of the
    /// city could be classified.
    pub fn anomaly_rate(&self) -> Option<f64> {
        let classified = self.normal + self.anomalous;
        (classified > 0).then(|| self.anomalous as f64 / classified as f64)
    }
}

/// Counts verdicts per city, sorted by city.
pub fn summarize(annotated: &[AnnotatedObservation]) -> Vec<AnomalySummary> {
    let mut by_city: BTreeMap<&str, AnomalySummary> = BTreeMap::new();
    for row in annotated {
        let city = row.observation.city.as_str();
        let summary = by_city.entry(city).or_insert_with(|| AnomalySummary {
            city: city.to_string(),
            ..AnomalySummary::default()
        });
        match row.verdict {
            Verdict::Normal => summary.normal += 1,
            Verdict::Anomalous => summary.anomalous += 1,
            Verdict::InsufficientData => summary.insufficient_data += 1,
        }
    }
    by_city.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::observation::Observation;
    use chrono::NaiveDate;

    fn row(city: &str, verdict: Verdict) -> AnnotatedObservation {
        let timestamp = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        AnnotatedObservation {
            observation: Observation::new(city, timestamp, "winter", 0.0),
            mean_temperature: None,
            std_temperature: None,
            lower_bound: None,
            upper_bound: None,
            verdict,
        }
    }

    #[test]
    fn test_summarize_counts_per_city() {
        let rows = vec![
            row("Oslo", Verdict::Normal),
            row("Berlin", Verdict::Anomalous),
            row("Berlin", Verdict::Normal),
            row("Berlin", Verdict::Normal),
            row("Berlin", Verdict::InsufficientData),
            row("Oslo", Verdict::InsufficientData),
        ];
        let summaries = summarize(&rows);

        assert_eq!(summaries.len(), 2);
        let berlin = &summaries[0];
        assert_eq!(berlin.city, "Berlin");
        assert_eq!((berlin.normal, berlin.anomalous, berlin.insufficient_data), (2, 1, 1));
        assert_eq!(berlin.total(), 4);
        assert!((berlin.anomaly_rate().unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(summaries[1].city, "Oslo");
    }

    #[test]
    fn test_rate_undefined_without_classified_rows() {
        let summaries = summarize(&[row("Lima", Verdict::InsufficientData)]);
        assert_eq!(summaries[0].anomaly_rate(), None);
    }
}
