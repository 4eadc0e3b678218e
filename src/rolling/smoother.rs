//! Trailing rolling mean of temperatures, per city.

use crate::rolling::error::InvalidWindowError;
use crate::types::observation::Observation;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Window used when none is configured: 30 observations.
pub const DEFAULT_WINDOW: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    /// Mean of the `window` temperatures ending at this point. `None` for the
    /// first `window - 1` points of the series.
    pub rolling_mean: Option<f64>,
}

/// One city's chronologically sorted series with its trailing means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub city: String,
    pub window: usize,
    pub points: Vec<RollingPoint>,
}

impl RollingSeries {
    pub fn means(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.rolling_mean).collect()
    }
}

/// Computes a trailing (non-centered) mean over `window` consecutive
/// observations for each city separately.
///
/// Each city's observations are sorted by timestamp first; rows sharing a
/// timestamp keep their input order. A window never crosses into another
/// city's rows, no matter how the input interleaves them.
///
/// # Errors
///
/// Returns [`InvalidWindowError`] when `window` is zero.
pub fn compute_rolling_means(
    observations: &[Observation],
    window: usize,
) -> Result<BTreeMap<String, RollingSeries>, InvalidWindowError> {
    if window == 0 {
        return Err(InvalidWindowError(window));
    }

    let mut by_city: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for observation in observations {
        by_city
            .entry(observation.city.as_str())
            .or_default()
            .push(observation);
    }

    Ok(by_city
        .into_iter()
        .map(|(city, mut rows)| {
            rows.sort_by_key(|o| o.timestamp);
            let series = RollingSeries {
                city: city.to_string(),
                window,
                points: trailing_means(&rows, window),
            };
            (city.to_string(), series)
        })
        .collect())
}

fn trailing_means(rows: &[&Observation], window: usize) -> Vec<RollingPoint> {
    let temperatures: Vec<f64> = rows.iter().map(|o| o.temperature).collect();
    let lead = (window - 1).min(temperatures.len());
    let means = std::iter::repeat(None)
        .take(lead)
        .chain(
            temperatures
                .windows(window)
                .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
        );

    rows.iter()
        .zip(means)
        .map(|(o, rolling_mean)| RollingPoint {
            timestamp: o.timestamp,
            temperature: o.temperature,
            rolling_mean,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(city: &str, day: u32, temperature: f64) -> Observation {
        let timestamp = NaiveDate::from_ymd_opt(2015, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Observation::new(city, timestamp, "spring", temperature)
    }

    #[test]
    fn test_window_of_three() -> Result<(), Box<dyn std::error::Error>> {
        let observations: Vec<Observation> = [10.0, 12.0, 11.0, 13.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, t)| obs("Paris", i as u32 + 1, *t))
            .collect();
        let rolling = compute_rolling_means(&observations, 3)?;

        assert_eq!(
            rolling["Paris"].means(),
            vec![None, None, Some(11.0), Some(12.0), Some(11.0)]
        );
        Ok(())
    }

    #[test]
    fn test_sorts_by_timestamp_before_smoothing() -> Result<(), Box<dyn std::error::Error>> {
        let observations = vec![
            obs("Paris", 5, 9.0),
            obs("Paris", 2, 12.0),
            obs("Paris", 4, 13.0),
            obs("Paris", 1, 10.0),
            obs("Paris", 3, 11.0),
        ];
        let rolling = compute_rolling_means(&observations, 3)?;
        let series = &rolling["Paris"];

        let days: Vec<u32> = series
            .points
            .iter()
            .map(|p| chrono::Datelike::day(&p.timestamp))
            .collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5]);
        assert_eq!(series.means(), vec![None, None, Some(11.0), Some(12.0), Some(11.0)]);
        Ok(())
    }

    #[test]
    fn test_cities_are_independent() -> Result<(), Box<dyn std::error::Error>> {
        let paris: Vec<Observation> = [10.0, 12.0, 11.0, 13.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, t)| obs("Paris", i as u32 + 1, *t))
            .collect();
        let alone = compute_rolling_means(&paris, 2)?;

        // Interleave another city on the same days.
        let mut mixed = Vec::new();
        for (i, p) in paris.iter().enumerate() {
            mixed.push(obs("Rome", i as u32 + 1, 30.0 + i as f64));
            mixed.push(p.clone());
        }
        let together = compute_rolling_means(&mixed, 2)?;

        assert_eq!(alone["Paris"], together["Paris"]);
        assert_eq!(together["Rome"].points.len(), 5);
        assert_eq!(together["Rome"].means()[1], Some(30.5));

        // Dropping rows of the other city leaves Paris unchanged as well.
        let fewer: Vec<Observation> = mixed
            .into_iter()
            .filter(|o| o.city == "Paris" || o.temperature > 32.0)
            .collect();
        assert_eq!(compute_rolling_means(&fewer, 2)?["Paris"], alone["Paris"]);
        Ok(())
    }

    #[test]
    fn test_series_shorter_than_window() -> Result<(), Box<dyn std::error::Error>> {
        let observations = vec![obs("Oslo", 1, 1.0), obs("Oslo", 2, 2.0)];
        let rolling = compute_rolling_means(&observations, DEFAULT_WINDOW)?;
        assert_eq!(rolling["Oslo"].means(), vec![None, None]);
        Ok(())
    }

    #[test]
    fn test_window_of_one_is_identity() -> Result<(), Box<dyn std::error::Error>> {
        let observations = vec![obs("Oslo", 1, 1.5), obs("Oslo", 2, -2.5)];
        let rolling = compute_rolling_means(&observations, 1)?;
        assert_eq!(rolling["Oslo"].means(), vec![Some(1.5), Some(-2.5)]);
        Ok(())
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert_eq!(
            compute_rolling_means(&[obs("Oslo", 1, 1.0)], 0),
            Err(InvalidWindowError(0))
        );
    }
}
