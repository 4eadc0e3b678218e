use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing a temperature against its seasonal bounds.
///
/// `InsufficientData` is a regular outcome, not a failure: the group the
/// temperature belongs to has fewer than two observations, so no standard
/// deviation (and therefore no bounds) exist for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomalous,
    InsufficientData,
}

impl Verdict {
    /// `Some(true)` for anomalies, `Some(false)` for normal values and `None`
    /// when there was not enough data to decide.
    pub fn is_anomaly(&self) -> Option<bool> {
        match self {
            Verdict::Normal => Some(false),
            Verdict::Anomalous => Some(true),
            Verdict::InsufficientData => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Normal => write!(f, "normal"),
            Verdict::Anomalous => write!(f, "anomalous"),
            Verdict::InsufficientData => write!(f, "insufficient data"),
        }
    }
}
