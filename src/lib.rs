mod anomaly;
mod error;
mod live;
mod pipeline;
mod rolling;
mod stats;
mod table;
mod types;
mod view;

pub use error::TempwatchError;
pub use pipeline::*;

pub use anomaly::classifier::{annotate, classify_live};
pub use anomaly::summary::{summarize, AnomalySummary};
pub use live::gate::{LiveTemperatureGate, DEFAULT_TIMEOUT, OPENWEATHERMAP_URL};
pub use rolling::smoother::{compute_rolling_means, RollingPoint, RollingSeries, DEFAULT_WINDOW};
pub use stats::engine::{
    compute_seasonal_index, compute_seasonal_stats, compute_yearly_stats,
    compute_yearly_stats_for_city, DEFAULT_SIGMA,
};
pub use table::loader::{load_table, Table};
pub use view::{SeriesPoint, TimeSeriesView};

pub use types::annotated::AnnotatedObservation;
pub use types::observation::{LiveReading, Observation};
pub use types::season::{Hemisphere, SeasonCalendar};
pub use types::stats::{Bounds, SeasonalIndex, SeasonalStats, YearlyStats};
pub use types::verdict::Verdict;

pub use live::error::WeatherError;
pub use rolling::error::InvalidWindowError;
pub use stats::error::{InvalidSigmaError, StatsError};
pub use table::error::{CorruptRowError, LoadError};
