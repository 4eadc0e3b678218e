use crate::live::error::WeatherError;
use crate::rolling::error::InvalidWindowError;
use crate::stats::error::{InvalidSigmaError, StatsError};
use crate::table::error::LoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TempwatchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    InvalidSigma(#[from] InvalidSigmaError),

    #[error(transparent)]
    InvalidWindow(#[from] InvalidWindowError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}
