//! Decoding of the current-weather response body.

use crate::live::error::WeatherError;
use serde::Deserialize;

/// The subset of the OpenWeatherMap current-weather payload that is read.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

/// Maps an HTTP status and body to a temperature or a typed error.
///
/// 401 is reported as [`WeatherError::InvalidCredentials`], any other non-2xx
/// as [`WeatherError::UpstreamError`]. A 2xx body without a numeric
/// `main.temp` is a [`WeatherError::MalformedResponse`].
pub(crate) fn interpret_response(status_code: u16, body: &str) -> Result<f64, WeatherError> {
    match status_code {
        401 => return Err(WeatherError::InvalidCredentials),
        200..=299 => {}
        _ => return Err(WeatherError::UpstreamError { status_code }),
    }

    let payload: CurrentWeather =
        serde_json::from_str(body).map_err(|e| WeatherError::MalformedResponse {
            reason: e.to_string(),
        })?;
    payload
        .main
        .ok_or_else(|| WeatherError::MalformedResponse {
            reason: "missing 'main' object".to_string(),
        })?
        .temp
        .filter(|t| t.is_finite())
        .ok_or_else(|| WeatherError::MalformedResponse {
            reason: "missing 'main.temp' value".to_string(),
        })
}
