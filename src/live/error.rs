use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// The service answered 401: the API key was rejected.
    #[error("Weather service rejected the API key (HTTP 401)")]
    InvalidCredentials,

    #[error("Weather service responded with HTTP status {status_code}")]
    UpstreamError { status_code: u16 },

    #[error("Weather service response is missing expected data: {reason}")]
    MalformedResponse { reason: String },

    #[error("Weather service did not respond in time")]
    Timeout,

    /// The wrapped error never carries the request URL, which holds the API key.
    #[error("Network request to the weather service failed")]
    Transport(#[source] reqwest::Error),
}

impl WeatherError {
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WeatherError::Timeout
        } else {
            WeatherError::Transport(error.without_url())
        }
    }

    /// Text suitable for showing to the person who triggered the check.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidCredentials => {
                "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
                    .to_string()
            }
            WeatherError::UpstreamError { status_code } => format!(
                "The weather service is unavailable right now (HTTP {}). Please try again later.",
                status_code
            ),
            WeatherError::MalformedResponse { .. } => {
                "The weather service returned no temperature for this city.".to_string()
            }
            WeatherError::Timeout => {
                "The weather service took too long to respond. Please try again.".to_string()
            }
            WeatherError::Transport(_) => {
                "Could not reach the weather service. Check your network connection.".to_string()
            }
        }
    }
}
