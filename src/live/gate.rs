//! One-shot current temperature lookups against the weather service.

use crate::live::error::WeatherError;
use crate::live::response::interpret_response;
use crate::types::observation::LiveReading;
use bon::bon;
use chrono::Utc;
use log::{info, warn};
use reqwest::blocking::Client;
use std::time::Duration;

/// OpenWeatherMap current-weather endpoint.
pub const OPENWEATHERMAP_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Upper bound on a single lookup, connect plus response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the current temperature of a city, in degrees Celsius.
///
/// Every call is a single blocking `GET` with no retries and no caching. The
/// API key is passed per call and never kept by the gate.
///
/// # Example
///
/// ```no_run
/// use tempwatch::LiveTemperatureGate;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), tempwatch::WeatherError> {
/// let gate = LiveTemperatureGate::builder()
///     .timeout(Duration::from_secs(5))
///     .build()?;
///
/// match gate.fetch_current_temperature("Berlin", "my-api-key") {
///     Ok(celsius) => println!("Berlin: {celsius} °C"),
///     Err(e) => eprintln!("{}", e.user_message()),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LiveTemperatureGate {
    client: Client,
    endpoint: String,
}

#[bon]
impl LiveTemperatureGate {
    /// Creates a gate.
    ///
    /// * `endpoint` - Current-weather URL, defaults to [`OPENWEATHERMAP_URL`].
    /// * `timeout` - Per-request limit, defaults to [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Transport`] if the HTTP client cannot be built.
    #[builder]
    pub fn new(
        #[builder(into, default = OPENWEATHERMAP_URL.to_string())] endpoint: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WeatherError::from_transport)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests the current temperature for `city` in metric units.
    ///
    /// Never panics on network trouble: every failure comes back as a
    /// [`WeatherError`] variant.
    pub fn fetch_current_temperature(&self, city: &str, api_key: &str) -> Result<f64, WeatherError> {
        info!("Requesting current temperature for {} from {}", city, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("units", "metric"), ("appid", api_key)])
            .send()
            .map_err(WeatherError::from_transport);
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Weather request for {} failed: {}", city, e);
                return Err(e);
            }
        };

        // Error statuses are judged on the status alone, so a stalled error
        // body cannot turn a 401 into a timeout.
        let status_code = response.status().as_u16();
        let body = if response.status().is_success() {
            response.text().map_err(WeatherError::from_transport)?
        } else {
            String::new()
        };
        interpret_response(status_code, &body).inspect_err(|e| {
            warn!("Weather lookup for {} failed: {}", city, e);
        })
    }

    /// Like [`Self::fetch_current_temperature`], stamped with the fetch time.
    pub fn fetch_reading(&self, city: &str, api_key: &str) -> Result<LiveReading, WeatherError> {
        let temperature = self.fetch_current_temperature(city, api_key)?;
        Ok(LiveReading {
            city: city.to_string(),
            temperature,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    /// Serves exactly one canned HTTP response on a local port and hands back
    /// the request line it received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let _ = tx.send(request.lines().next().unwrap_or_default().to_string());
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{}/data/2.5/weather", addr), rx)
    }

    fn gate(endpoint: String) -> LiveTemperatureGate {
        LiveTemperatureGate::builder()
            .endpoint(endpoint)
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client builds")
    }

    #[test]
    fn test_success_returns_temperature() -> Result<(), Box<dyn std::error::Error>> {
        let (url, requests) = serve_once("200 OK", r#"{"main":{"temp":4.2},"name":"Berlin"}"#);
        let reading = gate(url).fetch_reading("Berlin", "secret")?;

        assert_eq!(reading.city, "Berlin");
        assert_eq!(reading.temperature, 4.2);

        let request_line = requests.recv()?;
        assert!(request_line.starts_with("GET /data/2.5/weather?"));
        assert!(request_line.contains("q=Berlin"));
        assert!(request_line.contains("units=metric"));
        assert!(request_line.contains("appid=secret"));
        Ok(())
    }

    #[test]
    fn test_401_is_invalid_credentials() {
        let (url, _requests) = serve_once(
            "401 Unauthorized",
            r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#,
        );
        assert!(matches!(
            gate(url).fetch_current_temperature("Berlin", "wrong"),
            Err(WeatherError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_server_error_is_upstream_error() {
        let (url, _requests) = serve_once("502 Bad Gateway", "{}");
        assert!(matches!(
            gate(url).fetch_current_temperature("Berlin", "key"),
            Err(WeatherError::UpstreamError { status_code: 502 })
        ));
    }

    #[test]
    fn test_missing_temperature_is_malformed() {
        let (url, _requests) = serve_once("200 OK", r#"{"cod":"200","weather":[]}"#);
        assert!(matches!(
            gate(url).fetch_current_temperature("Berlin", "key"),
            Err(WeatherError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let url = format!("http://{}/", listener.local_addr().expect("local addr"));
        let handle = thread::spawn(move || {
            // Accept and hold the connection without answering.
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(2));
                drop(stream);
            }
        });

        let gate = LiveTemperatureGate::builder()
            .endpoint(url)
            .timeout(Duration::from_millis(200))
            .build()
            .expect("client builds");
        assert!(matches!(
            gate.fetch_current_temperature("Berlin", "key"),
            Err(WeatherError::Timeout)
        ));
        let _ = handle.join();
    }

    #[test]
    fn test_401_with_stalled_body_is_invalid_credentials() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let url = format!("http://{}/", listener.local_addr().expect("local addr"));
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                // Promise a body that never arrives.
                let _ = stream.write_all(
                    b"HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n{",
                );
                let _ = stream.flush();
                thread::sleep(Duration::from_secs(2));
            }
        });

        let gate = LiveTemperatureGate::builder()
            .endpoint(url)
            .timeout(Duration::from_millis(500))
            .build()
            .expect("client builds");
        assert!(matches!(
            gate.fetch_current_temperature("Berlin", "wrong"),
            Err(WeatherError::InvalidCredentials)
        ));
        let _ = handle.join();
    }

    #[test]
    fn test_refused_connection_is_typed_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
            listener.local_addr().expect("local addr").port()
        };
        let result = gate(format!("http://127.0.0.1:{}/", port))
            .fetch_current_temperature("Berlin", "secret-key");
        match result {
            Err(WeatherError::Transport(e)) => {
                assert!(e.url().is_none());
                assert!(!format!("{} {:?}", e, e).contains("secret-key"));
            }
            Err(WeatherError::Timeout) => {}
            other => panic!("Expected a transport failure, got {:?}", other),
        }
    }

    #[test]
    fn test_default_endpoint() {
        let gate = LiveTemperatureGate::builder().build().expect("client builds");
        assert_eq!(gate.endpoint(), OPENWEATHERMAP_URL);
    }
}
