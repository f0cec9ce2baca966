//! OpenWeatherMap 2.5 API client.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{Coordinates, CurrentWeather, ForecastSample, Units};

pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_LANGUAGE: &str = "fr";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Request settings shared by both endpoints
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub units: Units,
    /// Language of condition descriptions (`lang` parameter)
    pub language: String,
    /// `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: OPENWEATHER_API_BASE.to_string(),
            units: Units::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    options: ClientOptions,
}

impl OpenWeatherClient {
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            options: ClientOptions {
                base_url: options.base_url.trim_end_matches('/').to_string(),
                ..options
            },
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Current conditions by free-text city name.
    #[instrument(skip(self), level = "info")]
    pub async fn current_weather(&self, location: &str) -> Result<CurrentWeather, WeatherError> {
        let url = format!("{}/weather", self.options.base_url);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("units", self.options.units.as_query()),
                ("appid", self.api_key.as_str()),
                ("lang", self.options.language.as_str()),
            ])
            .send()
            .await?;

        let raw: owm::CurrentResponse = self.handle_response(response).await?;
        let current = CurrentWeather::from(raw);

        self.log_timing("current weather", started);
        tracing::info!(
            "Resolved '{}' to {} / {} ({:.4}, {:.4})",
            location,
            current.name,
            current.country,
            current.coord.lat,
            current.coord.lon
        );
        Ok(current)
    }

    /// 5-day / 3-hour forecast for coordinates, in provider order.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, coord: Coordinates) -> Result<Vec<ForecastSample>, WeatherError> {
        let url = format!("{}/forecast", self.options.base_url);
        let started = Instant::now();
        let lat = coord.lat.to_string();
        let lon = coord.lon.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", self.options.units.as_query()),
                ("appid", self.api_key.as_str()),
                ("lang", self.options.language.as_str()),
            ])
            .send()
            .await?;

        let raw: owm::ForecastResponse = self.handle_response(response).await?;
        let samples = raw
            .list
            .into_iter()
            .map(ForecastSample::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.log_timing("forecast", started);
        tracing::debug!("Forecast returned {} samples", samples.len());
        Ok(samples)
    }

    fn log_timing(&self, what: &str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > SLOW_RESPONSE {
            tracing::warn!("Slow {} response: {:.3}s", what, elapsed.as_secs_f64());
        } else {
            tracing::debug!("{} fetched in {:.3}s", what, elapsed.as_secs_f64());
        }
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)));
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(WeatherError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let text = response.text().await.unwrap_or_default();
                Err(WeatherError::NotFound(owm::error_message(&text)))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(WeatherError::RateLimited(retry_after))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(WeatherError::Api {
                    status: status.as_u16(),
                    message: owm::error_message(&text),
                })
            }
        }
    }
}

/// Raw OpenWeatherMap payloads and their conversion to the public types.
mod owm {
    use chrono::DateTime;
    use serde::Deserialize;

    use crate::error::WeatherError;
    use crate::types::{Condition, Coordinates, CurrentWeather, ForecastSample};

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        #[serde(default)]
        pub sys: Sys,
        pub coord: Coord,
        pub main: CurrentMain,
        #[serde(default)]
        pub weather: Vec<ApiCondition>,
        #[serde(default)]
        pub wind: Wind,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Sys {
        pub country: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Coord {
        pub lat: f64,
        pub lon: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentMain {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: u8,
        pub pressure: u32,
        pub temp_min: f64,
        pub temp_max: f64,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Wind {
        #[serde(default)]
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ApiCondition {
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastEntry>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        /// Unix seconds
        pub dt: i64,
        pub main: ForecastMain,
        #[serde(default)]
        pub weather: Vec<ApiCondition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastMain {
        pub temp: f64,
    }

    #[derive(Debug, Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    /// Provider error message from a `{"cod": .., "message": ..}` body,
    /// falling back to the raw text.
    pub fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.trim().to_string())
    }

    fn first_condition(weather: Vec<ApiCondition>) -> Option<Condition> {
        weather.into_iter().next().map(|c| Condition {
            description: c.description,
            icon: c.icon,
        })
    }

    impl From<CurrentResponse> for CurrentWeather {
        fn from(raw: CurrentResponse) -> Self {
            Self {
                name: raw.name,
                country: raw.sys.country.unwrap_or_default(),
                coord: Coordinates {
                    lat: raw.coord.lat,
                    lon: raw.coord.lon,
                },
                temperature: raw.main.temp,
                feels_like: raw.main.feels_like,
                humidity: raw.main.humidity,
                pressure: raw.main.pressure,
                temp_min: raw.main.temp_min,
                temp_max: raw.main.temp_max,
                wind_speed: raw.wind.speed,
                condition: first_condition(raw.weather),
            }
        }
    }

    impl TryFrom<ForecastEntry> for ForecastSample {
        type Error = WeatherError;

        fn try_from(raw: ForecastEntry) -> Result<Self, Self::Error> {
            let timestamp = DateTime::from_timestamp(raw.dt, 0)
                .ok_or_else(|| WeatherError::Parse(format!("timestamp out of range: {}", raw.dt)))?;

            Ok(Self {
                timestamp,
                temperature: raw.main.temp,
                condition: first_condition(raw.weather),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(
            "test_key",
            ClientOptions {
                base_url: server.uri(),
                ..ClientOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_error_message_from_provider_body() {
        assert_eq!(
            owm::error_message(r#"{"cod":"404","message":"city not found"}"#),
            "city not found"
        );
        assert_eq!(owm::error_message("  gateway down \n"), "gateway down");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenWeatherClient::new(
            "k",
            ClientOptions {
                base_url: "http://localhost:1234/data/2.5/".to_string(),
                ..ClientOptions::default()
            },
        )
        .unwrap();
        assert_eq!(client.options().base_url, "http://localhost:1234/data/2.5");
    }

    #[tokio::test]
    async fn test_current_weather_sends_provider_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Lyon"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test_key"))
            .and(query_param("lang", "fr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Lyon",
                "sys": {"country": "FR"},
                "coord": {"lat": 45.75, "lon": 4.85},
                "main": {"temp": 12.3, "feels_like": 11.0, "humidity": 70,
                         "pressure": 1018, "temp_min": 10.1, "temp_max": 14.9},
                "weather": [{"description": "ciel dégagé", "icon": "01d"}],
                "wind": {"speed": 3.6}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let current = client_for(&mock_server).current_weather("Lyon").await.unwrap();

        assert_eq!(current.name, "Lyon");
        assert_eq!(current.country, "FR");
        assert_eq!(current.pressure, 1018);
        assert_eq!(current.condition.unwrap().icon, "01d");
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key."
            })))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).current_weather("Lyon").await;
        assert!(matches!(result, Err(WeatherError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_rate_limited_reads_retry_after() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "42"))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .forecast(Coordinates { lat: 1.0, lon: 2.0 })
            .await;
        assert!(matches!(result, Err(WeatherError::RateLimited(42))));
    }
}
