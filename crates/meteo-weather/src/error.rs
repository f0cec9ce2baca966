//! Weather provider and lookup error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Location not found".to_string(),
            Self::Unauthorized => "Weather API key is invalid. Check settings.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service unavailable. Please try again later.".to_string()
            }
            Self::Api { message, .. } => format!("Weather service error: {}", message),
            Self::Parse(_) => "Received an unexpected response from the weather service".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }
}

/// Failure of one stage of a lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// First stage; the session shows not-found.
    #[error("current weather fetch failed: {0}")]
    CurrentWeather(#[source] WeatherError),

    /// Second stage; current weather stays displayed.
    #[error("forecast fetch failed: {0}")]
    Forecast(#[source] WeatherError),
}

impl LookupError {
    pub fn weather_error(&self) -> &WeatherError {
        match self {
            Self::CurrentWeather(e) | Self::Forecast(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = WeatherError::NotFound("city not found".into());
        assert_eq!(err.user_message(), "Location not found");

        let err = WeatherError::RateLimited(30);
        assert!(err.user_message().contains("30"));

        let err = WeatherError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(err.user_message().contains("unavailable"));

        let err = WeatherError::Api {
            status: 400,
            message: "wrong latitude".into(),
        };
        assert!(err.user_message().contains("wrong latitude"));
    }

    #[test]
    fn test_lookup_error_keeps_source() {
        let err = LookupError::Forecast(WeatherError::Parse("missing list".into()));
        assert_eq!(err.to_string(), "forecast fetch failed: Parse error: missing list");
        assert!(matches!(err.weather_error(), WeatherError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
