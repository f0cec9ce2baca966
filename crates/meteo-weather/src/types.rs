use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default base URL of the provider's condition icons
pub const DEFAULT_ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

/// Measurement system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    /// Kelvin and m/s
    Standard,
}

impl Units {
    /// Value of the `units` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
            Self::Standard => "K",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Self::Metric | Self::Standard => "m/s",
            Self::Imperial => "mph",
        }
    }
}

/// Geographic coordinates as returned by the provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Weather condition: localized description plus icon code (e.g. "10d")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

impl Condition {
    /// Icon asset URL under the given base
    pub fn icon_url(&self, base_url: &str) -> String {
        icon_url(base_url, &self.icon)
    }
}

/// Build the `@2x` icon URL for an icon code
pub fn icon_url(base_url: &str, icon: &str) -> String {
    format!("{}/{}@2x.png", base_url.trim_end_matches('/'), icon)
}

/// Current conditions for a resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    /// ISO country code, empty when the provider omits it
    pub country: String,
    pub coord: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Sea-level pressure in hPa
    pub pressure: u32,
    pub temp_min: f64,
    pub temp_max: f64,
    pub wind_speed: f64,
    pub condition: Option<Condition>,
}

/// One predicted reading of the 3-hour forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub condition: Option<Condition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_url() {
        assert_eq!(
            icon_url(DEFAULT_ICON_BASE_URL, "10d"),
            "http://openweathermap.org/img/wn/10d@2x.png"
        );
    }

    #[test]
    fn test_icon_url_trailing_slash() {
        let condition = Condition {
            description: "pluie légère".to_string(),
            icon: "10n".to_string(),
        };
        assert_eq!(
            condition.icon_url("http://localhost:9000/icons/"),
            "http://localhost:9000/icons/10n@2x.png"
        );
    }

    #[test]
    fn test_units_query_and_suffixes() {
        assert_eq!(Units::default().as_query(), "metric");
        assert_eq!(Units::Imperial.temperature_suffix(), "°F");
        assert_eq!(Units::Imperial.speed_suffix(), "mph");
        assert_eq!(Units::Standard.temperature_suffix(), "K");
    }
}
