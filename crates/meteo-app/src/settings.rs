//! Translate the loaded configuration into weather-layer settings.

use std::time::Duration;

use meteo_core::{Config, ConfigError, ForecastConfig, WeatherConfig};
use meteo_weather::{ClientOptions, ForecastBucketer};

use crate::render::{Labels, RenderOptions};

pub fn client_options(config: &WeatherConfig) -> ClientOptions {
    ClientOptions {
        base_url: config.base_url.clone(),
        units: config.units,
        language: config.language.clone(),
        timeout: (config.timeout_seconds > 0).then(|| Duration::from_secs(config.timeout_seconds)),
    }
}

pub fn bucketer(config: &ForecastConfig) -> ForecastBucketer {
    ForecastBucketer::new(config.horizon_days, config.locale, config.grouping)
}

/// Named display zone, or `None` for the system's local time.
pub fn display_zone(config: &ForecastConfig) -> Result<Option<chrono_tz::Tz>, ConfigError> {
    config
        .timezone
        .as_deref()
        .map(|name| {
            name.parse::<chrono_tz::Tz>()
                .map_err(|_| ConfigError::Invalid(format!("unknown time zone: {}", name)))
        })
        .transpose()
}

pub fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        units: config.weather.units,
        icon_base_url: config.weather.icon_base_url.clone(),
        labels: Labels::for_language(&config.weather.language),
    }
}
