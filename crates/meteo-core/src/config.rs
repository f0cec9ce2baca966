use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use meteo_weather::{Grouping, LabelLocale, Units};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

const MAX_HORIZON_DAYS: u32 = 5;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory the config file lives in
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Forecast grouping settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Prefer the environment variable; it is never
    /// written back to the config file.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the provider's 2.5 data API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL of the condition icon assets
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    #[serde(default)]
    pub units: Units,

    /// Language of the provider's condition descriptions
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds, 0 leaves the transport default
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_icon_base_url() -> String {
    "http://openweathermap.org/img/wn".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            icon_base_url: default_icon_base_url(),
            units: Units::default(),
            language: default_language(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of calendar days ahead of now a sample may fall
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,

    /// Locale of the day labels (e.g. "fr_FR")
    #[serde(default)]
    pub locale: LabelLocale,

    #[serde(default)]
    pub grouping: Grouping,

    /// IANA time zone used to derive calendar days; system local time if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_horizon_days() -> u32 {
    3
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            locale: LabelLocale::default(),
            grouping: Grouping::default(),
            timezone: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meteo");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            forecast: ForecastConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing.
    /// The API key environment variable overrides the file.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit file, creating a default one there
    /// if it doesn't exist.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;

            toml::from_str::<Config>(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))
                .context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            config
        };

        if let Some(parent) = config_path.parent() {
            config.config_dir = parent.to_path_buf();
        }
        config.apply_api_key_override(std::env::var(API_KEY_ENV).ok());

        Ok(config)
    }

    /// Validate a loaded configuration, logging warnings.
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn validated(self) -> Result<(Self, ValidationResult)> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Replace the configured API key with a non-empty override value.
    pub fn apply_api_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("Using API key from {}", API_KEY_ENV);
            self.weather.api_key = Some(key.trim().to_string());
        }
    }

    /// The API key, or a `MissingSetting` error naming where to put it.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.weather
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ConfigError::MissingSetting(format!("weather.api_key (or {})", API_KEY_ENV))
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.api_key().is_err() {
            result.add_error(
                "weather.api_key",
                format!("No API key configured; set {}", API_KEY_ENV),
            );
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(
            &self.weather.icon_base_url,
            "weather.icon_base_url",
            &mut result,
        );

        if self.weather.language.trim().is_empty() {
            result.add_error("weather.language", "Language code must not be empty");
        }

        if self.weather.timeout_seconds == 0 {
            result.add_warning(
                "weather.timeout_seconds",
                "Request timeout disabled (0 seconds)",
            );
        } else if self.weather.timeout_seconds > 300 {
            result.add_warning(
                "weather.timeout_seconds",
                "Request timeout is more than 5 minutes",
            );
        }

        if self.forecast.horizon_days == 0 || self.forecast.horizon_days > MAX_HORIZON_DAYS {
            result.add_error(
                "forecast.horizon_days",
                format!(
                    "Horizon must be between 1 and {} days (the provider forecasts 5 days)",
                    MAX_HORIZON_DAYS
                ),
            );
        }

        if let Some(tz) = &self.forecast.timezone {
            if tz.parse::<chrono_tz::Tz>().is_err() {
                result.add_error(
                    "forecast.timezone",
                    format!("Unknown time zone '{}'", tz),
                );
            }
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            result.add_warning(
                "logging.level",
                format!("Unknown log level '{}', falling back to info", self.logging.level),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Effective log level, falling back to info for unknown values
    pub fn log_level(&self) -> &str {
        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => &self.logging.level,
            _ => "info",
        }
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("meteo");

        Ok(config_dir.join("config.toml"))
    }
}
