pub mod config;
pub mod error;

pub use config::{
    Config, ForecastConfig, LoggingConfig, ValidationResult, WeatherConfig, API_KEY_ENV,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;

/// Initialize the core application
///
/// `RUST_LOG` wins over `default_level` when set. Output goes to stderr so it
/// does not interleave with rendered weather on stdout.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("meteo core initialized");
    Ok(())
}
