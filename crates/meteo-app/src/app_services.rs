//! Shared services of the running application.
//!
//! Holds the tokio runtime, the provider client and the cancellation token
//! of the lookup currently in flight.

use std::sync::Arc;
use std::time::Duration;

use meteo_core::{AppError, Config};
use meteo_weather::{ForecastBucketer, OpenWeatherClient};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error_mapping::app_error;
use crate::render::RenderOptions;
use crate::settings;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct AppServices {
    runtime: tokio::runtime::Runtime,
    client: Arc<OpenWeatherClient>,
    bucketer: ForecastBucketer,
    render_options: RenderOptions,
    lookup_cancel_token: RwLock<Option<CancellationToken>>,
}

impl AppServices {
    /// Build the runtime and provider client from a validated config.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("meteo-tokio")
            .build()?;

        let api_key = config.api_key()?;
        let client = OpenWeatherClient::new(api_key, settings::client_options(&config.weather))
            .map_err(|e| app_error(&e))?;
        let bucketer = settings::bucketer(&config.forecast);

        tracing::info!(
            "Weather services ready ({} units, lang {}, {} day horizon)",
            client.options().units.as_query(),
            client.options().language,
            bucketer.horizon_days
        );

        Ok(Self {
            runtime,
            client: Arc::new(client),
            bucketer,
            render_options: settings::render_options(config),
            lookup_cancel_token: RwLock::new(None),
        })
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn client(&self) -> Arc<OpenWeatherClient> {
        self.client.clone()
    }

    pub fn bucketer(&self) -> ForecastBucketer {
        self.bucketer
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Cancel the lookup in flight, if any, and hand out a token for the next.
    pub fn new_lookup_cancel_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.lookup_cancel_token.write().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel any active lookup and clear the token.
    fn cancel_lookup(&self) {
        if let Some(token) = self.lookup_cancel_token.write().take() {
            token.cancel();
            tracing::debug!("Lookup cancelled");
        }
    }

    /// Cancel outstanding work and stop the runtime.
    pub fn shutdown(self) {
        tracing::info!("Shutting down");
        self.cancel_lookup();
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }
}
