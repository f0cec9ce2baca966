use meteo_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use meteo_weather::{LookupError, WeatherError as ProviderError};

/// Map a provider error onto the application error hierarchy.
pub fn app_error(e: &ProviderError) -> AppError {
    match e {
        ProviderError::NotFound(message) => {
            AppError::Weather(WeatherError::LocationNotFound(message.clone()))
        }
        ProviderError::Unauthorized => AppError::Weather(WeatherError::InvalidApiKey),
        ProviderError::RateLimited(_) => AppError::Weather(WeatherError::ServiceUnavailable),
        ProviderError::Api { status, message } if *status >= 500 => {
            AppError::Network(NetworkError::ServerError {
                status: *status,
                message: message.clone(),
            })
        }
        ProviderError::Api { message, .. } => {
            AppError::Weather(WeatherError::ApiError(message.clone()))
        }
        ProviderError::Parse(message) => {
            AppError::Network(NetworkError::InvalidResponse(message.clone()))
        }
        ProviderError::Network(err) => AppError::Network(err.into_network_error()),
    }
}

pub fn lookup_app_error(e: &LookupError) -> AppError {
    app_error(e.weather_error())
}
