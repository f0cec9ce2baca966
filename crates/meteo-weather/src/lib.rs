//! Weather lookup for meteo
//!
//! Resolves a free-text location to current conditions via the
//! OpenWeatherMap API, then groups the 3-hourly forecast for those
//! coordinates into day buckets over a short horizon.

pub mod bucket;
pub mod client;
pub mod error;
pub mod lookup;
pub mod types;

pub use bucket::{DailyForecast, DayBucket, ForecastBucketer, Grouping, LabelLocale};
pub use client::{ClientOptions, OpenWeatherClient};
pub use error::{LookupError, WeatherError};
pub use lookup::{
    lookup, run_pipeline, ApplyOutcome, LookupSession, LookupTicket, StageEvent, WeatherSource,
};
pub use types::*;
