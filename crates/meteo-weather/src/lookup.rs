//! Location lookup: session state and the two-stage fetch pipeline.
//!
//! Stage one resolves the query to current conditions; stage two fetches the
//! forecast for the coordinates stage one returned and buckets it. Each stage
//! reports a [`StageEvent`] tagged with the lookup generation, and
//! [`LookupSession::apply`] drops events from superseded lookups.

use std::fmt::Display;
use std::future::Future;

use chrono::{DateTime, TimeZone};

use crate::bucket::{DailyForecast, ForecastBucketer};
use crate::client::OpenWeatherClient;
use crate::error::{LookupError, WeatherError};
use crate::types::{Coordinates, CurrentWeather, ForecastSample};

/// Anything that can answer the two provider queries.
pub trait WeatherSource: Send + Sync {
    fn current_weather(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<CurrentWeather, WeatherError>> + Send;

    fn forecast(
        &self,
        coord: Coordinates,
    ) -> impl Future<Output = Result<Vec<ForecastSample>, WeatherError>> + Send;
}

impl WeatherSource for OpenWeatherClient {
    fn current_weather(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<CurrentWeather, WeatherError>> + Send {
        OpenWeatherClient::current_weather(self, location)
    }

    fn forecast(
        &self,
        coord: Coordinates,
    ) -> impl Future<Output = Result<Vec<ForecastSample>, WeatherError>> + Send {
        OpenWeatherClient::forecast(self, coord)
    }
}

/// Handle for one started lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    query: String,
}

impl LookupTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Result of one pipeline stage
#[derive(Debug)]
pub enum StageEvent {
    Current {
        generation: u64,
        result: Result<CurrentWeather, LookupError>,
    },
    Forecast {
        generation: u64,
        result: Result<DailyForecast, LookupError>,
    },
}

impl StageEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Current { generation, .. } | Self::Forecast { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Event belonged to a superseded lookup and was dropped
    Stale,
}

/// Everything the display needs for the current search.
///
/// Replaced wholesale by each search; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupSession {
    generation: u64,
    query: String,
    current: Option<CurrentWeather>,
    forecast: DailyForecast,
    not_found: bool,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Query of the latest started lookup
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> &DailyForecast {
        &self.forecast
    }

    pub fn not_found(&self) -> bool {
        self.not_found
    }

    /// Start a lookup. Blank queries start nothing and change nothing.
    pub fn begin(&mut self, query: &str) -> Option<LookupTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.generation += 1;
        self.query = query.to_string();
        tracing::debug!("Lookup #{} started for '{}'", self.generation, self.query);

        Some(LookupTicket {
            generation: self.generation,
            query: self.query.clone(),
        })
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Fold a stage result into the session.
    pub fn apply(&mut self, event: StageEvent) -> ApplyOutcome {
        if !self.is_latest(event.generation()) {
            tracing::debug!(
                "Dropping stale result of lookup #{} (latest #{})",
                event.generation(),
                self.generation
            );
            return ApplyOutcome::Stale;
        }

        match event {
            StageEvent::Current { result: Ok(current), .. } => {
                self.current = Some(current);
                self.forecast = DailyForecast::default();
                self.not_found = false;
            }
            StageEvent::Current { result: Err(e), .. } => {
                tracing::warn!("Lookup for '{}' failed: {}", self.query, e);
                self.current = None;
                self.forecast = DailyForecast::default();
                self.not_found = true;
            }
            StageEvent::Forecast { result: Ok(forecast), .. } => {
                self.forecast = forecast;
            }
            StageEvent::Forecast { result: Err(e), .. } => {
                tracing::warn!("Forecast for '{}' unavailable: {}", self.query, e);
            }
        }

        ApplyOutcome::Applied
    }
}

/// Run both stages for `ticket`, handing each result to `emit`.
///
/// The forecast stage only runs after current conditions resolved; `now` is
/// read once the forecast has arrived.
pub async fn run_pipeline<S, Tz, N, E>(
    source: &S,
    bucketer: &ForecastBucketer,
    ticket: LookupTicket,
    now: N,
    mut emit: E,
) where
    S: WeatherSource,
    Tz: TimeZone,
    Tz::Offset: Display,
    N: Fn() -> DateTime<Tz>,
    E: FnMut(StageEvent),
{
    let generation = ticket.generation;

    let coord = match source.current_weather(&ticket.query).await {
        Ok(current) => {
            let coord = current.coord;
            emit(StageEvent::Current {
                generation,
                result: Ok(current),
            });
            coord
        }
        Err(e) => {
            emit(StageEvent::Current {
                generation,
                result: Err(LookupError::CurrentWeather(e)),
            });
            return;
        }
    };

    let result = match source.forecast(coord).await {
        Ok(samples) => Ok(bucketer.bucket(&now(), &samples)),
        Err(e) => Err(LookupError::Forecast(e)),
    };
    emit(StageEvent::Forecast { generation, result });
}

/// Run a complete lookup against `session` and hand the updated session back.
pub async fn lookup<S, Tz, N>(
    source: &S,
    bucketer: &ForecastBucketer,
    mut session: LookupSession,
    query: &str,
    now: N,
) -> LookupSession
where
    S: WeatherSource,
    Tz: TimeZone,
    Tz::Offset: Display,
    N: Fn() -> DateTime<Tz>,
{
    let Some(ticket) = session.begin(query) else {
        tracing::debug!("Ignoring empty location query");
        return session;
    };

    run_pipeline(source, bucketer, ticket, now, |event| {
        session.apply(event);
    })
    .await;

    session
}
