//! Lookup backend: runs the two-stage pipeline on the tokio runtime.
//! Stage results are sent back to the main thread via mpsc.

use std::fmt::Display;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use meteo_weather::{run_pipeline, ForecastBucketer, LookupTicket, WeatherSource};
use tokio_util::sync::CancellationToken;

use crate::AppEvent;

/// Everything one spawned lookup needs
pub struct LookupJob<S, Tz> {
    pub source: Arc<S>,
    pub bucketer: ForecastBucketer,
    pub ticket: LookupTicket,
    /// Zone the forecast days are derived in
    pub zone: Tz,
    pub cancel: CancellationToken,
}

/// Spawn `job` on `runtime`. Each stage result is sent as
/// `AppEvent::Lookup`; nothing is sent once the token is cancelled.
pub fn request_lookup<S, Tz>(
    runtime: &tokio::runtime::Handle,
    tx: &Sender<AppEvent>,
    job: LookupJob<S, Tz>,
) -> tokio::task::JoinHandle<()>
where
    S: WeatherSource + 'static,
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Display + Send,
{
    let tx = tx.clone();

    runtime.spawn(async move {
        let LookupJob {
            source,
            bucketer,
            ticket,
            zone,
            cancel,
        } = job;
        let generation = ticket.generation();
        let stage_cancel = cancel.clone();

        let pipeline = run_pipeline(
            source.as_ref(),
            &bucketer,
            ticket,
            move || Utc::now().with_timezone(&zone),
            move |event| {
                // The token may fire between the fetch and this send
                if stage_cancel.is_cancelled() {
                    return;
                }
                if tx.send(AppEvent::Lookup(event)).is_err() {
                    tracing::debug!("Main loop gone, dropping lookup result");
                }
            },
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Lookup #{} cancelled", generation);
            }
            _ = pipeline => {
                tracing::debug!("Lookup #{} finished", generation);
            }
        }
    })
}
