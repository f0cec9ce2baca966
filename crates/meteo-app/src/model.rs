//! Main-thread owner of the lookup session.

use meteo_weather::{ApplyOutcome, LookupSession, LookupTicket, StageEvent};

use crate::error_mapping::lookup_app_error;

#[derive(Debug, Default)]
pub struct SearchModel {
    session: LookupSession,
    pending: bool,
}

impl SearchModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &LookupSession {
        &self.session
    }

    /// True while the latest lookup still has a stage outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start a lookup for a submitted line. Blank lines start nothing.
    pub fn submit(&mut self, query: &str) -> Option<LookupTicket> {
        let ticket = self.session.begin(query)?;
        self.pending = true;
        Some(ticket)
    }

    pub fn handle(&mut self, event: StageEvent) -> ApplyOutcome {
        if self.session.is_latest(event.generation()) {
            if let StageEvent::Current { result: Err(e), .. }
            | StageEvent::Forecast { result: Err(e), .. } = &event
            {
                let app_err = lookup_app_error(e);
                tracing::info!("{} ({})", app_err.user_message(), app_err);
            }
        }

        // A failed first stage ends the lookup as well as the forecast does.
        let last_stage = matches!(
            event,
            StageEvent::Forecast { .. } | StageEvent::Current { result: Err(_), .. }
        );

        let outcome = self.session.apply(event);
        if outcome == ApplyOutcome::Applied && last_stage {
            self.pending = false;
        }
        outcome
    }
}
