//! Main-thread loop: reads submitted lines, starts lookups and prints reports.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Sender};

use anyhow::{Context, Result};
use chrono::TimeZone;
use meteo_weather::ApplyOutcome;

use crate::services::{request_lookup, LookupJob};
use crate::{input, AppEvent, AppServices, InputEvent, Report, SearchModel};

/// Run until `:q`, or until input closes and the last lookup has reported.
pub fn run<Tz, R, W>(services: &AppServices, zone: Tz, reader: R, out: &mut W) -> Result<()>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Display + Send,
    R: BufRead + Send + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel();
    let options = services.render_options();
    let mut model = SearchModel::new();
    let mut input_closed = false;

    // Startup lookup with no location yet; starts nothing.
    submit(services, &tx, &mut model, "", &zone);

    input::spawn_reader(reader, tx.clone()).context("Failed to start input thread")?;
    prompt(out, options.labels.prompt)?;

    for event in rx.iter() {
        match event {
            AppEvent::Input(InputEvent::Quit) => break,
            AppEvent::Input(InputEvent::Eof) => {
                input_closed = true;
                if !model.is_pending() {
                    break;
                }
            }
            AppEvent::Input(InputEvent::Submit(line)) => {
                if !submit(services, &tx, &mut model, &line, &zone) {
                    prompt(out, options.labels.prompt)?;
                }
            }
            AppEvent::Lookup(stage) => {
                if model.handle(stage) == ApplyOutcome::Applied && !model.is_pending() {
                    write!(out, "{}", Report::new(model.session(), options, &zone))?;
                    if input_closed {
                        out.flush()?;
                        break;
                    }
                    prompt(out, options.labels.prompt)?;
                }
            }
        }
    }

    Ok(())
}

/// Start a lookup for `query`; false when the query was blank.
fn submit<Tz>(
    services: &AppServices,
    tx: &Sender<AppEvent>,
    model: &mut SearchModel,
    query: &str,
    zone: &Tz,
) -> bool
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Display + Send,
{
    let Some(ticket) = model.submit(query) else {
        return false;
    };

    let job = LookupJob {
        source: services.client(),
        bucketer: services.bucketer(),
        ticket,
        zone: zone.clone(),
        cancel: services.new_lookup_cancel_token(),
    };
    // Detached; the next submission or shutdown cancels it through the token.
    request_lookup(&services.runtime(), tx, job);
    true
}

fn prompt<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{}", text)?;
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use meteo_core::Config;
    use std::io::Cursor;

    fn services() -> AppServices {
        let mut config = Config::default();
        config.weather.api_key = Some("test_key".to_string());
        // Nothing listens here; only blank or quit input is fed below.
        config.weather.base_url = "http://127.0.0.1:9".to_string();
        AppServices::new(&config).unwrap()
    }

    #[test]
    fn test_startup_prompts_once_and_eof_exits() {
        let services = services();
        let mut out = Vec::new();

        run(&services, Utc, Cursor::new(""), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Entrez votre destination préférée ...\n> ");
        services.shutdown();
    }

    #[test]
    fn test_blank_line_prompts_again() {
        let services = services();
        let mut out = Vec::new();

        run(&services, Utc, Cursor::new("   \n"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Entrez votre destination").count(), 2);
        services.shutdown();
    }

    #[test]
    fn test_quit_stops_reading() {
        let services = services();
        let mut out = Vec::new();

        run(&services, Utc, Cursor::new(":q\n\n\n"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Entrez votre destination").count(), 1);
        services.shutdown();
    }
}
