//! Line input from the terminal.

use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use crate::AppEvent;

pub const QUIT_COMMAND: &str = ":q";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A location line, untrimmed
    Submit(String),
    Quit,
    /// Input closed; lookups in flight still get reported
    Eof,
}

pub fn parse_line(line: &str) -> InputEvent {
    if line.trim() == QUIT_COMMAND {
        InputEvent::Quit
    } else {
        InputEvent::Submit(line.to_string())
    }
}

/// Read lines on a dedicated thread until EOF, `:q` or a closed channel.
/// A closed or failing input finishes with `Eof`.
pub fn spawn_reader<R>(reader: R, tx: Sender<AppEvent>) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("meteo-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Failed to read input: {}", e);
                        break;
                    }
                };

                let event = parse_line(&line);
                let quit = event == InputEvent::Quit;
                if tx.send(AppEvent::Input(event)).is_err() || quit {
                    return;
                }
            }

            tracing::debug!("Input closed");
            let _ = tx.send(AppEvent::Input(InputEvent::Eof));
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    fn collect(input: &'static str) -> Vec<InputEvent> {
        let (tx, rx) = mpsc::channel();
        spawn_reader(Cursor::new(input), tx).unwrap().join().unwrap();

        rx.try_iter()
            .map(|event| match event {
                AppEvent::Input(input) => input,
                other => panic!("unexpected event {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(":q"), InputEvent::Quit);
        assert_eq!(parse_line("  :q "), InputEvent::Quit);
        assert_eq!(parse_line("Quimper"), InputEvent::Submit("Quimper".to_string()));
    }

    #[test]
    fn test_reader_stops_at_quit() {
        let events = collect("Paris\n\n:q\nLyon\n");
        assert_eq!(
            events,
            vec![
                InputEvent::Submit("Paris".to_string()),
                InputEvent::Submit(String::new()),
                InputEvent::Quit,
            ]
        );
    }

    #[test]
    fn test_reader_reports_eof() {
        let events = collect("Saint-Malo");
        assert_eq!(
            events,
            vec![InputEvent::Submit("Saint-Malo".to_string()), InputEvent::Eof]
        );
    }

    #[test]
    fn test_quit_sends_no_eof() {
        let events = collect(":q
");
        assert_eq!(events, vec![InputEvent::Quit]);
    }
}
