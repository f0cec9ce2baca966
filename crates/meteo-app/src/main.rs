use std::io::BufReader;

use anyhow::{Context, Result};
use meteo_app::{event_loop, settings, AppServices};
use meteo_core::Config;

fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    meteo_core::init(config.log_level())?;

    let (config, _validation) = config.validated().map_err(|e| {
        eprintln!("{}", e);
        e
    })?;

    let zone = settings::display_zone(&config.forecast)?;
    let services = AppServices::new(&config).map_err(|e| {
        eprintln!("{}", e.user_message());
        e
    })?;

    tracing::info!("meteo started, config at {}", config.config_dir.display());

    let stdin = BufReader::new(std::io::stdin());
    let mut stdout = std::io::stdout();
    let result = match zone {
        Some(tz) => event_loop::run(&services, tz, stdin, &mut stdout),
        None => event_loop::run(&services, chrono::Local, stdin, &mut stdout),
    };

    services.shutdown();
    result
}
