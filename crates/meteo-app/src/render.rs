//! Plain-text rendering of a lookup session.

use std::fmt;

use chrono::TimeZone;
use meteo_weather::{DayBucket, LookupSession, Units};

/// User-facing strings of the terminal surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub prompt: &'static str,
    pub not_found: &'static str,
    pub currently: &'static str,
    pub feels_like: &'static str,
    pub min_max: &'static str,
    pub humidity: &'static str,
    pub wind: &'static str,
    pub pressure: &'static str,
    pub no_forecast: &'static str,
}

impl Labels {
    pub fn french() -> Self {
        Self {
            prompt: "Entrez votre destination préférée ...",
            not_found: "Destination non trouvée",
            currently: "Actuellement",
            feels_like: "Ressenti",
            min_max: "Mini/Max",
            humidity: "Humidité",
            wind: "Vent",
            pressure: "Pression",
            no_forecast: "Aucune prévision disponible pour cette journée.",
        }
    }

    pub fn english() -> Self {
        Self {
            prompt: "Enter your preferred destination ...",
            not_found: "Destination not found",
            currently: "Currently",
            feels_like: "Feels like",
            min_max: "Min/Max",
            humidity: "Humidity",
            wind: "Wind",
            pressure: "Pressure",
            no_forecast: "No forecast available for this day.",
        }
    }

    /// French for `fr*` provider languages, English otherwise.
    pub fn for_language(language: &str) -> Self {
        if language.to_ascii_lowercase().starts_with("fr") {
            Self::french()
        } else {
            Self::english()
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::french()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub units: Units,
    pub icon_base_url: String,
    pub labels: Labels,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            units: Units::default(),
            icon_base_url: meteo_weather::DEFAULT_ICON_BASE_URL.to_string(),
            labels: Labels::default(),
        }
    }
}

/// Display adapter for a session. Forecast times are shown in `zone`.
pub struct Report<'a, Tz: TimeZone> {
    session: &'a LookupSession,
    options: &'a RenderOptions,
    zone: &'a Tz,
}

impl<'a, Tz: TimeZone> Report<'a, Tz> {
    pub fn new(session: &'a LookupSession, options: &'a RenderOptions, zone: &'a Tz) -> Self {
        Self {
            session,
            options,
            zone,
        }
    }

    fn write_day(&self, f: &mut fmt::Formatter<'_>, day: &DayBucket) -> fmt::Result
    where
        Tz::Offset: fmt::Display,
    {
        let unit = self.options.units.temperature_suffix();
        writeln!(f, "{}", capitalize(&day.label))?;

        if day.samples.is_empty() {
            return writeln!(f, "  {}", self.options.labels.no_forecast);
        }

        for sample in &day.samples {
            let local = sample.timestamp.with_timezone(self.zone);
            write!(f, "  {}  {:>4}{}", local.format("%H:%M"), whole(sample.temperature), unit)?;
            match &sample.condition {
                Some(c) => writeln!(
                    f,
                    "  {}  {}",
                    c.description,
                    c.icon_url(&self.options.icon_base_url)
                )?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}

impl<Tz> fmt::Display for Report<'_, Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = &self.options.labels;

        if self.session.not_found() {
            return writeln!(f, "{}", labels.not_found);
        }
        let Some(current) = self.session.current() else {
            return Ok(());
        };

        let unit = self.options.units.temperature_suffix();

        if current.country.is_empty() {
            writeln!(f, "{}", current.name)?;
        } else {
            writeln!(f, "{} / {}", current.name, current.country)?;
        }
        writeln!(f, "{} {}{}", labels.currently, whole(current.temperature), unit)?;
        if let Some(condition) = &current.condition {
            writeln!(
                f,
                "{}  {}",
                capitalize(&condition.description),
                condition.icon_url(&self.options.icon_base_url)
            )?;
        }
        writeln!(f, "{} {}{}", labels.feels_like, whole(current.feels_like), unit)?;
        writeln!(
            f,
            "{} {}%  {} {} {}  {} {} hPa",
            labels.humidity,
            current.humidity,
            labels.wind,
            current.wind_speed,
            self.options.units.speed_suffix(),
            labels.pressure,
            current.pressure
        )?;
        writeln!(
            f,
            "{} {}{} / {}{}",
            labels.min_max,
            whole(current.temp_min),
            unit,
            whole(current.temp_max),
            unit
        )?;

        let forecast = self.session.forecast();
        if forecast.is_empty() {
            return writeln!(f, "\n{}", labels.no_forecast);
        }
        for day in forecast {
            writeln!(f)?;
            self.write_day(f, day)?;
        }
        Ok(())
    }
}

/// Temperatures are shown rounded down to whole degrees.
fn whole(value: f64) -> i64 {
    value.floor() as i64
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
