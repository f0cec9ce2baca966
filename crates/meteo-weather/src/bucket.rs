//! Groups forecast samples into day buckets within a horizon.
//!
//! A sample is kept when its timestamp is at most `horizon_days` calendar days
//! after "now" (inclusive), with day arithmetic done in the time zone of `now`.
//! Kept samples are grouped under the localized full weekday name of their
//! local date. Buckets appear in order of first appearance and samples keep
//! source order within a bucket.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Days, Locale, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::ForecastSample;

pub const DEFAULT_HORIZON_DAYS: u32 = 3;

/// Locale of the day labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LabelLocale {
    #[default]
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "en_GB")]
    EnGb,
    #[serde(rename = "de_DE")]
    DeDe,
    #[serde(rename = "es_ES")]
    EsEs,
    #[serde(rename = "it_IT")]
    ItIt,
    #[serde(rename = "nl_NL")]
    NlNl,
}

impl LabelLocale {
    fn chrono_locale(self) -> Locale {
        match self {
            Self::FrFr => Locale::fr_FR,
            Self::EnUs => Locale::en_US,
            Self::EnGb => Locale::en_GB,
            Self::DeDe => Locale::de_DE,
            Self::EsEs => Locale::es_ES,
            Self::ItIt => Locale::it_IT,
            Self::NlNl => Locale::nl_NL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported label locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for LabelLocale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fr_FR" => Ok(Self::FrFr),
            "en_US" => Ok(Self::EnUs),
            "en_GB" => Ok(Self::EnGb),
            "de_DE" => Ok(Self::DeDe),
            "es_ES" => Ok(Self::EsEs),
            "it_IT" => Ok(Self::ItIt),
            "nl_NL" => Ok(Self::NlNl),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// Bucket key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Weekday name only; dates seven days apart share a bucket
    #[default]
    Weekday,
    /// One bucket per local calendar date
    CalendarDate,
}

/// Samples sharing one day label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub label: String,
    /// Local date of the first sample in the bucket
    pub date: NaiveDate,
    pub samples: Vec<ForecastSample>,
}

/// Day-bucketed forecast, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    days: Vec<DayBucket>,
}

impl DailyForecast {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayBucket> {
        self.days.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.days.iter().map(|d| d.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&[ForecastSample]> {
        self.days
            .iter()
            .find(|d| d.label == label)
            .map(|d| d.samples.as_slice())
    }

    pub fn sample_count(&self) -> usize {
        self.days.iter().map(|d| d.samples.len()).sum()
    }
}

impl<'a> IntoIterator for &'a DailyForecast {
    type Item = &'a DayBucket;
    type IntoIter = std::slice::Iter<'a, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastBucketer {
    pub horizon_days: u32,
    pub locale: LabelLocale,
    pub grouping: Grouping,
}

impl Default for ForecastBucketer {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            locale: LabelLocale::default(),
            grouping: Grouping::default(),
        }
    }
}

impl ForecastBucketer {
    pub fn new(horizon_days: u32, locale: LabelLocale, grouping: Grouping) -> Self {
        Self {
            horizon_days,
            locale,
            grouping,
        }
    }

    /// Last instant (inclusive) a sample may fall at.
    pub fn horizon_end<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let days = u64::from(self.horizon_days);
        now.clone()
            .checked_add_days(Days::new(days))
            // Unrepresentable local date (far future); fixed-length days instead.
            .unwrap_or_else(|| now.clone() + chrono::Duration::days(days as i64))
    }

    /// Filter `samples` to the horizon and group them by day label.
    pub fn bucket<Tz>(&self, now: &DateTime<Tz>, samples: &[ForecastSample]) -> DailyForecast
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let end = self.horizon_end(now);
        let zone = now.timezone();
        let locale = self.locale.chrono_locale();
        let mut days: Vec<DayBucket> = Vec::new();

        for sample in samples.iter().filter(|s| s.timestamp <= end) {
            let local = sample.timestamp.with_timezone(&zone);
            let date = local.date_naive();
            let label = match self.grouping {
                Grouping::Weekday => local.format_localized("%A", locale).to_string(),
                Grouping::CalendarDate => local.format_localized("%A %-d", locale).to_string(),
            };

            match days.iter_mut().find(|d| d.label == label) {
                Some(day) => day.samples.push(sample.clone()),
                None => days.push(DayBucket {
                    label,
                    date,
                    samples: vec![sample.clone()],
                }),
            }
        }

        let forecast = DailyForecast { days };
        tracing::debug!(
            "Bucketed {} of {} samples into {} days (horizon end {})",
            forecast.sample_count(),
            samples.len(),
            forecast.len(),
            end
        );
        forecast
    }
}
