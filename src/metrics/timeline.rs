//! Month bucketing for the timeline chart.
//!
//! Date keys are reduced to a `YYYY-MM` month key taken verbatim from the
//! text: no timezone conversion happens, so `2024-01-31T23:30:00-05:00`
//! belongs to January. Keys that are missing or not a valid calendar date
//! are skipped and logged.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `YYYY-MM`, `YYYY-MM-DD`, or a full timestamp with `T` or a space, an
/// optional fraction and an optional `Z` / numeric offset.
static DATE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
          ^(?P<year>\d{4})-(?P<month>\d{2})
          (?:
            -(?P<day>\d{2})
            (?:
              [T\ ](?P<hour>\d{2}):(?P<minute>\d{2})(?::(?P<second>\d{2})(?:\.\d+)?)?
              (?:Z|[+-]\d{2}:?\d{2})?
            )?
          )?$
        ",
    )
    .expect("date key regex must compile")
});

const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Language used for month labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fr => write!(f, "fr"),
            Self::En => write!(f, "en"),
        }
    }
}

impl Locale {
    /// Abbreviated month name, `month` in `1..=12`.
    pub fn short_month(self, month: u32) -> &'static str {
        let names = match self {
            Self::Fr => &MONTHS_FR,
            Self::En => &MONTHS_EN,
        };
        names[(month.clamp(1, 12) - 1) as usize]
    }
}

/// A date-stamped count from an upstream grouping query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthObservation {
    pub date_key: Option<String>,
    pub count: u64,
}

impl MonthObservation {
    pub fn new(date_key: impl Into<String>, count: u64) -> Self {
        Self {
            date_key: Some(date_key.into()),
            count,
        }
    }
}

/// One point of the monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyEntry {
    /// `YYYY-MM`.
    pub month_key: String,
    /// Short localized label, e.g. `janv. 24`.
    pub label: String,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Month keys
// ---------------------------------------------------------------------------

/// Parse a date key into its calendar date, ignoring any time and offset.
///
/// A `YYYY-MM` key reads as the first of the month. Returns `None` if the
/// key is not a recognizable, valid date.
pub fn parse_date_key(date_key: &str) -> Option<NaiveDate> {
    let caps = DATE_KEY_RE.captures(date_key.trim())?;

    let year: i32 = caps["year"].parse().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = match caps.name("day") {
        Some(d) => d.as_str().parse().ok()?,
        None => 1,
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    if let Some(hour) = caps.name("hour") {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = caps["minute"].parse().ok()?;
        let second: u32 = match caps.name("second") {
            Some(s) => s.as_str().parse().ok()?,
            None => 0,
        };
        NaiveTime::from_hms_opt(hour, minute, second)?;
    }

    Some(date)
}

/// Extract the `YYYY-MM` month key of a date key, or `None` if the key is
/// not a recognizable, valid date.
pub fn month_key(date_key: &str) -> Option<String> {
    parse_date_key(date_key).map(|date| date.format("%Y-%m").to_string())
}

/// Short label for a month key: `janv. 24` (fr) or `Jan 24` (en).
///
/// Falls back to the key itself if it is not a `YYYY-MM` string.
pub fn month_label(month_key: &str, locale: Locale) -> String {
    let parsed = month_key.split_once('-').and_then(|(y, m)| {
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    });

    match parsed {
        Some((year, month)) => format!(
            "{} {:02}",
            locale.short_month(month),
            year.rem_euclid(100)
        ),
        None => month_key.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Series construction
// ---------------------------------------------------------------------------

/// Monthly series plus the number of observations that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlySeries {
    pub entries: Vec<MonthlyEntry>,
    pub skipped: usize,
}

/// Sum observation counts per month and sort ascending by month key.
pub fn build_monthly_series(observations: &[MonthObservation], locale: Locale) -> MonthlySeries {
    let mut monthly: HashMap<String, u64> = HashMap::new();
    let mut skipped = 0;

    for obs in observations {
        let key = obs.date_key.as_deref().and_then(month_key);
        match key {
            Some(key) => {
                let total = monthly.entry(key).or_default();
                *total = total.saturating_add(obs.count);
            }
            None => {
                log::warn!(
                    "skipping month observation with unusable date key {:?}",
                    obs.date_key
                );
                skipped += 1;
            }
        }
    }

    let mut entries: Vec<MonthlyEntry> = monthly
        .into_iter()
        .map(|(month_key, count)| MonthlyEntry {
            label: month_label(&month_key, locale),
            month_key,
            count,
        })
        .collect();

    // Zero-padded YYYY-MM sorts chronologically as text
    entries.sort_by(|a, b| a.month_key.cmp(&b.month_key));

    MonthlySeries { entries, skipped }
}
