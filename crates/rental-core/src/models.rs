use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::{RentalError, Result};
use crate::labels;

// ── Tables ────────────────────────────────────────────────────────────────────

/// The two source tables the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// One row per calendar day (`day.csv`).
    Daily,
    /// One row per (day, hour) pair (`hour.csv`).
    Hourly,
}

impl TableKind {
    /// File name looked up in the data directories.
    pub fn file_name(self) -> &'static str {
        match self {
            TableKind::Daily => "day.csv",
            TableKind::Hourly => "hour.csv",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Daily => f.write_str("daily"),
            TableKind::Hourly => f.write_str("hourly"),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// A single row of the daily rental table.
///
/// Resampled daily aggregates use the same shape: categorical fields come from
/// the first row of the day, measurements are day means and counts are sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalRecord {
    /// Calendar day of the rentals.
    pub date: NaiveDate,
    /// Season code, 1 (spring) to 4 (winter).
    pub season: u8,
    /// Year offset from 2011.
    pub year: u8,
    /// Month code, 1 to 12.
    pub month: u8,
    pub holiday: bool,
    /// Weekday code, 0 (Sunday) to 6 (Saturday).
    pub weekday: u8,
    pub working_day: bool,
    /// Weather situation code, 1 (clear) to 4 (heavy rain).
    pub weather: u8,
    /// Normalised temperature.
    pub temp: f64,
    /// Normalised felt temperature.
    pub felt_temp: f64,
    /// Normalised relative humidity.
    pub humidity: f64,
    /// Normalised wind speed.
    pub windspeed: f64,
    /// Rentals by casual riders.
    pub casual: u64,
    /// Rentals by registered riders.
    pub registered: u64,
    /// All rentals; equals `casual + registered` in well-formed data.
    pub total: u64,
}

impl RentalRecord {
    /// `true` when the total matches the casual plus registered split.
    pub fn counts_consistent(&self) -> bool {
        self.total == self.casual + self.registered
    }
}

/// A single row of the hourly rental table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Hour of day, 0 to 23.
    pub hour: u8,
    #[serde(flatten)]
    pub record: RentalRecord,
}

/// Anything that carries a [`RentalRecord`].
///
/// The aggregation functions are generic over this trait so the daily and
/// hourly tables share one implementation.
pub trait RentalRow {
    fn record(&self) -> &RentalRecord;

    fn date(&self) -> NaiveDate {
        self.record().date
    }
}

impl RentalRow for RentalRecord {
    fn record(&self) -> &RentalRecord {
        self
    }
}

impl RentalRow for HourlyRecord {
    fn record(&self) -> &RentalRecord {
        &self.record
    }
}

// ── Categorical keys ──────────────────────────────────────────────────────────

/// Categorical column a group summary is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Season,
    Month,
    Year,
    Weekday,
    Weather,
}

impl GroupKey {
    /// Extract this key's code from `record`.
    pub fn code(self, record: &RentalRecord) -> u8 {
        match self {
            GroupKey::Season => record.season,
            GroupKey::Month => record.month,
            GroupKey::Year => record.year,
            GroupKey::Weekday => record.weekday,
            GroupKey::Weather => record.weather,
        }
    }

    /// Display label for `code` under this key.
    pub fn label(self, code: u8) -> String {
        match self {
            GroupKey::Season => labels::season_label(code).to_string(),
            GroupKey::Month => labels::month_label(code).to_string(),
            GroupKey::Year => labels::year_label(code),
            GroupKey::Weekday => labels::weekday_label(code).to_string(),
            GroupKey::Weather => labels::weather_label(code).to_string(),
        }
    }

    /// Chart title used by the presenter.
    pub fn title(self) -> &'static str {
        match self {
            GroupKey::Season => "Rentals by Season",
            GroupKey::Month => "Rentals by Month",
            GroupKey::Year => "Rentals by Year",
            GroupKey::Weekday => "Rentals by Weekday",
            GroupKey::Weather => "Rentals by Weather",
        }
    }
}

/// Fixed time-of-day buckets for hourly rows.
///
/// | Bucket     | Hours           |
/// |------------|-----------------|
/// | Morning    | 6 – 9           |
/// | Midday     | 10 – 14         |
/// | Evening    | 15 – 18         |
/// | Night      | 19 – 22         |
/// | Late night | 23, 0 – 5       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Midday,
    Evening,
    Night,
    LateNight,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 5] = [
        TimeOfDay::Morning,
        TimeOfDay::Midday,
        TimeOfDay::Evening,
        TimeOfDay::Night,
        TimeOfDay::LateNight,
    ];

    /// Bucket for an hour of day. Hours outside 0–23 fall into late night.
    pub fn from_hour(hour: u8) -> Self {
        match hour {
            6..=9 => TimeOfDay::Morning,
            10..=14 => TimeOfDay::Midday,
            15..=18 => TimeOfDay::Evening,
            19..=22 => TimeOfDay::Night,
            _ => TimeOfDay::LateNight,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Midday => "Midday",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
            TimeOfDay::LateNight => "Late night",
        }
    }
}

/// Working days versus weekends and holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn from_working_day(working_day: bool) -> Self {
        if working_day {
            DayType::Weekday
        } else {
            DayType::Weekend
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive `[start, end]` range of calendar days. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RentalError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Intersect with `bounds`. Returns `None` when the two do not overlap.
    pub fn clamp_to(&self, bounds: &DateRange) -> Option<DateRange> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Move the start by `days`, staying within `bounds` and not past the end.
    pub fn shift_start(&self, days: i64, bounds: &DateRange) -> DateRange {
        let moved = offset(self.start, days).unwrap_or(self.start);
        let start = moved.max(bounds.start).min(self.end);
        DateRange {
            start,
            end: self.end,
        }
    }

    /// Move the end by `days`, staying within `bounds` and not before the start.
    pub fn shift_end(&self, days: i64, bounds: &DateRange) -> DateRange {
        let moved = offset(self.end, days).unwrap_or(self.end);
        let end = moved.min(bounds.end).max(self.start);
        DateRange {
            start: self.start,
            end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

fn offset(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
