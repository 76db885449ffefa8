//! Grouped aggregations over rental tables.
//!
//! Every function here is total: empty input produces empty output and no
//! well-formed input panics.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rental_core::models::{
    DayType, GroupKey, HourlyRecord, RentalRecord, RentalRow, TimeOfDay,
};
use serde::Serialize;

// ── Output types ──────────────────────────────────────────────────────────────

/// Summed rental count for one group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupTotal<K = u8> {
    pub key: K,
    pub total: u64,
}

/// Totals per code of one categorical column, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub totals: Vec<GroupTotal>,
}

impl GroupSummary {
    /// `(label, total)` pairs in display order.
    pub fn labeled(&self) -> Vec<(String, u64)> {
        self.totals
            .iter()
            .map(|t| (self.key.label(t.key), t.total))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Mean total rentals for one hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyMean {
    pub hour: u8,
    pub mean: f64,
}

/// Mean total rentals for one (hour, day type) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTypeMean {
    pub hour: u8,
    pub day_type: DayType,
    pub mean: f64,
}

/// Hour-of-day profile split by working day versus weekend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyPattern {
    /// Cells ordered by hour, then day type.
    pub cells: Vec<DayTypeMean>,
}

impl HourlyPattern {
    /// Mean for one cell, `None` when no rows fell into it.
    pub fn mean(&self, hour: u8, day_type: DayType) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.hour == hour && c.day_type == day_type)
            .map(|c| c.mean)
    }

    /// `(hour, mean)` points for one day type, ordered by hour.
    pub fn series(&self, day_type: DayType) -> Vec<(u8, f64)> {
        self.cells
            .iter()
            .filter(|c| c.day_type == day_type)
            .map(|c| (c.hour, c.mean))
            .collect()
    }
}

/// An hourly row tagged with its time-of-day bucket.
#[derive(Debug, Clone, Copy)]
pub struct CategorizedHour<'a> {
    pub bucket: TimeOfDay,
    pub row: &'a HourlyRecord,
}

impl RentalRow for CategorizedHour<'_> {
    fn record(&self) -> &RentalRecord {
        &self.row.record
    }
}

/// Recency / frequency / totals for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmRow {
    pub weekday: Weekday,
    /// Days from this weekday's latest date to the latest date overall.
    pub recency: u64,
    /// Number of rows falling on this weekday.
    pub frequency: usize,
    pub total_casual: u64,
    pub total_registered: u64,
}

/// The three headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub total_rentals: u64,
    pub total_casual: u64,
    pub total_registered: u64,
}

// ── RentalAggregator ──────────────────────────────────────────────────────────

/// Stateless helper holding the aggregation functions.
pub struct RentalAggregator;

impl RentalAggregator {
    /// Resample `rows` onto calendar days.
    ///
    /// Categorical fields come from the first row seen for the day,
    /// measurements (temperatures, humidity, wind) are averaged and counts are
    /// summed. Days with no rows are not synthesized. Output is ordered by date.
    pub fn daily_aggregate<R: RentalRow>(rows: &[R]) -> Vec<RentalRecord> {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for row in rows {
            let record = row.record();
            days.entry(record.date)
                .or_insert_with(|| DayAccumulator::new(record))
                .add(record);
        }

        days.into_values().map(DayAccumulator::finish).collect()
    }

    /// Sum total rentals per `key` code, largest total first.
    ///
    /// Equal totals keep ascending code order, so the result does not depend
    /// on input row order.
    pub fn group_and_sum<R: RentalRow>(rows: &[R], key: GroupKey) -> GroupSummary {
        GroupSummary {
            key,
            totals: Self::sum_by(rows, |row| key.code(row.record())),
        }
    }

    /// Generic engine behind [`Self::group_and_sum`].
    pub fn sum_by<R, K, F>(rows: &[R], key_fn: F) -> Vec<GroupTotal<K>>
    where
        R: RentalRow,
        K: Ord + Copy,
        F: Fn(&R) -> K,
    {
        let mut sums: BTreeMap<K, u64> = BTreeMap::new();
        for row in rows {
            *sums.entry(key_fn(row)).or_insert(0) += row.record().total;
        }

        let mut totals: Vec<GroupTotal<K>> = sums
            .into_iter()
            .map(|(key, total)| GroupTotal { key, total })
            .collect();
        // Stable: ties stay in ascending key order.
        totals.sort_by(|a, b| b.total.cmp(&a.total));
        totals
    }

    /// Mean total rentals per hour of day, ordered 0..23. Hours with no rows
    /// are omitted.
    pub fn hourly_mean(rows: &[HourlyRecord]) -> Vec<HourlyMean> {
        let mut hours: BTreeMap<u8, MeanAccumulator> = BTreeMap::new();
        for row in rows {
            hours.entry(row.hour).or_default().add(row.record.total);
        }

        hours
            .into_iter()
            .map(|(hour, acc)| HourlyMean {
                hour,
                mean: acc.mean(),
            })
            .collect()
    }

    /// Mean total rentals per (hour, day type).
    pub fn hourly_pattern_by_day_type(rows: &[HourlyRecord]) -> HourlyPattern {
        let mut cells: BTreeMap<(u8, DayType), MeanAccumulator> = BTreeMap::new();
        for row in rows {
            let day_type = DayType::from_working_day(row.record.working_day);
            cells
                .entry((row.hour, day_type))
                .or_default()
                .add(row.record.total);
        }

        HourlyPattern {
            cells: cells
                .into_iter()
                .map(|((hour, day_type), acc)| DayTypeMean {
                    hour,
                    day_type,
                    mean: acc.mean(),
                })
                .collect(),
        }
    }

    /// Tag each hourly row with its [`TimeOfDay`] bucket, preserving order.
    pub fn categorize_by_time_of_day(rows: &[HourlyRecord]) -> Vec<CategorizedHour<'_>> {
        rows.iter()
            .map(|row| CategorizedHour {
                bucket: TimeOfDay::from_hour(row.hour),
                row,
            })
            .collect()
    }

    /// Total rentals per time-of-day bucket, largest first.
    pub fn time_of_day_totals(rows: &[HourlyRecord]) -> Vec<GroupTotal<TimeOfDay>> {
        let categorized = Self::categorize_by_time_of_day(rows);
        Self::sum_by(&categorized, |c| c.bucket)
    }

    /// Recency / frequency / totals per weekday, ordered Sunday to Saturday.
    ///
    /// The weekday is derived from each row's date. Recency is measured
    /// against the latest date anywhere in `rows`. Weekdays with no rows are
    /// absent.
    pub fn rfm<R: RentalRow>(rows: &[R]) -> Vec<RfmRow> {
        let Some(last_date) = rows.iter().map(|row| row.date()).max() else {
            return Vec::new();
        };

        let mut by_weekday: BTreeMap<u32, RfmAccumulator> = BTreeMap::new();
        for row in rows {
            let record = row.record();
            let weekday = record.date.weekday();
            by_weekday
                .entry(weekday.num_days_from_sunday())
                .or_insert_with(|| RfmAccumulator::new(weekday, record.date))
                .add(record);
        }

        by_weekday
            .into_values()
            .map(|acc| RfmRow {
                weekday: acc.weekday,
                recency: (last_date - acc.latest).num_days().unsigned_abs(),
                frequency: acc.frequency,
                total_casual: acc.casual,
                total_registered: acc.registered,
            })
            .collect()
    }

    /// Sum the three headline counts over `rows`.
    pub fn summary_metrics<R: RentalRow>(rows: &[R]) -> SummaryMetrics {
        rows.iter().fold(SummaryMetrics::default(), |mut acc, row| {
            let record = row.record();
            acc.total_rentals += record.total;
            acc.total_casual += record.casual;
            acc.total_registered += record.registered;
            acc
        })
    }
}

// ── Accumulators ──────────────────────────────────────────────────────────────

struct DayAccumulator {
    first: RentalRecord,
    temp: f64,
    felt_temp: f64,
    humidity: f64,
    windspeed: f64,
    casual: u64,
    registered: u64,
    total: u64,
    rows: usize,
}

impl DayAccumulator {
    fn new(first: &RentalRecord) -> Self {
        Self {
            first: first.clone(),
            temp: 0.0,
            felt_temp: 0.0,
            humidity: 0.0,
            windspeed: 0.0,
            casual: 0,
            registered: 0,
            total: 0,
            rows: 0,
        }
    }

    fn add(&mut self, record: &RentalRecord) {
        self.temp += record.temp;
        self.felt_temp += record.felt_temp;
        self.humidity += record.humidity;
        self.windspeed += record.windspeed;
        self.casual += record.casual;
        self.registered += record.registered;
        self.total += record.total;
        self.rows += 1;
    }

    fn finish(self) -> RentalRecord {
        let n = self.rows as f64;
        RentalRecord {
            temp: self.temp / n,
            felt_temp: self.felt_temp / n,
            humidity: self.humidity / n,
            windspeed: self.windspeed / n,
            casual: self.casual,
            registered: self.registered,
            total: self.total,
            ..self.first
        }
    }
}

#[derive(Default)]
struct MeanAccumulator {
    sum: u64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: u64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

struct RfmAccumulator {
    weekday: Weekday,
    latest: NaiveDate,
    frequency: usize,
    casual: u64,
    registered: u64,
}

impl RfmAccumulator {
    fn new(weekday: Weekday, date: NaiveDate) -> Self {
        Self {
            weekday,
            latest: date,
            frequency: 0,
            casual: 0,
            registered: 0,
        }
    }

    fn add(&mut self, record: &RentalRecord) {
        self.latest = self.latest.max(record.date);
        self.frequency += 1;
        self.casual += record.casual;
        self.registered += record.registered;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
