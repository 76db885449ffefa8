//! Report pipeline for the dashboard.
//!
//! Filters the loaded tables to a date range and derives every view the
//! presenter shows, returning a [`DashboardReport`] ready for the UI layer or
//! JSON output. Nothing is cached: each call recomputes from the tables.

use chrono::Utc;
use rental_core::models::{DateRange, GroupKey, HourlyRecord, RentalRecord, TimeOfDay};
use serde::Serialize;

use crate::aggregator::{
    GroupSummary, GroupTotal, HourlyMean, HourlyPattern, RentalAggregator, RfmRow,
    SummaryMetrics,
};
use crate::filter::filter_range;

// ── Public types ──────────────────────────────────────────────────────────────

/// The loaded source tables. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct RentalTables {
    /// Daily table, sorted by date.
    pub daily: Vec<RentalRecord>,
    /// Hourly table sorted by (date, hour), or `None` in daily-only mode.
    pub hourly: Option<Vec<HourlyRecord>>,
}

impl RentalTables {
    pub fn new(daily: Vec<RentalRecord>, hourly: Option<Vec<HourlyRecord>>) -> Self {
        Self { daily, hourly }
    }

    /// `[min, max]` date of the daily table, `None` when it is empty.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let start = self.daily.iter().map(|r| r.date).min()?;
        let end = self.daily.iter().map(|r| r.date).max()?;
        DateRange::new(start, end).ok()
    }

    pub fn has_hourly(&self) -> bool {
        self.hourly.is_some()
    }
}

/// Views derived from the hourly table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HourlyViews {
    pub hourly_mean: Vec<HourlyMean>,
    pub pattern: HourlyPattern,
    pub time_of_day: Vec<GroupTotal<TimeOfDay>>,
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Daily rows inside the range.
    pub daily_rows: usize,
    /// Hourly rows inside the range, `None` in daily-only mode.
    pub hourly_rows: Option<usize>,
    /// Wall-clock seconds spent filtering and aggregating.
    pub build_time_seconds: f64,
}

/// Everything the presenter renders for one date range.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub metrics: SummaryMetrics,
    /// Daily aggregate of the filtered daily table.
    pub daily: Vec<RentalRecord>,
    pub by_season: GroupSummary,
    pub by_month: GroupSummary,
    pub by_year: GroupSummary,
    pub by_weekday: GroupSummary,
    pub by_weather: GroupSummary,
    pub rfm: Vec<RfmRow>,
    pub hourly: Option<HourlyViews>,
    pub metadata: ReportMetadata,
}

impl DashboardReport {
    /// `true` when no daily rows fall inside the range.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// The five categorical summaries in display order.
    pub fn group_summaries(&self) -> [&GroupSummary; 5] {
        [
            &self.by_season,
            &self.by_month,
            &self.by_year,
            &self.by_weekday,
            &self.by_weather,
        ]
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Build the full report for `range`.
///
/// 1. Filter the daily (and hourly, when loaded) table to `range`.
/// 2. Resample the daily rows and derive the headline metrics.
/// 3. Group-and-sum the five categorical columns and compute the RFM view.
/// 4. Derive the hourly views when hourly data is present.
pub fn build_report(tables: &RentalTables, range: DateRange) -> DashboardReport {
    let started = std::time::Instant::now();

    // ── Step 1: Filter ────────────────────────────────────────────────────────
    let daily_rows = filter_range(&tables.daily, &range);
    let hourly_rows = tables
        .hourly
        .as_deref()
        .map(|rows| filter_range(rows, &range));

    // ── Step 2: Daily aggregate and metrics ───────────────────────────────────
    let daily = RentalAggregator::daily_aggregate(&daily_rows);
    let metrics = RentalAggregator::summary_metrics(&daily);

    // ── Step 3: Categories and RFM ────────────────────────────────────────────
    let group = |key| RentalAggregator::group_and_sum(&daily_rows, key);
    let by_season = group(GroupKey::Season);
    let by_month = group(GroupKey::Month);
    let by_year = group(GroupKey::Year);
    let by_weekday = group(GroupKey::Weekday);
    let by_weather = group(GroupKey::Weather);
    let rfm = RentalAggregator::rfm(&daily_rows);

    // ── Step 4: Hourly views ──────────────────────────────────────────────────
    let hourly = hourly_rows.as_deref().map(|rows| HourlyViews {
        hourly_mean: RentalAggregator::hourly_mean(rows),
        pattern: RentalAggregator::hourly_pattern_by_day_type(rows),
        time_of_day: RentalAggregator::time_of_day_totals(rows),
    });

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        daily_rows: daily_rows.len(),
        hourly_rows: hourly_rows.as_ref().map(Vec::len),
        build_time_seconds: started.elapsed().as_secs_f64(),
    };

    tracing::debug!(
        "Built report for {}: {} daily rows, {:?} hourly rows",
        range,
        metadata.daily_rows,
        metadata.hourly_rows
    );

    DashboardReport {
        range,
        metrics,
        daily,
        by_season,
        by_month,
        by_year,
        by_weekday,
        by_weather,
        rfm,
        hourly,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(date: NaiveDate, casual: u64, registered: u64) -> RentalRecord {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        RentalRecord {
            date,
            season: 1,
            year: (date.year() - 2011) as u8,
            month: date.month() as u8,
            holiday: false,
            weekday,
            working_day: weekday != 0 && weekday != 6,
            weather: 1,
            temp: 0.25,
            felt_temp: 0.25,
            humidity: 0.5,
            windspeed: 0.15,
            casual,
            registered,
            total: casual + registered,
        }
    }

    fn sample_tables(with_hourly: bool) -> RentalTables {
        // 2011-01-02 (Sun) .. 2011-01-15 (Sat): two full weeks.
        let daily: Vec<RentalRecord> = (2..=15)
            .map(|d| make_record(day(2011, 1, d), u64::from(d) * 10, 500))
            .collect();
        let hourly = with_hourly.then(|| {
            daily
                .iter()
                .flat_map(|r| {
                    (0..24u8).map(move |hour| HourlyRecord {
                        hour,
                        record: make_record(r.date, 1, u64::from(hour)),
                    })
                })
                .collect()
        });
        RentalTables::new(daily, hourly)
    }

    // ── RentalTables ──────────────────────────────────────────────────────────

    #[test]
    fn test_date_bounds() {
        let tables = sample_tables(false);
        let bounds = tables.date_bounds().unwrap();
        assert_eq!(bounds.start(), day(2011, 1, 2));
        assert_eq!(bounds.end(), day(2011, 1, 15));
        assert!(!tables.has_hourly());
    }

    #[test]
    fn test_date_bounds_empty_table() {
        assert!(RentalTables::default().date_bounds().is_none());
    }

    // ── build_report ──────────────────────────────────────────────────────────

    #[test]
    fn test_full_range_report() {
        let tables = sample_tables(true);
        let report = build_report(&tables, tables.date_bounds().unwrap());

        assert_eq!(report.daily.len(), 14);
        assert_eq!(report.metadata.daily_rows, 14);
        assert_eq!(report.metadata.hourly_rows, Some(14 * 24));
        assert_eq!(report.rfm.len(), 7);
        assert_eq!(report.by_weekday.totals.len(), 7);
        assert_eq!(report.metrics.total_registered, 14 * 500);
        assert_eq!(
            report.metrics.total_rentals,
            report.metrics.total_casual + report.metrics.total_registered
        );

        let hourly = report.hourly.unwrap();
        assert_eq!(hourly.hourly_mean.len(), 24);
        assert_eq!(hourly.pattern.cells.len(), 48);
        assert_eq!(hourly.time_of_day.len(), 5);
    }

    #[test]
    fn test_daily_only_report_has_no_hourly_views() {
        let tables = sample_tables(false);
        let report = build_report(&tables, tables.date_bounds().unwrap());
        assert!(report.hourly.is_none());
        assert!(report.metadata.hourly_rows.is_none());
        assert!(!report.is_empty());
    }

    #[test]
    fn test_single_day_report() {
        let tables = sample_tables(true);
        let report = build_report(&tables, DateRange::single(day(2011, 1, 3)));

        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.metrics.total_casual, 30);
        assert_eq!(report.rfm.len(), 1);
        assert_eq!(report.rfm[0].recency, 0);
        assert_eq!(report.hourly.unwrap().hourly_mean.len(), 24);
    }

    #[test]
    fn test_range_outside_dataset_is_empty_report() {
        let tables = sample_tables(true);
        let range = DateRange::new(day(2013, 1, 1), day(2013, 1, 31)).unwrap();
        let report = build_report(&tables, range);

        assert!(report.is_empty());
        assert_eq!(report.metrics, SummaryMetrics::default());
        assert!(report.group_summaries().iter().all(|s| s.is_empty()));
        assert!(report.rfm.is_empty());
        let hourly = report.hourly.unwrap();
        assert!(hourly.hourly_mean.is_empty());
        assert!(hourly.pattern.cells.is_empty());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let tables = sample_tables(true);
        let report = build_report(&tables, DateRange::single(day(2011, 1, 8)));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["range"]["start"], "2011-01-08");
        assert_eq!(json["by_weekday"]["key"], "weekday");
        assert_eq!(json["rfm"][0]["weekday"], "Sat");
        assert_eq!(json["hourly"]["hourly_mean"].as_array().unwrap().len(), 24);
    }
}
