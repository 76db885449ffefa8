//! CSV discovery and loading for the rental tables.
//!
//! Each table is looked up at `<data_dir>/<file>` and then at
//! `<data_dir>/<fallback_dir>/<file>`. The first file that exists is read in
//! full; a table found in neither place is a [`RentalError::DataNotFound`].

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rental_core::error::{RentalError, Result};
use rental_core::models::{HourlyRecord, RentalRecord, RentalRow, TableKind};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::analysis::RentalTables;

// ── DataSource ────────────────────────────────────────────────────────────────

/// Where to look for the rental tables and which ones to load.
#[derive(Debug, Clone)]
pub struct DataSource {
    /// Directory searched first.
    pub data_dir: PathBuf,
    /// Subdirectory of `data_dir` searched second.
    pub fallback_dir: PathBuf,
    /// Load `hour.csv` as well as `day.csv`.
    pub include_hourly: bool,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            fallback_dir: PathBuf::from("data"),
            include_hourly: true,
        }
    }
}

impl DataSource {
    /// Source rooted at `data_dir` with the default fallback subdirectory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// The two lookup locations for `table`, in priority order.
    pub fn candidate_paths(&self, table: TableKind) -> [PathBuf; 2] {
        let file = table.file_name();
        [
            self.data_dir.join(file),
            self.data_dir.join(&self.fallback_dir).join(file),
        ]
    }

    /// Return the first candidate path that exists.
    pub fn locate(&self, table: TableKind) -> Result<PathBuf> {
        let candidates = self.candidate_paths(table);
        if let Some(found) = candidates.iter().find(|p| p.is_file()) {
            return Ok(found.clone());
        }
        Err(RentalError::DataNotFound {
            table,
            candidates: candidates.to_vec(),
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every table `source` asks for into an immutable [`RentalTables`].
pub fn load_tables(source: &DataSource) -> Result<RentalTables> {
    let daily = load_daily(source)?;
    let hourly = if source.include_hourly {
        Some(load_hourly(source)?)
    } else {
        debug!("Hourly table disabled; running daily views only");
        None
    };
    Ok(RentalTables::new(daily, hourly))
}

/// Locate and read `day.csv`.
pub fn load_daily(source: &DataSource) -> Result<Vec<RentalRecord>> {
    let path = source.locate(TableKind::Daily)?;
    info!("Loading daily table from {}", path.display());
    read_daily_csv(&path)
}

/// Locate and read `hour.csv`.
pub fn load_hourly(source: &DataSource) -> Result<Vec<HourlyRecord>> {
    let path = source.locate(TableKind::Hourly)?;
    info!("Loading hourly table from {}", path.display());
    read_hourly_csv(&path)
}

/// Read a daily CSV file, sorted by date.
pub fn read_daily_csv(path: &Path) -> Result<Vec<RentalRecord>> {
    let mut records: Vec<RentalRecord> = read_rows(path)?
        .into_iter()
        .map(CsvRow::into_record)
        .collect();
    records.sort_by_key(|r| r.date);

    report_loaded(path, &records);
    Ok(records)
}

/// Read an hourly CSV file, sorted by date then hour.
///
/// Every row must carry an `hr` value.
pub fn read_hourly_csv(path: &Path) -> Result<Vec<HourlyRecord>> {
    let rows = read_rows(path)?;
    let mut records = Vec::with_capacity(rows.len());

    for (idx, row) in rows.into_iter().enumerate() {
        let Some(hour) = row.hr else {
            return Err(RentalError::Schema {
                path: path.to_path_buf(),
                message: format!("data row {} has no hr value", idx + 1),
            });
        };
        records.push(HourlyRecord {
            hour,
            record: row.into_record(),
        });
    }
    records.sort_by_key(|r| (r.record.date, r.hour));

    report_loaded(path, &records);
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// One CSV line in the public bike-sharing dataset layout.
///
/// `instant` and any other extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    dteday: NaiveDate,
    season: u8,
    yr: u8,
    mnth: u8,
    #[serde(default)]
    hr: Option<u8>,
    holiday: u8,
    weekday: u8,
    workingday: u8,
    weathersit: u8,
    temp: f64,
    atemp: f64,
    hum: f64,
    windspeed: f64,
    casual: u64,
    registered: u64,
    cnt: u64,
}

impl CsvRow {
    fn into_record(self) -> RentalRecord {
        RentalRecord {
            date: self.dteday,
            season: self.season,
            year: self.yr,
            month: self.mnth,
            holiday: self.holiday != 0,
            weekday: self.weekday,
            working_day: self.workingday != 0,
            weather: self.weathersit,
            temp: self.temp,
            felt_temp: self.atemp,
            humidity: self.hum,
            windspeed: self.windspeed,
            casual: self.casual,
            registered: self.registered,
            total: self.cnt,
        }
    }
}

/// Decode every row of `path`. Any undecodable row fails the whole read.
fn read_rows(path: &Path) -> Result<Vec<CsvRow>> {
    let file = File::open(path).map_err(|source| RentalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize::<CsvRow>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| RentalError::CsvParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Log the row count and warn about rows whose total does not match the
/// casual + registered split.
fn report_loaded<R: RentalRow>(path: &Path, rows: &[R]) {
    let inconsistent = rows
        .iter()
        .filter(|r| !r.record().counts_consistent())
        .count();
    if inconsistent > 0 {
        warn!(
            "{}: {} of {} rows have cnt != casual + registered",
            path.display(),
            inconsistent,
            rows.len()
        );
    }
    debug!("Loaded {} rows from {}", rows.len(), path.display());
}

// ── Tests ─────────────────────────────────────────────────────────────────────
