use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::TableKind;

/// All errors produced by the rental dashboard crates.
#[derive(Error, Debug)]
pub enum RentalError {
    /// Neither the primary nor the fallback location holds the table.
    #[error("Data not found: no {table} table at {}", join_paths(.candidates))]
    DataNotFound {
        table: TableKind,
        candidates: Vec<PathBuf>,
    },

    /// A located file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV record could not be decoded into a rental row.
    #[error("Failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file parsed but is missing something the table kind requires.
    #[error("Invalid schema in {path}: {message}")]
    Schema { path: PathBuf, message: String },

    /// A date range whose start falls after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, RentalError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_data_not_found() {
        let err = RentalError::DataNotFound {
            table: TableKind::Daily,
            candidates: vec![PathBuf::from("./day.csv"), PathBuf::from("./data/day.csv")],
        };
        assert_eq!(
            err.to_string(),
            "Data not found: no daily table at ./day.csv, ./data/day.csv"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = RentalError::FileRead {
            path: PathBuf::from("/srv/hour.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/srv/hour.csv"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_schema() {
        let err = RentalError::Schema {
            path: PathBuf::from("hour.csv"),
            message: "row 3 has no hr value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid schema in hour.csv: row 3 has no hr value"
        );
    }

    #[test]
    fn test_error_display_invalid_range() {
        let err = RentalError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2012, 5, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2012, 5, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2012-05-02 is after 2012-05-01"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = RentalError::Config("empty fallback dir".to_string());
        assert_eq!(err.to_string(), "Configuration error: empty fallback dir");
    }

    #[test]
    fn test_error_source_is_kept() {
        use std::error::Error as _;

        let err = RentalError::FileRead {
            path: PathBuf::from("day.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("gone".to_string()));
    }
}
