use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use rental_core::models::DateRange;
use rental_core::settings::Settings;
use rental_core::RentalError;
use rental_data::reader::DataSource;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.bikeshare-dash`, or `./.bikeshare-dash` without a home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bikeshare-dash")
}

/// Ensure `~/.bikeshare-dash/` and `~/.bikeshare-dash/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Log file used by the terminal dashboard when `--log-file` is not given.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("bikeshare-dash.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map Python-style level names onto `tracing` filter directives.
pub fn normalise_level(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` when given (appending, no ANSI colours) and to
/// stderr otherwise. Falls back to `"info"` if the level is not recognised.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Settings → pipeline inputs ─────────────────────────────────────────────────

/// Where to look for the tables, per the command line.
pub fn data_source(settings: &Settings) -> Result<DataSource, RentalError> {
    if settings.fallback_dir.trim().is_empty() {
        return Err(RentalError::Config(
            "--fallback-dir must not be empty".to_string(),
        ));
    }
    Ok(DataSource {
        data_dir: settings.data_dir.clone(),
        fallback_dir: PathBuf::from(&settings.fallback_dir),
        include_hourly: !settings.daily_only,
    })
}

/// Turn the optional `--start` / `--end` into the initial range.
///
/// Missing edges default to the dataset bounds, or to the given edge when
/// that edge lies past the data on the missing side. A range overlapping the
/// dataset is clamped to it; a range entirely outside is kept so the
/// dashboard shows an empty report. An explicit `start > end` is an error.
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    bounds: DateRange,
) -> Result<DateRange, RentalError> {
    let first = start.unwrap_or_else(|| end.map_or(bounds.start(), |e| e.min(bounds.start())));
    let last = end.unwrap_or_else(|| start.map_or(bounds.end(), |s| s.max(bounds.end())));
    let requested = DateRange::new(first, last)?;

    match requested.clamp_to(&bounds) {
        Some(clamped) if clamped != requested => {
            tracing::info!("Requested range {} clamped to {}", requested, clamped);
            Ok(clamped)
        }
        Some(clamped) => Ok(clamped),
        None => {
            tracing::warn!(
                "Requested range {} lies outside the data ({}); nothing to show",
                requested,
                bounds
            );
            Ok(requested)
        }
    }
}

/// Display form of the data directory for the startup log line.
pub fn describe_dir(path: &Path) -> String {
    match path.canonicalize() {
        Ok(abs) => abs.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bounds() -> DateRange {
        DateRange::new(day(2011, 1, 1), day(2012, 12, 31)).unwrap()
    }

    // ── ensure_directories ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");

        // Override HOME so that dirs::home_dir() resolves to our temp dir.
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", tmp.path());

        let result = ensure_directories();
        let log_file = default_log_file();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }

        result.expect("ensure_directories should succeed");

        let app_dir = tmp.path().join(".bikeshare-dash");
        assert!(app_dir.is_dir(), ".bikeshare-dash dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
        assert_eq!(log_file, app_dir.join("logs").join("bikeshare-dash.log"));
    }

    // ── normalise_level ───────────────────────────────────────────────────────

    #[test]
    fn test_normalise_level() {
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("CRITICAL"), "error");
        assert_eq!(normalise_level("critical"), "error");
        assert_eq!(normalise_level("info"), "info");
        assert_eq!(normalise_level("ERROR"), "error");
        assert_eq!(normalise_level("trace"), "trace");
    }

    // ── data_source ───────────────────────────────────────────────────────────

    #[test]
    fn test_data_source_from_settings() {
        let settings = Settings::parse_from([
            "bikeshare-dash",
            "--data-dir",
            "/srv/bikes",
            "--fallback-dir",
            "raw",
            "--daily-only",
        ]);
        let source = data_source(&settings).unwrap();
        assert_eq!(source.data_dir, PathBuf::from("/srv/bikes"));
        assert_eq!(source.fallback_dir, PathBuf::from("raw"));
        assert!(!source.include_hourly);
    }

    #[test]
    fn test_data_source_rejects_empty_fallback() {
        let settings = Settings::parse_from(["bikeshare-dash", "--fallback-dir", " "]);
        let err = data_source(&settings).unwrap_err();
        assert!(matches!(err, RentalError::Config(_)));
    }

    // ── resolve_range ─────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_range_defaults_to_bounds() {
        assert_eq!(resolve_range(None, None, bounds()).unwrap(), bounds());
    }

    #[test]
    fn test_resolve_range_within_bounds() {
        let range = resolve_range(Some(day(2011, 6, 1)), Some(day(2011, 6, 30)), bounds()).unwrap();
        assert_eq!(range.start(), day(2011, 6, 1));
        assert_eq!(range.end(), day(2011, 6, 30));
    }

    #[test]
    fn test_resolve_range_clamps_overlap() {
        let range = resolve_range(Some(day(2010, 6, 1)), Some(day(2011, 2, 1)), bounds()).unwrap();
        assert_eq!(range.start(), day(2011, 1, 1));
        assert_eq!(range.end(), day(2011, 2, 1));
    }

    #[test]
    fn test_resolve_range_single_day() {
        let range = resolve_range(Some(day(2012, 3, 4)), Some(day(2012, 3, 4)), bounds()).unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_resolve_range_disjoint_is_kept() {
        let range = resolve_range(Some(day(2013, 1, 1)), Some(day(2013, 2, 1)), bounds()).unwrap();
        assert_eq!(range.start(), day(2013, 1, 1));
        assert_eq!(range.end(), day(2013, 2, 1));
    }

    #[test]
    fn test_resolve_range_start_only_past_data() {
        let range = resolve_range(Some(day(2013, 1, 1)), None, bounds()).unwrap();
        assert_eq!(range, DateRange::single(day(2013, 1, 1)));
    }

    #[test]
    fn test_resolve_range_end_only_before_data() {
        let range = resolve_range(None, Some(day(2010, 12, 1)), bounds()).unwrap();
        assert_eq!(range, DateRange::single(day(2010, 12, 1)));
    }

    #[test]
    fn test_resolve_range_start_only_within_data() {
        let range = resolve_range(Some(day(2012, 6, 1)), None, bounds()).unwrap();
        assert_eq!(range.start(), day(2012, 6, 1));
        assert_eq!(range.end(), day(2012, 12, 31));
    }

    #[test]
    fn test_resolve_range_inverted_is_error() {
        let err = resolve_range(Some(day(2012, 2, 1)), Some(day(2012, 1, 1)), bounds()).unwrap_err();
        assert!(matches!(err, RentalError::InvalidDateRange { .. }));
    }
}
