use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive dashboard for bike-share rental data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bikeshare-dash",
    about = "Interactive dashboard for bike-share rental data",
    version
)]
pub struct Settings {
    /// Directory searched first for day.csv and hour.csv
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Subdirectory of the data directory searched when a table is missing
    #[arg(long, default_value = "data")]
    pub fallback_dir: String,

    /// First day of the range (YYYY-MM-DD); defaults to the earliest date in the data
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD); defaults to the latest date in the data
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Skip the hourly table and show the daily views only
    #[arg(long)]
    pub daily_only: bool,

    /// Output mode
    #[arg(long, default_value = "tui", value_parser = ["tui", "json"])]
    pub output: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Problems met while merging or persisting last-used params. Parsing
    /// runs before logging is set up, so the caller logs these afterwards.
    #[arg(skip)]
    pub notices: Vec<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bikeshare-dash/last_used.json`.
///
/// Only presentation and location preferences are remembered; the date range
/// always starts from the dataset bounds or the command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".bikeshare-dash").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        Self::read_from(path).unwrap_or_default()
    }

    /// Like [`Self::load_from`], but a file that exists and does not parse
    /// is an error.
    pub fn read_from(path: &Path) -> Result<Self, serde_json::Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Self::load_with_last_used`] with an explicit argument list and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .notices
                    .push(format!("Could not clear {}: {}", config_path.display(), e));
            }
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::read_from(config_path).unwrap_or_else(|e| {
            settings.notices.push(format!(
                "Ignoring unreadable {}: {}",
                config_path.display(),
                e
            ));
            LastUsedParams::default()
        });

        // CLI always wins; clap stores arg ids under the field name.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "data_dir") {
            if let Some(v) = last.data_dir {
                settings.data_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "fallback_dir") {
            if let Some(v) = last.fallback_dir {
                settings.fallback_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output") {
            if let Some(v) = last.output {
                settings.output = v;
            }
        }

        settings = settings.apply_debug_flag();

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            settings.notices.push(format!(
                "Could not persist settings to {}: {}",
                config_path.display(),
                e
            ));
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Whether the interactive terminal dashboard was requested.
    pub fn is_interactive(&self) -> bool {
        self.output == "tui"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            data_dir: Some(s.data_dir.clone()),
            fallback_dir: Some(s.fallback_dir.clone()),
            output: Some(s.output.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            data_dir: Some(PathBuf::from("/srv/bikes")),
            fallback_dir: Some("dashboard".to_string()),
            output: Some("json".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/srv/bikes")));
        assert_eq!(loaded.fallback_dir, Some("dashboard".to_string()));
        assert_eq!(loaded.output, Some("json".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.theme.is_none());
        assert!(loaded.data_dir.is_none());
        assert!(loaded.output.is_none());
    }

    #[test]
    fn test_last_used_params_default_when_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let loaded = LastUsedParams::load_from(&path);
        assert!(loaded.theme.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── CLI parsing ───────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["bikeshare-dash"]);

        assert_eq!(settings.data_dir, PathBuf::from("."));
        assert_eq!(settings.fallback_dir, "data");
        assert!(settings.start.is_none());
        assert!(settings.end.is_none());
        assert!(!settings.daily_only);
        assert_eq!(settings.output, "tui");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(settings.is_interactive());
    }

    #[test]
    fn test_settings_cli_dates() {
        let settings = Settings::parse_from([
            "bikeshare-dash",
            "--start",
            "2011-03-01",
            "--end",
            "2011-03-31",
        ]);
        assert_eq!(settings.start, NaiveDate::from_ymd_opt(2011, 3, 1));
        assert_eq!(settings.end, NaiveDate::from_ymd_opt(2011, 3, 31));
    }

    #[test]
    fn test_settings_cli_rejects_bad_date() {
        let result = Settings::try_parse_from(["bikeshare-dash", "--start", "03/01/2011"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_cli_json_daily_only() {
        let settings =
            Settings::parse_from(["bikeshare-dash", "--output", "json", "--daily-only"]);
        assert_eq!(settings.output, "json");
        assert!(settings.daily_only);
        assert!(!settings.is_interactive());
    }

    #[test]
    fn test_settings_cli_rejects_unknown_output() {
        let result = Settings::try_parse_from(["bikeshare-dash", "--output", "png"]);
        assert!(result.is_err());
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            data_dir: Some(PathBuf::from("/srv/bikes")),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["bikeshare-dash".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.data_dir, PathBuf::from("/srv/bikes"));
        assert_eq!(settings.fallback_dir, "data");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dash".into(), "--theme".into(), "light".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dash".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists());
        assert_eq!(settings.theme, "auto");
    }

    #[test]
    fn test_load_with_last_used_reports_corrupt_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "{not json").unwrap();

        let settings =
            Settings::load_with_last_used_impl(vec!["bikeshare-dash".into()], &config_path);

        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.notices.len(), 1);
        assert!(settings.notices[0].starts_with("Ignoring unreadable"));
        assert!(settings.notices[0].contains("last_used.json"));
    }

    #[test]
    fn test_load_with_last_used_clean_run_has_no_notices() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dash".into()],
            &tmp_config_path(&tmp),
        );
        assert!(settings.notices.is_empty());
        assert!(Settings::parse_from(["bikeshare-dash"]).notices.is_empty());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["bikeshare-dash".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "bikeshare-dash".into(),
                "--data-dir".into(),
                "/opt/rentals".into(),
                "--start".into(),
                "2011-06-01".into(),
            ],
            &config_path,
        );

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/opt/rentals")));
        let raw = std::fs::read_to_string(&config_path).unwrap();
        assert!(!raw.contains("2011-06-01"), "dates must not be persisted");
    }
}
