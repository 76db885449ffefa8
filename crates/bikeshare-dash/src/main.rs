mod bootstrap;

use std::io::Write;

use anyhow::Result;
use rental_core::settings::Settings;
use rental_core::RentalError;
use rental_data::analysis::build_report;
use rental_data::reader::load_tables;
use rental_ui::app::{restore_terminal, App};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    // The dashboard owns the terminal, so its logs go to a file by default.
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| settings.is_interactive().then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_ref())?;

    tracing::info!("Bike-share dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    for notice in &settings.notices {
        tracing::warn!("{}", notice);
    }
    tracing::info!(
        "Data dir: {}, Output: {}, Theme: {}, Daily only: {}",
        bootstrap::describe_dir(&settings.data_dir),
        settings.output,
        settings.theme,
        settings.daily_only
    );

    let source = bootstrap::data_source(&settings)?;
    let tables = load_tables(&source)?;

    let Some(bounds) = tables.date_bounds() else {
        anyhow::bail!("The daily table has no rows; nothing to show");
    };
    let range = bootstrap::resolve_range(settings.start, settings.end, bounds)?;
    tracing::info!("Dataset covers {}; showing {}", bounds, range);

    match settings.output.as_str() {
        "json" => {
            let report = build_report(&tables, range);
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }

        _ => {
            let app = App::new(&settings.theme, tables, range);

            // The loop exits on 'q' / Ctrl+C inside the TUI. The OS-level
            // signal covers Ctrl+C delivered outside raw mode.
            tokio::select! {
                result = app.run() => {
                    result.map_err(|e| RentalError::Terminal(e.to_string()))?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                    restore_terminal().map_err(|e| RentalError::Terminal(e.to_string()))?;
                }
            }
        }
    }

    Ok(())
}
