//! Application state and TUI event loop for the dashboard.
//!
//! [`App`] owns the theme, the loaded tables, the active date range and the
//! report computed for it. Every range change rebuilds the report from the
//! tables.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use rental_core::models::DateRange;
use rental_data::analysis::{build_report, DashboardReport, HourlyViews, RentalTables};
use tracing::debug;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::metrics::MetricsRow;
use crate::rfm_view;
use crate::themes::Theme;

// ── Page / RangeEdge ──────────────────────────────────────────────────────────

/// Which page of the dashboard is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Headline metrics and the daily line chart.
    Overview,
    /// Season, month, year, weekday and weather bars.
    Categories,
    /// Recency / frequency per weekday.
    Rfm,
    /// Hour-of-day views. Only offered when hourly data was loaded.
    Hourly,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Categories => "Categories",
            Page::Rfm => "RFM",
            Page::Hourly => "Hourly",
        }
    }

    /// Pages available for the loaded tables, in tab order.
    pub fn available(has_hourly: bool) -> Vec<Page> {
        let mut pages = vec![Page::Overview, Page::Categories, Page::Rfm];
        if has_hourly {
            pages.push(Page::Hourly);
        }
        pages
    }
}

/// The range edge the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdge {
    Start,
    End,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    tables: RentalTables,
    /// `[min, max]` of the daily table; the selectable range.
    pub bounds: DateRange,
    pub range: DateRange,
    pub focus: RangeEdge,
    pub pages: Vec<Page>,
    pub page: Page,
    pub report: DashboardReport,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Build the app and compute the initial report for `range`.
    pub fn new(theme_name: &str, tables: RentalTables, range: DateRange) -> Self {
        let bounds = tables.date_bounds().unwrap_or(range);
        let pages = Page::available(tables.has_hourly());
        let report = build_report(&tables, range);
        Self {
            theme: Theme::from_name(theme_name),
            tables,
            bounds,
            range,
            focus: RangeEdge::Start,
            pages,
            page: Page::Overview,
            report,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout and yields to the
    /// runtime between polls so an outer `select!` can observe signals.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }

            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press to the app state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.cycle_page(1),
            KeyCode::BackTab => self.cycle_page(-1),
            KeyCode::Char('s') => self.focus = RangeEdge::Start,
            KeyCode::Char('e') => self.focus = RangeEdge::End,
            KeyCode::Left => self.shift_focused(-1),
            KeyCode::Right => self.shift_focused(1),
            KeyCode::Down => self.shift_focused(-7),
            KeyCode::Up => self.shift_focused(7),
            KeyCode::Char('r') => self.set_range(self.bounds),
            _ => {}
        }
    }

    fn cycle_page(&mut self, step: isize) {
        let count = self.pages.len() as isize;
        let current = self
            .pages
            .iter()
            .position(|p| *p == self.page)
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(count) as usize;
        if let Some(page) = self.pages.get(next) {
            self.page = *page;
        }
    }

    fn shift_focused(&mut self, days: i64) {
        let range = match self.focus {
            RangeEdge::Start => self.range.shift_start(days, &self.bounds),
            RangeEdge::End => self.range.shift_end(days, &self.bounds),
        };
        self.set_range(range);
    }

    fn set_range(&mut self, range: DateRange) {
        if range != self.range {
            self.range = range;
            self.refresh();
        }
    }

    /// Recompute the report for the current range.
    pub fn refresh(&mut self) {
        self.report = build_report(&self.tables, self.range);
        debug!(
            "Range {} rebuilt in {:.3}s",
            self.range, self.report.metadata.build_time_seconds
        );
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current page into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, body] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(frame.area());

        let header = Header::new(self.range, self.focus, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);
        self.render_tabs(frame, tabs_area);

        if self.report.is_empty() {
            chart_view::render_no_data(frame, body, &self.theme);
            return;
        }

        match self.page {
            Page::Overview => self.render_overview(frame, body),
            Page::Categories => self.render_categories(frame, body),
            Page::Rfm => rfm_view::render_rfm_view(frame, body, &self.report.rfm, &self.theme),
            Page::Hourly => match &self.report.hourly {
                Some(hourly) => self.render_hourly(frame, body, hourly),
                None => chart_view::render_no_data(frame, body, &self.theme),
            },
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = self.pages.iter().map(|p| Line::from(p.title())).collect();
        let selected = self
            .pages
            .iter()
            .position(|p| *p == self.page)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let [metrics_area, chart_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
        MetricsRow::new(&self.report.metrics, &self.theme).render(frame, metrics_area);
        chart_view::render_daily_chart(frame, chart_area, &self.report.daily, &self.theme);
    }

    fn render_categories(&self, frame: &mut Frame, area: Rect) {
        let [top, bottom] = Layout::vertical([Constraint::Percentage(50); 2]).areas(area);
        let top_cells: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(top);
        let bottom_cells: [Rect; 2] =
            Layout::horizontal([Constraint::Ratio(1, 2); 2]).areas(bottom);

        let report = &self.report;
        let placements = [
            (&report.by_season, top_cells[0]),
            (&report.by_year, top_cells[1]),
            (&report.by_weather, top_cells[2]),
            (&report.by_month, bottom_cells[0]),
            (&report.by_weekday, bottom_cells[1]),
        ];
        for (summary, cell) in placements {
            chart_view::render_group_summary(frame, cell, summary, &self.theme);
        }
    }

    fn render_hourly(&self, frame: &mut Frame, area: Rect, hourly: &HourlyViews) {
        let [top, bottom] = Layout::vertical([Constraint::Percentage(50); 2]).areas(area);
        let [pattern_area, buckets_area] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(bottom);

        chart_view::render_hourly_mean(frame, top, &hourly.hourly_mean, &self.theme);
        chart_view::render_hourly_pattern(frame, pattern_area, &hourly.pattern, &self.theme);
        chart_view::render_time_of_day(frame, buckets_area, &hourly.time_of_day, &self.theme);
    }
}

/// Leave raw mode and the alternate screen.
///
/// Also called by the binary when a signal interrupts [`App::run`].
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
