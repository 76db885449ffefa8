//! Chart widgets for the overview, category and hourly pages.
//!
//! Each function renders one view of a [`DashboardReport`] into the given
//! area. Values are plotted as-is; styling comes from the [`Theme`].
//!
//! [`DashboardReport`]: rental_data::analysis::DashboardReport

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use rental_core::formatting::format_count;
use rental_core::models::{DayType, RentalRecord, TimeOfDay};
use rental_data::aggregator::{GroupSummary, GroupTotal, HourlyMean, HourlyPattern};

use crate::themes::Theme;

// ── Line charts ───────────────────────────────────────────────────────────────

/// Daily total rentals as a time-series line.
pub fn render_daily_chart(frame: &mut Frame, area: Rect, daily: &[RentalRecord], theme: &Theme) {
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        render_no_data(frame, area, theme);
        return;
    };

    // x = days since the first plotted date, so gaps stay visible.
    let points: Vec<(f64, f64)> = daily
        .iter()
        .map(|r| ((r.date - first.date).num_days() as f64, r.total as f64))
        .collect();
    let x_max = points.last().map_or(0.0, |p| p.0).max(1.0);
    let y_max = axis_max(daily.iter().map(|r| r.total));

    let dataset = Dataset::default()
        .name("Total rentals")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.series_primary)
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(titled_block("Daily Rentals", theme))
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, x_max])
                .labels(vec![first.date.to_string(), last.date.to_string()]),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(vec!["0".to_string(), format_count(y_max as u64)]),
        );

    frame.render_widget(chart, area);
}

/// Mean rentals per hour, one line per day type.
pub fn render_hourly_pattern(frame: &mut Frame, area: Rect, pattern: &HourlyPattern, theme: &Theme) {
    if pattern.cells.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let series: Vec<(DayType, Vec<(f64, f64)>, Style)> = [
        (DayType::Weekday, theme.series_primary),
        (DayType::Weekend, theme.series_secondary),
    ]
    .into_iter()
    .map(|(day_type, style)| {
        let points = pattern
            .series(day_type)
            .into_iter()
            .map(|(hour, mean)| (f64::from(hour), mean))
            .collect();
        (day_type, points, style)
    })
    .collect();

    let y_max = pattern
        .cells
        .iter()
        .map(|c| c.mean)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(day_type, points, style)| {
            Dataset::default()
                .name(day_type.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(*style)
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(titled_block("Hourly Pattern: Weekday vs Weekend", theme))
        .x_axis(
            Axis::default()
                .title("hour")
                .style(theme.axis)
                .bounds([0.0, 23.0])
                .labels(vec!["0", "6", "12", "18", "23"]),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(vec!["0".to_string(), format_count(y_max.round() as u64)]),
        );

    frame.render_widget(chart, area);
}

// ── Bar charts ────────────────────────────────────────────────────────────────

/// One categorical summary as a labeled bar chart, largest first.
pub fn render_group_summary(frame: &mut Frame, area: Rect, summary: &GroupSummary, theme: &Theme) {
    let labeled = summary.labeled();
    render_bars(frame, area, summary.key.title(), &labeled, theme);
}

/// Mean rentals per hour of day.
pub fn render_hourly_mean(frame: &mut Frame, area: Rect, means: &[HourlyMean], theme: &Theme) {
    let labeled: Vec<(String, u64)> = means
        .iter()
        .map(|m| (m.hour.to_string(), m.mean.round() as u64))
        .collect();
    render_bars(frame, area, "Average Rentals by Hour", &labeled, theme);
}

/// Total rentals per time-of-day bucket.
pub fn render_time_of_day(
    frame: &mut Frame,
    area: Rect,
    totals: &[GroupTotal<TimeOfDay>],
    theme: &Theme,
) {
    let labeled: Vec<(String, u64)> = totals
        .iter()
        .map(|t| (t.key.label().to_string(), t.total))
        .collect();
    render_bars(frame, area, "Rentals by Time of Day", &labeled, theme);
}

/// Shared vertical bar chart for `(label, value)` pairs.
pub(crate) fn render_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    labeled: &[(String, u64)],
    theme: &Theme,
) {
    if labeled.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let bars: Vec<Bar> = labeled
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .text_value(format_count(*value))
                .style(theme.series_primary)
                .value_style(theme.bar_value)
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block(title, theme))
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(area, labeled.len()))
        .bar_gap(1)
        .label_style(theme.label);

    frame.render_widget(chart, area);
}

// ── Placeholder ───────────────────────────────────────────────────────────────

/// Render a placeholder when the selected range contains no rows.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No rentals in the selected range", theme.placeholder)),
        Line::from(""),
        Line::from(Span::styled("Press 'r' to reset the range", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .alignment(Alignment::Center)
            .block(titled_block("Bike-Share Dashboard", theme)),
        area,
    );
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn titled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(format!(" {title} "), theme.header))
}

/// Widest bar that still fits `count` bars (plus gaps) inside `area`.
pub(crate) fn bar_width(area: Rect, count: usize) -> u16 {
    let inner = area.width.saturating_sub(2);
    let count = u16::try_from(count.max(1)).unwrap_or(u16::MAX);
    (inner / count).saturating_sub(1).clamp(1, 12)
}

/// Upper y-axis bound: the largest value, never below 1.
fn axis_max(values: impl Iterator<Item = u64>) -> f64 {
    values.max().unwrap_or(0).max(1) as f64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
