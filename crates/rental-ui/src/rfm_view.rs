//! Recency / frequency view per weekday.
//!
//! Two bar charts (recency, frequency) side by side, a grouped
//! casual-vs-registered bar chart and a summary table.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Row, Table},
    Frame,
};
use rental_core::formatting::{format_count, format_number, percentage};
use rental_core::labels::weekday_name;
use rental_data::aggregator::RfmRow;

use crate::chart_view::{bar_width, render_bars, render_no_data, titled_block};
use crate::themes::Theme;

/// Render the full RFM page into `area`.
pub fn render_rfm_view(frame: &mut Frame, area: Rect, rows: &[RfmRow], theme: &Theme) {
    if rows.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let [top, middle, bottom] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Min(0),
    ])
    .areas(area);
    let [recency_area, frequency_area] =
        Layout::horizontal([Constraint::Percentage(50); 2]).areas(top);

    let recency: Vec<(String, u64)> = rows
        .iter()
        .map(|r| (short_name(r), r.recency))
        .collect();
    let frequency: Vec<(String, u64)> = rows
        .iter()
        .map(|r| (short_name(r), r.frequency as u64))
        .collect();

    render_bars(frame, recency_area, "Recency (days)", &recency, theme);
    render_bars(frame, frequency_area, "Frequency (days seen)", &frequency, theme);
    render_rider_split(frame, middle, rows, theme);
    render_rfm_table(frame, bottom, rows, theme);
}

/// Casual and registered totals per weekday as grouped bars.
fn render_rider_split(frame: &mut Frame, area: Rect, rows: &[RfmRow], theme: &Theme) {
    let groups: Vec<(String, [Bar; 2])> = rows
        .iter()
        .map(|r| {
            (
                short_name(r),
                [
                    rider_bar(r.total_casual, theme.series_primary, theme),
                    rider_bar(r.total_registered, theme.series_secondary, theme),
                ],
            )
        })
        .collect();

    // Two bars per group, one column of gap between groups.
    let width = bar_width(area, rows.len() * 2 + rows.len());
    let title = Line::from(vec![
        Span::styled(" Casual ", theme.series_primary),
        Span::styled("vs", theme.label),
        Span::styled(" Registered ", theme.series_secondary),
    ]);

    let chart = groups.iter().fold(
        BarChart::default()
            .block(titled_block("Riders by Weekday", theme).title_bottom(title))
            .bar_width(width)
            .bar_gap(0)
            .group_gap(1)
            .label_style(theme.label),
        |chart, (label, bars)| {
            chart.data(
                BarGroup::default()
                    .label(Line::from(label.clone()))
                    .bars(bars),
            )
        },
    );

    frame.render_widget(chart, area);
}

fn rider_bar<'a>(value: u64, style: ratatui::style::Style, theme: &Theme) -> Bar<'a> {
    Bar::default()
        .value(value)
        .text_value(format_count(value))
        .style(style)
        .value_style(theme.bar_value)
}

/// One row per weekday with the raw numbers behind the charts.
fn render_rfm_table(frame: &mut Frame, area: Rect, rows: &[RfmRow], theme: &Theme) {
    let header = Row::new(
        [
            "Weekday",
            "Recency",
            "Frequency",
            "Casual",
            "Registered",
            "Casual %",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let riders = (r.total_casual + r.total_registered) as f64;
            let casual_share = percentage(r.total_casual as f64, riders, 1);
            Row::new(vec![
                Cell::from(weekday_name(r.weekday)),
                Cell::from(format!("{} d", r.recency)),
                Cell::from(r.frequency.to_string()),
                Cell::from(format_count(r.total_casual)),
                Cell::from(format_count(r.total_registered)),
                Cell::from(format!("{}%", format_number(casual_share, 1))),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(11),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(9),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(titled_block("Weekday Summary", theme))
        .style(theme.text);

    frame.render_widget(table, area);
}

fn short_name(row: &RfmRow) -> String {
    row.weekday.to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
