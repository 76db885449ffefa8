use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rental_core::formatting::format_count;
use rental_data::aggregator::SummaryMetrics;

use crate::themes::Theme;

/// The three headline metric boxes shown on the overview page.
pub struct MetricsRow<'a> {
    pub metrics: &'a SummaryMetrics,
    pub theme: &'a Theme,
}

impl<'a> MetricsRow<'a> {
    pub fn new(metrics: &'a SummaryMetrics, theme: &'a Theme) -> Self {
        Self { metrics, theme }
    }

    /// `(title, formatted value)` per box, left to right.
    pub fn cards(&self) -> [(&'static str, String); 3] {
        [
            ("Total Rentals", format_count(self.metrics.total_rentals)),
            ("Casual Riders", format_count(self.metrics.total_casual)),
            ("Registered Riders", format_count(self.metrics.total_registered)),
        ]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let areas: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(area);

        for ((title, value), cell) in self.cards().into_iter().zip(areas) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border)
                .title(Span::styled(format!(" {title} "), self.theme.label));
            let body = Paragraph::new(Line::from(Span::styled(value, self.theme.value)))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(body, cell);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn sample() -> SummaryMetrics {
        SummaryMetrics {
            total_rentals: 3_292_679,
            total_casual: 620_017,
            total_registered: 2_672_662,
        }
    }

    #[test]
    fn test_cards_use_thousands_separators() {
        let metrics = sample();
        let theme = Theme::dark();
        let cards = MetricsRow::new(&metrics, &theme).cards();
        assert_eq!(cards[0], ("Total Rentals", "3,292,679".to_string()));
        assert_eq!(cards[1].1, "620,017");
        assert_eq!(cards[2].1, "2,672,662");
    }

    #[test]
    fn test_render_shows_values() {
        let metrics = sample();
        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(90, 3)).unwrap();
        terminal
            .draw(|f| MetricsRow::new(&metrics, &theme).render(f, f.area()))
            .unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(rendered.contains("3,292,679"));
        assert!(rendered.contains("Registered Riders"));
    }

    #[test]
    fn test_render_zero_metrics() {
        let metrics = SummaryMetrics::default();
        let theme = Theme::classic();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|f| MetricsRow::new(&metrics, &theme).render(f, f.area()))
            .unwrap();
    }
}
