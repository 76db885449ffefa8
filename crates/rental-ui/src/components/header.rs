use crate::app::RangeEdge;
use crate::themes::Theme;
use rental_core::models::DateRange;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Key hints shown on the last header line.
pub const KEY_HINTS: &str =
    "s/e focus edge · ←/→ ±1 day · ↑/↓ ±7 days · r reset · Tab page · q quit";

/// Dashboard header rendering four lines:
///
/// 1. Application title with accents (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. The active range as `[ start → end | N days ]`, focused edge highlighted.
/// 4. Key hints.
pub struct Header<'a> {
    pub range: DateRange,
    pub focus: RangeEdge,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(range: DateRange, focus: RangeEdge, theme: &'a Theme) -> Self {
        Self {
            range,
            focus,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let edge_style = |edge: RangeEdge| {
            if edge == self.focus {
                self.theme.focus
            } else {
                self.theme.value
            }
        };

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" BIKE-SHARE RENTAL DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.range.start().to_string(), edge_style(RangeEdge::Start)),
                Span::styled(" → ", self.theme.label),
                Span::styled(self.range.end().to_string(), edge_style(RangeEdge::End)),
                Span::styled(" | ", self.theme.label),
                Span::styled(day_count(self.range.days()), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(Span::styled(KEY_HINTS, self.theme.dim)),
        ]
    }
}

fn day_count(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
