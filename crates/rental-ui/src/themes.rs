use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Absent or unparseable values count as dark.
pub fn detect_background() -> BackgroundType {
    parse_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn parse_colorfgbg(value: Option<&str>) -> BackgroundType {
    let background = value
        .and_then(|v| v.split(';').next_back())
        .and_then(|bg| bg.parse::<u8>().ok());
    match background {
        Some(bg) if bg > 6 => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Every style the dashboard components use.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Highlighted range edge the arrow keys move.
    pub focus: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,
    pub placeholder: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub border: Style,
    pub axis: Style,
    /// Primary series: totals, casual riders, weekdays.
    pub series_primary: Style,
    /// Secondary series: registered riders, weekends.
    pub series_secondary: Style,
    pub bar_value: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            focus: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            border: Style::default().fg(Color::DarkGray),
            axis: Style::default().fg(Color::Gray),
            series_primary: Style::default().fg(Color::Cyan),
            series_secondary: Style::default().fg(Color::Magenta),
            bar_value: Style::default().fg(Color::Black).bg(Color::Cyan),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            focus: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            placeholder: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),

            border: Style::default().fg(Color::Gray),
            axis: Style::default().fg(Color::DarkGray),
            series_primary: Style::default().fg(Color::Blue),
            series_secondary: Style::default().fg(Color::Red),
            bar_value: Style::default().fg(Color::White).bg(Color::Blue),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
        }
    }

    /// Classic theme using only the basic ANSI palette and no modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),
            tab_active: Style::default().fg(Color::Black).bg(Color::White),
            tab_inactive: Style::default().fg(Color::White),
            focus: Style::default().fg(Color::Yellow),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),
            placeholder: Style::default().fg(Color::DarkGray),

            border: Style::default().fg(Color::DarkGray),
            axis: Style::default().fg(Color::White),
            series_primary: Style::default().fg(Color::Green),
            series_secondary: Style::default().fg(Color::Yellow),
            bar_value: Style::default().fg(Color::Black).bg(Color::Green),

            table_header: Style::default().fg(Color::Cyan),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Alternating row style for tables.
    pub fn row_style(&self, index: usize) -> Style {
        if index % 2 == 0 {
            self.table_row
        } else {
            self.table_row_alt
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.series_primary.fg, Some(Color::Cyan));
        assert_eq!(t.series_secondary.fg, Some(Color::Magenta));
        assert!(t.focus.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_modifiers() {
        let t = Theme::classic();
        assert!(t.header.add_modifier.is_empty());
        assert!(t.focus.add_modifier.is_empty());
        assert!(t.value.add_modifier.is_empty());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(Theme::from_name("classic")
            .header
            .add_modifier
            .is_empty());
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    #[test]
    fn test_parse_colorfgbg() {
        assert_eq!(parse_colorfgbg(Some("15;0")), BackgroundType::Dark);
        assert_eq!(parse_colorfgbg(Some("0;15")), BackgroundType::Light);
        assert_eq!(parse_colorfgbg(Some("0;default;7")), BackgroundType::Light);
        assert_eq!(parse_colorfgbg(Some("garbage")), BackgroundType::Dark);
        assert_eq!(parse_colorfgbg(None), BackgroundType::Dark);
    }

    #[test]
    fn test_row_style_alternates() {
        let t = Theme::dark();
        assert_eq!(t.row_style(0), t.table_row);
        assert_eq!(t.row_style(1), t.table_row_alt);
        assert_eq!(t.row_style(2), t.table_row);
    }
}
