use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use vowtimer_core::storage::config::parse_hex_color;
use vowtimer_core::storage::ThemeConfig;

/// Theme tokens for consistent styling across the TUI.
///
/// Built once from `[theme]` in the config file and handed to every view.
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub border: Style,
    pub selected: Style,
    pub normal: Style,
    pub secondary: Style,
    pub muted: Style,
    pub gold: Style,
    pub danger: Style,
    pub warning: Style,
    pub success: Style,
    pub key_hint: Style,
    pub accent: Color,
}

fn color(hex: &str, fallback: Color) -> Color {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(fallback)
}

impl Theme {
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        let primary = color(&cfg.primary, Color::White);
        let secondary = color(&cfg.secondary, Color::Gray);
        let muted = color(&cfg.muted, Color::DarkGray);
        let gold = color(&cfg.gold, Color::Yellow);
        let success = color(&cfg.success, Color::Green);
        let warning = color(&cfg.warning, Color::Yellow);
        let danger = color(&cfg.danger, Color::Red);

        Self {
            title: Style::default().fg(gold).add_modifier(Modifier::BOLD),
            border: Style::default().fg(muted),
            selected: Style::default()
                .fg(Color::Black)
                .bg(gold)
                .add_modifier(Modifier::BOLD),
            normal: Style::default().fg(primary),
            secondary: Style::default().fg(secondary).add_modifier(Modifier::ITALIC),
            muted: Style::default().fg(muted),
            gold: Style::default().fg(gold).add_modifier(Modifier::BOLD),
            danger: Style::default().fg(danger).add_modifier(Modifier::BOLD),
            warning: Style::default().fg(warning).add_modifier(Modifier::BOLD),
            success: Style::default().fg(success).add_modifier(Modifier::BOLD),
            key_hint: Style::default().fg(gold).add_modifier(Modifier::BOLD),
            accent: gold,
        }
    }

    /// ` key ` label pairs for footers.
    pub fn hints<'a>(&self, pairs: &[(&'a str, &'a str)]) -> Line<'a> {
        let mut spans = Vec::with_capacity(pairs.len() * 3);
        for (i, (key, label)) in pairs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!(" {key} "), self.key_hint));
            spans.push(Span::styled(*label, self.muted));
        }
        Line::from(spans)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

/// Shrink rect by margin.
pub fn inner_rect(area: Rect, margin: u16) -> Rect {
    Rect {
        x: area.x + margin.min(area.width / 2),
        y: area.y + margin.min(area.height / 2),
        width: area.width.saturating_sub(margin * 2),
        height: area.height.saturating_sub(margin * 2),
    }
}

/// Center a popup of fixed height.
pub fn center_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
