use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use vowtimer_core::DisplayMode;

use super::{frame_block, step};
use crate::tui::app::{AppEvent, Effect, Route, Screen};
use crate::tui::tasks::{StoreResult, StoreTask};
use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    StartSession,
    ViewStats,
    ManageQuotes,
    ToggleDisplay,
    Quit,
}

const ITEMS: [MenuItem; 5] = [
    MenuItem::StartSession,
    MenuItem::ViewStats,
    MenuItem::ManageQuotes,
    MenuItem::ToggleDisplay,
    MenuItem::Quit,
];

impl MenuItem {
    fn icon(self, mode: DisplayMode) -> &'static str {
        match self {
            MenuItem::StartSession => "🎯",
            MenuItem::ViewStats => "📜",
            MenuItem::ManageQuotes => "💬",
            MenuItem::ToggleDisplay if mode == DisplayMode::Poems => "📖",
            MenuItem::ToggleDisplay => "💬",
            MenuItem::Quit => "🚪",
        }
    }

    fn label(self, mode: DisplayMode) -> String {
        match self {
            MenuItem::StartSession => "Start Focus Session".into(),
            MenuItem::ViewStats => "View Statistics".into(),
            MenuItem::ManageQuotes => "Manage Quotes".into(),
            MenuItem::ToggleDisplay => format!("Display: {}", mode.label()),
            MenuItem::Quit => "Quit".into(),
        }
    }
}

pub struct MenuScreen {
    index: usize,
    mode: DisplayMode,
    streak: Option<u32>,
}

impl MenuScreen {
    pub fn new(mode: DisplayMode, streak: Option<u32>) -> Self {
        Self {
            index: 0,
            mode,
            streak,
        }
    }

    fn select(&mut self) -> Vec<Effect> {
        match ITEMS[self.index] {
            MenuItem::StartSession => vec![Effect::Navigate(Route::SubjectSelect)],
            MenuItem::ViewStats => vec![Effect::Navigate(Route::Stats)],
            MenuItem::ManageQuotes => vec![Effect::Navigate(Route::QuotesAdmin)],
            MenuItem::ToggleDisplay => {
                self.mode = self.mode.toggle();
                vec![Effect::SetDisplayMode(self.mode)]
            }
            MenuItem::Quit => vec![Effect::Quit],
        }
    }
}

impl Screen for MenuScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        vec![Effect::Spawn(StoreTask::LoadStats)]
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.index = step(self.index, ITEMS.len(), false);
                    Vec::new()
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.index = step(self.index, ITEMS.len(), true);
                    Vec::new()
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.select(),
                KeyCode::Char('q') | KeyCode::Esc => vec![Effect::Quit],
                _ => Vec::new(),
            },
            AppEvent::Store(StoreResult::Stats(Ok(stats))) => {
                self.streak = Some(stats.current_streak);
                Vec::new()
            }
            // The streak line is decoration; a failed refresh keeps the old value.
            _ => Vec::new(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inner = frame_block(frame, area, "⚔ Vow", theme);
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(ITEMS.len() as u16 + 1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        let version = Paragraph::new(Line::from(vec![
            Span::styled("Keep your word. ", theme.secondary),
            Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), theme.muted),
        ]));
        frame.render_widget(version, rows[0]);

        let items: Vec<Line> = ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let selected = i == self.index;
                let cursor = if selected { "▸ " } else { "  " };
                let style = if selected { theme.selected } else { theme.normal };
                Line::from(vec![
                    Span::styled(cursor, theme.gold),
                    Span::raw(format!("{} ", item.icon(self.mode))),
                    Span::styled(format!(" {} ", item.label(self.mode)), style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(items), rows[1]);

        let streak = match self.streak {
            Some(days) if days > 0 => Line::styled(format!("⚡ {days} day streak"), theme.gold),
            _ => Line::styled("Start a session to begin your streak!", theme.muted),
        };
        frame.render_widget(Paragraph::new(streak), rows[2]);

        let footer = Paragraph::new(theme.hints(&[
            ("↑/↓", "Navigate"),
            ("Enter", "Select"),
            ("q", "Quit"),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(footer, rows[4]);
    }
}
