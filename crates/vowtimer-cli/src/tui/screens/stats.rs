use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use vowtimer_core::stats::format_minutes;
use vowtimer_core::SessionStats;

use super::frame_block;
use crate::tui::app::{AppEvent, Effect, Route, Screen};
use crate::tui::tasks::{StoreResult, StoreTask};
use crate::tui::theme::Theme;

pub struct StatsScreen {
    stats: Option<SessionStats>,
    loading: bool,
    error: Option<String>,
}

impl StatsScreen {
    pub fn new() -> Self {
        Self {
            stats: None,
            loading: true,
            error: None,
        }
    }

    fn stat_line<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{label:<20}"), theme.secondary),
            Span::styled(value, theme.normal),
        ])
    }

    fn body(&self, theme: &Theme) -> Vec<Line<'_>> {
        let Some(stats) = &self.stats else {
            return Vec::new();
        };
        let mut lines = vec![
            Line::styled("📜 Your Record", theme.title),
            Line::raw(""),
            Self::stat_line("Sessions", stats.total_sessions.to_string(), theme),
            Self::stat_line("Vows kept", stats.completed_sessions.to_string(), theme),
            Self::stat_line("Vows broken", stats.abandoned_sessions.to_string(), theme),
            Self::stat_line("Completion rate", format!("{}%", stats.completion_rate()), theme),
            Self::stat_line("Focused time", format_minutes(stats.total_minutes), theme),
            Line::raw(""),
            Self::stat_line("Current streak", format!("{} days", stats.current_streak), theme),
            Self::stat_line("Longest streak", format!("{} days", stats.longest_streak), theme),
            Line::raw(""),
            Line::styled("By subject", theme.title),
        ];
        if stats.by_subject.is_empty() {
            lines.push(Line::styled("  No completed sessions yet.", theme.muted));
        }
        for (name, count) in &stats.by_subject {
            lines.push(Line::from(vec![
                Span::styled(format!("  {name:<18}"), theme.normal),
                Span::styled(count.to_string(), theme.gold),
            ]));
        }
        lines
    }
}

impl Default for StatsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for StatsScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        vec![Effect::Spawn(StoreTask::LoadStats)]
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) => match key.code {
                KeyCode::Char('r') => {
                    self.loading = true;
                    vec![Effect::Spawn(StoreTask::LoadStats)]
                }
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
                    vec![Effect::Navigate(Route::Menu)]
                }
                _ => Vec::new(),
            },
            AppEvent::Store(StoreResult::Stats(result)) => {
                self.loading = false;
                match result {
                    Ok(stats) => {
                        self.stats = Some(stats.clone());
                        self.error = None;
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inner = frame_block(frame, area, "Statistics", theme);
        let rows = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        let body = if self.loading && self.stats.is_none() {
            vec![Line::styled("Loading...", theme.muted)]
        } else {
            self.body(theme)
        };
        frame.render_widget(Paragraph::new(body), rows[0]);

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(format!("Error: {error}"), theme.danger)),
                rows[1],
            );
        }

        frame.render_widget(
            Paragraph::new(theme.hints(&[("r", "refresh"), ("esc", "back")]))
                .alignment(Alignment::Center),
            rows[2],
        );
    }
}
