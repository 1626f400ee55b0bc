//! The focus session itself.
//!
//! Ticks and content rotation are one-shot wake-ups scheduled through the
//! event loop. Each carries a generation number; any state change that
//! stops or restarts the countdown moves to a fresh generation, so a wake-up
//! scheduled before a quick pause/resume is recognised as stale and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Frame;
use vowtimer_core::storage::Subject;
use vowtimer_core::{Content, DisplayMode, Event, SessionTimer, TimerState};

use super::frame_block;
use crate::tui::app::{AppEvent, Effect, Route, Screen, Settings};
use crate::tui::tasks::{StoreResult, StoreTask};
use crate::tui::theme::{center_rect, inner_rect, Theme};

const TICK: Duration = Duration::from_secs(1);

// Shared by every timer screen so a wake-up from an earlier session can
// never match a later one.
static GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SaveStatus {
    Pending,
    Saved,
    Failed(String),
}

pub struct TimerScreen {
    timer: SessionTimer,
    mode: DisplayMode,
    rotation_interval: Duration,
    content: Content,
    tick_generation: u64,
    rotation_generation: u64,
    rotation_pending: bool,
    save: Option<SaveStatus>,
}

impl TimerScreen {
    pub fn new(subject: Subject, settings: &Settings) -> Self {
        Self {
            timer: SessionTimer::new(settings.duration_min, subject.id, subject.name),
            mode: settings.mode,
            rotation_interval: settings.rotation_interval,
            content: Content::fallback(settings.mode),
            tick_generation: 0,
            rotation_generation: 0,
            rotation_pending: false,
            save: None,
        }
    }

    fn schedule_tick(&self) -> Effect {
        Effect::Schedule {
            after: TICK,
            event: AppEvent::Tick {
                generation: self.tick_generation,
            },
        }
    }

    fn schedule_rotation(&mut self) -> Effect {
        self.rotation_generation = next_generation();
        self.rotation_pending = true;
        Effect::Schedule {
            after: self.rotation_interval,
            event: AppEvent::Rotate {
                generation: self.rotation_generation,
            },
        }
    }

    fn load_content(&self) -> Effect {
        Effect::Spawn(StoreTask::LoadContent {
            mode: self.mode,
            subject: Some(self.timer.subject_name().to_string()),
        })
    }

    /// React to whatever a timer command reported.
    fn apply(&mut self, event: Option<Event>) -> Vec<Effect> {
        match event {
            None => Vec::new(),
            Some(Event::SessionFinished { outcome, .. }) => {
                self.save = Some(SaveStatus::Pending);
                vec![Effect::Spawn(StoreTask::SaveSession(outcome))]
            }
            Some(_) => {
                // Any pending tick belongs to the old state.
                self.tick_generation = next_generation();
                let mut effects = Vec::new();
                if self.timer.is_running() {
                    effects.push(self.schedule_tick());
                    if !self.rotation_pending {
                        effects.push(self.schedule_rotation());
                    }
                }
                effects
            }
        }
    }

    fn on_tick(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.tick_generation || !self.timer.is_running() {
            return Vec::new();
        }
        match self.timer.tick() {
            Some(event) => self.apply(Some(event)),
            None => vec![self.schedule_tick()],
        }
    }

    fn on_rotate(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.rotation_generation {
            return Vec::new();
        }
        self.rotation_pending = false;
        if !self.timer.is_running() {
            return Vec::new();
        }
        vec![self.load_content(), self.schedule_rotation()]
    }

    fn on_key(&mut self, code: KeyCode) -> Vec<Effect> {
        if self.timer.is_finished() {
            return vec![Effect::Navigate(Route::Menu)];
        }
        let event = match (self.timer.state(), code) {
            (TimerState::ConfirmingAbandon, KeyCode::Char('y' | 'Y')) => self.timer.confirm_abandon(),
            (TimerState::ConfirmingAbandon, KeyCode::Char('n' | 'N') | KeyCode::Esc) => {
                self.timer.cancel_abandon()
            }
            (TimerState::ConfirmingAbandon, _) => None,
            (_, KeyCode::Char(' ' | 'p')) => self.timer.toggle_pause(),
            (_, KeyCode::Char('r')) => self.timer.reset(),
            (_, KeyCode::Char('q') | KeyCode::Esc) => self.timer.request_abandon(),
            _ => None,
        };
        self.apply(event)
    }

    fn render_content(&self, theme: &Theme) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        match &self.content {
            Content::Quote { text, .. } => {
                lines.push(Line::styled(format!("\"{text}\""), theme.secondary));
            }
            Content::Poem {
                old_english,
                modern_english,
                ..
            } => {
                lines.extend(old_english.lines().map(|l| Line::styled(l, theme.gold)));
                lines.push(Line::raw(""));
                lines.extend(modern_english.lines().map(|l| Line::styled(l, theme.secondary)));
            }
        }
        let attribution = self.content.attribution();
        if !attribution.is_empty() {
            lines.push(Line::styled(format!("    {attribution}"), theme.muted));
        }
        lines
    }

    fn render_running(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Event::StateSnapshot {
            state,
            subject_name,
            remaining_secs: remaining,
            percent_complete: percent,
            ..
        } = self.timer.snapshot()
        else {
            return;
        };
        let inner = frame_block(frame, area, "⚔ Vow", theme);
        let rows = Layout::vertical([
            Constraint::Min(4),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(self.render_content(theme)).wrap(Wrap { trim: false }),
            rows[0],
        );

        let status = match state {
            TimerState::Paused => Line::styled("Paused", theme.warning),
            _ => Line::from(vec![
                Span::styled("Focus Time: ", theme.secondary),
                Span::styled(subject_name, theme.gold),
            ]),
        };
        frame.render_widget(Paragraph::new(status), rows[1]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.accent))
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label("");
        frame.render_widget(gauge, rows[2]);

        let clock = Line::from(vec![
            Span::styled(format!("{:02}:{:02}", remaining / 60, remaining % 60), theme.gold),
            Span::styled(format!("  ({}% complete)", percent as u32), theme.muted),
        ]);
        frame.render_widget(Paragraph::new(clock), rows[3]);

        let toggle = if state == TimerState::Paused {
            "resume"
        } else {
            "pause"
        };
        frame.render_widget(
            Paragraph::new(theme.hints(&[("space", toggle), ("r", "reset"), ("q", "quit")]))
                .alignment(Alignment::Center),
            rows[4],
        );
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup = center_rect(area, 50, 8);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.danger)
                .title(" Give up? ")
                .title_style(theme.danger),
            popup,
        );
        let text = Paragraph::new(vec![
            Line::raw(""),
            Line::styled("This will be logged as abandoned 💀", theme.normal),
            Line::raw(""),
            Line::from(vec![
                Span::styled(" [y] ", theme.key_hint),
                Span::styled("yes, abandon", theme.danger),
                Span::raw("    "),
                Span::styled(" [n] ", theme.key_hint),
                Span::styled("no, continue", theme.normal),
            ]),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(text, inner_rect(popup, 1));
    }

    fn render_finished(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inner = frame_block(frame, area, "⚔ Vow", theme);
        let minutes = self.timer.duration_min();

        let mut lines = if self.timer.was_abandoned() {
            vec![
                Line::styled("The vow is broken.", theme.danger),
                Line::raw(""),
                Line::styled("This session was logged as abandoned.", theme.normal),
            ]
        } else {
            vec![
                Line::styled("Your vow is kept.", theme.success),
                Line::raw(""),
                Line::styled(
                    format!("You held to your word for {minutes} minutes."),
                    theme.normal,
                ),
                Line::styled("Your honour remains unbroken.", theme.normal),
            ]
        };
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Subject: ", theme.secondary),
            Span::styled(self.timer.subject_name(), theme.gold),
        ]));
        lines.push(Line::raw(""));
        lines.push(match &self.save {
            Some(SaveStatus::Saved) => Line::styled("Session recorded.", theme.success),
            Some(SaveStatus::Failed(e)) => {
                Line::styled(format!("Could not record session: {e}"), theme.danger)
            }
            _ => Line::styled("Recording session…", theme.muted),
        });
        lines.push(Line::raw(""));
        lines.push(Line::styled("Press any key to continue", theme.muted));

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }
}

impl Screen for TimerScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        self.tick_generation = next_generation();
        let tick = self.schedule_tick();
        let rotation = self.schedule_rotation();
        vec![tick, rotation, self.load_content()]
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Tick { generation } => self.on_tick(*generation),
            AppEvent::Rotate { generation } => self.on_rotate(*generation),
            AppEvent::Key(key) => self.on_key(key.code),
            AppEvent::Store(StoreResult::Content(content)) => {
                self.content = content.clone();
                Vec::new()
            }
            AppEvent::Store(StoreResult::SessionSaved(result)) => {
                self.save = Some(match result {
                    Ok(_) => SaveStatus::Saved,
                    Err(e) => SaveStatus::Failed(e.to_string()),
                });
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self.timer.state() {
            TimerState::Complete => self.render_finished(frame, area, theme),
            TimerState::ConfirmingAbandon => {
                self.render_running(frame, area, theme);
                self.render_confirmation(frame, area, theme);
            }
            TimerState::Running | TimerState::Paused => self.render_running(frame, area, theme),
        }
    }

    fn captures_interrupt(&self) -> bool {
        self.timer.state() == TimerState::ConfirmingAbandon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::test_support::{key, render_screen, settings, spawned, subject};
    use vowtimer_core::{CoreError, DatabaseError};

    fn screen() -> TimerScreen {
        TimerScreen::new(subject(7, "Music"), &settings())
    }

    fn tick_generation(effects: &[Effect]) -> Option<u64> {
        effects.iter().find_map(|e| match e {
            Effect::Schedule {
                event: AppEvent::Tick { generation },
                ..
            } => Some(*generation),
            _ => None,
        })
    }

    fn rotate_generation(effects: &[Effect]) -> Option<u64> {
        effects.iter().find_map(|e| match e {
            Effect::Schedule {
                event: AppEvent::Rotate { generation },
                ..
            } => Some(*generation),
            _ => None,
        })
    }

    #[test]
    fn entering_schedules_tick_rotation_and_content() {
        let mut timer = screen();
        let effects = timer.on_enter();
        assert!(tick_generation(&effects).is_some());
        assert!(rotate_generation(&effects).is_some());
        assert!(matches!(
            spawned(&effects)[..],
            [StoreTask::LoadContent {
                mode: DisplayMode::Quotes,
                ..
            }]
        ));
    }

    #[test]
    fn tick_decrements_and_reschedules_same_generation() {
        let mut timer = screen();
        let gen = tick_generation(&timer.on_enter()).unwrap();
        let effects = timer.handle_event(&AppEvent::Tick { generation: gen });
        assert_eq!(timer.timer.remaining_secs(), 59);
        assert_eq!(tick_generation(&effects), Some(gen));
    }

    #[test]
    fn running_view_shows_clock_and_progress() {
        let mut timer = screen();
        let gen = tick_generation(&timer.on_enter()).unwrap();
        for _ in 0..30 {
            timer.handle_event(&AppEvent::Tick { generation: gen });
        }
        let text = render_screen(&timer);
        assert!(text.contains("00:30"), "{text}");
        assert!(text.contains("(50% complete)"));
        assert!(text.contains(" space pause"));
    }

    #[test]
    fn quick_pause_resume_drops_stale_tick() {
        let mut timer = screen();
        let stale = tick_generation(&timer.on_enter()).unwrap();

        assert!(timer.handle_event(&key(KeyCode::Char(' '))).is_empty());
        let resumed = timer.handle_event(&key(KeyCode::Char(' ')));
        let fresh = tick_generation(&resumed).unwrap();
        assert_ne!(fresh, stale);

        // The wake-up scheduled before the pause arrives late.
        assert!(timer.handle_event(&AppEvent::Tick { generation: stale }).is_empty());
        assert_eq!(timer.timer.remaining_secs(), 60);

        timer.handle_event(&AppEvent::Tick { generation: fresh });
        assert_eq!(timer.timer.remaining_secs(), 59);
    }

    #[test]
    fn ticks_while_paused_do_nothing() {
        let mut timer = screen();
        let gen = tick_generation(&timer.on_enter()).unwrap();
        timer.handle_event(&key(KeyCode::Char('p')));
        assert!(timer.handle_event(&AppEvent::Tick { generation: gen }).is_empty());
        assert_eq!(timer.timer.remaining_secs(), 60);
        let text = render_screen(&timer);
        assert!(text.contains("Paused"));
    }

    #[test]
    fn countdown_to_zero_saves_completed_session() {
        let mut timer = screen();
        let mut gen = tick_generation(&timer.on_enter()).unwrap();
        let mut saved = None;
        for _ in 0..60 {
            let effects = timer.handle_event(&AppEvent::Tick { generation: gen });
            if let Some(next) = tick_generation(&effects) {
                gen = next;
            }
            if let [StoreTask::SaveSession(outcome)] = spawned(&effects)[..] {
                saved = Some(outcome.clone());
            }
        }
        let outcome = saved.expect("session saved");
        assert!(outcome.completed);
        assert_eq!(outcome.subject_name, "Music");
        assert!(timer.timer.is_finished());

        // Nothing schedules further ticks once complete.
        assert!(timer.handle_event(&AppEvent::Tick { generation: gen }).is_empty());
        assert!(render_screen(&timer).contains("Your vow is kept."));
    }

    #[test]
    fn abandon_flow_records_and_returns_to_menu() {
        let mut timer = screen();
        timer.on_enter();
        timer.handle_event(&key(KeyCode::Char('q')));
        assert!(timer.captures_interrupt());
        assert!(render_screen(&timer).contains("This will be logged as abandoned"));

        // "n" resumes with a fresh tick.
        let effects = timer.handle_event(&key(KeyCode::Char('n')));
        assert!(tick_generation(&effects).is_some());
        assert!(!timer.captures_interrupt());

        timer.handle_event(&key(KeyCode::Esc));
        let effects = timer.handle_event(&key(KeyCode::Char('y')));
        match spawned(&effects)[..] {
            [StoreTask::SaveSession(outcome)] => assert!(!outcome.completed),
            ref other => panic!("unexpected {other:?}"),
        }

        let failure = CoreError::Database(DatabaseError::Timeout);
        timer.handle_event(&AppEvent::Store(StoreResult::SessionSaved(Err(failure))));
        let text = render_screen(&timer);
        assert!(text.contains("The vow is broken."));
        assert!(text.contains("Could not record session"));

        // A save that outlived its budget can still land afterwards.
        let late = vowtimer_core::storage::Session {
            id: 3,
            subject_id: 1,
            subject_name: "Music".into(),
            duration_min: 1,
            status: vowtimer_core::storage::SessionStatus::Abandoned,
            started_at: chrono::Utc::now(),
            completed_at: chrono::Utc::now(),
        };
        timer.handle_event(&AppEvent::Store(StoreResult::SessionSaved(Ok(late))));
        assert!(render_screen(&timer).contains("Session recorded."));

        let effects = timer.handle_event(&key(KeyCode::Char('x')));
        assert!(matches!(effects[..], [Effect::Navigate(Route::Menu)]));
    }

    #[test]
    fn rotation_only_reloads_while_running() {
        let mut timer = screen();
        let rot = rotate_generation(&timer.on_enter()).unwrap();

        let effects = timer.handle_event(&AppEvent::Rotate { generation: rot });
        assert!(matches!(
            spawned(&effects)[..],
            [StoreTask::LoadContent { .. }]
        ));
        let next = rotate_generation(&effects).unwrap();

        // Fires while paused: consumed, nothing loaded.
        timer.handle_event(&key(KeyCode::Char(' ')));
        assert!(timer.handle_event(&AppEvent::Rotate { generation: next }).is_empty());

        // Resume brings rotation back.
        let effects = timer.handle_event(&key(KeyCode::Char(' ')));
        assert!(rotate_generation(&effects).is_some());
    }

    #[test]
    fn resume_with_pending_rotation_does_not_duplicate_it() {
        let mut timer = screen();
        timer.on_enter();
        timer.handle_event(&key(KeyCode::Char(' ')));
        let effects = timer.handle_event(&key(KeyCode::Char(' ')));
        assert!(tick_generation(&effects).is_some());
        assert!(rotate_generation(&effects).is_none());
    }

    #[test]
    fn loaded_content_is_displayed() {
        let mut timer = screen();
        timer.handle_event(&AppEvent::Store(StoreResult::Content(Content::Quote {
            text: "Without music, life would be a mistake.".into(),
            source: "Friedrich Nietzsche".into(),
        })));
        let text = render_screen(&timer);
        assert!(text.contains("Without music, life would be a mistake."));
        assert!(text.contains("Focus Time: Music"));
    }
}
