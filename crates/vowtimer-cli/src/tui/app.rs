//! Screen router.
//!
//! `App` owns exactly one active screen. Screens never talk to the store or
//! the clock directly: they answer events with [`Effect`]s which the router
//! either resolves itself (navigation) or hands to the event loop.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;
use vowtimer_core::storage::Subject;
use vowtimer_core::{Config, DisplayMode};

use super::screens::{MenuScreen, QuotesScreen, StatsScreen, SubjectSelectScreen, TimerScreen};
use super::tasks::{StoreResult, StoreTask};
use super::theme::Theme;

/// Everything that enters the event queue.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// One-second countdown wake-up.
    Tick { generation: u64 },
    /// Content rotation wake-up.
    Rotate { generation: u64 },
    Store(StoreResult),
}

impl AppEvent {
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            AppEvent::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Menu,
    SubjectSelect,
    Timer(Subject),
    Stats,
    QuotesAdmin,
}

/// Side effects requested by a screen.
#[derive(Debug)]
pub enum Effect {
    Spawn(StoreTask),
    /// Deliver `event` once after `after`.
    Schedule { after: Duration, event: AppEvent },
    Navigate(Route),
    SetDisplayMode(DisplayMode),
    Quit,
}

/// Capabilities shared by every screen.
pub trait Screen {
    /// Work to start when the screen becomes active.
    fn on_enter(&mut self) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect>;

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Whether Ctrl+C is handled by the screen instead of quitting.
    fn captures_interrupt(&self) -> bool {
        false
    }
}

pub enum ActiveScreen {
    Menu(MenuScreen),
    SubjectSelect(SubjectSelectScreen),
    Timer(TimerScreen),
    Stats(StatsScreen),
    QuotesAdmin(QuotesScreen),
}

impl ActiveScreen {
    fn inner(&self) -> &dyn Screen {
        match self {
            ActiveScreen::Menu(s) => s,
            ActiveScreen::SubjectSelect(s) => s,
            ActiveScreen::Timer(s) => s,
            ActiveScreen::Stats(s) => s,
            ActiveScreen::QuotesAdmin(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Screen {
        match self {
            ActiveScreen::Menu(s) => s,
            ActiveScreen::SubjectSelect(s) => s,
            ActiveScreen::Timer(s) => s,
            ActiveScreen::Stats(s) => s,
            ActiveScreen::QuotesAdmin(s) => s,
        }
    }

    pub fn route_name(&self) -> &'static str {
        match self {
            ActiveScreen::Menu(_) => "menu",
            ActiveScreen::SubjectSelect(_) => "subject_select",
            ActiveScreen::Timer(_) => "timer",
            ActiveScreen::Stats(_) => "stats",
            ActiveScreen::QuotesAdmin(_) => "quotes_admin",
        }
    }
}

impl Screen for ActiveScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        self.inner_mut().on_enter()
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        self.inner_mut().handle_event(event)
    }

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.inner().view(frame, area, theme)
    }

    fn captures_interrupt(&self) -> bool {
        self.inner().captures_interrupt()
    }
}

/// Settings screens are built with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub duration_min: u64,
    pub rotation_interval: Duration,
    pub mode: DisplayMode,
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            duration_min: cfg.timer.duration_min,
            rotation_interval: cfg.rotation_interval(),
            mode: cfg.display.mode,
        }
    }
}

pub struct App {
    screen: ActiveScreen,
    settings: Settings,
    theme: Theme,
    streak: Option<u32>,
}

impl App {
    pub fn new(settings: Settings, theme: Theme) -> Self {
        let screen = ActiveScreen::Menu(MenuScreen::new(settings.mode, None));
        Self {
            screen,
            settings,
            theme,
            streak: None,
        }
    }

    /// Effects of entering the first screen.
    pub fn start(&mut self) -> Vec<Effect> {
        let effects = self.screen.on_enter();
        self.resolve(effects)
    }

    #[cfg(test)]
    pub fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    #[cfg(test)]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        if event.is_interrupt() && !self.screen.captures_interrupt() {
            return vec![Effect::Quit];
        }

        if let AppEvent::Store(StoreResult::Stats(Ok(stats))) = event {
            self.streak = Some(stats.current_streak);
        }

        let mut effects = self.screen.handle_event(event);

        // A new session changes the streak shown on the menu.
        if let AppEvent::Store(StoreResult::SessionSaved(Ok(_))) = event {
            effects.push(Effect::Spawn(StoreTask::LoadStats));
        }

        self.resolve(effects)
    }

    pub fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        self.screen.view(frame, area, &self.theme);
    }

    /// Apply navigation and settings changes; return what the loop must run.
    fn resolve(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut out = Vec::new();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Navigate(route) => {
                    self.screen = self.build(route);
                    tracing::debug!(screen = self.screen.route_name(), "navigate");
                    queue.extend(self.screen.on_enter());
                }
                Effect::SetDisplayMode(mode) => {
                    tracing::info!(?mode, "display mode changed");
                    self.settings.mode = mode;
                }
                other => out.push(other),
            }
        }
        out
    }

    fn build(&self, route: Route) -> ActiveScreen {
        match route {
            Route::Menu => ActiveScreen::Menu(MenuScreen::new(self.settings.mode, self.streak)),
            Route::SubjectSelect => ActiveScreen::SubjectSelect(SubjectSelectScreen::new()),
            Route::Timer(subject) => ActiveScreen::Timer(TimerScreen::new(subject, &self.settings)),
            Route::Stats => ActiveScreen::Stats(StatsScreen::new()),
            Route::QuotesAdmin => ActiveScreen::QuotesAdmin(QuotesScreen::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::Utc;

    pub fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub fn ctrl_c() -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
    }

    pub fn subject(id: i64, name: &str) -> Subject {
        Subject {
            id,
            name: name.into(),
            icon: "📚".into(),
            created_at: Utc::now(),
        }
    }

    pub fn settings() -> Settings {
        Settings {
            duration_min: 1,
            rotation_interval: Duration::from_secs(180),
            mode: DisplayMode::Quotes,
        }
    }

    pub fn spawned(effects: &[Effect]) -> Vec<&StoreTask> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Spawn(task) => Some(task),
                _ => None,
            })
            .collect()
    }

    pub fn render_screen(screen: &dyn Screen) -> String {
        render_screen_sized(screen, 100, 30)
    }

    pub fn render_screen_sized(screen: &dyn Screen, width: u16, height: u16) -> String {
        let theme = Theme::default();
        render_text_sized(width, height, |f| {
            let area = f.area();
            screen.view(f, area, &theme)
        })
    }

    /// Render into an in-memory terminal and return the screen text.
    pub fn render_text(draw: impl FnOnce(&mut Frame)) -> String {
        render_text_sized(100, 30, draw)
    }

    pub fn render_text_sized(width: u16, height: u16, draw: impl FnOnce(&mut Frame)) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(draw).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::Utc;
    use vowtimer_core::SessionStats;

    fn app() -> App {
        App::new(settings(), Theme::default())
    }

    #[test]
    fn start_loads_stats_for_menu() {
        let mut app = app();
        let effects = app.start();
        assert!(matches!(spawned(&effects)[..], [StoreTask::LoadStats]));
        assert_eq!(app.screen().route_name(), "menu");
    }

    #[test]
    fn navigation_runs_on_enter_of_new_screen() {
        let mut app = app();
        app.start();
        // Menu cursor starts on "Start Focus Session".
        let effects = app.handle_event(&key(KeyCode::Enter));
        assert_eq!(app.screen().route_name(), "subject_select");
        assert!(matches!(spawned(&effects)[..], [StoreTask::LoadSubjects]));
    }

    #[test]
    fn ctrl_c_quits_from_menu() {
        let mut app = app();
        let effects = app.handle_event(&ctrl_c());
        assert!(matches!(effects[..], [Effect::Quit]));
    }

    #[test]
    fn ctrl_c_is_ignored_while_confirming_abandon() {
        let mut app = app();
        app.resolve(vec![Effect::Navigate(Route::Timer(subject(1, "Music")))]);
        app.handle_event(&key(KeyCode::Char('q')));
        let effects = app.handle_event(&ctrl_c());
        assert!(!effects.iter().any(|e| matches!(e, Effect::Quit)));
        assert_eq!(app.screen().route_name(), "timer");
    }

    #[test]
    fn saved_session_refreshes_streak() {
        let mut app = app();
        app.resolve(vec![Effect::Navigate(Route::Timer(subject(1, "Music")))]);
        let saved = vowtimer_core::storage::Session {
            id: 1,
            subject_id: 1,
            subject_name: "Music".into(),
            duration_min: 1,
            status: vowtimer_core::storage::SessionStatus::Completed,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };
        let effects = app.handle_event(&AppEvent::Store(StoreResult::SessionSaved(Ok(saved))));
        assert!(spawned(&effects)
            .iter()
            .any(|t| matches!(t, StoreTask::LoadStats)));

        let stats = SessionStats {
            current_streak: 4,
            ..SessionStats::default()
        };
        app.handle_event(&AppEvent::Store(StoreResult::Stats(Ok(stats))));
        app.resolve(vec![Effect::Navigate(Route::Menu)]);
        let text = render_text(|f| app.view(f));
        assert!(text.contains("4 day streak"));
    }

    #[test]
    fn display_mode_toggle_reaches_new_timer() {
        let mut app = app();
        app.resolve(vec![Effect::SetDisplayMode(DisplayMode::Poems)]);
        assert_eq!(app.settings().mode, DisplayMode::Poems);
        let effects = app.resolve(vec![Effect::Navigate(Route::Timer(subject(2, "Reading")))]);
        assert!(spawned(&effects).iter().any(|t| matches!(
            t,
            StoreTask::LoadContent {
                mode: DisplayMode::Poems,
                ..
            }
        )));
    }
}
