//! Content administration: quotes and Old English poems on two tabs.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, Paragraph, Tabs};
use ratatui::Frame;
use vowtimer_core::storage::{parse_subject_list, NewPoem, Poem, Quote};

use super::{frame_block, selectable_list, step};
use crate::tui::app::{AppEvent, Effect, Route, Screen};
use crate::tui::form::{Form, FormAction, TextField};
use crate::tui::tasks::{StoreResult, StoreTask};
use crate::tui::theme::Theme;

/// Poem lines are typed on one row and separated with " / ".
const LINE_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Quotes,
    Poems,
}

impl Tab {
    fn other(self) -> Self {
        match self {
            Tab::Quotes => Tab::Poems,
            Tab::Poems => Tab::Quotes,
        }
    }
}

pub struct QuotesScreen {
    tab: Tab,
    quotes: Vec<Quote>,
    poems: Vec<Poem>,
    index: usize,
    loading: bool,
    error: Option<String>,
    form: Option<Form>,
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " / ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

impl QuotesScreen {
    pub fn new() -> Self {
        Self {
            tab: Tab::Quotes,
            quotes: Vec::new(),
            poems: Vec::new(),
            index: 0,
            loading: true,
            error: None,
            form: None,
        }
    }

    fn len(&self) -> usize {
        match self.tab {
            Tab::Quotes => self.quotes.len(),
            Tab::Poems => self.poems.len(),
        }
    }

    fn clamp_index(&mut self) {
        self.index = self.index.min(self.len().saturating_sub(1));
    }

    fn add_form(tab: Tab) -> Form {
        match tab {
            Tab::Quotes => Form::new(vec![
                TextField::new("Quote", "Enter quote text..."),
                TextField::new("Source", "Source (optional)"),
                TextField::new("Subjects", "comma separated, empty for all"),
            ]),
            Tab::Poems => Form::new(vec![
                TextField::new("Old English", "lines separated by ' / '"),
                TextField::new("Modern English", "lines separated by ' / '"),
                TextField::new("Source", "e.g. The Wanderer"),
                TextField::new("Line reference", "e.g. lines 1-2 (optional)"),
            ]),
        }
    }

    fn submit(&mut self, form: &Form) -> Option<StoreTask> {
        match self.tab {
            Tab::Quotes => {
                if form.value(0).is_empty() {
                    self.error = Some("Quote text must not be empty".into());
                    return None;
                }
                Some(StoreTask::AddQuote {
                    text: form.value(0).to_string(),
                    source: form.value(1).to_string(),
                    subjects: parse_subject_list(form.value(2)),
                })
            }
            Tab::Poems => {
                let poem = NewPoem {
                    old_english: form.value(0).replace(LINE_SEPARATOR, "\n"),
                    modern_english: form.value(1).replace(LINE_SEPARATOR, "\n"),
                    source: form.value(2).to_string(),
                    line_ref: form.value(3).to_string(),
                };
                if poem.old_english.is_empty() || poem.modern_english.is_empty() || poem.source.is_empty() {
                    self.error = Some("Both texts and a source are required".into());
                    return None;
                }
                Some(StoreTask::AddPoem(poem))
            }
        }
    }

    fn on_form_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        let Some(mut form) = self.form.take() else {
            return Vec::new();
        };
        match form.handle_key(key) {
            FormAction::Continue => {
                self.form = Some(form);
                Vec::new()
            }
            FormAction::Cancel => Vec::new(),
            FormAction::Submit => match self.submit(&form) {
                Some(task) => vec![Effect::Spawn(task)],
                None => {
                    self.form = Some(form);
                    Vec::new()
                }
            },
        }
    }

    fn delete_selected(&self) -> Option<StoreTask> {
        match self.tab {
            Tab::Quotes => self.quotes.get(self.index).map(|q| StoreTask::DeleteQuote(q.id)),
            Tab::Poems => self.poems.get(self.index).map(|p| StoreTask::DeletePoem(p.id)),
        }
    }

    fn on_list_key(&mut self, code: KeyCode) -> Vec<Effect> {
        match code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.tab = self.tab.other();
                self.index = 0;
                self.error = None;
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.index = step(self.index, self.len(), false);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.index = step(self.index, self.len(), true);
                Vec::new()
            }
            KeyCode::Char('a') => {
                self.error = None;
                self.form = Some(Self::add_form(self.tab));
                Vec::new()
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                self.delete_selected().map(Effect::Spawn).into_iter().collect()
            }
            KeyCode::Char('r') => {
                self.loading = true;
                vec![
                    Effect::Spawn(StoreTask::LoadQuotes),
                    Effect::Spawn(StoreTask::LoadPoems),
                ]
            }
            KeyCode::Esc | KeyCode::Char('q') => vec![Effect::Navigate(Route::Menu)],
            _ => Vec::new(),
        }
    }

    fn on_result(&mut self, result: &StoreResult) {
        let failure = match result {
            StoreResult::Quotes(Ok(quotes)) => {
                self.loading = false;
                self.quotes = quotes.clone();
                None
            }
            StoreResult::Poems(Ok(poems)) => {
                self.loading = false;
                self.poems = poems.clone();
                None
            }
            StoreResult::QuoteAdded(Ok(quote)) => {
                self.quotes.push(quote.clone());
                None
            }
            StoreResult::PoemAdded(Ok(poem)) => {
                self.poems.push(poem.clone());
                None
            }
            StoreResult::QuoteDeleted(Ok(id)) => {
                self.quotes.retain(|q| q.id != *id);
                None
            }
            StoreResult::PoemDeleted(Ok(id)) => {
                self.poems.retain(|p| p.id != *id);
                None
            }
            StoreResult::Quotes(Err(e)) | StoreResult::Poems(Err(e)) => {
                self.loading = false;
                Some(e.to_string())
            }
            StoreResult::QuoteAdded(Err(e))
            | StoreResult::PoemAdded(Err(e))
            | StoreResult::QuoteDeleted(Err(e))
            | StoreResult::PoemDeleted(Err(e)) => Some(e.to_string()),
            _ => return,
        };
        if failure.is_some() {
            self.error = failure;
        }
        self.clamp_index();
    }

    fn items(&self, theme: &Theme) -> Vec<ListItem<'static>> {
        let labels: Vec<(String, String)> = match self.tab {
            Tab::Quotes => self
                .quotes
                .iter()
                .map(|q| {
                    let tags = if q.is_general() {
                        "all".to_string()
                    } else {
                        q.subjects.join(", ")
                    };
                    (truncate(&q.text, 60), format!("[{tags}]"))
                })
                .collect(),
            Tab::Poems => self
                .poems
                .iter()
                .map(|p| (truncate(&p.modern_english, 60), format!("{} {}", p.source, p.line_ref)))
                .collect(),
        };

        labels
            .into_iter()
            .map(|(text, meta)| {
                ListItem::new(Line::from(vec![
                    Span::raw(text),
                    Span::raw("  "),
                    Span::styled(meta, theme.muted),
                ]))
            })
            .collect()
    }
}

impl Default for QuotesScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for QuotesScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        vec![
            Effect::Spawn(StoreTask::LoadQuotes),
            Effect::Spawn(StoreTask::LoadPoems),
        ]
    }

    fn handle_event(&mut self, event: &AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Key(key) if self.form.is_some() => self.on_form_key(key),
            AppEvent::Key(key) => self.on_list_key(key.code),
            AppEvent::Store(result) => {
                self.on_result(result);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let inner = frame_block(frame, area, "💬 Manage Quotes", theme);
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        let selected = match self.tab {
            Tab::Quotes => 0,
            Tab::Poems => 1,
        };
        let tabs = Tabs::new(vec![
            format!("Quotes ({})", self.quotes.len()),
            format!("Poems ({})", self.poems.len()),
        ])
        .select(selected)
        .style(theme.muted)
        .highlight_style(theme.selected);
        frame.render_widget(tabs, rows[0]);

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(format!("Error: {error}"), theme.danger)),
                rows[2],
            );
        }

        if let Some(form) = &self.form {
            form.render(frame, rows[1], theme);
            return;
        }

        if self.loading {
            frame.render_widget(Paragraph::new(Line::styled("Loading...", theme.muted)), rows[1]);
        } else if self.len() == 0 {
            let what = match self.tab {
                Tab::Quotes => "quotes",
                Tab::Poems => "poems",
            };
            frame.render_widget(
                Paragraph::new(Line::styled(
                    format!("No {what} yet. Press 'a' to add one."),
                    theme.normal,
                )),
                rows[1],
            );
        } else {
            selectable_list(frame, rows[1], self.items(theme), self.index, theme);
        }

        frame.render_widget(
            Paragraph::new(theme.hints(&[
                ("tab", "switch"),
                ("↑/↓", "navigate"),
                ("a", "add"),
                ("d", "delete"),
                ("esc", "back"),
            ]))
            .alignment(Alignment::Center),
            rows[3],
        );
    }
}
