use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{ListItem, Paragraph};
use ratatui::Frame;
use vowtimer_core::storage::{Subject, DEFAULT_SUBJECT_ICON};

use super::{frame_block, selectable_list, step};
use crate::tui::app::{AppEvent, Effect, Route, Screen};
use crate::tui::form::{Form, FormAction, TextField};
use crate::tui::tasks::{StoreResult, StoreTask};
use crate::tui::theme::Theme;

pub struct SubjectSelectScreen {
    subjects: Vec<Subject>,
    index: usize,
    loading: bool,
    error: Option<String>,
    form: Option<Form>,
}

impl SubjectSelectScreen {
    pub fn new() -> Self {
        Self {
            subjects: Vec::new(),
            index: 0,
            loading: true,
            error: None,
            form: None,
        }
    }

    fn add_form() -> Form {
        Form::new(vec![
            TextField::new("Name", "e.g. Chess"),
            TextField::new("Icon", DEFAULT_SUBJECT_ICON),
        ])
    }

    fn submit(&mut self, form: &Form) -> Vec<Effect> {
        let name = form.value(0);
        if name.is_empty() {
            self.error = Some("Subject name must not be empty".into());
            return Vec::new();
        }
        let icon = match form.value(1) {
            "" => DEFAULT_SUBJECT_ICON,
            icon => icon,
        };
        vec![Effect::Spawn(StoreTask::AddSubject {
            name: name.to_string(),
            icon: icon.to_string(),
        })]
    }

    fn on_form_key(&mut self, key: &crossterm::event::KeyEvent) -> Vec<Effect> {
        let Some(mut form) = self.form.take() else {
            return Vec::new();
        };
        match form.handle_key(key) {
            FormAction::Continue => {
                self.form = Some(form);
                Vec::new()
            }
            FormAction::Cancel => Vec::new(),
            FormAction::Submit => {
                let effects = self.submit(&form);
                if effects.is_empty() {
                    // Keep the dialog open so the name can be fixed.
                    self.form = Some(form);
                }
                effects
            }
        }
    }

    fn on_list_key(&mut self, code: KeyCode) -> Vec<Effect> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.index = step(self.index, self.subjects.len(), false);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.index = step(self.index, self.subjects.len(), true);
                Vec::new()
            }
            KeyCode::Enter => match self.subjects.get(self.index) {
                Some(subject) => vec![Effect::Navigate(Route::Timer(subject.clone()))],
                None => Vec::new(),
            },
            KeyCode::Char('a') => {
                self.error = None;
                self.form = Some(Self::add_form());
                Vec::new()
            }
            KeyCode::Char('d') | KeyCode::Delete => match self.subjects.get(self.index) {
                Some(subject) => vec![Effect::Spawn(StoreTask::DeleteSubject(subject.id))],
                None => Vec::new(),
            },
            KeyCode::Char('r') => {
                self.loading = true;
                vec![Effect::Spawn(StoreTask::LoadSubjects)]
            }
            KeyCode::Esc | KeyCode::Char('q') => vec![Effect::Navigate(Route::Menu)],
            _ => Vec::new(),
        }
    }

    fn on_result(&mut self, result: &StoreResult) {
        match result {
            StoreResult::Subjects(Ok(subjects)) => {
                self.loading = false;
                self.error = None;
                self.subjects = subjects.clone();
                self.index = self.index.min(self.subjects.len().saturating_sub(1));
            }
            StoreResult::SubjectAdded(Ok(subject)) => {
                self.error = None;
                self.subjects.push(subject.clone());
                self.index = self.subjects.len() - 1;
            }
            StoreResult::SubjectDeleted(Ok(id)) => {
                self.subjects.retain(|s| s.id != *id);
                self.index = self.index.min(self.subjects.len().saturating_sub(1));
            }
            StoreResult::Subjects(Err(e)) => {
                self.loading = false;
                self.error = Some(e.to_string());
            }
            StoreResult::SubjectAdded(Err(e)) | StoreResult::SubjectDeleted(Err(e)) => {
                self.error = Some(e.to_string());
            }
            _ => {}
        }
    }
}

impl Default for SubjectSelectScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for SubjectSelectScreen {
    fn on_enter(&mut self) -> Vec<Effect> {
        vec![Effect::Spawn(StoreTask::LoadSubjects)]
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
        let inner = frame_block(frame, area, "Choose Your Focus", theme);
        let rows = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(format!("Error: {error}"), theme.danger)),
                rows[1],
            );
        }

        if let Some(form) = &self.form {
            form.render(frame, rows[0], theme);
            return;
        }

        if self.loading {
            frame.render_widget(Paragraph::new(Line::styled("Loading...", theme.muted)), rows[0]);
        } else if self.subjects.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("No subjects yet. Press 'a' to add one.", theme.normal)),
                rows[0],
            );
        } else {
            let items = self
                .subjects
                .iter()
                .map(|s| ListItem::new(format!("{}  {}", s.icon, s.name)))
                .collect();
            selectable_list(frame, rows[0], items, self.index, theme);
        }

        frame.render_widget(
            Paragraph::new(theme.hints(&[
                ("↑/↓", "navigate"),
                ("enter", "select"),
                ("a", "add"),
                ("d", "delete"),
                ("esc", "back"),
            ]))
            .alignment(Alignment::Center),
            rows[2],
        );
    }
}
