//! Minimal multi-field text entry used by the add dialogs.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use super::theme::Theme;

#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    pub value: String,
    pub placeholder: &'static str,
}

impl TextField {
    pub fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Still editing.
    Continue,
    Submit,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
    fields: Vec<TextField>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.trim()).unwrap_or("")
    }

    #[cfg(test)]
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Tab and shift-tab move between fields; enter advances and submits
    /// on the last one.
    pub fn handle_key(&mut self, key: &KeyEvent) -> FormAction {
        let last = self.fields.len().saturating_sub(1);
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.fields.len().max(1),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.checked_sub(1).unwrap_or(last);
            }
            KeyCode::Enter if self.focus < last => self.focus += 1,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(c);
                }
            }
            _ => {}
        }
        FormAction::Continue
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = Vec::new();
        for (i, field) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let label_style = if focused { theme.gold } else { theme.secondary };
            lines.push(Line::from(Span::styled(format!("{}:", field.label), label_style)));

            let body = if field.value.is_empty() && !focused {
                Span::styled(field.placeholder, theme.muted)
            } else {
                Span::styled(field.value.as_str(), theme.normal)
            };
            let cursor = if focused { "▏" } else { "" };
            lines.push(Line::from(vec![
                Span::raw("  "),
                body,
                Span::styled(cursor, theme.gold),
            ]));
            lines.push(Line::raw(""));
        }
        lines.push(theme.hints(&[("tab", "switch field"), ("enter", "next/submit"), ("esc", "cancel")]));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.handle_key(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_advances_then_submits() {
        let mut form = Form::new(vec![TextField::new("Name", ""), TextField::new("Icon", "")]);
        type_text(&mut form, "Chess");
        assert_eq!(form.handle_key(&key(KeyCode::Enter)), FormAction::Continue);
        assert_eq!(form.focus(), 1);
        type_text(&mut form, "♞");
        assert_eq!(form.handle_key(&key(KeyCode::Enter)), FormAction::Submit);
        assert_eq!(form.value(0), "Chess");
        assert_eq!(form.value(1), "♞");
    }

    #[test]
    fn backspace_and_tab_wrap() {
        let mut form = Form::new(vec![TextField::new("A", ""), TextField::new("B", "")]);
        type_text(&mut form, "ab");
        form.handle_key(&key(KeyCode::Backspace));
        assert_eq!(form.value(0), "a");
        form.handle_key(&key(KeyCode::BackTab));
        assert_eq!(form.focus(), 1);
        form.handle_key(&key(KeyCode::Tab));
        assert_eq!(form.focus(), 0);
        assert_eq!(form.handle_key(&key(KeyCode::Esc)), FormAction::Cancel);
    }

    #[test]
    fn values_are_trimmed() {
        let mut form = Form::new(vec![TextField::new("Text", "")]);
        type_text(&mut form, "  spaced  ");
        assert_eq!(form.value(0), "spaced");
        assert_eq!(form.value(5), "");
    }
}
