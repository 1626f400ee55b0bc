mod menu;
mod quotes;
mod stats;
mod subject_select;
mod timer;

pub use menu::MenuScreen;
pub use quotes::QuotesScreen;
pub use stats::StatsScreen;
pub use subject_select::SubjectSelectScreen;
pub use timer::TimerScreen;

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use super::theme::{inner_rect, Theme};

/// Outer bordered frame shared by every screen; returns the padded inside.
fn frame_block(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(format!(" {title} "))
        .title_style(theme.title);
    frame.render_widget(block, area);
    inner_rect(area, 2)
}

/// Selectable list that scrolls so the row at `index` is always drawn.
fn selectable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem<'_>>,
    index: usize,
    theme: &Theme,
) {
    let list = List::new(items)
        .style(theme.normal)
        .highlight_style(theme.selected)
        .highlight_symbol("▸ ");
    let mut state = ListState::default().with_selected(Some(index));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Wrapping cursor movement over `len` rows.
fn step(index: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (index + 1) % len
    } else {
        index.checked_sub(1).unwrap_or(len - 1)
    }
}
