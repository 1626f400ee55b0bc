//! Session statistics.
//!
//! Streaks are computed from the distinct calendar days that hold at least
//! one completed session. Totals and per-subject counts come from the store.

mod streak;
mod summary;

pub use streak::{calculate_streaks, Streaks};
pub use summary::{format_minutes, SessionStats};
