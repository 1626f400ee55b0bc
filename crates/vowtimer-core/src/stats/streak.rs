//! Day streaks over the calendar days that have a completed session.
//!
//! A streak is a run of consecutive calendar days. The current streak is
//! only alive when the most recent completion was today or yesterday, so a
//! day without a session is forgiven until the day after it ends.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result of a streak calculation, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Compute current and longest streaks.
///
/// `days` may be unordered and may repeat; each calendar day counts once.
/// `today` is passed in so the result depends on nothing but the inputs.
pub fn calculate_streaks<I>(days: I, today: NaiveDate) -> Streaks
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut sorted: Vec<NaiveDate> = days.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();

    let Some(&most_recent) = sorted.first() else {
        return Streaks::default();
    };

    Streaks {
        current: current_streak(&sorted, most_recent, today),
        longest: longest_streak(&sorted),
    }
}

/// `sorted` is descending and free of duplicates.
fn current_streak(sorted: &[NaiveDate], most_recent: NaiveDate, today: NaiveDate) -> u32 {
    let yesterday = today.pred_opt();
    if most_recent != today && Some(most_recent) != yesterday {
        return 0;
    }

    let mut streak = 1;
    for pair in sorted.windows(2) {
        if days_between(pair[0], pair[1]) == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

fn longest_streak(sorted: &[NaiveDate]) -> u32 {
    let mut longest = 1;
    let mut run = 1;
    for pair in sorted.windows(2) {
        if days_between(pair[0], pair[1]) == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }
    longest
}

fn days_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days()
}
