use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::streak::calculate_streaks;
use crate::error::Result;
use crate::storage::Store;

/// Aggregate session statistics shown on the stats screen and by `vow stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub abandoned_sessions: u64,
    /// Completed sessions only.
    pub total_minutes: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completed sessions per subject, most first.
    pub by_subject: Vec<(String, u64)>,
}

impl SessionStats {
    /// Gather totals, streaks and per-subject counts from `store`.
    ///
    /// Completion timestamps are bucketed by local calendar day.
    pub fn collect(store: &dyn Store, today: NaiveDate) -> Result<Self> {
        let totals = store.session_totals()?;
        let days = store
            .completion_timestamps()?
            .into_iter()
            .map(|ts| ts.with_timezone(&Local).date_naive());
        let streaks = calculate_streaks(days, today);

        let mut by_subject = store.sessions_by_subject()?;
        by_subject.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            total_sessions: totals.total,
            completed_sessions: totals.completed,
            abandoned_sessions: totals.abandoned,
            total_minutes: totals.total_minutes,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            by_subject,
        })
    }

    /// Percentage of sessions that were completed, 0 when there are none.
    pub fn completion_rate(&self) -> u32 {
        if self.total_sessions == 0 {
            return 0;
        }
        ((self.completed_sessions * 100) / self.total_sessions) as u32
    }
}

/// `95` -> `"1h 35m"`, `40` -> `"40m"`.
pub fn format_minutes(minutes: u64) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, NewSession, SessionStatus};
    use chrono::{TimeZone, Utc};

    fn record(db: &Database, subject: &str, minutes: u64, status: SessionStatus, day: NaiveDate) {
        let at = Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc);
        db.create_session(&NewSession {
            subject_id: 1,
            subject_name: subject.into(),
            duration_min: minutes,
            status,
            started_at: at,
            completed_at: at,
        })
        .unwrap();
    }

    #[test]
    fn empty_store_gives_zeroes() {
        let db = Database::open_in_memory().unwrap();
        let today = Local::now().date_naive();
        let stats = SessionStats::collect(&db, today).unwrap();
        assert_eq!(stats, SessionStats::default());
        assert_eq!(stats.completion_rate(), 0);
    }

    #[test]
    fn abandoned_sessions_only_count_towards_totals() {
        let db = Database::open_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let yesterday = today.pred_opt().unwrap();

        record(&db, "Music", 25, SessionStatus::Completed, today);
        record(&db, "Music", 25, SessionStatus::Completed, yesterday);
        record(&db, "Reading", 50, SessionStatus::Completed, today);
        record(&db, "Writing", 25, SessionStatus::Abandoned, today);

        let stats = SessionStats::collect(&db, today).unwrap();
        assert_eq!(stats.total_sessions, 4);
        assert_eq!(stats.completed_sessions, 3);
        assert_eq!(stats.abandoned_sessions, 1);
        assert_eq!(stats.total_minutes, 100);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(
            stats.by_subject,
            vec![("Music".to_string(), 2), ("Reading".to_string(), 1)]
        );
        assert_eq!(stats.completion_rate(), 75);
    }

    #[test]
    fn abandoned_day_does_not_extend_streak() {
        let db = Database::open_in_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        record(&db, "Music", 25, SessionStatus::Abandoned, today);
        let stats = SessionStats::collect(&db, today).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
    }

    #[test]
    fn minutes_format() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(40), "40m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(95), "1h 35m");
    }
}
