use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Terminal result of one timer run.
///
/// Carries everything needed to write the session record; the timer itself
/// is discarded once this has been produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub completed: bool,
    pub subject_id: i64,
    pub subject_name: String,
    pub duration_min: u64,
    pub started_at: DateTime<Utc>,
}

/// Every state change of a session timer produces an Event.
/// The terminal UI reacts to them; `SessionFinished` is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    AbandonRequested {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    AbandonCancelled {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero or the user confirmed abandoning it.
    SessionFinished {
        outcome: SessionOutcome,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        subject_name: String,
        remaining_secs: u64,
        total_secs: u64,
        percent_complete: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The outcome carried by a `SessionFinished` event.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match self {
            Event::SessionFinished { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
