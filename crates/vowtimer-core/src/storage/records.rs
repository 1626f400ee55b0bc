//! Row types shared by every `Store` implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::SessionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(SessionStatus::Completed),
            "abandoned" => Some(SessionStatus::Abandoned),
            _ => None,
        }
    }
}

/// A finished focus session. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub subject_id: i64,
    /// Denormalised so history survives subject deletion.
    pub subject_name: String,
    pub duration_min: u64,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Insert payload for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub subject_id: i64,
    pub subject_name: String,
    pub duration_min: u64,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl NewSession {
    /// The status is fixed here, once, from the timer's outcome.
    pub fn from_outcome(outcome: &SessionOutcome, completed_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: outcome.subject_id,
            subject_name: outcome.subject_name.clone(),
            duration_min: outcome.duration_min,
            status: if outcome.completed {
                SessionStatus::Completed
            } else {
                SessionStatus::Abandoned
            },
            started_at: outcome.started_at,
            completed_at,
        }
    }
}

/// Aggregate counts over the sessions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionTotals {
    pub total: u64,
    pub completed: u64,
    pub abandoned: u64,
    /// Minutes across completed sessions only.
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_SUBJECT_ICON: &str = "📚";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub source: String,
    /// Subject names this quote belongs to. Empty means it fits every subject.
    #[serde(default)]
    pub subjects: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Quote {
    pub fn is_general(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn applies_to(&self, subject: &str) -> bool {
        self.is_general() || self.subjects.iter().any(|s| s == subject)
    }
}

/// An Old English passage with its modern rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub id: i64,
    pub old_english: String,
    pub modern_english: String,
    pub source: String,
    #[serde(default)]
    pub line_ref: String,
    pub created_at: DateTime<Utc>,
}

/// Poem fields before insert.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewPoem {
    pub old_english: String,
    pub modern_english: String,
    pub source: String,
    #[serde(default)]
    pub line_ref: String,
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Split a comma separated subject list, dropping blanks.
pub fn parse_subject_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
