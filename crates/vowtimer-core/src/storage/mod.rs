pub mod config;
pub mod database;
pub mod migrations;
mod records;
pub mod seed;

pub use config::{Config, DisplayConfig, StorageConfig, ThemeConfig, TimerConfig};
pub use database::{Database, CONNECTION_ENV};
pub use records::{
    parse_subject_list, NewPoem, NewSession, Poem, Quote, Session, SessionStatus, SessionTotals,
    Subject, DEFAULT_SUBJECT_ICON,
};

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{ConfigError, Result};

/// Returns `~/.config/vowtimer[-dev]/` based on VOWTIMER_ENV.
///
/// Set VOWTIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("VOWTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("vowtimer-dev")
    } else {
        base_dir.join("vowtimer")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Persistence collaborator for sessions, subjects and motivational content.
///
/// Every call is one-shot. Implementations must be shareable across the
/// blocking worker pool, hence `Send + Sync`.
pub trait Store: Send + Sync {
    /// Cheap round trip used to verify connectivity at startup.
    fn ping(&self) -> Result<()>;

    // ── Sessions ─────────────────────────────────────────────────────

    fn create_session(&self, session: &NewSession) -> Result<Session>;

    /// Most recent first, by completion time.
    fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>>;

    /// Completion timestamps of every completed session (streak input).
    fn completion_timestamps(&self) -> Result<Vec<DateTime<Utc>>>;

    fn session_totals(&self) -> Result<SessionTotals>;

    /// Completed session count per subject name.
    fn sessions_by_subject(&self) -> Result<Vec<(String, u64)>>;

    // ── Subjects ─────────────────────────────────────────────────────

    fn list_subjects(&self) -> Result<Vec<Subject>>;

    fn get_subject(&self, id: i64) -> Result<Subject>;

    fn add_subject(&self, name: &str, icon: &str) -> Result<Subject>;

    /// Returns the subject and whether it was newly created.
    fn add_subject_if_missing(&self, name: &str, icon: &str) -> Result<(Subject, bool)>;

    fn delete_subject(&self, id: i64) -> Result<()>;

    // ── Quotes ───────────────────────────────────────────────────────

    fn list_quotes(&self) -> Result<Vec<Quote>>;

    /// A random general quote or one tagged with `subject`.
    fn random_quote_for(&self, subject: Option<&str>) -> Result<Option<Quote>>;

    fn add_quote(&self, text: &str, source: &str, subjects: &[String]) -> Result<Quote>;

    fn add_quote_if_missing(
        &self,
        text: &str,
        source: &str,
        subjects: &[String],
    ) -> Result<(Quote, bool)>;

    fn delete_quote(&self, id: i64) -> Result<()>;

    fn count_quotes(&self) -> Result<u64>;

    // ── Poems ────────────────────────────────────────────────────────

    fn list_poems(&self) -> Result<Vec<Poem>>;

    fn random_poem(&self) -> Result<Option<Poem>>;

    fn add_poem(&self, poem: &NewPoem) -> Result<Poem>;

    /// Keyed on (source, line_ref).
    fn add_poem_if_missing(&self, poem: &NewPoem) -> Result<(Poem, bool)>;

    fn delete_poem(&self, id: i64) -> Result<()>;

    fn count_poems(&self) -> Result<u64>;
}
