//! SQLite-backed `Store`.
//!
//! Provides persistent storage for:
//! - Focus sessions (completed and abandoned)
//! - Subjects
//! - Quotes (general or tagged with subjects) and poems
//!
//! The location comes from the `VOW_DATABASE_URL` environment variable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::migrations;
use super::records::{
    require, NewPoem, NewSession, Poem, Quote, Session, SessionStatus, SessionTotals, Subject,
    DEFAULT_SUBJECT_ICON,
};
use super::Store;
use crate::error::{DatabaseError, Result};

/// Environment variable holding the database location.
pub const CONNECTION_ENV: &str = "VOW_DATABASE_URL";

const MEMORY_URL: &str = ":memory:";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database shared by the UI loop and the blocking task pool.
pub struct Database {
    conn: Mutex<Connection>,
    location: String,
}

impl Database {
    /// Open the database named by `VOW_DATABASE_URL`.
    ///
    /// # Errors
    /// Fails when the variable is unset or blank, or when the database
    /// cannot be opened, migrated or pinged.
    pub fn from_env(busy_timeout: Duration) -> Result<Self> {
        let url = std::env::var(CONNECTION_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(DatabaseError::MissingConnectionString {
                var: CONNECTION_ENV,
            })?;
        Self::connect(&url, busy_timeout)
    }

    /// Open a database from a connection string.
    ///
    /// Accepts a filesystem path, the same path prefixed with `sqlite://`,
    /// or `:memory:`.
    pub fn connect(url: &str, busy_timeout: Duration) -> Result<Self> {
        let target = url.trim().trim_start_matches("sqlite://");
        if target == MEMORY_URL {
            return Self::open_in_memory();
        }

        let path = PathBuf::from(target);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Self::init(conn, path.display().to_string(), busy_timeout)
    }

    /// Open a file database with the default busy timeout.
    pub fn open(path: &Path) -> Result<Self> {
        Self::connect(&path.display().to_string(), DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(MEMORY_URL),
            source,
        })?;
        Self::init(conn, MEMORY_URL.to_string(), DEFAULT_BUSY_TIMEOUT)
    }

    fn init(conn: Connection, location: String, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)
            .map_err(DatabaseError::from)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let db = Self {
            conn: Mutex::new(conn),
            location,
        };
        db.ping()?;
        tracing::debug!(location = %db.location, "database opened");
        Ok(db)
    }

    /// Where this database lives, as given to `connect`.
    pub fn location(&self) -> &str {
        &self.location
    }

    fn with_conn<T>(&self, op: &'static str, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::Poisoned)?;
        f(&conn).map_err(|e| {
            tracing::warn!(op, error = %e, "database operation failed");
            DatabaseError::from(e).into()
        })
    }

    fn quote_subjects(conn: &Connection, quote_id: i64) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT subject_name FROM quote_subjects WHERE quote_id = ?1 ORDER BY subject_name",
        )?;
        let rows = stmt.query_map(params![quote_id], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    fn insert_quote(
        conn: &Connection,
        text: &str,
        source: &str,
        subjects: &[String],
    ) -> rusqlite::Result<Quote> {
        let tx = conn.unchecked_transaction()?;
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO quotes (text, source, created_at) VALUES (?1, ?2, ?3)",
            params![text, source, created_at.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();

        let mut tags: Vec<String> = subjects.to_vec();
        tags.sort();
        tags.dedup();
        for name in &tags {
            tx.execute(
                "INSERT INTO quote_subjects (quote_id, subject_name) VALUES (?1, ?2)",
                params![id, name],
            )?;
        }
        tx.commit()?;

        Ok(Quote {
            id,
            text: text.to_string(),
            source: source.to_string(),
            subjects: tags,
            created_at,
        })
    }

    fn insert_poem(conn: &Connection, poem: &NewPoem) -> rusqlite::Result<Poem> {
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO poems (old_english, modern_english, source, line_ref, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                poem.old_english,
                poem.modern_english,
                poem.source,
                poem.line_ref,
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(Poem {
            id: conn.last_insert_rowid(),
            old_english: poem.old_english.clone(),
            modern_english: poem.modern_english.clone(),
            source: poem.source.clone(),
            line_ref: poem.line_ref.clone(),
            created_at,
        })
    }

    fn insert_subject(conn: &Connection, name: &str, icon: &str) -> rusqlite::Result<Subject> {
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO subjects (name, icon, created_at) VALUES (?1, ?2, ?3)",
            params![name, icon, created_at.to_rfc3339()],
        )?;
        Ok(Subject {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            icon: icon.to_string(),
            created_at,
        })
    }

    fn delete_by_id(&self, op: &'static str, table: &'static str, kind: &'static str, id: i64) -> Result<()> {
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        let affected = self.with_conn(op, |conn| conn.execute(&sql, params![id]))?;
        if affected == 0 {
            return Err(DatabaseError::NotFound { kind, id }.into());
        }
        Ok(())
    }
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(idx, &raw)
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let status: String = row.get(4)?;
    let status = SessionStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown session status '{status}'").into(),
        )
    })?;
    Ok(Session {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        subject_name: row.get(2)?,
        duration_min: row.get(3)?,
        status,
        started_at: ts_at(row, 5)?,
        completed_at: ts_at(row, 6)?,
    })
}

fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        created_at: ts_at(row, 3)?,
    })
}

/// Subjects are filled in separately.
fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        text: row.get(1)?,
        source: row.get(2)?,
        subjects: Vec::new(),
        created_at: ts_at(row, 3)?,
    })
}

fn poem_from_row(row: &Row<'_>) -> rusqlite::Result<Poem> {
    Ok(Poem {
        id: row.get(0)?,
        old_english: row.get(1)?,
        modern_english: row.get(2)?,
        source: row.get(3)?,
        line_ref: row.get(4)?,
        created_at: ts_at(row, 5)?,
    })
}

const SESSION_COLUMNS: &str =
    "id, subject_id, subject_name, duration_min, status, started_at, completed_at";
const SUBJECT_COLUMNS: &str = "id, name, icon, created_at";
const QUOTE_COLUMNS: &str = "id, text, source, created_at";
const POEM_COLUMNS: &str = "id, old_english, modern_english, source, line_ref, created_at";

impl Store for Database {
    fn ping(&self) -> Result<()> {
        self.with_conn("ping", |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
        })
    }

    fn create_session(&self, session: &NewSession) -> Result<Session> {
        let id = self.with_conn("create_session", |conn| {
            conn.execute(
                "INSERT INTO sessions (subject_id, subject_name, duration_min, status, started_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.subject_id,
                    session.subject_name,
                    session.duration_min,
                    session.status.as_str(),
                    session.started_at.to_rfc3339(),
                    session.completed_at.to_rfc3339(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::info!(
            id,
            subject = %session.subject_name,
            status = session.status.as_str(),
            minutes = session.duration_min,
            "session recorded"
        );
        Ok(Session {
            id,
            subject_id: session.subject_id,
            subject_name: session.subject_name.clone(),
            duration_min: session.duration_min,
            status: session.status,
            started_at: session.started_at,
            completed_at: session.completed_at,
        })
    }

    fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        self.with_conn("recent_sessions", |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY completed_at DESC, id DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], session_from_row)?;
            rows.collect()
        })
    }

    fn completion_timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        self.with_conn("completion_timestamps", |conn| {
            let mut stmt = conn.prepare(
                "SELECT completed_at FROM sessions WHERE status = 'completed' ORDER BY completed_at DESC",
            )?;
            let rows = stmt.query_map([], |row| ts_at(row, 0))?;
            rows.collect()
        })
    }

    fn session_totals(&self) -> Result<SessionTotals> {
        self.with_conn("session_totals", |conn| {
            conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'completed' THEN duration_min ELSE 0 END), 0)
                 FROM sessions",
                [],
                |row| {
                    let total: u64 = row.get(0)?;
                    let completed: u64 = row.get(1)?;
                    Ok(SessionTotals {
                        total,
                        completed,
                        abandoned: total - completed,
                        total_minutes: row.get(2)?,
                    })
                },
            )
        })
    }

    fn sessions_by_subject(&self) -> Result<Vec<(String, u64)>> {
        self.with_conn("sessions_by_subject", |conn| {
            let mut stmt = conn.prepare(
                "SELECT subject_name, COUNT(*) FROM sessions
                 WHERE status = 'completed'
                 GROUP BY subject_name
                 ORDER BY COUNT(*) DESC, subject_name ASC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
    }

    fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.with_conn("list_subjects", |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id"))?;
            let rows = stmt.query_map([], subject_from_row)?;
            rows.collect()
        })
    }

    fn get_subject(&self, id: i64) -> Result<Subject> {
        let found = self.with_conn("get_subject", |conn| {
            conn.query_row(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ?1"),
                params![id],
                subject_from_row,
            )
            .optional()
        })?;
        found.ok_or_else(|| DatabaseError::NotFound { kind: "subject", id }.into())
    }

    fn add_subject(&self, name: &str, icon: &str) -> Result<Subject> {
        require("name", name)?;
        let icon = if icon.trim().is_empty() {
            DEFAULT_SUBJECT_ICON
        } else {
            icon.trim()
        };
        self.with_conn("add_subject", |conn| Self::insert_subject(conn, name.trim(), icon))
    }

    fn add_subject_if_missing(&self, name: &str, icon: &str) -> Result<(Subject, bool)> {
        require("name", name)?;
        let existing = self.with_conn("find_subject", |conn| {
            conn.query_row(
                &format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE name = ?1"),
                params![name.trim()],
                subject_from_row,
            )
            .optional()
        })?;
        match existing {
            Some(subject) => Ok((subject, false)),
            None => Ok((self.add_subject(name, icon)?, true)),
        }
    }

    fn delete_subject(&self, id: i64) -> Result<()> {
        self.delete_by_id("delete_subject", "subjects", "subject", id)
    }

    fn list_quotes(&self) -> Result<Vec<Quote>> {
        self.with_conn("list_quotes", |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY id"))?;
            let mut quotes = stmt
                .query_map([], quote_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
            let mut stmt = conn.prepare(
                "SELECT quote_id, subject_name FROM quote_subjects ORDER BY subject_name",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get(1)?)))?;
            for row in rows {
                let (quote_id, name) = row?;
                tags.entry(quote_id).or_default().push(name);
            }

            for quote in &mut quotes {
                quote.subjects = tags.remove(&quote.id).unwrap_or_default();
            }
            Ok(quotes)
        })
    }

    fn random_quote_for(&self, subject: Option<&str>) -> Result<Option<Quote>> {
        self.with_conn("random_quote_for", |conn| {
            let found = match subject {
                Some(name) => conn
                    .query_row(
                        &format!(
                            "SELECT {QUOTE_COLUMNS} FROM quotes q
                             WHERE NOT EXISTS (SELECT 1 FROM quote_subjects s WHERE s.quote_id = q.id)
                                OR EXISTS (SELECT 1 FROM quote_subjects s
                                           WHERE s.quote_id = q.id AND s.subject_name = ?1)
                             ORDER BY RANDOM() LIMIT 1"
                        ),
                        params![name],
                        quote_from_row,
                    )
                    .optional()?,
                None => conn
                    .query_row(
                        &format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY RANDOM() LIMIT 1"),
                        [],
                        quote_from_row,
                    )
                    .optional()?,
            };
            match found {
                Some(mut quote) => {
                    quote.subjects = Self::quote_subjects(conn, quote.id)?;
                    Ok(Some(quote))
                }
                None => Ok(None),
            }
        })
    }

    fn add_quote(&self, text: &str, source: &str, subjects: &[String]) -> Result<Quote> {
        require("text", text)?;
        self.with_conn("add_quote", |conn| {
            Self::insert_quote(conn, text.trim(), source.trim(), subjects)
        })
    }

    fn add_quote_if_missing(
        &self,
        text: &str,
        source: &str,
        subjects: &[String],
    ) -> Result<(Quote, bool)> {
        require("text", text)?;
        self.with_conn("add_quote_if_missing", |conn| {
            let existing = conn
                .query_row(
                    &format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE text = ?1"),
                    params![text.trim()],
                    quote_from_row,
                )
                .optional()?;
            match existing {
                Some(mut quote) => {
                    quote.subjects = Self::quote_subjects(conn, quote.id)?;
                    Ok((quote, false))
                }
                None => Ok((
                    Self::insert_quote(conn, text.trim(), source.trim(), subjects)?,
                    true,
                )),
            }
        })
    }

    fn delete_quote(&self, id: i64) -> Result<()> {
        self.delete_by_id("delete_quote", "quotes", "quote", id)
    }

    fn count_quotes(&self) -> Result<u64> {
        self.with_conn("count_quotes", |conn| {
            conn.query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))
        })
    }

    fn list_poems(&self) -> Result<Vec<Poem>> {
        self.with_conn("list_poems", |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {POEM_COLUMNS} FROM poems ORDER BY id"))?;
            let rows = stmt.query_map([], poem_from_row)?;
            rows.collect()
        })
    }

    fn random_poem(&self) -> Result<Option<Poem>> {
        self.with_conn("random_poem", |conn| {
            conn.query_row(
                &format!("SELECT {POEM_COLUMNS} FROM poems ORDER BY RANDOM() LIMIT 1"),
                [],
                poem_from_row,
            )
            .optional()
        })
    }

    fn add_poem(&self, poem: &NewPoem) -> Result<Poem> {
        require("old_english", &poem.old_english)?;
        require("modern_english", &poem.modern_english)?;
        require("source", &poem.source)?;
        self.with_conn("add_poem", |conn| Self::insert_poem(conn, poem))
    }

    fn add_poem_if_missing(&self, poem: &NewPoem) -> Result<(Poem, bool)> {
        require("old_english", &poem.old_english)?;
        require("modern_english", &poem.modern_english)?;
        require("source", &poem.source)?;
        self.with_conn("add_poem_if_missing", |conn| {
            let existing = conn
                .query_row(
                    &format!("SELECT {POEM_COLUMNS} FROM poems WHERE source = ?1 AND line_ref = ?2"),
                    params![poem.source, poem.line_ref],
                    poem_from_row,
                )
                .optional()?;
            match existing {
                Some(found) => Ok((found, false)),
                None => Ok((Self::insert_poem(conn, poem)?, true)),
            }
        })
    }

    fn delete_poem(&self, id: i64) -> Result<()> {
        self.delete_by_id("delete_poem", "poems", "poem", id)
    }

    fn count_poems(&self) -> Result<u64> {
        self.with_conn("count_poems", |conn| {
            conn.query_row("SELECT COUNT(*) FROM poems", [], |row| row.get(0))
        })
    }
}
