//! Background persistence work.
//!
//! Every store call runs on tokio's blocking pool under a time budget and
//! comes back to the event loop as a typed [`StoreResult`]. Nothing here
//! touches UI state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use vowtimer_core::storage::{NewPoem, NewSession, Poem, Quote, Session, Subject};
use vowtimer_core::{load_content, Content, CoreError, DisplayMode, SessionOutcome, SessionStats, Store};

use super::app::AppEvent;

/// One unit of persistence work requested by a screen.
#[derive(Debug, Clone)]
pub enum StoreTask {
    LoadStats,
    LoadSubjects,
    AddSubject { name: String, icon: String },
    DeleteSubject(i64),
    LoadContent { mode: DisplayMode, subject: Option<String> },
    SaveSession(SessionOutcome),
    LoadQuotes,
    AddQuote { text: String, source: String, subjects: Vec<String> },
    DeleteQuote(i64),
    LoadPoems,
    AddPoem(NewPoem),
    DeletePoem(i64),
}

/// Outcome of a [`StoreTask`], delivered through the event queue.
#[derive(Debug)]
pub enum StoreResult {
    Stats(Result<SessionStats, CoreError>),
    Subjects(Result<Vec<Subject>, CoreError>),
    SubjectAdded(Result<Subject, CoreError>),
    SubjectDeleted(Result<i64, CoreError>),
    Content(Content),
    SessionSaved(Result<Session, CoreError>),
    Quotes(Result<Vec<Quote>, CoreError>),
    QuoteAdded(Result<Quote, CoreError>),
    QuoteDeleted(Result<i64, CoreError>),
    Poems(Result<Vec<Poem>, CoreError>),
    PoemAdded(Result<Poem, CoreError>),
    PoemDeleted(Result<i64, CoreError>),
}

/// What a task was, kept around after the task itself moved into the
/// worker so a timeout can still be reported with the right variant.
#[derive(Debug, Clone, Copy)]
enum TaskKind {
    Stats,
    Subjects,
    SubjectAdded,
    SubjectDeleted,
    Content(DisplayMode),
    SessionSaved,
    Quotes,
    QuoteAdded,
    QuoteDeleted,
    Poems,
    PoemAdded,
    PoemDeleted,
}

impl TaskKind {
    fn failed(self, err: CoreError) -> StoreResult {
        match self {
            TaskKind::Stats => StoreResult::Stats(Err(err)),
            TaskKind::Subjects => StoreResult::Subjects(Err(err)),
            TaskKind::SubjectAdded => StoreResult::SubjectAdded(Err(err)),
            TaskKind::SubjectDeleted => StoreResult::SubjectDeleted(Err(err)),
            TaskKind::Content(mode) => {
                tracing::warn!(error = %err, "content lookup did not finish, using fallback");
                StoreResult::Content(Content::fallback(mode))
            }
            TaskKind::SessionSaved => StoreResult::SessionSaved(Err(err)),
            TaskKind::Quotes => StoreResult::Quotes(Err(err)),
            TaskKind::QuoteAdded => StoreResult::QuoteAdded(Err(err)),
            TaskKind::QuoteDeleted => StoreResult::QuoteDeleted(Err(err)),
            TaskKind::Poems => StoreResult::Poems(Err(err)),
            TaskKind::PoemAdded => StoreResult::PoemAdded(Err(err)),
            TaskKind::PoemDeleted => StoreResult::PoemDeleted(Err(err)),
        }
    }
}

impl StoreTask {
    fn kind(&self) -> TaskKind {
        match self {
            StoreTask::LoadStats => TaskKind::Stats,
            StoreTask::LoadSubjects => TaskKind::Subjects,
            StoreTask::AddSubject { .. } => TaskKind::SubjectAdded,
            StoreTask::DeleteSubject(_) => TaskKind::SubjectDeleted,
            StoreTask::LoadContent { mode, .. } => TaskKind::Content(*mode),
            StoreTask::SaveSession(_) => TaskKind::SessionSaved,
            StoreTask::LoadQuotes => TaskKind::Quotes,
            StoreTask::AddQuote { .. } => TaskKind::QuoteAdded,
            StoreTask::DeleteQuote(_) => TaskKind::QuoteDeleted,
            StoreTask::LoadPoems => TaskKind::Poems,
            StoreTask::AddPoem(_) => TaskKind::PoemAdded,
            StoreTask::DeletePoem(_) => TaskKind::PoemDeleted,
        }
    }

    /// Run synchronously against `store`.
    pub fn execute(self, store: &dyn Store) -> StoreResult {
        match self {
            StoreTask::LoadStats => {
                StoreResult::Stats(SessionStats::collect(store, Local::now().date_naive()))
            }
            StoreTask::LoadSubjects => StoreResult::Subjects(store.list_subjects()),
            StoreTask::AddSubject { name, icon } => {
                StoreResult::SubjectAdded(store.add_subject(&name, &icon))
            }
            StoreTask::DeleteSubject(id) => {
                StoreResult::SubjectDeleted(store.delete_subject(id).map(|()| id))
            }
            StoreTask::LoadContent { mode, subject } => {
                StoreResult::Content(load_content(store, mode, subject.as_deref()))
            }
            StoreTask::SaveSession(outcome) => StoreResult::SessionSaved(
                store.create_session(&NewSession::from_outcome(&outcome, Utc::now())),
            ),
            StoreTask::LoadQuotes => StoreResult::Quotes(store.list_quotes()),
            StoreTask::AddQuote {
                text,
                source,
                subjects,
            } => StoreResult::QuoteAdded(store.add_quote(&text, &source, &subjects)),
            StoreTask::DeleteQuote(id) => {
                StoreResult::QuoteDeleted(store.delete_quote(id).map(|()| id))
            }
            StoreTask::LoadPoems => StoreResult::Poems(store.list_poems()),
            StoreTask::AddPoem(poem) => StoreResult::PoemAdded(store.add_poem(&poem)),
            StoreTask::DeletePoem(id) => StoreResult::PoemDeleted(store.delete_poem(id).map(|()| id)),
        }
    }
}

/// Spawns store tasks and feeds their results back into the event queue.
#[derive(Clone)]
pub struct TaskRunner {
    store: Arc<dyn Store>,
    timeout: Duration,
    tx: UnboundedSender<AppEvent>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn Store>, timeout: Duration, tx: UnboundedSender<AppEvent>) -> Self {
        Self { store, timeout, tx }
    }

    /// Fire and forget. Must be called from within the tokio runtime.
    pub fn spawn(&self, task: StoreTask) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let budget = self.timeout;
        tokio::spawn(async move {
            let kind = task.kind();
            let work = tokio::task::spawn_blocking(move || task.execute(store.as_ref()));
            deliver(kind, work, budget, &tx).await;
        });
    }
}

/// Send the outcome of `work` to the queue, failing it once `budget` runs out.
///
/// A blocking store call cannot be cancelled. After a timeout the task is
/// still awaited and whatever it finally produced is sent as well, so a
/// write that lands late still reaches the screens.
async fn deliver(
    kind: TaskKind,
    mut work: JoinHandle<StoreResult>,
    budget: Duration,
    tx: &UnboundedSender<AppEvent>,
) {
    let joined = match tokio::time::timeout(budget, &mut work).await {
        Ok(joined) => joined,
        Err(elapsed) => {
            tracing::warn!(?kind, ?budget, "store task timed out, it may still complete");
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(AppEvent::Store(kind.failed(elapsed.into())));
            let late = work.await;
            tracing::info!(?kind, ok = late.is_ok(), "timed out store task finished");
            late
        }
    };
    let result = joined.unwrap_or_else(|join_err| {
        tracing::error!(error = %join_err, ?kind, "store task panicked");
        kind.failed(CoreError::Custom(join_err.to_string()))
    });
    let _ = tx.send(AppEvent::Store(result));
}
