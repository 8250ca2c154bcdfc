use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{LanguageMode, OptionIndex, QuestionNumber, QuizMode, Session, SessionId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RUN RECORDS ───────────────────────────────────────────────────────────────
//

/// Lifecycle of an analytics run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    InProgress,
    Completed,
    /// Exam stopped by the fail-fast rule.
    Failed,
    /// Restarted before reaching a summary.
    Abandoned,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(RunStatus::InProgress),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            "abandoned" => Ok(RunStatus::Abandoned),
            other => Err(StorageError::Serialization(format!(
                "invalid run status: {other}"
            ))),
        }
    }
}

/// Persisted shape of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub session_id: SessionId,
    pub mode: QuizMode,
    pub total: u32,
    pub score: u32,
    pub wrong: u32,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// One scored answer inside a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLogRecord {
    pub run_id: i64,
    pub question_number: QuestionNumber,
    pub selected: OptionIndex,
    pub correct: OptionIndex,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    pub latency_ms: Option<i64>,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Keyed storage for in-flight sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored row cannot be decoded.
    async fn load(&self, id: SessionId) -> Result<Option<Session>, StorageError>;

    /// Persist or replace the session, stamped with `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save(
        &self,
        id: SessionId,
        session: &Session,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Forget the session. Removing a missing session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn remove(&self, id: SessionId) -> Result<(), StorageError>;
}

/// Append-only analytics of users, runs and answers.
#[async_trait]
pub trait QuizLogRepository: Send + Sync {
    /// Register the user behind a session, or update their language.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn ensure_user(
        &self,
        session_id: SessionId,
        language: LanguageMode,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Open a run and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the run cannot be stored.
    async fn start_run(
        &self,
        session_id: SessionId,
        mode: QuizMode,
        total: u32,
        started_at: DateTime<Utc>,
    ) -> Result<i64, StorageError>;

    /// Record an answer and bump the run's score or wrong counter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown run, or other storage errors.
    async fn log_answer(&self, answer: &AnswerLogRecord) -> Result<(), StorageError>;

    /// Close a run with a final status.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown run, or other storage errors.
    async fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_run(&self, run_id: i64) -> Result<RunRecord, StorageError>;

    /// Answers of a run in logging order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn answers_for_run(&self, run_id: i64) -> Result<Vec<AnswerLogRecord>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct LogState {
    users: HashMap<SessionId, LanguageMode>,
    runs: HashMap<i64, RunRecord>,
    answers: Vec<AnswerLogRecord>,
    next_run_id: i64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
    log: Arc<Mutex<LogState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Language recorded for a session's user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn user_language(&self, id: SessionId) -> Result<Option<LanguageMode>, StorageError> {
        let guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.users.get(&id).copied())
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn load(&self, id: SessionId) -> Result<Option<Session>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn save(
        &self,
        id: SessionId,
        session: &Session,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, session.clone());
        Ok(())
    }

    async fn remove(&self, id: SessionId) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl QuizLogRepository for InMemoryRepository {
    async fn ensure_user(
        &self,
        session_id: SessionId,
        language: LanguageMode,
        _at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.users.insert(session_id, language);
        Ok(())
    }

    async fn start_run(
        &self,
        session_id: SessionId,
        mode: QuizMode,
        total: u32,
        started_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_run_id += 1;
        let id = guard.next_run_id;
        guard.runs.insert(
            id,
            RunRecord {
                id,
                session_id,
                mode,
                total,
                score: 0,
                wrong: 0,
                status: RunStatus::InProgress,
                started_at,
                finished_at: None,
            },
        );
        Ok(id)
    }

    async fn log_answer(&self, answer: &AnswerLogRecord) -> Result<(), StorageError> {
        let mut guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let run = guard
            .runs
            .get_mut(&answer.run_id)
            .ok_or(StorageError::NotFound)?;
        if answer.is_correct {
            run.score += 1;
        } else {
            run.wrong += 1;
        }
        guard.answers.push(answer.clone());
        Ok(())
    }

    async fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let run = guard.runs.get_mut(&run_id).ok_or(StorageError::NotFound)?;
        run.status = status;
        run.finished_at = Some(finished_at);
        Ok(())
    }

    async fn get_run(&self, run_id: i64) -> Result<RunRecord, StorageError> {
        let guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.runs.get(&run_id).cloned().ok_or(StorageError::NotFound)
    }

    async fn answers_for_run(&self, run_id: i64) -> Result<Vec<AnswerLogRecord>, StorageError> {
        let guard = self
            .log
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .answers
            .iter()
            .filter(|a| a.run_id == run_id)
            .cloned()
            .collect())
    }
}

/// Aggregates the session store and analytics log behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
    pub quiz_log: Arc<dyn QuizLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionStore> = Arc::new(repo.clone());
        let quiz_log: Arc<dyn QuizLogRepository> = Arc::new(repo);
        Self { sessions, quiz_log }
    }
}
