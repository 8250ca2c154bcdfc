use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

//
// ─── MODES ─────────────────────────────────────────────────────────────────────
//

/// Which texts the transport should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
    /// Primary language only.
    #[default]
    Primary,
    /// Primary language followed by the secondary-language rendition.
    Bilingual,
}

/// How questions are picked and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Whole bank in natural order, explanations after correct answers.
    Learning,
    /// Fixed-size random sample, no explanations, fail-fast and pass threshold.
    Exam,
}

impl QuizMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Learning => "learning",
            QuizMode::Exam => "exam",
        }
    }
}

impl LanguageMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageMode::Primary => "primary",
            LanguageMode::Bilingual => "bilingual",
        }
    }

    #[must_use]
    pub fn is_bilingual(self) -> bool {
        matches!(self, LanguageMode::Bilingual)
    }
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Position of a session in the quiz flow.
///
/// Pausing is tracked separately (`Session::is_paused`) and can overlay
/// `InQuestion` or `AwaitingContinue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    AwaitingLanguage,
    AwaitingMode,
    InQuestion,
    AwaitingContinue,
    Complete,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::AwaitingLanguage => "awaiting_language",
            SessionPhase::AwaitingMode => "awaiting_mode",
            SessionPhase::InQuestion => "in_question",
            SessionPhase::AwaitingContinue => "awaiting_continue",
            SessionPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Why a session reached `SessionPhase::Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// Every question in the order was asked.
    Finished,
    /// The exam hit the wrong-answer threshold.
    FailedFast,
    /// No unused question was left to present.
    Exhausted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Per-user quiz progress record.
///
/// Only the state machine mutates a session; everything outside the crate
/// reads it through accessors. `Default` is the freshly created (or restarted)
/// session waiting for a language choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub(crate) phase: SessionPhase,
    pub(crate) language_mode: LanguageMode,
    pub(crate) quiz_mode: Option<QuizMode>,
    pub(crate) question_order: Vec<usize>,
    pub(crate) used_questions: BTreeSet<usize>,
    pub(crate) answered_positions: BTreeSet<usize>,
    pub(crate) cursor: usize,
    pub(crate) score: u32,
    pub(crate) wrong_count: u32,
    pub(crate) paused: bool,
    pub(crate) resume_cursor: Option<usize>,
    pub(crate) completion: Option<CompletionReason>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) presented_at: Option<DateTime<Utc>>,
    #[serde(default)]
    run_id: Option<i64>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn language_mode(&self) -> LanguageMode {
        self.language_mode
    }

    #[must_use]
    pub fn quiz_mode(&self) -> Option<QuizMode> {
        self.quiz_mode
    }

    /// Bank indices in the order they are asked.
    #[must_use]
    pub fn question_order(&self) -> &[usize] {
        &self.question_order
    }

    /// Bank indices already presented in an exam.
    #[must_use]
    pub fn used_questions(&self) -> &BTreeSet<usize> {
        &self.used_questions
    }

    /// 0-based position into `question_order`.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn resume_cursor(&self) -> Option<usize> {
        self.resume_cursor
    }

    /// Feedback is on screen and a continue event is expected.
    #[must_use]
    pub fn awaiting_next(&self) -> bool {
        self.phase == SessionPhase::AwaitingContinue
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    #[must_use]
    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// Number of questions this session asks.
    #[must_use]
    pub fn total(&self) -> usize {
        self.question_order.len()
    }

    /// Positions that already recorded an outcome.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered_positions.len()
    }

    #[must_use]
    pub fn is_answered(&self, position: usize) -> bool {
        self.answered_positions.contains(&position)
    }

    /// Bank index of the question under the cursor while a quiz is running.
    #[must_use]
    pub fn current_question_index(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::InQuestion | SessionPhase::AwaitingContinue => {
                self.question_order.get(self.cursor).copied()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the question under the cursor was last rendered.
    #[must_use]
    pub fn presented_at(&self) -> Option<DateTime<Utc>> {
        self.presented_at
    }

    /// Identifier of the analytics run backing this session, if any.
    #[must_use]
    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    pub fn set_run_id(&mut self, id: Option<i64>) {
        self.run_id = id;
    }

    /// A quiz has started and not yet reached its summary.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::InQuestion | SessionPhase::AwaitingContinue
        )
    }
}
