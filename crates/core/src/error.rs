use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{QuizMode, SessionPhase};

/// Errors produced while applying an event to a session.
///
/// Every variant leaves the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("not enough questions for an exam: {available} available, {required} required")]
    InsufficientQuestions { available: usize, required: usize },

    #[error("operation not allowed in {mode:?} mode")]
    ModeNotAllowed { mode: Option<QuizMode> },

    #[error("option index {0} is out of range")]
    OptionOutOfRange(usize),

    #[error("question number {number} is outside 1..={bank_size}")]
    QuestionOutOfRange { number: u32, bank_size: usize },

    #[error("{event} is not valid in phase {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        event: &'static str,
    },
}

/// Transport-facing classification of a `QuizError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientQuestions,
    ModeNotAllowed,
    OutOfRange,
    InvalidTransition,
}

impl QuizError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::InsufficientQuestions { .. } => ErrorKind::InsufficientQuestions,
            QuizError::ModeNotAllowed { .. } => ErrorKind::ModeNotAllowed,
            QuizError::OptionOutOfRange(_) | QuizError::QuestionOutOfRange { .. } => {
                ErrorKind::OutOfRange
            }
            QuizError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        }
    }

    /// Duplicate or stale events are dropped without telling the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.kind() == ErrorKind::InvalidTransition
    }
}
