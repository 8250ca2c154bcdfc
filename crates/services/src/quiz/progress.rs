use quiz_core::model::{
    LanguageMode, QuestionBank, QuestionNumber, QuizMode, Session, SessionPhase,
};
use serde::Serialize;

/// Aggregated view of session progress, useful for transports.
///
/// `current_question` is the number of the question on screen; a transport
/// compares it with the number it rendered buttons for to drop stale taps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub phase: SessionPhase,
    pub language_mode: LanguageMode,
    pub quiz_mode: Option<QuizMode>,
    /// 1-based; 0 before a quiz starts.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub score: u32,
    pub wrong_count: u32,
    pub is_paused: bool,
    pub current_question: Option<QuestionNumber>,
}

impl SessionProgress {
    #[must_use]
    pub fn from_session(session: &Session, bank: &QuestionBank) -> Self {
        let position = if session.total() == 0 {
            0
        } else {
            (session.cursor() + 1).min(session.total())
        };
        Self {
            phase: session.phase(),
            language_mode: session.language_mode(),
            quiz_mode: session.quiz_mode(),
            position,
            total: session.total(),
            answered: session.answered_count(),
            score: session.score(),
            wrong_count: session.wrong_count(),
            is_paused: session.is_paused(),
            current_question: session
                .current_question_index()
                .and_then(|index| bank.get(index))
                .map(|q| q.number()),
        }
    }
}
