use crate::error::ErrorKind;
use crate::model::{
    CompletionReason, LanguageMode, LocalizedText, OPTION_COUNT, OptionIndex, QuestionNumber,
    QuizMode,
};
use crate::scoring::OptionMark;

/// Render request produced by a transition and carried out by the transport.
///
/// Views hold data only; wording, emoji and layout stay with the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PromptLanguage,
    PromptMode { language_mode: LanguageMode },
    RenderQuestion(QuestionView),
    RenderFeedback(FeedbackView),
    RenderSummary(SummaryView),
    Paused(PauseView),
    RenderError { kind: ErrorKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub number: QuestionNumber,
    pub prompt: LocalizedText,
    pub options: Vec<LocalizedText>,
    /// 1-based position in the session.
    pub position: usize,
    pub total: usize,
    pub mode: QuizMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    pub number: QuestionNumber,
    pub prompt: LocalizedText,
    pub options: Vec<LocalizedText>,
    pub marks: [OptionMark; OPTION_COUNT],
    pub selected: OptionIndex,
    pub is_correct: bool,
    /// False when the position had already been scored (a revisited question).
    pub counted: bool,
    pub explanation: Option<LocalizedText>,
    pub position: usize,
    pub total: usize,
    pub score: u32,
    pub wrong_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryView {
    pub mode: QuizMode,
    pub score: u32,
    pub wrong_count: u32,
    pub total: usize,
    /// Only exams have a pass bar.
    pub passed: Option<bool>,
    pub reason: CompletionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseView {
    pub position: usize,
    pub total: usize,
    pub answered: usize,
}
