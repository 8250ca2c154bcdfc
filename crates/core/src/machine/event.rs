use crate::model::{LanguageMode, QuestionNumber, QuizMode};

/// User action delivered by the transport for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ChooseLanguage(LanguageMode),
    ChooseQuizMode(QuizMode),
    /// Raw option index as tapped; `question` is the number the transport
    /// rendered the buttons for, used to drop replays aimed at a retired question.
    SubmitAnswer {
        option: usize,
        question: Option<QuestionNumber>,
    },
    Advance,
    /// Jump to a question by its public number (learning mode only).
    JumpTo(u32),
    Pause,
    Resume,
    Restart,
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::ChooseLanguage(_) => "choose_language",
            Event::ChooseQuizMode(_) => "choose_quiz_mode",
            Event::SubmitAnswer { .. } => "submit_answer",
            Event::Advance => "advance",
            Event::JumpTo(_) => "jump_to",
            Event::Pause => "pause",
            Event::Resume => "resume",
            Event::Restart => "restart",
        }
    }
}
