mod ids;
mod question;
mod rules;
mod session;

pub use ids::{ParseIdError, QuestionNumber, SessionId};
pub use question::{
    LocalizedText, OPTION_COUNT, OPTION_LABELS, OptionIndex, ParseOptionError, Question,
    QuestionBank, QuestionDraft, QuestionError,
};
pub use rules::{QuizRules, RulesError};
pub use session::{CompletionReason, LanguageMode, QuizMode, Session, SessionPhase};
