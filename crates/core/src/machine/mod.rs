//! Session state machine: events in, render actions out.

mod action;
mod event;
mod transition;

pub use action::{Action, FeedbackView, PauseView, QuestionView, SummaryView};
pub use event::Event;
pub use transition::{AnswerRecord, QuizEngine, Transition};
