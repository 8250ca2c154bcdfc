use std::fmt;

use quiz_core::machine::Event;
use quiz_core::model::{LanguageMode, OptionIndex, QuestionNumber, QuizMode};

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quiz(Input),
    Progress,
    Help,
    Quit,
}

/// Quiz input before the transport attaches the question it rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Language(LanguageMode),
    Mode(QuizMode),
    Answer(OptionIndex),
    Next,
    Jump(u32),
    Pause,
    Resume,
    Restart,
}

impl Input {
    /// Build the machine event; answers carry the number of the question on screen.
    #[must_use]
    pub fn into_event(self, on_screen: Option<QuestionNumber>) -> Event {
        match self {
            Input::Language(mode) => Event::ChooseLanguage(mode),
            Input::Mode(mode) => Event::ChooseQuizMode(mode),
            Input::Answer(option) => Event::SubmitAnswer {
                option: option.value(),
                question: on_screen,
            },
            Input::Next => Event::Advance,
            Input::Jump(number) => Event::JumpTo(number),
            Input::Pause => Event::Pause,
            Input::Resume => Event::Resume,
            Input::Restart => Event::Restart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub line: String,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized input: {:?} (type `help`)", self.line)
    }
}

impl std::error::Error for CommandError {}

/// Parse a trimmed input line. Empty lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let err = || CommandError {
        line: line.to_string(),
    };
    let lower = line.to_lowercase();
    let mut words = lower.split_whitespace();
    let head = words.next().unwrap_or_default();
    let arg = words.next();
    if words.next().is_some() {
        return Err(err());
    }

    let command = match (head, arg) {
        ("start" | "restart", None) => Command::Quiz(Input::Restart),
        ("lang", Some("en" | "primary")) => Command::Quiz(Input::Language(LanguageMode::Primary)),
        ("lang", Some("bi" | "bilingual" | "uk")) => {
            Command::Quiz(Input::Language(LanguageMode::Bilingual))
        }
        ("mode", Some("learning" | "learn")) => Command::Quiz(Input::Mode(QuizMode::Learning)),
        ("mode", Some("exam")) => Command::Quiz(Input::Mode(QuizMode::Exam)),
        ("next" | "n", None) => Command::Quiz(Input::Next),
        ("jump", Some(n)) => Command::Quiz(Input::Jump(n.parse().map_err(|_| err())?)),
        ("pause" | "stop", None) => Command::Quiz(Input::Pause),
        ("resume", None) => Command::Quiz(Input::Resume),
        ("progress", None) => Command::Progress,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        ("answer", Some(label)) => Command::Quiz(Input::Answer(label.parse().map_err(|_| err())?)),
        (label, None) => Command::Quiz(Input::Answer(label.parse().map_err(|_| err())?)),
        _ => return Err(err()),
    };
    Ok(Some(command))
}

pub fn print_help() {
    println!("Commands:");
    println!("  start              show the language menu (also: restart)");
    println!("  lang en | lang bi  English only, or English with Ukrainian");
    println!("  mode learning      every question in order, explanations shown");
    println!("  mode exam          random sample, stops early after too many mistakes");
    println!("  a | b | c | d      answer the question on screen (or 1-4)");
    println!("  next               continue after feedback");
    println!("  jump <n>           go to the n-th question (learning mode)");
    println!("  pause | resume     pause and come back later (also: stop)");
    println!("  progress           show where you are");
    println!("  quit               leave (paused sessions are kept with --db)");
}
