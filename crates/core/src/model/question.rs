use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionNumber;

/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Positional labels shown next to the options.
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question number must be > 0")]
    ZeroNumber,

    #[error("question {number}: prompt cannot be empty")]
    EmptyPrompt { number: u32 },

    #[error("question {number}: expected 4 options, found {found}")]
    OptionCount { number: u32, found: usize },

    #[error("question {number}: expected 4 secondary options, found {found}")]
    SecondaryOptionCount { number: u32, found: usize },

    #[error("question {number}: correct option {value} is outside 0..4")]
    CorrectOptionOutOfRange { number: u32, value: usize },

    #[error("question bank is empty")]
    EmptyBank,

    #[error("question number {0} appears more than once")]
    DuplicateNumber(u32),
}

//
// ─── OPTION INDEX ──────────────────────────────────────────────────────────────
//

/// Position of an option within a question, always in `0..OPTION_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionIndex(u8);

impl OptionIndex {
    /// Returns `None` when `value` does not address one of the four options.
    #[must_use]
    pub fn new(value: usize) -> Option<Self> {
        if value < OPTION_COUNT {
            u8::try_from(value).ok().map(Self)
        } else {
            None
        }
    }

    /// Resolves a case-insensitive `A`–`D` label.
    #[must_use]
    pub fn from_label(label: char) -> Option<Self> {
        let upper = label.to_ascii_uppercase();
        OPTION_LABELS
            .iter()
            .position(|l| *l == upper)
            .and_then(Self::new)
    }

    #[must_use]
    pub fn value(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn label(self) -> char {
        OPTION_LABELS[self.value()]
    }

    /// All option positions in display order.
    pub fn all() -> impl Iterator<Item = OptionIndex> {
        (0..OPTION_COUNT).filter_map(Self::new)
    }
}

impl fmt::Display for OptionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when free-text input does not name an option.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("not an option label: {raw:?}")]
pub struct ParseOptionError {
    raw: String,
}

impl FromStr for OptionIndex {
    type Err = ParseOptionError;

    /// Accepts a single `A`–`D` letter or a 1-based digit `1`–`4`, optionally
    /// followed by `.` or `)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['.', ')']);
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => match c.to_digit(10) {
                Some(digit) => usize::try_from(digit)
                    .ok()
                    .and_then(|d| d.checked_sub(1))
                    .and_then(Self::new),
                None => Self::from_label(c),
            },
            _ => None,
        }
        .ok_or_else(|| ParseOptionError { raw: s.to_owned() })
    }
}

//
// ─── LOCALIZED TEXT ────────────────────────────────────────────────────────────
//

/// Text in the primary language with an optional secondary-language rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub primary: String,
    pub secondary: Option<String>,
}

impl LocalizedText {
    #[must_use]
    pub fn new(primary: impl Into<String>, secondary: Option<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.filter(|s| !s.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn primary_only(primary: impl Into<String>) -> Self {
        Self::new(primary, None)
    }

    /// Copy that keeps the secondary text only when `bilingual` is set.
    #[must_use]
    pub fn for_display(&self, bilingual: bool) -> Self {
        Self {
            primary: self.primary.clone(),
            secondary: if bilingual { self.secondary.clone() } else { None },
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as it arrives from a bank loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub number: u32,
    pub prompt: String,
    pub prompt_secondary: Option<String>,
    pub options: Vec<String>,
    pub options_secondary: Option<Vec<String>>,
    pub correct_option: usize,
    pub explanation: Option<String>,
    pub explanation_secondary: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the number is zero, the prompt is blank, the
    /// option lists do not hold exactly four entries, or the correct option is
    /// out of range.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let number = self.number;
        if number == 0 {
            return Err(QuestionError::ZeroNumber);
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt { number });
        }
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                number,
                found: self.options.len(),
            });
        }
        let secondary: Vec<Option<String>> = match self.options_secondary {
            Some(list) if list.len() != OPTION_COUNT => {
                return Err(QuestionError::SecondaryOptionCount {
                    number,
                    found: list.len(),
                });
            }
            Some(list) => list.into_iter().map(Some).collect(),
            None => vec![None; OPTION_COUNT],
        };
        let correct_option =
            OptionIndex::new(self.correct_option).ok_or(QuestionError::CorrectOptionOutOfRange {
                number,
                value: self.correct_option,
            })?;

        let options = self
            .options
            .into_iter()
            .zip(secondary)
            .map(|(primary, secondary)| LocalizedText::new(primary, secondary))
            .collect();

        let explanation = self
            .explanation
            .filter(|e| !e.trim().is_empty())
            .map(|e| LocalizedText::new(e, self.explanation_secondary));

        Ok(Question {
            number: QuestionNumber::new(number),
            prompt: LocalizedText::new(self.prompt, self.prompt_secondary),
            options,
            correct_option,
            explanation,
        })
    }
}

/// Immutable multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    number: QuestionNumber,
    prompt: LocalizedText,
    options: Vec<LocalizedText>,
    correct_option: OptionIndex,
    explanation: Option<LocalizedText>,
}

impl Question {
    #[must_use]
    pub fn number(&self) -> QuestionNumber {
        self.number
    }

    #[must_use]
    pub fn prompt(&self) -> &LocalizedText {
        &self.prompt
    }

    /// The four options in display order.
    #[must_use]
    pub fn options(&self) -> &[LocalizedText] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> OptionIndex {
        self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&LocalizedText> {
        self.explanation.as_ref()
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Ordered, immutable collection of questions loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_number: HashMap<QuestionNumber, usize>,
}

impl QuestionBank {
    /// Build a bank, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyBank` for an empty list and
    /// `QuestionError::DuplicateNumber` when two questions share a number.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        if questions.is_empty() {
            return Err(QuestionError::EmptyBank);
        }
        let mut by_number = HashMap::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            if by_number.insert(question.number(), index).is_some() {
                return Err(QuestionError::DuplicateNumber(question.number().value()));
            }
        }
        Ok(Self {
            questions,
            by_number,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Bank index of the question carrying `number`.
    #[must_use]
    pub fn index_of(&self, number: QuestionNumber) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
