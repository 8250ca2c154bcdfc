//! JSON question bank loader.

use quiz_core::model::{QuestionBank, QuestionDraft, QuestionError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankLoadError {
    #[error("failed to read question bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed question bank: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid question at position {position}: {source}")]
    Question {
        position: usize,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    Bank(QuestionError),
}

/// One entry of the bank file as written by content authors.
///
/// `question_number` may be omitted, in which case the 1-based position in the
/// file is used. Empty secondary option lists count as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub question_number: Option<u32>,
    pub question: String,
    #[serde(default)]
    pub question_uk: Option<String>,
    pub options: Vec<String>,
    #[serde(default)]
    pub options_uk: Option<Vec<String>>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation_en: Option<String>,
    #[serde(default)]
    pub explanation_uk: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn into_draft(self, position: usize) -> QuestionDraft {
        let fallback = u32::try_from(position + 1).unwrap_or(u32::MAX);
        QuestionDraft {
            number: self.question_number.unwrap_or(fallback),
            prompt: self.question,
            prompt_secondary: self.question_uk,
            options: self.options,
            options_secondary: self.options_uk.filter(|o| !o.is_empty()),
            correct_option: self.answer_index,
            explanation: self.explanation_en,
            explanation_secondary: self.explanation_uk,
        }
    }
}

/// Parse and validate a bank from JSON text.
///
/// # Errors
///
/// Returns `BankLoadError::Json` for malformed input, `BankLoadError::Question`
/// for the first invalid record and `BankLoadError::Bank` for an empty bank or
/// duplicate numbers.
pub fn bank_from_json_str(json: &str) -> Result<QuestionBank, BankLoadError> {
    let records: Vec<QuestionRecord> = serde_json::from_str(json)?;
    let questions = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            record
                .into_draft(position)
                .validate()
                .map_err(|source| BankLoadError::Question { position, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    QuestionBank::new(questions).map_err(BankLoadError::Bank)
}

/// Read a bank file from disk.
///
/// # Errors
///
/// Returns `BankLoadError::Io` when the file cannot be read, otherwise the
/// errors of [`bank_from_json_str`].
pub fn load_bank_from_path(path: impl AsRef<Path>) -> Result<QuestionBank, BankLoadError> {
    let json = std::fs::read_to_string(path)?;
    bank_from_json_str(&json)
}
