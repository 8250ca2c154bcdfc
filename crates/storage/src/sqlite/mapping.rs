use quiz_core::model::{OptionIndex, QuestionNumber, QuizMode, SessionId};
use sqlx::Row;

use crate::repository::{AnswerLogRecord, RunRecord, RunStatus, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn quiz_mode_to_str(mode: QuizMode) -> &'static str {
    mode.as_str()
}

pub(crate) fn parse_quiz_mode(s: &str) -> Result<QuizMode, StorageError> {
    match s {
        "learning" => Ok(QuizMode::Learning),
        "exam" => Ok(QuizMode::Exam),
        _ => Err(StorageError::Serialization(format!("invalid mode: {s}"))),
    }
}

/// Options are stored by their 0-based index.
pub(crate) fn option_to_i64(option: OptionIndex) -> i64 {
    i64::try_from(option.value()).unwrap_or(i64::MAX)
}

pub(crate) fn option_from_i64(field: &'static str, v: i64) -> Result<OptionIndex, StorageError> {
    usize::try_from(v)
        .ok()
        .and_then(OptionIndex::new)
        .ok_or_else(|| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_run_row(row: &sqlx::sqlite::SqliteRow) -> Result<RunRecord, StorageError> {
    let mode: String = row.try_get("mode").map_err(ser)?;
    let status: String = row.try_get("status").map_err(ser)?;
    Ok(RunRecord {
        id: row.try_get("id").map_err(ser)?,
        session_id: SessionId::new(row.try_get("session_id").map_err(ser)?),
        mode: parse_quiz_mode(&mode)?,
        total: u32_from_i64("total", row.try_get("total").map_err(ser)?)?,
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        wrong: u32_from_i64("wrong", row.try_get("wrong").map_err(ser)?)?,
        status: status.parse::<RunStatus>()?,
        started_at: row.try_get("started_at").map_err(ser)?,
        finished_at: row.try_get("finished_at").map_err(ser)?,
    })
}

pub(crate) fn map_answer_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<AnswerLogRecord, StorageError> {
    let number = u32_from_i64(
        "question_number",
        row.try_get("question_number").map_err(ser)?,
    )?;
    Ok(AnswerLogRecord {
        run_id: row.try_get("run_id").map_err(ser)?,
        question_number: QuestionNumber::new(number),
        selected: option_from_i64("selected", row.try_get("selected").map_err(ser)?)?,
        correct: option_from_i64("correct", row.try_get("correct").map_err(ser)?)?,
        is_correct: row.try_get("is_correct").map_err(ser)?,
        answered_at: row.try_get("answered_at").map_err(ser)?,
        latency_ms: row.try_get("latency_ms").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_indices_stay_in_range() {
        let option = OptionIndex::new(3).unwrap();
        assert_eq!(option_from_i64("selected", option_to_i64(option)).unwrap(), option);
        assert!(option_from_i64("selected", 4).is_err());
        assert!(option_from_i64("selected", -1).is_err());
    }

    #[test]
    fn quiz_modes_use_lowercase_labels() {
        for mode in [QuizMode::Learning, QuizMode::Exam] {
            assert_eq!(parse_quiz_mode(quiz_mode_to_str(mode)).unwrap(), mode);
        }
        assert!(parse_quiz_mode("practice").is_err());
    }
}
