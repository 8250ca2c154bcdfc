use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("exam size must be > 0")]
    InvalidExamSize,

    #[error("fail threshold must be > 0")]
    InvalidFailThreshold,

    #[error("pass threshold ({pass}) cannot exceed exam size ({exam_size})")]
    PassThresholdAboveExamSize { pass: u32, exam_size: u32 },
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Exam parameters shared by every session.
///
/// - `exam_size`: number of questions sampled for an exam
/// - `fail_threshold`: wrong answers that end an exam early
/// - `pass_threshold`: correct answers needed to pass an exam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRules {
    exam_size: u32,
    fail_threshold: u32,
    pass_threshold: u32,
}

impl QuizRules {
    pub const DEFAULT_EXAM_SIZE: u32 = 30;
    pub const DEFAULT_FAIL_THRESHOLD: u32 = 6;
    pub const DEFAULT_PASS_THRESHOLD: u32 = 25;

    /// Creates validated rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if a size or threshold is zero, or if passing would
    /// need more correct answers than the exam has questions.
    pub fn new(exam_size: u32, fail_threshold: u32, pass_threshold: u32) -> Result<Self, RulesError> {
        if exam_size == 0 {
            return Err(RulesError::InvalidExamSize);
        }
        if fail_threshold == 0 {
            return Err(RulesError::InvalidFailThreshold);
        }
        if pass_threshold > exam_size {
            return Err(RulesError::PassThresholdAboveExamSize {
                pass: pass_threshold,
                exam_size,
            });
        }
        Ok(Self {
            exam_size,
            fail_threshold,
            pass_threshold,
        })
    }

    #[must_use]
    pub fn exam_size(&self) -> u32 {
        self.exam_size
    }

    #[must_use]
    pub fn fail_threshold(&self) -> u32 {
        self.fail_threshold
    }

    #[must_use]
    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }
}

impl Default for QuizRules {
    /// 30 sampled questions, six mistakes end the exam, 25 correct answers pass.
    fn default() -> Self {
        Self {
            exam_size: Self::DEFAULT_EXAM_SIZE,
            fail_threshold: Self::DEFAULT_FAIL_THRESHOLD,
            pass_threshold: Self::DEFAULT_PASS_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_exam_format() {
        let rules = QuizRules::default();
        assert_eq!(rules.exam_size(), 30);
        assert_eq!(rules.fail_threshold(), 6);
        assert_eq!(rules.pass_threshold(), 25);
        assert_eq!(QuizRules::new(30, 6, 25).unwrap(), rules);
    }

    #[test]
    fn rejects_inconsistent_thresholds() {
        assert_eq!(QuizRules::new(0, 6, 0), Err(RulesError::InvalidExamSize));
        assert_eq!(QuizRules::new(10, 0, 5), Err(RulesError::InvalidFailThreshold));
        assert_eq!(
            QuizRules::new(10, 3, 11),
            Err(RulesError::PassThresholdAboveExamSize {
                pass: 11,
                exam_size: 10
            })
        );
    }
}
