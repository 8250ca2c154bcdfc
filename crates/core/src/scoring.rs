//! Answer evaluation and exam thresholds.

use serde::{Deserialize, Serialize};

use crate::model::{OPTION_COUNT, OptionIndex, Question, QuizMode};

/// Per-option marker shown in answer feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    /// The user picked this option and it is right.
    SelectedCorrect,
    /// The user picked this option and it is wrong.
    SelectedWrong,
    /// Right option the user did not pick.
    Correct,
    Neutral,
}

/// Outcome of comparing a selected option with the question's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub selected: OptionIndex,
    pub correct: OptionIndex,
    pub is_correct: bool,
}

impl Evaluation {
    /// Markers for all four options in display order.
    #[must_use]
    pub fn marks(&self) -> [OptionMark; OPTION_COUNT] {
        let mut marks = [OptionMark::Neutral; OPTION_COUNT];
        for option in OptionIndex::all() {
            marks[option.value()] = match (option == self.selected, option == self.correct) {
                (true, true) => OptionMark::SelectedCorrect,
                (true, false) => OptionMark::SelectedWrong,
                (false, true) => OptionMark::Correct,
                (false, false) => OptionMark::Neutral,
            };
        }
        marks
    }
}

#[must_use]
pub fn evaluate(question: &Question, selected: OptionIndex) -> Evaluation {
    let correct = question.correct_option();
    Evaluation {
        selected,
        correct,
        is_correct: selected == correct,
    }
}

/// True iff an exam has collected `threshold` or more wrong answers.
#[must_use]
pub fn should_fail_fast(mode: QuizMode, wrong_count: u32, threshold: u32) -> bool {
    mode == QuizMode::Exam && wrong_count >= threshold
}

/// Whether a finished session counts as passed.
///
/// Learning sessions have no pass bar and always pass; callers that only
/// report exam results should check the mode first.
#[must_use]
pub fn compute_pass(mode: QuizMode, score: u32, pass_threshold: u32) -> bool {
    match mode {
        QuizMode::Exam => score >= pass_threshold,
        QuizMode::Learning => true,
    }
}
