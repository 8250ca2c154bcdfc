//! Question selection: exam sampling and next-unused lookup.

use rand::Rng;
use rand::seq::index;
use std::collections::BTreeSet;

use crate::error::QuizError;

/// A question picked from a session's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Position within the order (the new cursor).
    pub position: usize,
    /// Bank index stored at that position.
    pub question_index: usize,
}

/// Natural bank order used in learning mode.
#[must_use]
pub fn learning_order(bank_size: usize) -> Vec<usize> {
    (0..bank_size).collect()
}

/// Draw `exam_size` distinct bank indices uniformly at random, without replacement.
///
/// # Errors
///
/// Returns `QuizError::InsufficientQuestions` if the bank holds fewer than
/// `exam_size` questions.
pub fn build_exam_order<R: Rng + ?Sized>(
    bank_size: usize,
    exam_size: usize,
    rng: &mut R,
) -> Result<Vec<usize>, QuizError> {
    if bank_size < exam_size {
        return Err(QuizError::InsufficientQuestions {
            available: bank_size,
            required: exam_size,
        });
    }
    Ok(index::sample(rng, bank_size, exam_size).into_vec())
}

/// First entry of `order` whose bank index is not in `used`.
///
/// Scanning starts at position `from` and wraps to the start of the order
/// before giving up.
#[must_use]
pub fn select_next(order: &[usize], used: &BTreeSet<usize>, from: usize) -> Option<Selection> {
    let start = from.min(order.len());
    let (head, tail) = order.split_at(start);
    tail.iter()
        .enumerate()
        .map(|(offset, &question_index)| (start + offset, question_index))
        .chain(head.iter().copied().enumerate())
        .find(|(_, question_index)| !used.contains(question_index))
        .map(|(position, question_index)| Selection {
            position,
            question_index,
        })
}
