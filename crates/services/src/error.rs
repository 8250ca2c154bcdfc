//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `QuizService`.
///
/// Quiz rule violations are not errors at this level: they turn into render
/// actions. Only infrastructure failures surface here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("shared state lock poisoned: {0}")]
    Poisoned(String),
}
