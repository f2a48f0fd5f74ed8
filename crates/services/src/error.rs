//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, QuizSessionError};
use storage::repository::StorageError;

/// Errors emitted by `SessionEngine`.
///
/// None of these leave a half-written session behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("question catalog unavailable: {0}")]
    CatalogUnavailable(#[source] StorageError),
    #[error("session store failed: {0}")]
    SessionStore(#[source] StorageError),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors emitted by `QuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionServiceError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
