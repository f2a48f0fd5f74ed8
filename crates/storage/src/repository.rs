use async_trait::async_trait;
use quiz_core::model::{Question, QuestionId, QuestionKind, ValidatedQuestion};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::session_store::{InMemorySessionStore, SessionStore};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert shape for a question; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionRecord {
    pub kind: QuestionKind,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub feedback: Option<String>,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn from_validated(question: &ValidatedQuestion) -> Self {
        Self {
            kind: question.kind,
            text: question.text.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_answer.clone(),
            feedback: question.feedback.clone(),
        }
    }
}

/// Read side of the question store, as seen by the quiz engine.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// All questions in authoring order. An empty store yields an empty vec.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn list_all(&self) -> Result<Vec<Question>, StorageError>;
}

/// Authoring side of the question store.
#[async_trait]
pub trait QuestionRepository: QuestionCatalog {
    /// Append a question at the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, question: NewQuestionRecord)
    -> Result<QuestionId, StorageError>;

    /// Fetch a question by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Remove a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no question has that ID.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;
}

#[derive(Default)]
struct InMemoryQuestions {
    next_id: u64,
    questions: Vec<Question>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryQuestions>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionCatalog for InMemoryRepository {
    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.questions.clone())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_id += 1;
        let id = QuestionId::new(guard.next_id);
        guard.questions.push(Question::from_persisted(
            id,
            question.kind,
            question.text,
            question.options,
            question.correct_answer,
            question.feedback,
        ));
        Ok(id)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.questions.iter().find(|q| q.id() == id).cloned())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.questions.len();
        guard.questions.retain(|q| q.id() != id);
        if guard.questions.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

/// Aggregates the question store and the session table behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn QuestionCatalog>,
    pub questions: Arc<dyn QuestionRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let catalog: Arc<dyn QuestionCatalog> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self {
            catalog,
            questions,
            sessions,
        }
    }
}
