use std::sync::Arc;

use quiz_core::model::{Question, QuestionDraft, QuestionId};
use storage::repository::{NewQuestionRecord, QuestionCatalog, QuestionRepository};

use crate::error::QuestionServiceError;

/// Authoring operations on the question catalog.
#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionRepository>,
}

impl QuestionService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Validate a draft and append it to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Question` for validation failures.
    /// Returns `QuestionServiceError::Storage` if persistence fails.
    pub async fn add_question(
        &self,
        draft: QuestionDraft,
    ) -> Result<QuestionId, QuestionServiceError> {
        let validated = draft.validate()?;
        let id = self
            .questions
            .insert_question(NewQuestionRecord::from_validated(&validated))
            .await?;
        tracing::info!(question_id = %id, kind = %validated.kind, "question added");
        Ok(id)
    }

    /// All questions in quiz order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if repository access fails.
    pub async fn list_questions(&self) -> Result<Vec<Question>, QuestionServiceError> {
        Ok(self.questions.list_all().await?)
    }

    /// Remove a question from the catalog. Quizzes already in progress keep
    /// their own copy.
    ///
    /// # Errors
    ///
    /// Returns `QuestionServiceError::Storage` if the question does not exist
    /// or repository access fails.
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), QuestionServiceError> {
        self.questions.delete_question(id).await?;
        tracing::info!(question_id = %id, "question deleted");
        Ok(())
    }
}
