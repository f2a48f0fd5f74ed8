use chrono::Utc;
use quiz_core::model::{Question, QuestionId};

use super::SqliteRepository;
use super::mapping::{join_options, map_question_row, question_id_from_i64, question_id_to_i64};
use crate::repository::{NewQuestionRecord, QuestionCatalog, QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionCatalog for SqliteRepository {
    async fn list_all(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question_type, question_text, options, correct_answer, feedback
            FROM questions
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let options = join_options(&question.options)?;

        let res = sqlx::query(
            r"
            INSERT INTO questions (question_type, question_text, options, correct_answer, feedback, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(question.kind.as_str())
        .bind(question.text)
        .bind(options)
        .bind(question.correct_answer)
        .bind(question.feedback)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, question_type, question_text, options, correct_answer, feedback
            FROM questions WHERE id = ?1
            ",
        )
        .bind(question_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM questions WHERE id = ?1")
            .bind(question_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
