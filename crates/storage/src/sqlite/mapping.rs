use quiz_core::model::{Question, QuestionId, QuestionKind};
use sqlx::Row;

use crate::repository::StorageError;

/// Separator between options in the `questions.options` column.
pub const OPTION_DELIMITER: char = ',';

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u64::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization("question_id sign overflow".into()))
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

/// Split a stored option column into trimmed entries.
///
/// Blank entries stay in place so option numbers line up with the column. A
/// missing or all-whitespace column means no options.
#[must_use]
pub fn split_options(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => s
            .split(OPTION_DELIMITER)
            .map(|opt| opt.trim().to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Join options for storage; `None` when there are none.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if an option contains the delimiter,
/// since it could not be split back apart.
pub fn join_options(options: &[String]) -> Result<Option<String>, StorageError> {
    if options.is_empty() {
        return Ok(None);
    }
    if let Some(bad) = options.iter().find(|opt| opt.contains(OPTION_DELIMITER)) {
        return Err(StorageError::Serialization(format!(
            "option {bad:?} contains the '{OPTION_DELIMITER}' delimiter"
        )));
    }
    Ok(Some(options.join(&OPTION_DELIMITER.to_string())))
}

/// Stored types outside the known set are served like fill-in-the-blank
/// questions rather than failing the whole catalog.
pub(crate) fn parse_question_kind(raw: &str) -> QuestionKind {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(question_type = raw, "unknown question type, treating as fill_in_the_blank");
        QuestionKind::FillInTheBlank
    })
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let kind_str: String = row.try_get("question_type").map_err(ser)?;
    let options: Option<String> = row.try_get("options").map_err(ser)?;

    Ok(Question::from_persisted(
        id,
        parse_question_kind(&kind_str),
        row.try_get::<String, _>("question_text").map_err(ser)?,
        split_options(options.as_deref()),
        row.try_get::<String, _>("correct_answer").map_err(ser)?,
        row.try_get::<Option<String>, _>("feedback").map_err(ser)?,
    ))
}
