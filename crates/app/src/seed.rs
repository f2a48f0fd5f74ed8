//! Bulk catalog loading from TOML.
//!
//! ```toml
//! [[questions]]
//! type = "multiple_choice"
//! text = "Pick a color"
//! options = ["Red", "Green"]
//! correct_answer = "Green"
//! feedback = "Green it is."
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use quiz_core::model::{QuestionDraft, QuestionId};
use serde::Deserialize;
use services::QuestionService;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

/// Parse seed file contents.
pub fn parse_seed(content: &str) -> Result<SeedFile> {
    toml::from_str(content).context("invalid seed file")
}

/// Validate every draft, then append them in file order.
///
/// Nothing is inserted if any draft is invalid.
pub async fn seed_questions(
    questions: &QuestionService,
    seed: SeedFile,
) -> Result<Vec<QuestionId>> {
    for (index, draft) in seed.questions.iter().enumerate() {
        draft
            .clone()
            .validate()
            .with_context(|| format!("question #{} ({:?})", index + 1, draft.text))?;
    }

    let mut ids = Vec::with_capacity(seed.questions.len());
    for draft in seed.questions {
        ids.push(questions.add_question(draft).await?);
    }
    Ok(ids)
}

/// Read `path` and seed its questions.
pub async fn seed_from_file(questions: &QuestionService, path: &Path) -> Result<Vec<QuestionId>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    seed_questions(questions, parse_seed(&content)?).await
}
