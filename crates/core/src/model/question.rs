use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// The three supported question shapes.
///
/// Wire and storage names are the snake_case forms returned by [`QuestionKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Numbered options; answered by number or by option text.
    MultipleChoice,
    /// Answered with `true` or `false`.
    TrueFalse,
    /// Free text compared against the expected answer.
    FillInTheBlank,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::FillInTheBlank => "fill_in_the_blank",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "true_false" => Ok(Self::TrueFalse),
            "fill_in_the_blank" => Ok(Self::FillInTheBlank),
            other => Err(QuestionError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown question type: {0}")]
    UnknownKind(String),

    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer cannot be empty")]
    EmptyAnswer,

    #[error("multiple choice questions need at least one option")]
    MissingOptions,

    #[error("option {position} is blank")]
    BlankOption { position: usize },

    #[error("only multiple choice questions take options")]
    UnexpectedOptions,

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },

    #[error("true/false answer must be \"true\" or \"false\", got {0:?}")]
    InvalidTrueFalse(String),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single quiz question as served by the catalog.
///
/// Loaded data is never rejected; a multiple choice question without options
/// is representable and simply can't be answered by number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    text: String,
    options: Vec<String>,
    correct_answer: String,
    feedback: Option<String>,
}

impl Question {
    /// Rehydrate a question from storage without validation.
    ///
    /// Options are trimmed but kept in place, blanks included, so option
    /// numbers match what was stored.
    #[must_use]
    pub fn from_persisted(
        id: QuestionId,
        kind: QuestionKind,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        feedback: Option<String>,
    ) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
            options: trim_options(options),
            correct_answer: correct_answer.into(),
            feedback,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// True when a multiple choice question actually has options to pick from.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            QuestionKind::MultipleChoice => !self.options.is_empty(),
            QuestionKind::TrueFalse | QuestionKind::FillInTheBlank => true,
        }
    }
}

fn trim_options(options: Vec<String>) -> Vec<String> {
    options
        .into_iter()
        .map(|opt| opt.trim().to_string())
        .collect()
}

//
// ─── AUTHORING ─────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, as written in a seed file or a form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl QuestionDraft {
    /// Check the draft against the authoring rules for its kind.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` describing the first rule the draft breaks.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let correct_answer = self.correct_answer.trim();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        let mut options = trim_options(self.options);
        let has_options = options.iter().any(|opt| !opt.is_empty());

        match self.kind {
            QuestionKind::MultipleChoice => {
                if !has_options {
                    return Err(QuestionError::MissingOptions);
                }
                if let Some(blank) = options.iter().position(String::is_empty) {
                    return Err(QuestionError::BlankOption {
                        position: blank + 1,
                    });
                }
                let matches_option = options
                    .iter()
                    .any(|opt| opt.to_lowercase() == correct_answer.to_lowercase());
                if !matches_option {
                    return Err(QuestionError::AnswerNotAnOption {
                        answer: correct_answer.to_string(),
                    });
                }
            }
            QuestionKind::TrueFalse => {
                if has_options {
                    return Err(QuestionError::UnexpectedOptions);
                }
                let lowered = correct_answer.to_lowercase();
                if lowered != "true" && lowered != "false" {
                    return Err(QuestionError::InvalidTrueFalse(correct_answer.to_string()));
                }
            }
            QuestionKind::FillInTheBlank => {
                if has_options {
                    return Err(QuestionError::UnexpectedOptions);
                }
            }
        }

        if self.kind != QuestionKind::MultipleChoice {
            options.clear();
        }

        let feedback = self
            .feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        Ok(ValidatedQuestion {
            kind: self.kind,
            text: text.to_string(),
            options,
            correct_answer: correct_answer.to_string(),
            feedback,
        })
    }
}

/// A question that passed authoring validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub kind: QuestionKind,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub feedback: Option<String>,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            kind: self.kind,
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
            feedback: self.feedback,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: QuestionKind, options: &[&str], answer: &str) -> QuestionDraft {
        QuestionDraft {
            kind,
            text: "Question?".into(),
            options: options.iter().map(|s| (*s).to_string()).collect(),
            correct_answer: answer.into(),
            feedback: None,
        }
    }

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!(
            "multiple_choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::MultipleChoice
        );
        assert_eq!(
            "true_false".parse::<QuestionKind>().unwrap(),
            QuestionKind::TrueFalse
        );
        assert_eq!(
            "fill_in_the_blank".parse::<QuestionKind>().unwrap(),
            QuestionKind::FillInTheBlank
        );
        assert!(matches!(
            "essay".parse::<QuestionKind>(),
            Err(QuestionError::UnknownKind(k)) if k == "essay"
        ));
    }

    #[test]
    fn persisted_options_are_trimmed_and_keep_their_positions() {
        let q = Question::from_persisted(
            QuestionId::new(1),
            QuestionKind::MultipleChoice,
            "Pick",
            vec![" Red ".into(), "  ".into(), "Green".into()],
            "Green",
            None,
        );
        assert_eq!(q.options(), ["Red", "", "Green"]);
        assert!(q.is_well_formed());
    }

    #[test]
    fn multiple_choice_without_options_is_not_well_formed() {
        let q = Question::from_persisted(
            QuestionId::new(1),
            QuestionKind::MultipleChoice,
            "Pick",
            Vec::new(),
            "Green",
            None,
        );
        assert!(!q.is_well_formed());
    }

    #[test]
    fn draft_rejects_empty_text_and_answer() {
        let mut d = draft(QuestionKind::FillInTheBlank, &[], "x");
        d.text = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyText);

        let d = draft(QuestionKind::FillInTheBlank, &[], "  ");
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyAnswer);
    }

    #[test]
    fn multiple_choice_answer_must_be_an_option() {
        let d = draft(QuestionKind::MultipleChoice, &["Red", "Green"], "Blue");
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::AnswerNotAnOption { .. }
        ));

        let d = draft(QuestionKind::MultipleChoice, &["Red", "Green"], "green");
        let v = d.validate().unwrap();
        assert_eq!(v.options, vec!["Red".to_string(), "Green".to_string()]);
    }

    #[test]
    fn multiple_choice_requires_options() {
        let d = draft(QuestionKind::MultipleChoice, &["  "], "Red");
        assert_eq!(d.validate().unwrap_err(), QuestionError::MissingOptions);
    }

    #[test]
    fn multiple_choice_rejects_blank_options() {
        let d = draft(QuestionKind::MultipleChoice, &["Red", " ", "Green"], "Green");
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::BlankOption { position: 2 }
        );
    }

    #[test]
    fn blank_options_on_other_kinds_are_ignored() {
        let v = draft(QuestionKind::FillInTheBlank, &[""], "Paris")
            .validate()
            .unwrap();
        assert!(v.options.is_empty());
    }

    #[test]
    fn true_false_answer_is_checked() {
        let d = draft(QuestionKind::TrueFalse, &[], "maybe");
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::InvalidTrueFalse(_)
        ));
        assert!(draft(QuestionKind::TrueFalse, &[], "TRUE").validate().is_ok());
    }

    #[test]
    fn options_only_allowed_on_multiple_choice() {
        let d = draft(QuestionKind::FillInTheBlank, &["a"], "a");
        assert_eq!(d.validate().unwrap_err(), QuestionError::UnexpectedOptions);
    }

    #[test]
    fn blank_feedback_becomes_none_and_id_is_assigned() {
        let mut d = draft(QuestionKind::TrueFalse, &[], "true");
        d.feedback = Some("   ".into());
        let q = d.validate().unwrap().assign_id(QuestionId::new(7));
        assert_eq!(q.id(), QuestionId::new(7));
        assert_eq!(q.feedback(), None);
    }

    #[test]
    fn draft_deserializes_from_toml() {
        let d: QuestionDraft = toml::from_str(
            r#"
type = "multiple_choice"
text = "Pick a color"
options = ["Red", "Green"]
correct_answer = "Green"
feedback = "Ok"
"#,
        )
        .unwrap();
        assert_eq!(d.kind, QuestionKind::MultipleChoice);
        assert_eq!(d.options.len(), 2);
        assert_eq!(d.feedback.as_deref(), Some("Ok"));
    }
}
