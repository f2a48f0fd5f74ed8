//! Outbound message text.
//!
//! Replies are a single message: answer feedback, a separator, then either the
//! next question or the completion summary.

use crate::model::{Question, QuestionKind};

/// Reply sent when a quiz can't start because the catalog is empty.
pub const NO_QUESTIONS_MESSAGE: &str = "No questions available";

const NEXT_QUESTION_SEPARATOR: &str = "\n\nNext Question:\n\n";
const SUMMARY_SEPARATOR: &str = "\n\n";

/// Render a question as it is shown to the user.
#[must_use]
pub fn format_question(question: &Question) -> String {
    match question.kind() {
        QuestionKind::MultipleChoice => {
            let options = question
                .options()
                .iter()
                .enumerate()
                .map(|(i, option)| format!("{}. {}", i + 1, option.trim()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n\n{options}", question.text())
        }
        QuestionKind::TrueFalse | QuestionKind::FillInTheBlank => question.text().to_string(),
    }
}

/// Feedback line(s) for an answered question.
#[must_use]
pub fn answer_feedback(question: &Question, correct: bool) -> String {
    let feedback = question.feedback().unwrap_or("");
    if correct {
        format!("Correct! {feedback}")
    } else {
        format!(
            "Wrong. The correct answer was: {}\n{feedback}",
            question.correct_answer()
        )
    }
}

#[must_use]
pub fn completion_summary(score: usize, total: usize) -> String {
    format!("Quiz completed! Your score: {score}/{total}")
}

/// Feedback followed by the next question.
#[must_use]
pub fn with_next_question(feedback: &str, next: &Question) -> String {
    format!("{feedback}{NEXT_QUESTION_SEPARATOR}{}", format_question(next))
}

/// Feedback followed by the final score.
#[must_use]
pub fn with_summary(feedback: &str, score: usize, total: usize) -> String {
    format!(
        "{feedback}{SUMMARY_SEPARATOR}{}",
        completion_summary(score, total)
    )
}
