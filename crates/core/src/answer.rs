//! Free-text answer matching.

use crate::model::{Question, QuestionKind};

/// Decide whether `raw` answers `question` correctly.
///
/// Both sides are trimmed and lowercased. A multiple choice answer made only of
/// ASCII digits is read as a 1-based option number; anything out of range is
/// wrong. Signed input (`+2`, `-1`) is compared as text. Malformed questions
/// never panic, they just never match by number.
#[must_use]
pub fn check_answer(question: &Question, raw: &str) -> bool {
    let answer = normalize(raw);
    let expected = normalize(question.correct_answer());

    match question.kind() {
        QuestionKind::MultipleChoice if is_option_number(&answer) => answer
            .parse::<usize>()
            .ok()
            .and_then(|number| selected_option(question.options(), number))
            .is_some_and(|option| normalize(option) == expected),
        QuestionKind::MultipleChoice => answer == expected,
        QuestionKind::TrueFalse | QuestionKind::FillInTheBlank => answer == expected,
    }
}

fn is_option_number(answer: &str) -> bool {
    !answer.is_empty() && answer.bytes().all(|b| b.is_ascii_digit())
}

fn selected_option(options: &[String], number: usize) -> Option<&String> {
    options.get(number.checked_sub(1)?)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
