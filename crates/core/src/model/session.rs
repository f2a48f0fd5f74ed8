use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Question, SenderId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session already completed")]
    Completed,
}

/// Result of recording one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerStep {
    /// Index of the question that was answered.
    pub answered: usize,
    pub correct: bool,
    pub score: usize,
    pub is_complete: bool,
}

/// One sender's pass through a quiz.
///
/// `questions` is a snapshot taken at start; `current` only moves forward,
/// one step per recorded answer, and never passes `questions.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    sender: SenderId,
    questions: Arc<[Question]>,
    current: usize,
    score: usize,
    started_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl QuizSession {
    /// Start a session positioned on the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if `questions` is empty.
    pub fn start(
        sender: SenderId,
        questions: impl Into<Arc<[Question]>>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        let questions = questions.into();
        if questions.is_empty() {
            return Err(QuizSessionError::Empty);
        }
        let session = Self {
            sender,
            questions,
            current: 0,
            score: 0,
            started_at,
            last_activity_at: started_at,
        };
        session.debug_check_invariants();
        Ok(session)
    }

    #[must_use]
    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Record the outcome for the current question and move to the next one.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Completed` if every question was already answered.
    pub fn record_answer(
        &mut self,
        correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerStep, QuizSessionError> {
        if self.is_complete() {
            return Err(QuizSessionError::Completed);
        }
        let answered = self.current;
        if correct {
            self.score += 1;
        }
        self.current += 1;
        if answered_at > self.last_activity_at {
            self.last_activity_at = answered_at;
        }
        self.debug_check_invariants();

        Ok(AnswerStep {
            answered,
            correct,
            score: self.score,
            is_complete: self.is_complete(),
        })
    }

    /// True when no answer has arrived since `cutoff`.
    #[must_use]
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_activity_at < cutoff
    }

    fn debug_check_invariants(&self) {
        debug_assert!(
            self.current <= self.questions.len(),
            "current index {} past {} questions",
            self.current,
            self.questions.len()
        );
        debug_assert!(
            self.score <= self.current,
            "score {} exceeds answered count {}",
            self.score,
            self.current
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionId, QuestionKind};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn question(id: u64) -> Question {
        Question::from_persisted(
            QuestionId::new(id),
            QuestionKind::FillInTheBlank,
            format!("Q{id}"),
            Vec::new(),
            format!("A{id}"),
            None,
        )
    }

    fn sender() -> SenderId {
        SenderId::new("u1").unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::start(sender(), Vec::<Question>::new(), fixed_now()).unwrap_err();
        assert_eq!(err, QuizSessionError::Empty);
    }

    #[test]
    fn session_starts_on_first_question() {
        let session = QuizSession::start(sender(), vec![question(1), question(2)], fixed_now())
            .unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total(), 2);
        assert_eq!(session.current_question().unwrap().id(), QuestionId::new(1));
        assert!(!session.is_complete());
    }

    #[test]
    fn session_advances_and_completes() {
        let mut session =
            QuizSession::start(sender(), vec![question(1), question(2)], fixed_now()).unwrap();

        let first = session.record_answer(true, fixed_now()).unwrap();
        assert_eq!(first.answered, 0);
        assert_eq!(first.score, 1);
        assert!(!first.is_complete);
        assert_eq!(session.current_question().unwrap().id(), QuestionId::new(2));

        let second = session.record_answer(false, fixed_now()).unwrap();
        assert_eq!(second.answered, 1);
        assert_eq!(second.score, 1);
        assert!(second.is_complete);
        assert!(session.current_question().is_none());

        let err = session.record_answer(true, fixed_now()).unwrap_err();
        assert_eq!(err, QuizSessionError::Completed);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn activity_timestamp_tracks_answers() {
        let start = fixed_now();
        let mut session = QuizSession::start(sender(), vec![question(1), question(2)], start)
            .unwrap();
        let later = start + Duration::minutes(5);
        session.record_answer(true, later).unwrap();

        assert_eq!(session.started_at(), start);
        assert_eq!(session.last_activity_at(), later);
        assert!(session.is_idle_since(later + Duration::seconds(1)));
        assert!(!session.is_idle_since(later));
    }

    #[test]
    fn clones_share_the_question_snapshot() {
        let session = QuizSession::start(sender(), vec![question(1)], fixed_now()).unwrap();
        let copy = session.clone();
        assert!(std::ptr::eq(session.questions(), copy.questions()));
    }
}
