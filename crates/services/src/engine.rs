use std::sync::Arc;

use chrono::Duration;
use quiz_core::format::{self, NO_QUESTIONS_MESSAGE};
use quiz_core::model::{Question, QuizSession, QuizSessionError, SenderId};
use quiz_core::{Clock, check_answer, format_question};
use storage::repository::QuestionCatalog;
use storage::session_store::SessionStore;

use crate::error::EngineError;
use crate::locks::SenderLocks;

/// Drives each sender through a quiz, one inbound message at a time.
///
/// A sender without a session gets the first question of a fresh snapshot of
/// the catalog. A sender with a session has their text checked against the
/// current question and receives feedback plus the next question, or the
/// final score once the last question is answered (which also ends the
/// session).
pub struct SessionEngine {
    clock: Clock,
    catalog: Arc<dyn QuestionCatalog>,
    sessions: Arc<dyn SessionStore>,
    locks: SenderLocks,
}

impl SessionEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        catalog: Arc<dyn QuestionCatalog>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            clock,
            catalog,
            sessions,
            locks: SenderLocks::new(),
        }
    }

    /// Handle one inbound message and produce the reply text.
    ///
    /// Turns for the same sender are serialized; the session is only written
    /// back once the whole turn has succeeded.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::CatalogUnavailable` if a new quiz can't load its
    /// questions, and `EngineError::SessionStore` if the session table fails.
    /// In both cases the sender's session is left as it was.
    #[tracing::instrument(level = "debug", skip(self, sender, inbound), fields(sender = %sender))]
    pub async fn advance(&self, sender: &SenderId, inbound: &str) -> Result<String, EngineError> {
        let _turn = self.locks.acquire(sender).await;

        let existing = self
            .sessions
            .get(sender)
            .await
            .map_err(EngineError::SessionStore)?;

        match existing {
            Some(session) if !session.is_complete() => self.answer(session, inbound).await,
            _ => self.start(sender).await,
        }
    }

    async fn start(&self, sender: &SenderId) -> Result<String, EngineError> {
        let questions = self.catalog.list_all().await.map_err(|err| {
            tracing::error!(error = %err, "failed to load questions for new quiz");
            EngineError::CatalogUnavailable(err)
        })?;

        if questions.is_empty() {
            tracing::info!("no questions available, quiz not started");
            return Ok(NO_QUESTIONS_MESSAGE.to_string());
        }

        let session = QuizSession::start(sender.clone(), questions, self.clock.now())?;
        let Some(first) = session.current_question() else {
            return Err(QuizSessionError::Empty.into());
        };
        warn_if_malformed(first);
        let reply = format_question(first);

        tracing::info!(total = session.total(), "quiz started");
        self.sessions
            .put(session)
            .await
            .map_err(EngineError::SessionStore)?;
        Ok(reply)
    }

    async fn answer(&self, mut session: QuizSession, inbound: &str) -> Result<String, EngineError> {
        let Some(question) = session.current_question().cloned() else {
            return Err(QuizSessionError::Completed.into());
        };

        let correct = check_answer(&question, inbound);
        let step = session.record_answer(correct, self.clock.now())?;
        tracing::debug!(
            question_id = %question.id(),
            index = step.answered,
            correct,
            score = step.score,
            "answer recorded"
        );

        let feedback = format::answer_feedback(&question, correct);

        if step.is_complete {
            let reply = format::with_summary(&feedback, step.score, session.total());
            self.sessions
                .delete(session.sender())
                .await
                .map_err(EngineError::SessionStore)?;
            tracing::info!(score = step.score, total = session.total(), "quiz completed");
            return Ok(reply);
        }

        let Some(next) = session.current_question() else {
            return Err(QuizSessionError::Completed.into());
        };
        warn_if_malformed(next);
        let reply = format::with_next_question(&feedback, next);

        self.sessions
            .put(session)
            .await
            .map_err(EngineError::SessionStore)?;
        Ok(reply)
    }

    /// Drop sessions that have been idle for longer than `max_idle`.
    ///
    /// Returns how many sessions were removed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionStore` if the session table fails.
    pub async fn sweep_idle(&self, max_idle: Duration) -> Result<usize, EngineError> {
        let Some(cutoff) = self.clock.now().checked_sub_signed(max_idle) else {
            return Ok(0);
        };
        let evicted = self
            .sessions
            .evict_idle(cutoff)
            .await
            .map_err(EngineError::SessionStore)?;
        for sender in &evicted {
            tracing::info!(sender = %sender, "evicted idle quiz session");
        }
        Ok(evicted.len())
    }

    /// Number of quizzes currently in progress.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionStore` if the session table fails.
    pub async fn active_sessions(&self) -> Result<usize, EngineError> {
        self.sessions.len().await.map_err(EngineError::SessionStore)
    }
}

fn warn_if_malformed(question: &Question) {
    if !question.is_well_formed() {
        tracing::warn!(
            question_id = %question.id(),
            kind = %question.kind(),
            "question has no options; it cannot be answered by number"
        );
    }
}
