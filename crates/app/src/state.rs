//! Service wiring shared by every transport.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use services::{Clock, QuestionService, SessionEngine};
use storage::repository::Storage;
use tokio::task::JoinHandle;

/// Reply sent when a turn fails for reasons the user can't fix.
pub const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again later.";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
    pub questions: QuestionService,
}

impl AppState {
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let engine = Arc::new(SessionEngine::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.sessions),
        ));
        let questions = QuestionService::new(Arc::clone(&storage.questions));
        Self { engine, questions }
    }
}

/// Periodically drop sessions nobody has answered in `idle_timeout`.
pub fn spawn_idle_sweeper(
    engine: Arc<SessionEngine>,
    idle_timeout: StdDuration,
    every: StdDuration,
) -> JoinHandle<()> {
    let max_idle = chrono::Duration::from_std(idle_timeout).unwrap_or(chrono::Duration::MAX);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match engine.sweep_idle(max_idle).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "idle sweep finished"),
                Err(err) => tracing::warn!(error = %err, "idle sweep failed"),
            }
        }
    })
}
