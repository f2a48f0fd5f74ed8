//! Per-sender quiz session table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{QuizSession, SenderId};

use crate::repository::StorageError;

/// Keyed storage for in-flight sessions.
///
/// Implementations only store and return sessions; serializing concurrent
/// turns for one sender is the caller's job.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get(&self, sender: &SenderId) -> Result<Option<QuizSession>, StorageError>;

    /// Insert or replace the session for its sender.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn put(&self, session: QuizSession) -> Result<(), StorageError>;

    /// Remove a sender's session. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete(&self, sender: &SenderId) -> Result<bool, StorageError>;

    /// Remove every session with no activity since `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<Vec<SenderId>, StorageError>;

    /// Number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn len(&self) -> Result<usize, StorageError>;
}

/// Process-local session table.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SenderId, QuizSession>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, sender: &SenderId) -> Result<Option<QuizSession>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(sender).cloned())
    }

    async fn put(&self, session: QuizSession) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(session.sender().clone(), session);
        Ok(())
    }

    async fn delete(&self, sender: &SenderId) -> Result<bool, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(sender).is_some())
    }

    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<Vec<SenderId>, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let idle: Vec<SenderId> = guard
            .values()
            .filter(|session| session.is_idle_since(cutoff))
            .map(|session| session.sender().clone())
            .collect();
        for sender in &idle {
            guard.remove(sender);
        }
        Ok(idle)
    }

    async fn len(&self) -> Result<usize, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Question, QuestionId, QuestionKind};
    use quiz_core::time::fixed_now;

    fn session(sender: &str, at: DateTime<Utc>) -> QuizSession {
        let q = Question::from_persisted(
            QuestionId::new(1),
            QuestionKind::TrueFalse,
            "Q",
            Vec::new(),
            "true",
            None,
        );
        QuizSession::start(SenderId::new(sender).unwrap(), vec![q], at).unwrap()
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = InMemorySessionStore::new();
        let sender = SenderId::new("u1").unwrap();
        assert!(store.get(&sender).await.unwrap().is_none());

        store.put(session("u1", fixed_now())).await.unwrap();
        let fetched = store.get(&sender).await.unwrap().unwrap();
        assert_eq!(fetched.current_index(), 0);
        assert_eq!(store.len().await.unwrap(), 1);

        assert!(store.delete(&sender).await.unwrap());
        assert!(!store.delete(&sender).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn put_replaces_existing_session() {
        let store = InMemorySessionStore::new();
        let mut s = session("u1", fixed_now());
        store.put(s.clone()).await.unwrap();
        s.record_answer(true, fixed_now()).unwrap();
        store.put(s).await.unwrap();

        let fetched = store
            .get(&SenderId::new("u1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.score(), 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn evict_idle_only_removes_stale_sessions() {
        let store = InMemorySessionStore::new();
        let now = fixed_now();
        store.put(session("stale", now - Duration::hours(2))).await.unwrap();
        store.put(session("fresh", now)).await.unwrap();

        let evicted = store.evict_idle(now - Duration::hours(1)).await.unwrap();
        assert_eq!(evicted, vec![SenderId::new("stale").unwrap()]);
        assert_eq!(store.len().await.unwrap(), 1);
        assert!(store
            .get(&SenderId::new("fresh").unwrap())
            .await
            .unwrap()
            .is_some());
    }
}
