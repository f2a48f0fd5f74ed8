//! Per-sender turn serialization.

use std::sync::Arc;

use dashmap::DashMap;
use quiz_core::model::SenderId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per active sender.
///
/// Turns for the same sender run one at a time; different senders never wait
/// on each other. Entries are dropped once nobody holds or waits on them.
#[derive(Debug, Default)]
pub(crate) struct SenderLocks {
    locks: DashMap<SenderId, Arc<Mutex<()>>>,
}

impl SenderLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `sender`'s session.
    pub(crate) async fn acquire(&self, sender: &SenderId) -> SenderGuard<'_> {
        let lock = Arc::clone(
            self.locks
                .entry(sender.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = lock.lock_owned().await;
        SenderGuard {
            locks: self,
            sender: sender.clone(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

pub(crate) struct SenderGuard<'a> {
    locks: &'a SenderLocks,
    sender: SenderId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SenderGuard<'_> {
    fn drop(&mut self) {
        // Release the mutex first so the map holds the only remaining Arc when idle.
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.sender, |_, lock| Arc::strong_count(lock) == 1);
    }
}
