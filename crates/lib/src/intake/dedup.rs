//! Accepted-event set: the at-most-once gate in front of every side effect.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Records which event ids have been accepted for processing.
///
/// `try_accept` is an atomic test-and-set: of any number of concurrent calls with the
/// same id, exactly one returns true over the lifetime of the store.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Mark `event_id` accepted. Returns false when it was already accepted.
    async fn try_accept(&self, event_id: &str) -> bool;
}

/// Process-local dedup store. Lives as long as the process; nothing is persisted.
#[derive(Default)]
pub struct MemoryDedupStore {
    seen: Mutex<HashSet<String>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted ids.
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn try_accept(&self, event_id: &str) -> bool {
        let mut seen = self.seen.lock().await;
        if seen.contains(event_id) {
            return false;
        }
        seen.insert(event_id.to_string())
    }
}
