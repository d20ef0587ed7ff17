//! Per-delivery decision: drop a retry, drop a duplicate, or hand off to a worker.

use crate::intake::dedup::DedupStore;
use crate::intake::event::InboundEvent;
use crate::intake::stats::{EventState, IntakeStats};
use crate::intake::tasks::TaskSpawner;
use crate::intake::worker::Worker;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Retry header said this is not the first attempt.
    DroppedRetry,
    /// The event id was already accepted.
    DroppedDuplicate,
    /// A worker was spawned for the event.
    Accepted,
}

/// Gatekeeper between the HTTP endpoint and workers.
///
/// Two independent checks run before anything is spawned: the retry header (no dedup
/// lookup) and the dedup store test-and-set. The worker is spawned only after the id
/// is recorded, so at most one worker ever runs per event id.
#[derive(Clone)]
pub struct Dispatcher {
    dedup: Arc<dyn DedupStore>,
    worker: Arc<Worker>,
    spawner: TaskSpawner,
    stats: Arc<IntakeStats>,
}

impl Dispatcher {
    pub fn new(dedup: Arc<dyn DedupStore>, worker: Arc<Worker>, stats: Arc<IntakeStats>) -> Self {
        Self {
            dedup,
            worker,
            spawner: TaskSpawner::new(stats.clone()),
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<IntakeStats> {
        &self.stats
    }

    /// Classify one delivery attempt. Returns without waiting for the worker.
    pub async fn dispatch(&self, event: InboundEvent) -> DispatchOutcome {
        self.stats.record(EventState::Received);

        if !event.is_first_attempt() {
            log::debug!(
                "event {}: dropped retry attempt {}",
                event.event_id,
                event.retry_count
            );
            self.stats.record(EventState::DroppedRetry);
            return DispatchOutcome::DroppedRetry;
        }

        if !self.dedup.try_accept(&event.event_id).await {
            log::debug!("event {}: dropped duplicate delivery", event.event_id);
            self.stats.record(EventState::DroppedDuplicate);
            return DispatchOutcome::DroppedDuplicate;
        }

        self.stats.record(EventState::Accepted);
        let worker = self.worker.clone();
        let stats = self.stats.clone();
        let label = format!("event {}", event.event_id);
        self.spawner.spawn(label, async move {
            let outcome = worker.run(&event).await;
            stats.record(outcome.state());
        });
        DispatchOutcome::Accepted
    }
}
