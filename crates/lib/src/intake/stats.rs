//! Counters for every terminal state an inbound event can reach.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Terminal (or intermediate, for `Received`/`Accepted`) states of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Received,
    DroppedRetry,
    DroppedDuplicate,
    Accepted,
    Ignored,
    GenerationFailed,
    Sent,
    SendFailed,
}

/// Process-wide intake counters. Shared by the dispatcher, workers and the health endpoint.
#[derive(Debug, Default)]
pub struct IntakeStats {
    received: AtomicU64,
    dropped_retry: AtomicU64,
    dropped_duplicate: AtomicU64,
    accepted: AtomicU64,
    ignored: AtomicU64,
    generation_failed: AtomicU64,
    sent: AtomicU64,
    send_failed: AtomicU64,
    panicked: AtomicU64,
}

/// Point-in-time copy of `IntakeStats`, as served on the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub received: u64,
    pub dropped_retry: u64,
    pub dropped_duplicate: u64,
    pub accepted: u64,
    pub ignored: u64,
    pub generation_failed: u64,
    pub sent: u64,
    pub send_failed: u64,
    pub panicked: u64,
    /// Accepted events whose worker has not finished yet.
    pub in_flight: u64,
}

impl IntakeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, state: EventState) {
        let counter = match state {
            EventState::Received => &self.received,
            EventState::DroppedRetry => &self.dropped_retry,
            EventState::DroppedDuplicate => &self.dropped_duplicate,
            EventState::Accepted => &self.accepted,
            EventState::Ignored => &self.ignored,
            EventState::GenerationFailed => &self.generation_failed,
            EventState::Sent => &self.sent,
            EventState::SendFailed => &self.send_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A background task died by panic before reaching a terminal state.
    pub fn record_panic(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut s = StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            dropped_retry: self.dropped_retry.load(Ordering::Relaxed),
            dropped_duplicate: self.dropped_duplicate.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            generation_failed: self.generation_failed.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            send_failed: self.send_failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            in_flight: 0,
        };
        let finished = s.ignored + s.generation_failed + s.sent + s.send_failed + s.panicked;
        s.in_flight = s.accepted.saturating_sub(finished);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_is_accepted_minus_finished() {
        let stats = IntakeStats::new();
        for _ in 0..4 {
            stats.record(EventState::Accepted);
        }
        stats.record(EventState::Sent);
        stats.record(EventState::Ignored);
        stats.record_panic();
        let s = stats.snapshot();
        assert_eq!(s.accepted, 4);
        assert_eq!(s.in_flight, 1);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let stats = IntakeStats::new();
        stats.record(EventState::DroppedDuplicate);
        let v = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(v["droppedDuplicate"], 1);
        assert_eq!(v["inFlight"], 0);
    }
}
