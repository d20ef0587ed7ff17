//! Event intake: fast acknowledgment, deduplicated at-least-once processing, backgrounded side effects.
//!
//! Flow per delivery attempt: the HTTP endpoint parses the body and calls
//! [`Dispatcher::dispatch`], which drops retries and duplicates and otherwise spawns a
//! [`Worker`] through [`TaskSpawner`]. The worker filters the event, generates an image,
//! and replies. Every terminal state is counted in [`IntakeStats`].

mod dedup;
mod dispatch;
mod event;
mod filter;
mod stats;
mod tasks;
mod worker;

pub use dedup::{DedupStore, MemoryDedupStore};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use event::InboundEvent;
pub use filter::{classify, IgnoreReason, Verdict};
pub use stats::{EventState, IntakeStats, StatsSnapshot};
pub use tasks::TaskSpawner;
pub use worker::{render_reply, Worker, WorkerOutcome};
