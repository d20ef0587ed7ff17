//! Spawn-and-forget background tasks with a panic boundary.

use crate::intake::stats::IntakeStats;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs one-shot futures on the tokio runtime. A panic inside a task is caught,
/// logged and counted in `IntakeStats`; it never takes down the process or other tasks.
#[derive(Clone)]
pub struct TaskSpawner {
    stats: Arc<IntakeStats>,
}

impl TaskSpawner {
    pub fn new(stats: Arc<IntakeStats>) -> Self {
        Self { stats }
    }

    /// Spawn `fut` in the background. `label` names the task in logs.
    /// The returned handle may be dropped; the task keeps running.
    pub fn spawn<F>(&self, label: String, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let stats = self.stats.clone();
        tokio::spawn(async move {
            if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
                stats.record_panic();
                log::error!("{}: task panicked: {}", label, panic_message(panic.as_ref()));
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
