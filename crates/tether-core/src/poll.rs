// Periodic refresh driver, cancellable as a unit.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drives a recurring background operation on a fixed cadence.
///
/// One task at a time: `start` replaces any running task. `stop` is
/// idempotent and only returns once the task has fully wound down, so
/// no further invocation can begin afterwards. A tick already in
/// flight when `stop` is called runs to completion first.
#[derive(Debug, Default)]
pub struct PollScheduler {
    task: Mutex<Option<PollTask>>,
}

#[derive(Debug)]
struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `tick` every `period` until stopped.
    ///
    /// The first invocation happens one full period after `start`, not
    /// immediately; callers wanting an immediate refresh issue one
    /// themselves (the coalescer dedupes it against the ticks). A zero
    /// `period` disables polling: any running task is stopped and no
    /// new one starts.
    pub async fn start<F, Fut>(&self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Hold the slot lock across the whole replacement so concurrent
        // start/stop calls serialize; a task must never be dropped
        // while still running.
        let mut slot = self.task.lock().await;
        halt(slot.take()).await;

        // `tokio::time::interval` panics on a zero period; treat zero
        // as polling disabled.
        if period.is_zero() {
            return;
        }

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => tick().await,
                }
            }
            debug!("poll task stopped");
        });

        *slot = Some(PollTask { cancel, handle });
    }

    /// Stop the running task, waiting out any in-flight tick.
    pub async fn stop(&self) {
        let mut slot = self.task.lock().await;
        halt(slot.take()).await;
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }
}

async fn halt(task: Option<PollTask>) {
    if let Some(task) = task {
        task.cancel.cancel();
        let _ = task.handle.await;
    }
}
