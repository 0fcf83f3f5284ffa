use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Periodic tick task with an explicit cancellation handle.
///
/// The task stops on its own when the callback returns `false`; dropping or
/// cancelling the handle stops it immediately, so no tick is delivered afterwards.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Spawn on the current tokio runtime. The first tick fires one `period` from now.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime or with a zero `period`.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // Remaining time comes from the deadline, so catching up on missed ticks is useless.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        Self { task }
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
