//! Repeating background task with an explicit cancel handle.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Stops the task on `cancel()` or when dropped
#[derive(Debug)]
pub struct RotationHandle {
    task: JoinHandle<()>,
}

impl RotationHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `task` every `period`, first after one full period.
///
/// Must be called inside a tokio runtime. A zero period is raised to 1ms.
pub fn spawn_repeating<F>(period: Duration, mut task: F) -> RotationHandle
where
    F: FnMut() + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let start = Instant::now() + period;
    let task = tokio::spawn(async move {
        let mut interval = interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            task();
        }
    });
    RotationHandle { task }
}
