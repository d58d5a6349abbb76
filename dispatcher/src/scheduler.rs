//! Delay scheduler
//!
//! Suspends the calling task without blocking other tasks on the runtime.
//! Waits cannot be cancelled once started; they always run to completion.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
pub struct DelayScheduler;

impl DelayScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Suspend for at least `duration`
    pub async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Suspend until `deadline` has passed
    pub async fn wait_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}
