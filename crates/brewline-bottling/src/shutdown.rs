// SPDX-License-Identifier: BUSL-1.1
//! Process-wide cooperative shutdown signal.
//!
//! Loops check [`Shutdown::is_triggered`] at the top of every iteration and
//! race their suspension points (channel waits, interval sleeps) against
//! [`Shutdown::triggered`]. In-flight actuator calls are not aborted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Cloneable shutdown handle. All clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal has fired.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Sleep for `duration` unless shutdown fires first.
    ///
    /// Returns `true` if the full duration elapsed, `false` on shutdown.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.triggered() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
