// SPDX-License-Identifier: BUSL-1.1
//! Pipeline assembly: the dispatcher plus the two process-wide loops.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::bottling::Bottling;
use crate::context::PipelineContext;
use crate::expiry::ExpirySweeper;
use crate::monitor::EquipmentMonitor;
use crate::shutdown::Shutdown;

/// A running pipeline.
///
/// Lines are started lazily by [`Bottling::submit`]; the expiry sweeper and
/// the equipment monitor start immediately.
#[derive(Debug)]
pub struct Pipeline {
    bottling: Arc<Bottling>,
    shutdown: Shutdown,
    sweeper: JoinHandle<()>,
    monitor: JoinHandle<()>,
}

impl Pipeline {
    /// Start the sweeper and the monitor on the current tokio runtime.
    pub fn start(ctx: PipelineContext) -> Self {
        let shutdown = ctx.shutdown.clone();
        let bottling = Arc::new(Bottling::new(ctx.clone()));

        let sweeper = tokio::spawn(ExpirySweeper::new(Arc::clone(&bottling)).run());
        let monitor = tokio::spawn(EquipmentMonitor::new(ctx.clone()).run());

        tracing::info!(
            queue_mode = %ctx.config.queue_mode,
            fill_attempts = ctx.config.fill_attempts,
            expiry_horizon_secs = ctx.config.expiry_horizon.num_seconds(),
            "bottling pipeline started"
        );

        Self {
            bottling,
            shutdown,
            sweeper,
            monitor,
        }
    }

    pub fn bottling(&self) -> &Arc<Bottling> {
        &self.bottling
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Signal every loop to stop. In-flight actuator calls complete.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the sweeper, the monitor and every line to stop. Only
    /// returns once [`Pipeline::shutdown`] has been called.
    pub async fn join(self) {
        for (name, handle) in [("sweeper", self.sweeper), ("monitor", self.monitor)] {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "pipeline task panicked");
            }
        }
        for line in self.bottling.lines() {
            line.join().await;
        }
        tracing::info!("bottling pipeline stopped");
    }
}
