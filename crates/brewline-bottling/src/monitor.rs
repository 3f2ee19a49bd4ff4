// SPDX-License-Identifier: BUSL-1.1
//! Equipment monitor: polls the equipment state and requests a repair
//! whenever it reports `Stopped` or `Crashed`.

use brewline_actuator::ActuatorError;
use brewline_core::EquipmentState;

use crate::context::PipelineContext;

#[derive(Debug, Clone)]
pub struct EquipmentMonitor {
    ctx: PipelineContext,
}

impl EquipmentMonitor {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// Poll every `monitor_interval` until shutdown. Errors are logged and
    /// polling continues.
    pub async fn run(self) {
        tracing::debug!("equipment monitor started");
        while self.ctx.shutdown.sleep(self.ctx.config.monitor_interval).await {
            if let Err(e) = self.check_once().await {
                tracing::warn!(error = %e, "equipment check failed");
            }
        }
        tracing::debug!("equipment monitor stopped");
    }

    /// Poll once, repairing if needed. Returns the state observed before any
    /// repair.
    pub async fn check_once(&self) -> Result<EquipmentState, ActuatorError> {
        let state = self.ctx.actuator.equipment_state().await?;
        if state.needs_repair() {
            tracing::warn!(%state, "equipment down, requesting repair");
            self.ctx.actuator.repair().await?;
            self.ctx.metrics.record_repair();
        }
        Ok(state)
    }
}
