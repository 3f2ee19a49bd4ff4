// SPDX-License-Identifier: BUSL-1.1
//! Shared handles passed to every pipeline loop.

use std::sync::Arc;

use brewline_actuator::Actuator;
use brewline_core::{Clock, SystemClock};

use crate::config::PipelineConfig;
use crate::metrics::PipelineMetrics;
use crate::shutdown::Shutdown;

/// Everything a loop needs besides its own queues. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub actuator: Arc<dyn Actuator>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<PipelineConfig>,
    pub metrics: PipelineMetrics,
    pub shutdown: Shutdown,
}

impl PipelineContext {
    pub fn new(actuator: Arc<dyn Actuator>, config: PipelineConfig) -> Self {
        Self::with_clock(actuator, config, Arc::new(SystemClock))
    }

    /// Context driven by an explicit clock, for tests that step time by hand.
    pub fn with_clock(
        actuator: Arc<dyn Actuator>,
        config: PipelineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            actuator,
            clock,
            config: Arc::new(config),
            metrics: PipelineMetrics::new(),
            shutdown: Shutdown::new(),
        }
    }
}
