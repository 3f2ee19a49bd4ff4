// SPDX-License-Identifier: BUSL-1.1
//! Pipeline error types.

use brewline_actuator::ActuatorError;
use brewline_core::ValidationError;
use thiserror::Error;

/// Errors raised inside the pipeline.
///
/// An error escaping a loop body is caught at the loop boundary and handled
/// according to the configured [`LoopFailurePolicy`](crate::LoopFailurePolicy).
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An equipment call failed.
    #[error("actuator call failed: {0}")]
    Actuator(#[from] ActuatorError),

    /// A bottle or case violated a domain invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The shutdown signal has fired; no new bottles are accepted.
    #[error("pipeline is shutting down")]
    ShuttingDown,
}
