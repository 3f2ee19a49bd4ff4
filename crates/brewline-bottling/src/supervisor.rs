// SPDX-License-Identifier: BUSL-1.1
//! Loop supervision.
//!
//! A line loop is written as a [`LoopStage`] whose `step` handles one unit
//! of work. [`supervise`] drives it until shutdown, catching any error that
//! escapes a step and applying the configured [`LoopFailurePolicy`]. The
//! stage value, and with it the intake receiver and queue handles, survives
//! a restart, so nothing already queued is lost.
//!
//! A panicking step cannot be resumed: it ends the loop for good.
//! [`spawn_supervised`] watches for that, logs it at `error` and counts it
//! as a loop fault, so a dead stage shows up in monitoring.

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::LoopFailurePolicy;
use crate::context::PipelineContext;
use crate::error::PipelineError;

/// Outcome of one successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// Input exhausted or shutdown observed.
    Stop,
}

#[async_trait]
pub(crate) trait LoopStage: Send {
    fn name(&self) -> &'static str;

    async fn step(&mut self) -> Result<Flow, PipelineError>;
}

/// Spawn `stage` under [`supervise`]. The returned task finishes when the
/// loop does, whether it stopped, terminated or panicked.
pub(crate) fn spawn_supervised<S: LoopStage + 'static>(
    stage: S,
    ctx: PipelineContext,
    line: String,
) -> JoinHandle<()> {
    let name = stage.name();
    let inner = tokio::spawn(supervise(stage, ctx.clone(), line.clone()));
    tokio::spawn(async move {
        if let Err(e) = inner.await {
            if e.is_panic() {
                ctx.metrics.record_loop_fault(name);
                tracing::error!(line = %line, stage = name, error = %e, "loop panicked, stage stopped");
            }
        }
    })
}

pub(crate) async fn supervise<S: LoopStage>(mut stage: S, ctx: PipelineContext, line: String) {
    let name = stage.name();
    tracing::debug!(line = %line, stage = name, "loop started");

    loop {
        if ctx.shutdown.is_triggered() {
            break;
        }
        match stage.step().await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(e) => {
                ctx.metrics.record_loop_fault(name);
                match ctx.config.loop_failure {
                    LoopFailurePolicy::Terminate => {
                        tracing::error!(line = %line, stage = name, error = %e, "loop terminated");
                        break;
                    }
                    LoopFailurePolicy::Restart => {
                        tracing::warn!(
                            line = %line,
                            stage = name,
                            error = %e,
                            backoff_ms = ctx.config.restart_backoff.as_millis() as u64,
                            "loop faulted, restarting"
                        );
                        if !ctx.shutdown.sleep(ctx.config.restart_backoff).await {
                            break;
                        }
                        ctx.metrics.record_loop_restart(name);
                    }
                }
            }
        }
    }

    tracing::debug!(line = %line, stage = name, "loop stopped");
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::PipelineConfig;
    use crate::mock::RecordingActuator;

    struct Exploding;

    #[async_trait]
    impl LoopStage for Exploding {
        fn name(&self) -> &'static str {
            "intake"
        }

        async fn step(&mut self) -> Result<Flow, PipelineError> {
            panic!("stage blew up");
        }
    }

    struct CountDown(u32);

    #[async_trait]
    impl LoopStage for CountDown {
        fn name(&self) -> &'static str {
            "maturation"
        }

        async fn step(&mut self) -> Result<Flow, PipelineError> {
            if self.0 == 0 {
                return Ok(Flow::Stop);
            }
            self.0 -= 1;
            Ok(Flow::Continue)
        }
    }

    fn context() -> PipelineContext {
        PipelineContext::new(
            Arc::new(RecordingActuator::default()),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn panicking_stage_is_counted_as_fault() {
        let ctx = context();
        let handle = spawn_supervised(Exploding, ctx.clone(), "IPA".to_string());
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("watcher finishes")
            .expect("watcher itself does not panic");
        assert_eq!(ctx.metrics.loop_faults(), 1);
        assert_eq!(ctx.metrics.loop_restarts(), 0);
    }

    #[tokio::test]
    async fn clean_stop_is_not_a_fault() {
        let ctx = context();
        spawn_supervised(CountDown(3), ctx.clone(), "IPA".to_string())
            .await
            .unwrap();
        assert_eq!(ctx.metrics.loop_faults(), 0);
    }
}
