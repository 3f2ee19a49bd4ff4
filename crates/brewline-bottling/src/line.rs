// SPDX-License-Identifier: BUSL-1.1
//! # Bottling Line
//!
//! One line per routing key. A line owns a fermentation queue and a shipping
//! queue and runs two supervised tasks:
//!
//! - **intake**: takes bottles off an unbounded FIFO channel, recycles broken
//!   ones, tops up the container, fills the bottle (bounded retries) and
//!   starts fermentation.
//! - **maturation**: moves fermented bottles to the shipping queue and ships
//!   a case whenever a full one is available.
//!
//! The shipping queue is also drained from outside the line by the
//! [`crate::ExpirySweeper`].

use std::sync::Arc;

use async_trait::async_trait;
use brewline_core::{Bottle, BottleId, Case};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::fermentation::FermentationQueue;
use crate::metrics::ExpiryStage;
use crate::shipping::ShippingQueue;
use crate::supervisor::{spawn_supervised, Flow, LoopStage};

/// Point-in-time view of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineStatus {
    pub key: String,
    pub fermenting: usize,
    pub shipping: usize,
    pub intake_running: bool,
    pub maturation_running: bool,
}

#[derive(Debug)]
pub struct BottlingLine {
    key: String,
    intake: mpsc::UnboundedSender<Bottle>,
    fermentation: Arc<FermentationQueue>,
    shipping: Arc<ShippingQueue>,
    ctx: PipelineContext,
    intake_task: Mutex<Option<JoinHandle<()>>>,
    maturation_task: Mutex<Option<JoinHandle<()>>>,
}

impl BottlingLine {
    /// Create the line and spawn its two loops on the current tokio runtime.
    pub fn start(key: impl Into<String>, ctx: &PipelineContext) -> Arc<Self> {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let fermentation = Arc::new(FermentationQueue::new());
        let shipping = Arc::new(ShippingQueue::new());

        let intake = IntakeStage {
            line: key.clone(),
            rx,
            fermentation: Arc::clone(&fermentation),
            ctx: ctx.clone(),
        };
        let maturation = MaturationStage {
            line: key.clone(),
            fermentation: Arc::clone(&fermentation),
            shipping: Arc::clone(&shipping),
            ctx: ctx.clone(),
        };
        let intake_task = spawn_supervised(intake, ctx.clone(), key.clone());
        let maturation_task = spawn_supervised(maturation, ctx.clone(), key.clone());

        tracing::info!(line = %key, "bottling line started");

        Arc::new(Self {
            key,
            intake: tx,
            fermentation,
            shipping,
            ctx: ctx.clone(),
            intake_task: Mutex::new(Some(intake_task)),
            maturation_task: Mutex::new(Some(maturation_task)),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a bottle for intake. Never blocks.
    ///
    /// If the intake loop has ended (shutdown, or a terminated loop) the
    /// bottle is dropped and counted.
    pub fn submit(&self, bottle: Bottle) {
        if let Err(mpsc::error::SendError(bottle)) = self.intake.send(bottle) {
            tracing::warn!(
                line = %self.key,
                bottle_id = %bottle.id,
                "intake loop has stopped, bottle dropped"
            );
            self.ctx.metrics.record_intake_dropped();
        }
    }

    pub fn shipping_queue(&self) -> &Arc<ShippingQueue> {
        &self.shipping
    }

    pub fn fermentation_queue(&self) -> &Arc<FermentationQueue> {
        &self.fermentation
    }

    pub fn status(&self) -> LineStatus {
        LineStatus {
            key: self.key.clone(),
            fermenting: self.fermentation.len(),
            shipping: self.shipping.len(),
            intake_running: is_running(&self.intake_task),
            maturation_running: is_running(&self.maturation_task),
        }
    }

    /// Wait for both loops to finish. Returns immediately on later calls.
    pub async fn join(&self) {
        let handles = [
            self.intake_task.lock().take(),
            self.maturation_task.lock().take(),
        ];
        for handle in handles.into_iter().flatten() {
            if let Err(e) = handle.await {
                tracing::error!(line = %self.key, error = %e, "line task panicked");
            }
        }
    }
}

fn is_running(task: &Mutex<Option<JoinHandle<()>>>) -> bool {
    task.lock().as_ref().is_some_and(|h| !h.is_finished())
}

struct IntakeStage {
    line: String,
    rx: mpsc::UnboundedReceiver<Bottle>,
    fermentation: Arc<FermentationQueue>,
    ctx: PipelineContext,
}

impl IntakeStage {
    async fn process(&self, bottle: Bottle) -> Result<(), PipelineError> {
        if bottle.is_broken() {
            self.recycle(bottle.id);
            return Ok(());
        }

        let actuator = &self.ctx.actuator;
        let level = actuator.fill_level(&bottle.beer_type).await?;
        if level < bottle.max_content {
            tracing::debug!(
                line = %self.line,
                beer_type = %bottle.beer_type,
                level,
                "container low, refilling"
            );
            actuator.refill_container(&bottle.beer_type).await?;
        }

        let Some(filled) = self.fill(bottle).await? else {
            return Ok(());
        };

        let id = filled.id;
        let ready_at = self.fermentation.ferment(filled, self.ctx.clock.now())?;
        tracing::debug!(line = %self.line, bottle_id = %id, %ready_at, "fermenting");
        Ok(())
    }

    /// Fill until sealed or full, at most `fill_attempts` times. `None` when
    /// the bottle broke or never converged.
    async fn fill(&self, bottle: Bottle) -> Result<Option<Bottle>, PipelineError> {
        let attempts = self.ctx.config.fill_attempts;
        for attempt in 1..=attempts {
            let result = self.ctx.actuator.fill_bottle(bottle.id).await?;
            let merged = bottle.clone().with_fill_result(result);
            if merged.is_broken() {
                tracing::info!(line = %self.line, bottle_id = %bottle.id, attempt, "bottle broke during fill");
                self.recycle(bottle.id);
                return Ok(None);
            }
            if merged.fill_complete() {
                return Ok(Some(merged));
            }
            tracing::debug!(line = %self.line, bottle_id = %bottle.id, attempt, "fill incomplete");
        }

        tracing::warn!(
            line = %self.line,
            bottle_id = %bottle.id,
            attempts,
            "fill attempts exhausted, bottle dropped"
        );
        self.ctx.metrics.record_fill_exhausted();
        Ok(None)
    }

    /// Fire-and-forget. A failed recycle is logged and not retried.
    fn recycle(&self, id: BottleId) {
        self.ctx.metrics.record_recycled();
        let actuator = Arc::clone(&self.ctx.actuator);
        let line = self.line.clone();
        tokio::spawn(async move {
            if let Err(e) = actuator.recycle(id).await {
                tracing::warn!(line = %line, bottle_id = %id, error = %e, "recycle failed");
            }
        });
    }
}

#[async_trait]
impl LoopStage for IntakeStage {
    fn name(&self) -> &'static str {
        "intake"
    }

    async fn step(&mut self) -> Result<Flow, PipelineError> {
        let shutdown = self.ctx.shutdown.clone();
        let next = tokio::select! {
            biased;
            _ = shutdown.triggered() => None,
            next = self.rx.recv() => next,
        };
        let Some(bottle) = next else {
            return Ok(Flow::Stop);
        };
        self.process(bottle).await?;
        Ok(Flow::Continue)
    }
}

struct MaturationStage {
    line: String,
    fermentation: Arc<FermentationQueue>,
    shipping: Arc<ShippingQueue>,
    ctx: PipelineContext,
}

#[async_trait]
impl LoopStage for MaturationStage {
    fn name(&self) -> &'static str {
        "maturation"
    }

    async fn step(&mut self) -> Result<Flow, PipelineError> {
        let now = self.ctx.clock.now();
        let Some(bottle) = self.fermentation.take_ready(now) else {
            let slept = self.ctx.shutdown.sleep(self.ctx.config.poll_interval).await;
            return Ok(if slept { Flow::Continue } else { Flow::Stop });
        };

        if bottle.is_expired(now) {
            tracing::info!(line = %self.line, bottle_id = %bottle.id, "expired during fermentation, dropped");
            self.ctx.metrics.record_expired(ExpiryStage::Fermentation, 1);
            return Ok(Flow::Continue);
        }

        self.shipping.store(bottle);

        let drain = self.shipping.take_case(now);
        if !drain.expired.is_empty() {
            tracing::info!(
                line = %self.line,
                count = drain.expired.len(),
                "expired while awaiting shipment, dropped"
            );
            self.ctx
                .metrics
                .record_expired(ExpiryStage::Shipping, drain.expired.len());
        }
        if let Some(bottles) = drain.case {
            let case = Case::new(bottles.iter().map(|b| b.id).collect())?;
            let count = case.bottle_ids().len();
            self.ctx.actuator.ship_case(&case).await?;
            self.ctx.metrics.record_case_shipped(count);
            tracing::info!(line = %self.line, count, "case shipped");
        }
        Ok(Flow::Continue)
    }
}
