// SPDX-License-Identifier: BUSL-1.1
//! # Bottling Dispatcher
//!
//! Entry point for new bottles. [`Bottling::submit`] routes each bottle to
//! its line, creating and starting the line on first use. Under
//! [`QueueMode::SplitQueues`] the routing key is the beer type; under
//! [`QueueMode::GlobalQueue`] every bottle goes to [`GLOBAL_LINE_KEY`].
//!
//! Lines are never removed once created. Beer types are expected to be a
//! small, stable set.

use std::sync::Arc;

use brewline_core::Bottle;
use dashmap::DashMap;

use crate::config::QueueMode;
use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::line::{BottlingLine, LineStatus};
use crate::shipping::ShippingQueue;

/// Routing key of the single line used under [`QueueMode::GlobalQueue`].
pub const GLOBAL_LINE_KEY: &str = "*";

/// Concurrent map of routing key to line.
#[derive(Debug, Default)]
pub struct LineRegistry {
    lines: DashMap<String, Arc<BottlingLine>>,
}

impl LineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the line for `key`, running `create` if there is none yet.
    ///
    /// Concurrent callers racing on the same new key observe exactly one
    /// `create` call.
    pub fn get_or_create(
        &self,
        key: &str,
        create: impl FnOnce() -> Arc<BottlingLine>,
    ) -> Arc<BottlingLine> {
        if let Some(line) = self.lines.get(key) {
            return Arc::clone(line.value());
        }
        Arc::clone(self.lines.entry(key.to_string()).or_insert_with(create).value())
    }

    pub fn get(&self, key: &str) -> Option<Arc<BottlingLine>> {
        self.lines.get(key).map(|line| Arc::clone(line.value()))
    }

    pub fn snapshot(&self) -> Vec<Arc<BottlingLine>> {
        self.lines
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug)]
pub struct Bottling {
    ctx: PipelineContext,
    registry: LineRegistry,
}

impl Bottling {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            registry: LineRegistry::new(),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn mode(&self) -> QueueMode {
        self.ctx.config.queue_mode
    }

    /// Validate `bottle` and hand it to its line.
    ///
    /// Fill and shipping failures are not reported here; they surface in the
    /// line's loops.
    pub fn submit(&self, bottle: Bottle) -> Result<(), PipelineError> {
        if self.ctx.shutdown.is_triggered() {
            return Err(PipelineError::ShuttingDown);
        }
        bottle.validate()?;

        let line = self.line_for(&bottle);
        tracing::debug!(
            line = %line.key(),
            bottle_id = %bottle.id,
            beer_type = %bottle.beer_type,
            "bottle received"
        );
        self.ctx.metrics.record_received();
        line.submit(bottle);
        Ok(())
    }

    /// Routing key `bottle` would be submitted under.
    pub fn line_key<'a>(&self, bottle: &'a Bottle) -> &'a str {
        match self.mode() {
            QueueMode::SplitQueues => bottle.beer_type.as_str(),
            QueueMode::GlobalQueue => GLOBAL_LINE_KEY,
        }
    }

    fn line_for(&self, bottle: &Bottle) -> Arc<BottlingLine> {
        let key = self.line_key(bottle);
        self.registry
            .get_or_create(key, || BottlingLine::start(key, &self.ctx))
    }

    pub fn line(&self, key: &str) -> Option<Arc<BottlingLine>> {
        self.registry.get(key)
    }

    pub fn lines(&self) -> Vec<Arc<BottlingLine>> {
        self.registry.snapshot()
    }

    /// Every line's shipping queue, for the expiry sweeper.
    pub fn shipping_queues(&self) -> Vec<Arc<ShippingQueue>> {
        self.registry
            .snapshot()
            .iter()
            .map(|line| Arc::clone(line.shipping_queue()))
            .collect()
    }

    /// Status of every line, sorted by key.
    pub fn statuses(&self) -> Vec<LineStatus> {
        let mut statuses: Vec<LineStatus> = self.lines().iter().map(|l| l.status()).collect();
        statuses.sort_by(|a, b| a.key.cmp(&b.key));
        statuses
    }

    /// Refresh the per-line depth gauges. Called before each metrics scrape.
    pub fn observe_depths(&self) {
        for status in self.statuses() {
            self.ctx
                .metrics
                .set_depths(&status.key, status.fermenting, status.shipping);
        }
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::mock::RecordingActuator;
    use brewline_core::BeerType;

    fn bottling(mode: QueueMode) -> Bottling {
        let config = PipelineConfig {
            queue_mode: mode,
            ..PipelineConfig::default()
        };
        Bottling::new(PipelineContext::new(
            Arc::new(RecordingActuator::default()),
            config,
        ))
    }

    fn bottle(beer: &str) -> Bottle {
        Bottle::new(BeerType::new(beer).unwrap(), 330.0)
    }

    #[tokio::test]
    async fn split_mode_creates_one_line_per_beer_type() {
        let b = bottling(QueueMode::SplitQueues);
        b.submit(bottle("IPA")).unwrap();
        b.submit(bottle("IPA")).unwrap();
        b.submit(bottle("Stout")).unwrap();
        let keys: Vec<String> = b.statuses().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["IPA".to_string(), "Stout".to_string()]);
        assert_eq!(b.context().metrics.received(), 3);
    }

    #[tokio::test]
    async fn global_mode_uses_single_line() {
        let b = bottling(QueueMode::GlobalQueue);
        b.submit(bottle("IPA")).unwrap();
        b.submit(bottle("Stout")).unwrap();
        assert_eq!(b.lines().len(), 1);
        assert!(b.line(GLOBAL_LINE_KEY).is_some());
    }

    #[tokio::test]
    async fn rejects_after_shutdown() {
        let b = bottling(QueueMode::SplitQueues);
        b.context().shutdown.trigger();
        assert!(matches!(
            b.submit(bottle("IPA")),
            Err(PipelineError::ShuttingDown)
        ));
        assert!(b.lines().is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_bottle_without_creating_line() {
        let b = bottling(QueueMode::SplitQueues);
        let bad = bottle("IPA").with_fermentation_seconds(-5);
        assert!(matches!(b.submit(bad), Err(PipelineError::Validation(_))));
        assert!(b.lines().is_empty());
    }

    #[tokio::test]
    async fn registry_creates_once_under_contention() {
        let ctx = PipelineContext::new(
            Arc::new(RecordingActuator::default()),
            PipelineConfig::default(),
        );
        let registry = Arc::new(LineRegistry::new());
        let created = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let created = Arc::clone(&created);
            let ctx = ctx.clone();
            tasks.push(tokio::spawn(async move {
                registry.get_or_create("IPA", || {
                    created.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    BottlingLine::start("IPA", &ctx)
                })
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(created.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
