// SPDX-License-Identifier: BUSL-1.1
//! # Expiry Sweeper
//!
//! Lines only ship full cases, so a slow-moving beer type could hold
//! bottles until their deadline passes. The sweeper runs every
//! `sweep_interval` and, across every line, pulls bottles whose deadline
//! falls within `expiry_horizon`. They are pooled, soonest deadline first,
//! and shipped: each full case of 24 as one case, the remainder as
//! concurrent single shipments. Bottles already past their deadline are
//! dropped instead.

use std::sync::Arc;

use brewline_core::{Bottle, BottleId, Case, CASE_SIZE};
use tokio::task::JoinSet;

use crate::bottling::Bottling;
use crate::context::PipelineContext;
use crate::metrics::ExpiryStage;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Cases shipped.
    pub cases: usize,
    /// Bottles shipped individually.
    pub singles: usize,
    /// Bottles dropped past their deadline.
    pub expired: usize,
    /// Ship requests that failed.
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    ctx: PipelineContext,
    bottling: Arc<Bottling>,
}

impl ExpirySweeper {
    pub fn new(bottling: Arc<Bottling>) -> Self {
        Self {
            ctx: bottling.context().clone(),
            bottling,
        }
    }

    /// Sweep every `sweep_interval` until shutdown.
    pub async fn run(self) {
        tracing::debug!("expiry sweeper started");
        while self.ctx.shutdown.sleep(self.ctx.config.sweep_interval).await {
            let report = self.sweep_once().await;
            if report != SweepReport::default() {
                tracing::info!(
                    cases = report.cases,
                    singles = report.singles,
                    expired = report.expired,
                    failed = report.failed,
                    "expiry sweep"
                );
            }
        }
        tracing::debug!("expiry sweeper stopped");
    }

    /// Run a single sweep.
    pub async fn sweep_once(&self) -> SweepReport {
        let now = self.ctx.clock.now();
        let horizon = self.ctx.config.expiry_horizon;

        let mut due: Vec<Bottle> = Vec::new();
        for queue in self.bottling.shipping_queues() {
            while let Some(bottle) = queue.take_if_within(now, horizon) {
                due.push(bottle);
            }
        }

        let (expired, mut live): (Vec<Bottle>, Vec<Bottle>) =
            due.into_iter().partition(|b| b.is_expired(now));

        let mut report = SweepReport {
            expired: expired.len(),
            ..SweepReport::default()
        };
        if !expired.is_empty() {
            for bottle in &expired {
                tracing::info!(bottle_id = %bottle.id, beer_type = %bottle.beer_type, "expired, dropped");
            }
            self.ctx
                .metrics
                .record_expired(ExpiryStage::Sweep, expired.len());
        }

        live.sort_by_key(|b| b.consume_before);
        let ids: Vec<BottleId> = live.iter().map(|b| b.id).collect();

        let mut chunks = ids.chunks_exact(CASE_SIZE);
        for chunk in chunks.by_ref() {
            if self.ship_case(chunk.to_vec()).await {
                report.cases += 1;
            } else {
                report.failed += 1;
            }
        }

        let (singles, failed) = self.ship_singles(chunks.remainder()).await;
        report.singles = singles;
        report.failed += failed;
        report
    }

    async fn ship_case(&self, ids: Vec<BottleId>) -> bool {
        let case = match Case::new(ids) {
            Ok(case) => case,
            Err(e) => {
                tracing::error!(error = %e, "sweeper formed an invalid case");
                return false;
            }
        };
        match self.ctx.actuator.ship_case(&case).await {
            Ok(()) => {
                self.ctx.metrics.record_case_shipped(CASE_SIZE);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, count = CASE_SIZE, "sweeper case shipment failed");
                false
            }
        }
    }

    /// Ship each id concurrently and wait for all of them.
    async fn ship_singles(&self, ids: &[BottleId]) -> (usize, usize) {
        let mut set = JoinSet::new();
        for &id in ids {
            let actuator = Arc::clone(&self.ctx.actuator);
            set.spawn(async move { (id, actuator.ship_one(id).await) });
        }

        let (mut shipped, mut failed) = (0, 0);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {
                    shipped += 1;
                    self.ctx.metrics.record_single_shipped();
                }
                Ok((id, Err(e))) => {
                    failed += 1;
                    tracing::warn!(bottle_id = %id, error = %e, "single shipment failed");
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(error = %e, "shipment task panicked");
                }
            }
        }
        (shipped, failed)
    }
}
