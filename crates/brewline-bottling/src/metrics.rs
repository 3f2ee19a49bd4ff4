// SPDX-License-Identifier: BUSL-1.1
//! # Pipeline Metrics
//!
//! Prometheus registry shared by every loop of the pipeline.
//!
//! Event counters (received, recycled, shipped, expired, ...) are pushed
//! from the loops as things happen. Queue-depth gauges are pull model: the
//! `/metrics` handler calls [`crate::Bottling::observe_depths`] right before
//! encoding.

use std::sync::Arc;

use prometheus::{
    core::Collector, Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

/// Pipeline stage that dropped an expired bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStage {
    /// Already past its deadline when fermentation finished.
    Fermentation,
    /// Found past its deadline while forming a case.
    Shipping,
    /// Pulled by the expiry sweeper after its deadline.
    Sweep,
}

impl ExpiryStage {
    fn label(self) -> &'static str {
        match self {
            Self::Fermentation => "fermentation",
            Self::Shipping => "shipping",
            Self::Sweep => "sweep",
        }
    }
}

/// Cloneable handle to the pipeline's Prometheus registry.
#[derive(Clone)]
pub struct PipelineMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    bottles_received_total: IntCounter,
    bottles_recycled_total: IntCounter,
    fill_exhausted_total: IntCounter,
    intake_dropped_total: IntCounter,
    bottles_expired_total: IntCounterVec,
    bottles_shipped_total: IntCounterVec,
    cases_shipped_total: IntCounter,
    repairs_total: IntCounter,
    loop_faults_total: IntCounterVec,
    loop_restarts_total: IntCounterVec,

    fermenting_bottles: IntGaugeVec,
    shipping_bottles: IntGaugeVec,
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics")
            .field("received", &self.received())
            .field("cases_shipped", &self.cases_shipped())
            .finish()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let bottles_received_total = IntCounter::new(
            "brewline_bottles_received_total",
            "Bottles accepted for bottling",
        )
        .expect("metric can be created");

        let bottles_recycled_total = IntCounter::new(
            "brewline_bottles_recycled_total",
            "Broken bottles sent for recycling",
        )
        .expect("metric can be created");

        let fill_exhausted_total = IntCounter::new(
            "brewline_fill_exhausted_total",
            "Bottles dropped after exhausting fill attempts",
        )
        .expect("metric can be created");

        let intake_dropped_total = IntCounter::new(
            "brewline_intake_dropped_total",
            "Bottles handed to a line whose intake loop has ended",
        )
        .expect("metric can be created");

        let bottles_expired_total = IntCounterVec::new(
            Opts::new(
                "brewline_bottles_expired_total",
                "Bottles dropped past their consume-before deadline",
            ),
            &["stage"],
        )
        .expect("metric can be created");

        let bottles_shipped_total = IntCounterVec::new(
            Opts::new("brewline_bottles_shipped_total", "Bottles shipped by route"),
            &["route"],
        )
        .expect("metric can be created");

        let cases_shipped_total = IntCounter::new(
            "brewline_cases_shipped_total",
            "Full cases shipped",
        )
        .expect("metric can be created");

        let repairs_total = IntCounter::new(
            "brewline_equipment_repairs_total",
            "Repairs requested by the equipment monitor",
        )
        .expect("metric can be created");

        let loop_faults_total = IntCounterVec::new(
            Opts::new(
                "brewline_loop_faults_total",
                "Errors that escaped a pipeline loop body",
            ),
            &["stage"],
        )
        .expect("metric can be created");

        let loop_restarts_total = IntCounterVec::new(
            Opts::new(
                "brewline_loop_restarts_total",
                "Pipeline loops resumed after a fault",
            ),
            &["stage"],
        )
        .expect("metric can be created");

        let fermenting_bottles = IntGaugeVec::new(
            Opts::new("brewline_fermenting_bottles", "Bottles fermenting per line"),
            &["line"],
        )
        .expect("metric can be created");

        let shipping_bottles = IntGaugeVec::new(
            Opts::new(
                "brewline_shipping_bottles",
                "Bottles waiting to ship per line",
            ),
            &["line"],
        )
        .expect("metric can be created");

        let collectors: [Box<dyn Collector>; 12] = [
            Box::new(bottles_received_total.clone()),
            Box::new(bottles_recycled_total.clone()),
            Box::new(fill_exhausted_total.clone()),
            Box::new(intake_dropped_total.clone()),
            Box::new(bottles_expired_total.clone()),
            Box::new(bottles_shipped_total.clone()),
            Box::new(cases_shipped_total.clone()),
            Box::new(repairs_total.clone()),
            Box::new(loop_faults_total.clone()),
            Box::new(loop_restarts_total.clone()),
            Box::new(fermenting_bottles.clone()),
            Box::new(shipping_bottles.clone()),
        ];
        for collector in collectors {
            registry
                .register(collector)
                .expect("metric can be registered");
        }

        Self {
            inner: Arc::new(Inner {
                registry,
                bottles_received_total,
                bottles_recycled_total,
                fill_exhausted_total,
                intake_dropped_total,
                bottles_expired_total,
                bottles_shipped_total,
                cases_shipped_total,
                repairs_total,
                loop_faults_total,
                loop_restarts_total,
                fermenting_bottles,
                shipping_bottles,
            }),
        }
    }

    pub(crate) fn record_received(&self) {
        self.inner.bottles_received_total.inc();
    }

    pub(crate) fn record_recycled(&self) {
        self.inner.bottles_recycled_total.inc();
    }

    pub(crate) fn record_fill_exhausted(&self) {
        self.inner.fill_exhausted_total.inc();
    }

    pub(crate) fn record_intake_dropped(&self) {
        self.inner.intake_dropped_total.inc();
    }

    pub(crate) fn record_expired(&self, stage: ExpiryStage, count: usize) {
        self.inner
            .bottles_expired_total
            .with_label_values(&[stage.label()])
            .inc_by(count as u64);
    }

    pub(crate) fn record_single_shipped(&self) {
        self.inner
            .bottles_shipped_total
            .with_label_values(&["single"])
            .inc();
    }

    pub(crate) fn record_case_shipped(&self, bottles: usize) {
        self.inner.cases_shipped_total.inc();
        self.inner
            .bottles_shipped_total
            .with_label_values(&["case"])
            .inc_by(bottles as u64);
    }

    pub(crate) fn record_repair(&self) {
        self.inner.repairs_total.inc();
    }

    pub(crate) fn record_loop_fault(&self, stage: &str) {
        self.inner.loop_faults_total.with_label_values(&[stage]).inc();
    }

    pub(crate) fn record_loop_restart(&self, stage: &str) {
        self.inner
            .loop_restarts_total
            .with_label_values(&[stage])
            .inc();
    }

    pub(crate) fn set_depths(&self, line: &str, fermenting: usize, shipping: usize) {
        self.inner
            .fermenting_bottles
            .with_label_values(&[line])
            .set(fermenting as i64);
        self.inner
            .shipping_bottles
            .with_label_values(&[line])
            .set(shipping as i64);
    }

    pub fn received(&self) -> u64 {
        self.inner.bottles_received_total.get()
    }

    pub fn recycled(&self) -> u64 {
        self.inner.bottles_recycled_total.get()
    }

    pub fn fill_exhausted(&self) -> u64 {
        self.inner.fill_exhausted_total.get()
    }

    pub fn cases_shipped(&self) -> u64 {
        self.inner.cases_shipped_total.get()
    }

    pub fn repairs(&self) -> u64 {
        self.inner.repairs_total.get()
    }

    /// Expired bottles summed across stages.
    pub fn expired(&self) -> u64 {
        sum_counter_vec(&self.inner.bottles_expired_total)
    }

    /// Loop restarts summed across stages.
    pub fn loop_restarts(&self) -> u64 {
        sum_counter_vec(&self.inner.loop_restarts_total)
    }

    /// Loop faults summed across stages.
    pub fn loop_faults(&self) -> u64 {
        sum_counter_vec(&self.inner.loop_faults_total)
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.inner.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_counter_vec(vec: &IntCounterVec) -> u64 {
    vec.collect()
        .iter()
        .flat_map(|family| family.get_metric())
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}
