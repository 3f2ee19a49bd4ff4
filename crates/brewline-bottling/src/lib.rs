// SPDX-License-Identifier: BUSL-1.1
//! # brewline-bottling - The Bottling Pipeline
//!
//! Coordinates bottles through fill → fermentation → shipping for many beer
//! types at once.
//!
//! ## Components
//!
//! | Component | Module | Role |
//! |-----------|--------|------|
//! | [`FermentationQueue`] | [`fermentation`] | Bottles ordered by ready-at time |
//! | [`ShippingQueue`] | [`shipping`] | Bottles ordered by deadline, case batching |
//! | [`BottlingLine`] | [`line`] | Per-beer-type intake and maturation loops |
//! | [`Bottling`] | [`bottling`] | Routes bottles to lines, creating them lazily |
//! | [`ExpirySweeper`] | [`expiry`] | Force-ships near-deadline bottles across lines |
//! | [`EquipmentMonitor`] | [`monitor`] | Polls equipment health, requests repair |
//!
//! ## Task Model
//!
//! Each line runs two tokio tasks; the sweeper and the monitor run one each.
//! Queues are guarded by `parking_lot::Mutex` and the lock is never held
//! across an `.await`. A single [`Shutdown`] signal stops every loop.
//!
//! ```text
//! submit ─► Bottling ─► line intake ─► fill ─► FermentationQueue
//!                                                   │ (ready-at ≤ now)
//!                                                   ▼
//!              ExpirySweeper ◄──────────────── ShippingQueue ─► case (24)
//! ```

pub mod bottling;
pub mod config;
pub mod context;
pub mod error;
pub mod expiry;
pub mod fermentation;
pub mod line;
pub mod metrics;
#[cfg(feature = "mock")]
pub mod mock;
pub mod monitor;
pub mod pipeline;
mod queue;
pub mod shipping;
pub mod shutdown;
mod supervisor;

pub use bottling::{Bottling, LineRegistry, GLOBAL_LINE_KEY};
pub use config::{ConfigError, LoopFailurePolicy, PipelineConfig, QueueMode};
pub use context::PipelineContext;
pub use error::PipelineError;
pub use expiry::{ExpirySweeper, SweepReport};
pub use fermentation::FermentationQueue;
pub use line::{BottlingLine, LineStatus};
pub use metrics::PipelineMetrics;
pub use monitor::EquipmentMonitor;
pub use pipeline::Pipeline;
pub use shipping::{CaseDrain, ShippingQueue};
pub use shutdown::Shutdown;
