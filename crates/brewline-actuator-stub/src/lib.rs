// SPDX-License-Identifier: BUSL-1.1
//! In-memory Hopster equipment stub.
//!
//! Implements every endpoint the `brewline-actuator` HTTP client calls, so
//! the pipeline can run end to end without bottling hardware. State is held
//! in memory and lost on restart.

pub mod routes;
pub mod store;

pub use routes::router;
pub use store::{AppState, Ledger, StubConfig};
