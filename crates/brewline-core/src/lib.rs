// SPDX-License-Identifier: BUSL-1.1
//! # brewline-core - Foundational Types for the Bottling Pipeline
//!
//! Every other crate in the workspace depends on `brewline-core`; it depends
//! on nothing internal.
//!
//! ## Key Types
//!
//! - [`BottleId`] and [`BeerType`]: identifier newtypes. A beer type is the
//!   routing key that partitions bottles into independent bottling lines.
//! - [`Bottle`]: the unit flowing through fill → fermentation → shipping,
//!   in the PascalCase wire shape the Hopster service and the inbound
//!   `/bottles` endpoint share.
//! - [`Case`]: exactly [`CASE_SIZE`] bottle ids shipped in one request.
//! - [`EquipmentState`]: health reported by the bottling equipment.
//! - [`Clock`]: wall-clock abstraction so time-gated stages can be tested
//!   with a [`ManualClock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `brewline-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod bottle;
pub mod case;
pub mod clock;
pub mod equipment;
pub mod error;
pub mod identity;

pub use bottle::{Bottle, BottleState, MAX_FERMENTATION_SECONDS};
pub use case::{Case, CASE_SIZE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use equipment::EquipmentState;
pub use error::ValidationError;
pub use identity::{BeerType, BottleId};
