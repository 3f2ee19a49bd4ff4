// SPDX-License-Identifier: BUSL-1.1
//! # brewline-actuator - Bottling Equipment Capability
//!
//! The pipeline never talks to equipment directly. Every fill, refill,
//! recycle, shipment and repair goes through the [`Actuator`] trait, which
//! this crate defines together with [`HttpActuator`], the typed client for
//! the Hopster equipment service.
//!
//! ## Hopster Endpoints
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | [`Actuator::fill_level`] | GET | `/level/{beerType}` |
//! | [`Actuator::refill_container`] | POST | `/fillcontainer/{beerType}` |
//! | [`Actuator::fill_bottle`] | POST | `/fillbottle/{id}` |
//! | [`Actuator::recycle`] | POST | `/recycle/{id}` |
//! | [`Actuator::ship_one`] | POST | `/ship/{id}` |
//! | [`Actuator::ship_case`] | POST | `/case` |
//! | [`Actuator::equipment_state`] | GET | `/status` |
//! | [`Actuator::repair`] | POST | `/repair` |
//!
//! Requests authenticate with an `apikey` header.

pub mod config;
pub mod error;
pub mod http;
pub(crate) mod retry;

pub use config::{ActuatorConfig, ConfigError};
pub use error::ActuatorError;
pub use http::HttpActuator;

use async_trait::async_trait;
use brewline_core::{BeerType, Bottle, BottleId, Case, EquipmentState};

/// Operations the bottling equipment exposes.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// behind an `Arc` by every line, the expiry sweeper and the equipment
/// monitor.
#[async_trait]
pub trait Actuator: Send + Sync + std::fmt::Debug {
    /// Current fill level of the container for `beer_type`.
    async fn fill_level(&self, beer_type: &BeerType) -> Result<f64, ActuatorError>;

    /// Top up the container for `beer_type`.
    async fn refill_container(&self, beer_type: &BeerType) -> Result<(), ActuatorError>;

    /// Attempt to fill one bottle, returning its resulting state.
    async fn fill_bottle(&self, id: BottleId) -> Result<Bottle, ActuatorError>;

    /// Dispose of a broken bottle.
    async fn recycle(&self, id: BottleId) -> Result<(), ActuatorError>;

    /// Ship a single bottle.
    async fn ship_one(&self, id: BottleId) -> Result<(), ActuatorError>;

    /// Ship a full case.
    async fn ship_case(&self, case: &Case) -> Result<(), ActuatorError>;

    async fn equipment_state(&self) -> Result<EquipmentState, ActuatorError>;

    async fn repair(&self) -> Result<(), ActuatorError>;
}
