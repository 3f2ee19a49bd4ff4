// SPDX-License-Identifier: BUSL-1.1
//! # Bottle
//!
//! The unit flowing through the pipeline. A bottle arrives `Unknown`, is
//! filled (becoming `Filled` or `Broken`), ferments for
//! `fermentation_seconds`, and is shipped before `consume_before`.
//!
//! The JSON shape uses PascalCase field names. The same shape is accepted on
//! the inbound `/bottles` endpoint and returned by the Hopster fill call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{BeerType, BottleId};

/// Longest accepted fermentation, one hundred years.
pub const MAX_FERMENTATION_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Physical state of a bottle as reported by the filling equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BottleState {
    /// Filled and sealed.
    Filled,
    /// Broken; must be recycled.
    Broken,
    /// Not yet observed by the equipment.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A bottle and its fill, fermentation and shipping attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bottle {
    pub id: BottleId,
    pub beer_type: BeerType,
    #[serde(default)]
    pub state: BottleState,
    /// Capacity.
    pub max_content: f64,
    /// Current fill level.
    #[serde(default)]
    pub content: f64,
    /// Seconds the bottle must ferment before it may ship.
    #[serde(default)]
    pub fermentation_seconds: i64,
    /// Must not be shipped after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consume_before: Option<DateTime<Utc>>,
    /// Set by the equipment once the fill has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sealed_at: Option<DateTime<Utc>>,
}

impl Bottle {
    /// An empty, unobserved bottle with a fresh id.
    pub fn new(beer_type: BeerType, max_content: f64) -> Self {
        Self {
            id: BottleId::new(),
            beer_type,
            state: BottleState::Unknown,
            max_content,
            content: 0.0,
            fermentation_seconds: 0,
            consume_before: None,
            sealed_at: None,
        }
    }

    /// Set the fermentation duration.
    pub fn with_fermentation_seconds(mut self, secs: i64) -> Self {
        self.fermentation_seconds = secs;
        self
    }

    /// Set the consume-before deadline.
    pub fn with_consume_before(mut self, deadline: DateTime<Utc>) -> Self {
        self.consume_before = Some(deadline);
        self
    }

    /// Set the observed state.
    pub fn with_state(mut self, state: BottleState) -> Self {
        self.state = state;
        self
    }

    /// Merge the equipment's view of a fill into this bottle.
    ///
    /// The inbound bottle stays authoritative for identity and scheduling
    /// (`beer_type`, `max_content`, `fermentation_seconds`,
    /// `consume_before`); `filled` supplies the physical outcome.
    pub fn with_fill_result(mut self, filled: Bottle) -> Self {
        self.state = filled.state;
        self.content = filled.content;
        self.sealed_at = filled.sealed_at;
        self
    }

    /// Check the invariants an inbound bottle must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.max_content.is_finite() || self.max_content < 0.0 {
            return Err(ValidationError::InvalidCapacity(self.max_content));
        }
        if self.content > self.max_content {
            return Err(ValidationError::ContentExceedsCapacity {
                content: self.content,
                max_content: self.max_content,
            });
        }
        self.fermentation()?;
        Ok(())
    }

    pub fn is_broken(&self) -> bool {
        self.state == BottleState::Broken
    }

    /// Whether the equipment has stamped the fill as complete.
    pub fn is_sealed(&self) -> bool {
        self.sealed_at.is_some()
    }

    pub fn is_full(&self) -> bool {
        self.content >= self.max_content
    }

    /// A fill attempt has converged once the bottle is sealed or full.
    pub fn fill_complete(&self) -> bool {
        self.is_sealed() || self.is_full()
    }

    /// Whether the consume-before deadline lies strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.consume_before.is_some_and(|deadline| deadline < now)
    }

    /// The fermentation duration, at most [`MAX_FERMENTATION_SECONDS`].
    pub fn fermentation(&self) -> Result<Duration, ValidationError> {
        let secs = self.fermentation_seconds;
        if secs < 0 {
            return Err(ValidationError::NegativeFermentation(secs));
        }
        if secs > MAX_FERMENTATION_SECONDS {
            return Err(ValidationError::FermentationOutOfRange(secs));
        }
        Duration::try_seconds(secs).ok_or(ValidationError::FermentationOutOfRange(secs))
    }
}
