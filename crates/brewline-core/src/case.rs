// SPDX-License-Identifier: BUSL-1.1
//! # Case
//!
//! A case is the unit of bulk shipping: exactly [`CASE_SIZE`] bottle ids,
//! in the order they were drained from a shipping queue.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::BottleId;

/// Number of bottles in a full case.
pub const CASE_SIZE: usize = 24;

/// An ordered batch of exactly [`CASE_SIZE`] bottle ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Case {
    bottle_ids: Vec<BottleId>,
}

impl Case {
    /// Build a case, rejecting any count other than [`CASE_SIZE`].
    pub fn new(bottle_ids: Vec<BottleId>) -> Result<Self, ValidationError> {
        if bottle_ids.len() != CASE_SIZE {
            return Err(ValidationError::CaseSize {
                expected: CASE_SIZE,
                actual: bottle_ids.len(),
            });
        }
        Ok(Self { bottle_ids })
    }

    pub fn bottle_ids(&self) -> &[BottleId] {
        &self.bottle_ids
    }

    pub fn into_bottle_ids(self) -> Vec<BottleId> {
        self.bottle_ids
    }
}
