// SPDX-License-Identifier: BUSL-1.1
//! # Error Types
//!
//! Errors raised when constructing or validating core domain values.
//! All errors use `thiserror` for derive-based `Display` and `Error`.

use thiserror::Error;

/// A domain value was rejected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Beer type keys must contain at least one non-whitespace character.
    #[error("beer type must not be empty")]
    EmptyBeerType,

    /// A case must hold exactly `expected` bottles.
    #[error("case must contain exactly {expected} bottles, got {actual}")]
    CaseSize {
        /// Required case size.
        expected: usize,
        /// Number of bottle ids supplied.
        actual: usize,
    },

    /// Fermentation duration is negative.
    #[error("invalid fermentation value {0}s: must not be negative")]
    NegativeFermentation(i64),

    /// Fermentation duration is too long to schedule.
    #[error("invalid fermentation value {0}s: exceeds {max}s", max = crate::bottle::MAX_FERMENTATION_SECONDS)]
    FermentationOutOfRange(i64),

    /// Capacity is negative or not a finite number.
    #[error("invalid capacity {0}")]
    InvalidCapacity(f64),

    /// Current content exceeds the bottle's capacity.
    #[error("content {content} exceeds capacity {max_content}")]
    ContentExceedsCapacity {
        /// Current fill level.
        content: f64,
        /// Maximum content.
        max_content: f64,
    },
}
