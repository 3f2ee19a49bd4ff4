// SPDX-License-Identifier: BUSL-1.1
//! # API Route Modules
//!
//! - `bottles`: bottle intake, the pipeline's front door.
//! - `lines`: read-only status of every bottling line.

pub mod bottles;
pub mod lines;
