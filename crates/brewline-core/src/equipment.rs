// SPDX-License-Identifier: BUSL-1.1
//! Equipment health as reported by the bottling equipment.

use serde::{Deserialize, Serialize};

/// Operating state of the bottling equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentState {
    Running,
    Stopped,
    Crashed,
}

impl EquipmentState {
    /// Whether the equipment needs a repair request.
    pub fn needs_repair(&self) -> bool {
        matches!(self, Self::Stopped | Self::Crashed)
    }
}

impl std::fmt::Display for EquipmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Crashed => "Crashed",
        };
        f.write_str(s)
    }
}
