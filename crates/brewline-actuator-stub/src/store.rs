// SPDX-License-Identifier: BUSL-1.1
//! In-memory equipment state.
//!
//! Container levels are kept per beer type. The equipment has a single
//! active tap: the beer type most recently queried or refilled. Bottle
//! fills draw from that tap's container, which is how the real line
//! behaves when the client checks the level right before filling.

use std::sync::Arc;

use brewline_core::{BeerType, Bottle, BottleId, BottleState, EquipmentState};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

/// Stub settings, read from the environment by the binary.
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Level a container is topped up to by a refill.
    pub container_size: f64,
    /// Volume of one bottle.
    pub bottle_size: f64,
    /// When set, every request except `/health` must carry this `apikey`.
    pub api_key: Option<String>,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            container_size: 1000.0,
            bottle_size: 330.0,
            api_key: None,
        }
    }
}

impl StubConfig {
    /// `HOPSTER_STUB_CONTAINER_SIZE`, `HOPSTER_STUB_BOTTLE_SIZE` and
    /// `HOPSTER_STUB_API_KEY`. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let number = |var: &str, default: f64| {
            std::env::var(var)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };
        Self {
            container_size: number("HOPSTER_STUB_CONTAINER_SIZE", defaults.container_size),
            bottle_size: number("HOPSTER_STUB_BOTTLE_SIZE", defaults.bottle_size),
            api_key: std::env::var("HOPSTER_STUB_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

/// Outcome of drawing a bottle from the active container.
#[derive(Debug)]
pub enum FillOutcome {
    Filled(Bottle),
    /// No beer type has been selected yet.
    NoActiveTap,
    /// Equipment is not running.
    Down(EquipmentState),
}

struct Inner {
    config: StubConfig,
    levels: DashMap<BeerType, f64>,
    active_tap: RwLock<Option<BeerType>>,
    equipment: RwLock<EquipmentState>,
    fills: DashMap<BottleId, Bottle>,
    recycled: DashMap<BottleId, DateTime<Utc>>,
    shipped: DashMap<BottleId, DateTime<Utc>>,
    cases: DashMap<Uuid, Vec<BottleId>>,
}

/// Shared stub state. Clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    pub fn new(config: StubConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                levels: DashMap::new(),
                active_tap: RwLock::new(None),
                equipment: RwLock::new(EquipmentState::Running),
                fills: DashMap::new(),
                recycled: DashMap::new(),
                shipped: DashMap::new(),
                cases: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &StubConfig {
        &self.inner.config
    }

    /// Current level for `beer_type`, selecting it as the active tap.
    pub fn level(&self, beer_type: &BeerType) -> f64 {
        *self.inner.active_tap.write() = Some(beer_type.clone());
        self.inner.levels.get(beer_type).map(|l| *l).unwrap_or(0.0)
    }

    /// Top up the container for `beer_type`, selecting it as the active tap.
    pub fn refill(&self, beer_type: &BeerType) {
        *self.inner.active_tap.write() = Some(beer_type.clone());
        self.inner
            .levels
            .insert(beer_type.clone(), self.inner.config.container_size);
    }

    /// Draw one bottle from the active container. A short container yields
    /// a partial, unsealed fill and is left empty.
    pub fn fill(&self, id: BottleId) -> FillOutcome {
        let equipment = *self.inner.equipment.read();
        if equipment.needs_repair() {
            return FillOutcome::Down(equipment);
        }
        let Some(beer_type) = self.inner.active_tap.read().clone() else {
            return FillOutcome::NoActiveTap;
        };

        let size = self.inner.config.bottle_size;
        let drawn = {
            let mut level = self.inner.levels.entry(beer_type.clone()).or_insert(0.0);
            let drawn = level.min(size);
            *level -= drawn;
            drawn
        };

        let mut bottle = Bottle::new(beer_type, size);
        bottle.id = id;
        bottle.content = drawn;
        if drawn >= size {
            bottle.state = BottleState::Filled;
            bottle.sealed_at = Some(Utc::now());
        }
        self.inner.fills.insert(id, bottle.clone());
        FillOutcome::Filled(bottle)
    }

    pub fn recycle(&self, id: BottleId) {
        self.inner.recycled.insert(id, Utc::now());
    }

    pub fn ship(&self, id: BottleId) {
        self.inner.shipped.insert(id, Utc::now());
    }

    /// Record a case and return its id.
    pub fn ship_case(&self, bottle_ids: Vec<BottleId>) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.cases.insert(id, bottle_ids);
        id
    }

    pub fn equipment(&self) -> EquipmentState {
        *self.inner.equipment.read()
    }

    pub fn set_equipment(&self, state: EquipmentState) {
        *self.inner.equipment.write() = state;
    }

    pub fn repair(&self) {
        self.set_equipment(EquipmentState::Running);
    }

    pub fn ledger(&self) -> Ledger {
        Ledger {
            fills: self.inner.fills.len(),
            recycled: self.inner.recycled.len(),
            shipped: self.inner.shipped.len(),
            cases: self.inner.cases.len(),
            bottles_in_cases: self.inner.cases.iter().map(|c| c.value().len()).sum(),
        }
    }
}

/// Counts of everything the stub has recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ledger {
    pub fills: usize,
    pub recycled: usize,
    pub shipped: usize,
    pub cases: usize,
    pub bottles_in_cases: usize,
}
