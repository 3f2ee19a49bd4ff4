// SPDX-License-Identifier: BUSL-1.1
//! # Recording Actuator
//!
//! In-memory [`Actuator`] that records every call and answers according to
//! a configurable [`Behaviour`]. Used by the pipeline tests and by the API
//! crate's router tests. Not for production use.

use std::time::Duration;

use async_trait::async_trait;
use brewline_actuator::{Actuator, ActuatorError};
use brewline_core::{BeerType, Bottle, BottleId, BottleState, Case, EquipmentState};
use chrono::Utc;
use parking_lot::Mutex;

/// How `fill_bottle` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillBehaviour {
    /// Filled and sealed on the first attempt.
    #[default]
    Seal,
    /// Reports an empty, unsealed bottle every time.
    NeverSeal,
    /// Reports the bottle as broken.
    Break,
}

#[derive(Debug, Clone)]
pub struct Behaviour {
    pub level: f64,
    pub fill: FillBehaviour,
    pub equipment: EquipmentState,
    /// Number of upcoming `fill_level` calls that fail with a 503.
    pub fail_fill_level: u32,
    /// Number of upcoming `ship_case` calls that fail with a 503.
    pub fail_ship_case: u32,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            level: 1_000_000.0,
            fill: FillBehaviour::Seal,
            equipment: EquipmentState::Running,
            fail_fill_level: 0,
            fail_ship_case: 0,
        }
    }
}

/// Every call received, in arrival order per kind.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub fill_level: Vec<BeerType>,
    pub refills: Vec<BeerType>,
    pub fills: Vec<BottleId>,
    pub recycled: Vec<BottleId>,
    pub shipped: Vec<BottleId>,
    pub cases: Vec<Vec<BottleId>>,
    pub status_checks: usize,
    pub repairs: usize,
}

impl Calls {
    /// Every id that left the line, individually or in a case.
    pub fn all_shipped(&self) -> Vec<BottleId> {
        self.shipped
            .iter()
            .chain(self.cases.iter().flatten())
            .copied()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RecordingActuator {
    behaviour: Mutex<Behaviour>,
    calls: Mutex<Calls>,
}

impl RecordingActuator {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour: Mutex::new(behaviour),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn with_fill(fill: FillBehaviour) -> Self {
        Self::new(Behaviour {
            fill,
            ..Behaviour::default()
        })
    }

    pub fn set_equipment_state(&self, state: EquipmentState) {
        self.behaviour.lock().equipment = state;
    }

    pub fn update(&self, f: impl FnOnce(&mut Behaviour)) {
        f(&mut self.behaviour.lock());
    }

    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    /// Poll until `cond` holds or `timeout` elapses. Returns whether it held.
    pub async fn wait_until(&self, timeout: Duration, cond: impl Fn(&Calls) -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let done = cond(&self.calls.lock());
            if done {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn unavailable(endpoint: &str) -> ActuatorError {
        ActuatorError::Api {
            endpoint: endpoint.to_string(),
            status: 503,
            body: "equipment unavailable".to_string(),
        }
    }

    /// Consume one scheduled failure from `counter`, if any.
    fn take_failure(counter: &mut u32) -> bool {
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn fill_level(&self, beer_type: &BeerType) -> Result<f64, ActuatorError> {
        self.calls.lock().fill_level.push(beer_type.clone());
        let mut behaviour = self.behaviour.lock();
        if Self::take_failure(&mut behaviour.fail_fill_level) {
            return Err(Self::unavailable("level"));
        }
        Ok(behaviour.level)
    }

    async fn refill_container(&self, beer_type: &BeerType) -> Result<(), ActuatorError> {
        self.calls.lock().refills.push(beer_type.clone());
        Ok(())
    }

    async fn fill_bottle(&self, id: BottleId) -> Result<Bottle, ActuatorError> {
        self.calls.lock().fills.push(id);
        let fill = self.behaviour.lock().fill;
        let mut bottle = Bottle::new(
            BeerType::new("hopster").expect("literal beer type is valid"),
            0.0,
        );
        bottle.id = id;
        match fill {
            FillBehaviour::Seal => {
                bottle.state = BottleState::Filled;
                bottle.sealed_at = Some(Utc::now());
            }
            FillBehaviour::NeverSeal => {}
            FillBehaviour::Break => bottle.state = BottleState::Broken,
        }
        Ok(bottle)
    }

    async fn recycle(&self, id: BottleId) -> Result<(), ActuatorError> {
        self.calls.lock().recycled.push(id);
        Ok(())
    }

    async fn ship_one(&self, id: BottleId) -> Result<(), ActuatorError> {
        self.calls.lock().shipped.push(id);
        Ok(())
    }

    async fn ship_case(&self, case: &Case) -> Result<(), ActuatorError> {
        if Self::take_failure(&mut self.behaviour.lock().fail_ship_case) {
            return Err(Self::unavailable("case"));
        }
        self.calls.lock().cases.push(case.bottle_ids().to_vec());
        Ok(())
    }

    async fn equipment_state(&self) -> Result<EquipmentState, ActuatorError> {
        self.calls.lock().status_checks += 1;
        Ok(self.behaviour.lock().equipment)
    }

    async fn repair(&self) -> Result<(), ActuatorError> {
        self.calls.lock().repairs += 1;
        self.behaviour.lock().equipment = EquipmentState::Running;
        Ok(())
    }
}
