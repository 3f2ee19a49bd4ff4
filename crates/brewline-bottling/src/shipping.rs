// SPDX-License-Identifier: BUSL-1.1
//! # Shipping Queue
//!
//! Fermented bottles waiting to ship, ordered by `consume_before`. Bottles
//! without a deadline are keyed at the far-future sentinel and so sort after
//! every bottle that has one.
//!
//! The owning line drains full cases from the front; the expiry sweeper
//! concurrently pulls bottles whose deadline is within its horizon. A
//! queue is shared between them as `Arc<ShippingQueue>`.

use brewline_core::{Bottle, CASE_SIZE};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::queue::TimeOrderedHeap;

/// Result of [`ShippingQueue::take_case`].
#[derive(Debug, Default)]
pub struct CaseDrain {
    /// Bottles found past their deadline at the front of the queue. Removed
    /// and never shipped.
    pub expired: Vec<Bottle>,
    /// Exactly [`CASE_SIZE`] bottles, soonest deadline first, if the queue
    /// held at least that many live bottles.
    pub case: Option<Vec<Bottle>>,
}

#[derive(Debug, Default)]
pub struct ShippingQueue {
    heap: Mutex<TimeOrderedHeap>,
}

/// Sort key of a bottle: its deadline, or the far-future sentinel.
fn priority(bottle: &Bottle) -> DateTime<Utc> {
    bottle.consume_before.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl ShippingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, bottle: Bottle) {
        let key = priority(&bottle);
        self.heap.lock().push(key, bottle);
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the earliest bottle if its deadline is at or before
    /// `now + horizon`.
    pub fn take_if_within(&self, now: DateTime<Utc>, horizon: Duration) -> Option<Bottle> {
        let limit = now
            .checked_add_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.heap.lock().pop_if(|deadline| deadline <= limit)
    }

    /// Remove up to `n` bottles, soonest deadline first, regardless of how
    /// far away their deadlines are.
    pub fn drain_up_to(&self, n: usize) -> Vec<Bottle> {
        let mut heap = self.heap.lock();
        let mut out = Vec::with_capacity(n.min(heap.len()));
        while out.len() < n {
            match heap.pop() {
                Some(bottle) => out.push(bottle),
                None => break,
            }
        }
        out
    }

    /// Remove the bottle with the soonest deadline.
    pub fn dequeue(&self) -> Option<Bottle> {
        self.heap.lock().pop()
    }

    /// Under a single lock: discard bottles already past their deadline at
    /// `now`, then drain a full case if at least [`CASE_SIZE`] remain.
    pub fn take_case(&self, now: DateTime<Utc>) -> CaseDrain {
        let mut heap = self.heap.lock();
        let mut expired = Vec::new();
        while let Some(bottle) = heap.pop_if(|deadline| deadline < now) {
            expired.push(bottle);
        }
        let case = (heap.len() >= CASE_SIZE).then(|| {
            let mut bottles = Vec::with_capacity(CASE_SIZE);
            while bottles.len() < CASE_SIZE {
                match heap.pop() {
                    Some(bottle) => bottles.push(bottle),
                    None => break,
                }
            }
            bottles
        });
        CaseDrain { expired, case }
    }
}
