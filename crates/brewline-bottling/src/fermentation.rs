// SPDX-License-Identifier: BUSL-1.1
//! # Fermentation Queue
//!
//! Holds filled bottles until their fermentation time has elapsed. Each
//! bottle is keyed by `inserted_at + fermentation_seconds`; the earliest
//! key is taken only once it is not in the future.
//!
//! One line owns each queue. Its intake loop is the only writer and its
//! maturation loop the only remover; the two run concurrently, so every
//! operation takes the mutex.

use brewline_core::{Bottle, ValidationError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::queue::TimeOrderedHeap;

#[derive(Debug, Default)]
pub struct FermentationQueue {
    heap: Mutex<TimeOrderedHeap>,
}

impl FermentationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start fermenting `bottle` at `now`. Returns the instant it becomes
    /// ready, or an error if that instant cannot be represented.
    pub fn ferment(
        &self,
        bottle: Bottle,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ValidationError> {
        let ready_at = now
            .checked_add_signed(bottle.fermentation()?)
            .ok_or(ValidationError::FermentationOutOfRange(bottle.fermentation_seconds))?;
        self.heap.lock().push(ready_at, bottle);
        Ok(ready_at)
    }

    /// Remove and return the earliest bottle if it is ready at `now`.
    /// Leaves the queue untouched otherwise.
    pub fn take_ready(&self, now: DateTime<Utc>) -> Option<Bottle> {
        self.heap.lock().pop_if(|ready_at| ready_at <= now)
    }

    /// Ready-at instant of the earliest bottle.
    pub fn next_ready_at(&self) -> Option<DateTime<Utc>> {
        self.heap.lock().peek_key()
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::BeerType;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap()
    }

    fn bottle(secs: i64) -> Bottle {
        Bottle::new(BeerType::new("Stout").unwrap(), 500.0).with_fermentation_seconds(secs)
    }

    #[test]
    fn zero_fermentation_is_ready_immediately() {
        let queue = FermentationQueue::new();
        let b = bottle(0);
        queue.ferment(b.clone(), t0()).unwrap();
        assert_eq!(queue.take_ready(t0()).unwrap().id, b.id);
        assert!(queue.is_empty());
    }

    #[test]
    fn not_returned_before_ready() {
        let queue = FermentationQueue::new();
        let ready_at = queue.ferment(bottle(10), t0()).unwrap();
        assert_eq!(ready_at, t0() + Duration::seconds(10));
        assert!(queue.take_ready(t0() + Duration::seconds(9)).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.take_ready(t0() + Duration::seconds(10)).is_some());
    }

    #[test]
    fn earliest_ready_comes_first_regardless_of_arrival() {
        let queue = FermentationQueue::new();
        let slow = bottle(30);
        let fast = bottle(5);
        queue.ferment(slow.clone(), t0()).unwrap();
        queue.ferment(fast.clone(), t0()).unwrap();
        let later = t0() + Duration::seconds(60);
        assert_eq!(queue.take_ready(later).unwrap().id, fast.id);
        assert_eq!(queue.take_ready(later).unwrap().id, slow.id);
    }

    #[test]
    fn blocked_head_blocks_queue() {
        let queue = FermentationQueue::new();
        queue.ferment(bottle(10), t0()).unwrap();
        queue
            .ferment(bottle(0), t0() + Duration::seconds(20))
            .unwrap();
        // Head is ready at t0+10, second at t0+20.
        assert!(queue.take_ready(t0() + Duration::seconds(5)).is_none());
        assert_eq!(queue.next_ready_at(), Some(t0() + Duration::seconds(10)));
    }

    #[test]
    fn rejects_negative_fermentation() {
        let queue = FermentationQueue::new();
        assert_eq!(
            queue.ferment(bottle(-3), t0()),
            Err(ValidationError::NegativeFermentation(-3))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn unrepresentable_ready_time_is_an_error() {
        let queue = FermentationQueue::new();
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::seconds(5);
        assert_eq!(
            queue.ferment(bottle(10), near_end),
            Err(ValidationError::FermentationOutOfRange(10))
        );
        assert_eq!(
            queue.ferment(bottle(i64::MAX), t0()),
            Err(ValidationError::FermentationOutOfRange(i64::MAX))
        );
        assert!(queue.is_empty());
    }

    proptest! {
        #[test]
        fn never_returned_early(secs in proptest::collection::vec(0i64..120, 1..40), elapsed in 0i64..150) {
            let queue = FermentationQueue::new();
            for s in &secs {
                queue.ferment(bottle(*s), t0()).unwrap();
            }
            let now = t0() + Duration::seconds(elapsed);
            while let Some(b) = queue.take_ready(now) {
                prop_assert!(b.fermentation_seconds <= elapsed);
            }
            let still_waiting = secs.iter().filter(|s| **s > elapsed).count();
            prop_assert_eq!(queue.len(), still_waiting);
        }
    }
}
