// SPDX-License-Identifier: BUSL-1.1
//! Min-heap of bottles keyed by a timestamp.
//!
//! Entries with equal keys pop in insertion order. Callers wrap this in a
//! mutex; nothing here is synchronized.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use brewline_core::Bottle;
use chrono::{DateTime, Utc};

#[derive(Debug)]
struct Entry {
    key: DateTime<Utc>,
    seq: u64,
    bottle: Bottle,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Default)]
pub(crate) struct TimeOrderedHeap {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl TimeOrderedHeap {
    pub(crate) fn push(&mut self, key: DateTime<Utc>, bottle: Bottle) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { key, seq, bottle }));
    }

    pub(crate) fn peek_key(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(entry)| entry.key)
    }

    pub(crate) fn pop(&mut self) -> Option<Bottle> {
        self.heap.pop().map(|Reverse(entry)| entry.bottle)
    }

    /// Pop the earliest entry only if `cond` holds for its key.
    pub(crate) fn pop_if(&mut self, cond: impl FnOnce(DateTime<Utc>) -> bool) -> Option<Bottle> {
        match self.peek_key() {
            Some(key) if cond(key) => self.pop(),
            _ => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::BeerType;
    use chrono::{Duration, TimeZone};

    fn bottle() -> Bottle {
        Bottle::new(BeerType::new("IPA").unwrap(), 330.0)
    }

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut heap = TimeOrderedHeap::default();
        let first = bottle();
        let second = bottle();
        heap.push(t, first.clone());
        heap.push(t, second.clone());
        heap.push(t - Duration::seconds(1), bottle());
        heap.pop();
        assert_eq!(heap.pop().unwrap().id, first.id);
        assert_eq!(heap.pop().unwrap().id, second.id);
        assert!(heap.pop().is_none());
    }

    #[test]
    fn pop_if_leaves_entry_when_condition_fails() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut heap = TimeOrderedHeap::default();
        heap.push(t, bottle());
        assert!(heap.pop_if(|key| key < t).is_none());
        assert_eq!(heap.len(), 1);
        assert!(heap.pop_if(|key| key <= t).is_some());
        assert_eq!(heap.len(), 0);
    }
}
