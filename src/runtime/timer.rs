//! Timer heap for deadline management.
//!
//! A min-heap of `(deadline, sequence, payload)` entries. Entries with the
//! same deadline come out in insertion order, which is what lets a batch of
//! urgent submissions run in the order they were made.

use crate::types::{Sequence, Time};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct TimerEntry<T> {
    deadline: Time,
    sequence: Sequence,
    payload: T,
}

impl<T> PartialEq for TimerEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.sequence == other.sequence
    }
}

impl<T> Eq for TimerEntry<T> {}

impl<T> Ord for TimerEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline first).
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<T> PartialOrd for TimerEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap of payloads ordered by `(deadline, sequence)`.
#[derive(Debug)]
pub struct TimerHeap<T> {
    heap: BinaryHeap<TimerEntry<T>>,
    next_sequence: Sequence,
}

impl<T> Default for TimerHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerHeap<T> {
    /// Creates a new empty timer heap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: Sequence::FIRST,
        }
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the heap is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Adds a payload due at `deadline` and returns the sequence it was
    /// stamped with.
    pub fn insert(&mut self, deadline: Time, payload: T) -> Sequence {
        let sequence = self.next_sequence.bump();
        self.heap.push(TimerEntry {
            deadline,
            sequence,
            payload,
        });
        sequence
    }

    /// Returns the earliest deadline, if any.
    #[must_use]
    pub fn peek_deadline(&self) -> Option<Time> {
        self.heap.peek().map(|e| e.deadline)
    }

    /// Pops the earliest payload if its deadline is `<= now`.
    pub fn pop_due(&mut self, now: Time) -> Option<T> {
        if self.heap.peek()?.deadline <= now {
            self.heap.pop().map(|e| e.payload)
        } else {
            None
        }
    }

    /// Pops the earliest payload regardless of its deadline.
    pub fn pop_any(&mut self) -> Option<T> {
        self.heap.pop().map(|e| e.payload)
    }

    /// Pops all payloads whose deadline is `<= now`, earliest first.
    pub fn pop_expired(&mut self, now: Time) -> Vec<T> {
        let mut expired = Vec::new();
        while let Some(payload) = self.pop_due(now) {
            expired.push(payload);
        }
        expired
    }

    /// Removes every payload, earliest first.
    pub fn drain_ordered(&mut self) -> Vec<T> {
        let mut all = Vec::with_capacity(self.heap.len());
        while let Some(payload) = self.pop_any() {
            all.push(payload);
        }
        all
    }

    /// Discards all payloads and returns how many there were.
    ///
    /// The sequence counter keeps running so ordering stays monotonic
    /// across clears.
    pub fn clear(&mut self) -> usize {
        let discarded = self.heap.len();
        self.heap.clear();
        discarded
    }
}
