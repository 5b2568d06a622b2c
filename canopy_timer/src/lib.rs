// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Timer: host-agnostic timer queue primitives for UI runtimes.
//!
//! [`TimerQueue`] holds tokens with deadlines and hands them back when the
//! host advances time. There is no thread, no waker, and no clock inside: the
//! host owns the notion of "now" (an animation-frame timestamp, a test
//! counter, anything monotonic) and calls [`TimerQueue::advance`] from its
//! event loop. Tests advance virtual time deterministically the same way.
//!
//! Scheduling returns a generational [`TimerId`]; [`TimerQueue::cancel`] is
//! idempotent, and canceling an id that already fired is a no-op. This makes
//! teardown order irrelevant for callers that cancel on unmount.
//!
//! ## Minimal example
//!
//! ```rust
//! use canopy_timer::TimerQueue;
//!
//! let mut queue: TimerQueue<&str> = TimerQueue::new();
//! queue.schedule(10, "grace");
//! let scrim = queue.schedule(25, "scrim");
//!
//! assert!(queue.advance(5).is_empty());
//! assert_eq!(queue.advance(10), vec!["grace"]);
//!
//! // Canceling a pending entry keeps it from ever firing.
//! queue.cancel(scrim);
//! assert!(queue.advance(100).is_empty());
//! ```
//!
//! Entries due at the same instant fire in scheduling order, and entries
//! scheduled while the host is handling drained tokens are only seen by the
//! next `advance` call; there is no re-entrant firing.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

/// Identifier for a scheduled timer (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimerId(u32, u32);

impl TimerId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    generation: u32,
    deadline: u64,
    /// Scheduling sequence number, for FIFO order within equal deadlines.
    seq: u64,
    token: T,
}

/// A deadline-ordered token queue driven by a host-supplied clock.
///
/// The time unit is whatever the host passes in (milliseconds throughout the
/// Canopy docs); the only requirement is that `now` never decreases across
/// [`TimerQueue::advance`] calls.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    /// slots
    entries: Vec<Option<Entry<T>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `token` to fire once `now` reaches `deadline`.
    pub fn schedule(&mut self, deadline: u64, token: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = |generation| Entry {
            generation,
            deadline,
            seq,
            token,
        };
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(entry(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TimerId uses 32-bit indices by design."
            )]
            let idx = idx as u32;
            TimerId::new(idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(entry(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TimerId uses 32-bit indices by design."
            )]
            let idx = (self.entries.len() - 1) as u32;
            TimerId::new(idx, generation)
        }
    }

    /// Cancel a pending timer. Stale or already-fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        if self.is_pending(id) {
            self.entries[id.idx()] = None;
            self.free_list.push(id.idx());
        }
    }

    /// Whether `id` refers to a timer that has not yet fired or been canceled.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .is_some_and(|e| e.generation == id.1)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|slot| slot.is_none())
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        for (idx, slot) in self.entries.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
    }

    /// Remove and return every token whose deadline is at or before `now`,
    /// ordered by deadline and FIFO within equal deadlines.
    ///
    /// Tokens scheduled by the caller while handling the returned batch are
    /// only considered by the next `advance` call.
    pub fn advance(&mut self, now: u64) -> Vec<T> {
        let mut due: Vec<(u64, u64, usize)> = Vec::new();
        for (idx, slot) in self.entries.iter().enumerate() {
            if let Some(e) = slot
                && e.deadline <= now
            {
                due.push((e.deadline, e.seq, idx));
            }
        }
        due.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        due.into_iter()
            .map(|(_, _, idx)| {
                self.free_list.push(idx);
                self.entries[idx]
                    .take()
                    .map(|e| e.token)
                    .expect("slot was checked above")
            })
            .collect()
    }
}
