// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Track: tracking-session bookkeeping for continuously repositioned
//! popovers.
//!
//! A visible popover must follow its anchor through scrolls, resizes, and its
//! own content changes. The layout observation itself belongs to the host
//! (resize observers, scroll listeners, frame diffing, whatever the toolkit
//! offers); this crate owns the bookkeeping around it:
//!
//! - **Sessions**: [`TrackRegistry::start`] opens a tracking session for a
//!   popover handle and returns a generational [`TrackHandle`];
//!   [`TrackRegistry::stop`] ends it. Double-stop is a no-op, and a stale
//!   handle answers `false` to every query, so a signal that arrives after
//!   `stop` can never produce a late resample.
//! - **Modes**: [`TrackMode::Auto`] resamples on any [`LayoutSignals`] bit;
//!   [`TrackMode::Fixed`] computes exactly once on start and ignores signals
//!   until the host retriggers by hand.
//! - **Loop guard**: [`TrackRegistry::record`] compares each solve result
//!   against the last one recorded for the session and reports whether it
//!   actually changed. Applying an unchanged style is what feeds resize
//!   signals back into the solver; suppressing the no-op emit breaks the
//!   cycle, and the solver's purity makes equality a sound fixpoint test.
//!
//! ## Minimal example
//!
//! ```rust
//! use canopy_track::{LayoutSignals, TrackMode, TrackRegistry};
//! use canopy_placement::{solve, Placement, SolveOptions};
//! use kurbo::{Rect, Size};
//!
//! let mut registry: TrackRegistry<u32> = TrackRegistry::new();
//! let session = registry.start(7, TrackMode::Auto);
//!
//! // Initial sample on start.
//! assert!(registry.take_initial(session));
//!
//! // A scroll arrives: auto mode wants a resample.
//! assert!(registry.needs_sample(session, LayoutSignals::ANCESTOR_SCROLLED));
//!
//! let resolved = solve(
//!     Rect::new(100.0, 100.0, 150.0, 120.0),
//!     Size::new(200.0, 150.0),
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//!     Placement::BOTTOM_START,
//!     &SolveOptions::default(),
//! );
//! // First time this result is seen: emit it.
//! assert!(registry.record(session, &resolved));
//! // Identical result on the next signal: suppressed.
//! assert!(!registry.record(session, &resolved));
//!
//! registry.stop(session);
//! assert!(!registry.needs_sample(session, LayoutSignals::VIEWPORT_RESIZED));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use canopy_placement::Resolved;

bitflags::bitflags! {
    /// Layout mutation signals a host can observe for a tracked popover.
    ///
    /// Anchor and popover observation must be distinct from scroll/viewport
    /// observation on the host side; the bits exist so `Fixed` sessions and
    /// future filtering can tell them apart, not to change `Auto` behavior.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LayoutSignals: u8 {
        /// The anchor's size changed.
        const ANCHOR_RESIZED    = 0b0000_0001;
        /// The anchor's position changed.
        const ANCHOR_MOVED      = 0b0000_0010;
        /// A scrollable ancestor of the anchor scrolled.
        const ANCESTOR_SCROLLED = 0b0000_0100;
        /// The viewport resized.
        const VIEWPORT_RESIZED  = 0b0000_1000;
        /// The popover's own content size changed.
        const OVERLAY_RESIZED   = 0b0001_0000;
    }
}

/// Whether a session resamples continuously or computes once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackMode {
    /// Compute once on start; ignore signals until manually retriggered.
    Fixed,
    /// Resample on every layout signal.
    Auto,
}

/// Identifier for a tracking session (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TrackHandle(u32, u32);

impl TrackHandle {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Session<K> {
    generation: u32,
    key: K,
    mode: TrackMode,
    initial_taken: bool,
    last: Option<Resolved>,
}

/// Registry of active tracking sessions, keyed by a host-chosen handle type
/// (for example `canopy_overlay::OverlayId` or an application id).
#[derive(Clone, Debug)]
pub struct TrackRegistry<K> {
    /// slots
    sessions: Vec<Option<Session<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<K: Copy + Eq> Default for TrackRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq> TrackRegistry<K> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            sessions: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Open a tracking session for `key`.
    ///
    /// The session expects one initial sample (see
    /// [`TrackRegistry::take_initial`]) in either mode.
    pub fn start(&mut self, key: K, mode: TrackMode) -> TrackHandle {
        let session = |generation| Session {
            generation,
            key,
            mode,
            initial_taken: false,
            last: None,
        };
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.sessions[idx] = Some(session(generation));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TrackHandle uses 32-bit indices by design."
            )]
            let idx = idx as u32;
            TrackHandle::new(idx, generation)
        } else {
            let generation = 1_u32;
            self.sessions.push(Some(session(generation)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TrackHandle uses 32-bit indices by design."
            )]
            let idx = (self.sessions.len() - 1) as u32;
            TrackHandle::new(idx, generation)
        }
    }

    /// End a tracking session. Stale handles are ignored, so stopping twice
    /// (or stopping after a parent already tore the session down) is safe.
    pub fn stop(&mut self, handle: TrackHandle) {
        if self.session(handle).is_some() {
            self.sessions[handle.idx()] = None;
            self.free_list.push(handle.idx());
        }
    }

    /// Whether the initial on-start sample is still owed. Returns `true`
    /// exactly once per session; stale handles always answer `false`.
    pub fn take_initial(&mut self, handle: TrackHandle) -> bool {
        match self.session_mut(handle) {
            Some(s) if !s.initial_taken => {
                s.initial_taken = true;
                true
            }
            _ => false,
        }
    }

    /// Whether `signals` should trigger a resample for this session.
    ///
    /// Always `false` for stale handles (the no-late-callbacks guarantee) and
    /// for [`TrackMode::Fixed`] sessions past their initial sample.
    pub fn needs_sample(&self, handle: TrackHandle, signals: LayoutSignals) -> bool {
        match self.session(handle) {
            Some(s) => match s.mode {
                TrackMode::Fixed => !s.initial_taken,
                TrackMode::Auto => !signals.is_empty(),
            },
            None => false,
        }
    }

    /// Record a solve result; returns `true` when it differs from the last
    /// recorded result and should be emitted to the host.
    pub fn record(&mut self, handle: TrackHandle, result: &Resolved) -> bool {
        match self.session_mut(handle) {
            Some(s) => {
                if s.last.as_ref() == Some(result) {
                    false
                } else {
                    s.last = Some(result.clone());
                    true
                }
            }
            None => false,
        }
    }

    /// The key a live session was started for.
    pub fn key_of(&self, handle: TrackHandle) -> Option<K> {
        self.session(handle).map(|s| s.key)
    }

    /// The last recorded result for a live session.
    pub fn last_recorded(&self, handle: TrackHandle) -> Option<&Resolved> {
        self.session(handle).and_then(|s| s.last.as_ref())
    }

    fn session(&self, handle: TrackHandle) -> Option<&Session<K>> {
        self.sessions
            .get(handle.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|s| s.generation == handle.1)
    }

    fn session_mut(&mut self, handle: TrackHandle) -> Option<&mut Session<K>> {
        self.sessions
            .get_mut(handle.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|s| s.generation == handle.1)
    }
}
