// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Overlay: the anchored-popover coordination engine.
//!
//! [`Overlays`] owns a set of popover instances and everything about their
//! behavior that is not drawing: the visibility state machine
//! (`Hidden → Opening → Open → Closing → Hidden`), the post-open grace period
//! that keeps the opening gesture from immediately closing the popover again,
//! outside-click dismissal with correct nesting, depth-first cascade close of
//! child popovers, and the exit-transition bridge that keeps a background
//! scrim around until its fade-out has finished.
//!
//! The engine is host-agnostic and event-loop driven, like the rest of
//! Canopy: the host pushes layout data ([`Overlays::update_geometry`]),
//! pointer interactions ([`Overlays::pointer_event`]), and time
//! ([`Overlays::advance`]), and drains [`OverlayEvent`]s to learn what to
//! draw or reflect back into its own visibility state. No callback is ever
//! invoked from inside the engine, so re-entrancy is a non-issue by
//! construction.
//!
//! ## The visibility contract
//!
//! A popover is effectively visible only while its caller requests it *and*
//! its anchor exists ([`GeometrySample::anchor`] is `Some`). Requesting
//! visibility with no anchor is recorded, not an error: the popover opens on
//! the first sample that carries an anchor. When the engine itself decides to
//! hide a popover (outside click, parent cascade, anchor disappearing) it
//! emits [`OverlayEvent::VisibilityChanged`] so the caller can mirror the
//! flag (two-way binding); the engine never silently diverges from the
//! caller's intent.
//!
//! ## Minimal example
//!
//! ```rust
//! use canopy_overlay::{GeometrySample, OverlayEvent, OverlayOptions, Overlays, Transition};
//! use canopy_track::LayoutSignals;
//! use kurbo::{Rect, Size};
//!
//! let mut overlays = Overlays::new();
//! let id = overlays.mount(
//!     None,
//!     OverlayOptions {
//!         gap: 8.0,
//!         transition: Transition::None,
//!         ..OverlayOptions::default()
//!     },
//! );
//!
//! // The host measured the anchor and viewport.
//! overlays.update_geometry(
//!     id,
//!     GeometrySample {
//!         anchor: Some(Rect::new(100.0, 100.0, 150.0, 120.0)),
//!         overlay: Some(Size::new(200.0, 150.0)),
//!         viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
//!     },
//!     LayoutSignals::empty(),
//!     0,
//! );
//!
//! overlays.set_visible(id, true, 0);
//! let events = overlays.drain_events();
//! assert!(events.iter().any(|e| matches!(
//!     e,
//!     OverlayEvent::StyleChanged { style, .. } if style.y == 128.0
//! )));
//!
//! // The opening gesture cannot close it; after the grace tick it can.
//! overlays.pointer_event(&[], 0);
//! assert!(overlays.is_open(id));
//! overlays.advance(0);
//! overlays.pointer_event(&[], 1);
//! assert!(!overlays.is_open(id));
//! ```
//!
//! ## Pieces
//!
//! Placement solving lives in [`canopy_placement`], resample bookkeeping in
//! [`canopy_track`], outside-click classification in [`canopy_dismiss`], and
//! the virtual-time timer queue in [`canopy_timer`]; this crate wires them
//! together around the instance arena.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod overlays;
mod types;

pub use canopy_dismiss::{Marker, Verdict};
pub use canopy_placement::{Align, Placement, Resolved, Side};
pub use overlays::Overlays;
pub use types::{
    GeometrySample, OverlayEvent, OverlayId, OverlayOptions, Transition, Visibility,
};
