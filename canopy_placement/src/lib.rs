// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Placement: a pure, Kurbo-native placement solver for anchored popovers.
//!
//! Given an anchor rectangle, the popover's measured size, and the viewport, the
//! solver produces the popover's position for a requested [`Placement`] (a
//! primary [`Side`] plus an [`Align`]ment, twelve combinations in total). A
//! fixed middleware order refines the base position:
//!
//! 1. **gap** — push the popover away from the anchor along the primary axis
//!    ([`SolveOptions::gap`]); skipped when the gap is exactly zero.
//! 2. **flip** — mirror the side (top↔bottom, left↔right) when the popover
//!    would overflow the viewport along the primary axis
//!    ([`SolveOptions::flip`]).
//! 3. **size-sync** — force the cross-axis dimension to match the anchor's
//!    ([`SolveOptions::sync_size`]); applied after flip settles the side.
//! 4. **shift** — clamp the cross-axis position into the viewport unless
//!    [`SolveOptions::can_leave_viewport`] is set.
//!
//! The solver is a pure function: identical inputs yield identical output, with
//! no hidden state. It never fails: an anchor that has not been laid out yet
//! (zero area) produces a [`Resolved`] at the origin with
//! [`Resolved::valid`]`= false` so hosts can skip drawing rather than handle an
//! error.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use canopy_placement::{solve, Placement, SolveOptions};
//!
//! let anchor = Rect::new(100.0, 100.0, 150.0, 120.0);
//! let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
//! let overlay = Size::new(200.0, 150.0);
//!
//! let resolved = solve(
//!     anchor,
//!     overlay,
//!     viewport,
//!     Placement::BOTTOM_START,
//!     &SolveOptions { gap: 8.0, ..SolveOptions::default() },
//! );
//!
//! // Below the anchor with an 8px gap, start-aligned on the left edge.
//! assert_eq!(resolved.y, 128.0);
//! assert_eq!(resolved.x, 100.0);
//! assert!(resolved.valid);
//! ```
//!
//! This crate does not observe layout or own any subscription state; pair it
//! with `canopy_track` for continuous repositioning and `canopy_overlay` for
//! visibility and dismissal coordination.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for
//!   floating-point math.
//!
//! This crate is `no_std`.

#![no_std]

mod solve;
mod types;

pub use solve::solve;
pub use types::{Align, Axis, Placement, Resolved, Side, SolveOptions};
