// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the overlay engine: handles, options, samples, events.

use alloc::string::String;

use canopy_placement::{Placement, Resolved, SolveOptions};
use kurbo::{Rect, Size};

/// Identifier for a mounted overlay instance (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OverlayId(pub(crate) u32, pub(crate) u32);

impl OverlayId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// How the popover and its scrim animate in and out.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// No transition: on close, the scrim removal and the `Hidden` transition
    /// complete on the next [`advance`](crate::Overlays::advance) tick, with
    /// no [`exit_complete`](crate::Overlays::exit_complete) call expected.
    None,
    /// The host's default transition; the host reports
    /// [`enter_complete`](crate::Overlays::enter_complete) and
    /// [`exit_complete`](crate::Overlays::exit_complete).
    Default,
    /// A named host-defined transition, reported like [`Transition::Default`].
    Named(String),
}

impl Transition {
    /// Whether the host is expected to report transition completion.
    pub fn is_animated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::Default
    }
}

/// Per-instance configuration, fixed at [`mount`](crate::Overlays::mount).
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayOptions {
    /// Preferred placement; the solver may substitute its mirror.
    pub placement: Placement,
    /// Gap between anchor and popover along the primary axis.
    pub gap: f64,
    /// Mirror the side when the popover would overflow the viewport.
    pub flip: bool,
    /// Match the popover's cross-axis dimension to the anchor's.
    pub sync_size: bool,
    /// Let the popover leave the viewport instead of being clamped.
    pub can_leave_viewport: bool,
    /// Compute the position once per open instead of following layout.
    pub fixed: bool,
    /// Whether a background scrim is rendered behind the popover.
    pub background: bool,
    /// Enter/exit transition configuration.
    pub transition: Transition,
    /// Delay before the popover becomes dismissable after opening, in host
    /// time units. The default of 0 elapses on the first
    /// [`advance`](crate::Overlays::advance) after opening, which keeps the
    /// opening click's own bubble from closing the popover.
    pub grace_delay: u64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            gap: 0.0,
            flip: true,
            sync_size: false,
            can_leave_viewport: false,
            fixed: false,
            background: true,
            transition: Transition::default(),
            grace_delay: 0,
        }
    }
}

impl OverlayOptions {
    pub(crate) fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            gap: self.gap,
            flip: self.flip,
            sync_size: self.sync_size,
            can_leave_viewport: self.can_leave_viewport,
        }
    }
}

/// One layout measurement pushed by the host for an overlay.
///
/// `anchor: None` means the anchor is unmounted or otherwise gone; an
/// overlay in that state is never effectively visible, whatever its caller
/// requested. `overlay: None` means the popover content has not been measured
/// yet; positions are still computed (against a zero size) so the first paint
/// lands near the right place, then refined when the measurement arrives.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometrySample {
    /// The anchor's rectangle, if the anchor is currently mounted.
    pub anchor: Option<Rect>,
    /// The popover content's measured size, once known.
    pub overlay: Option<Size>,
    /// The viewport rectangle, in the same space as `anchor`.
    pub viewport: Rect,
}

impl GeometrySample {
    pub(crate) fn overlay_size(&self) -> Size {
        self.overlay.unwrap_or(Size::ZERO)
    }
}

/// Visibility state of an overlay instance.
///
/// `Opening` and `Closing` are transient grace states: hosts draw an
/// `Opening` overlay exactly like an `Open` one (only dismissability
/// differs), and keep the scrim of a `Closing` overlay mounted until the
/// engine reports it hidden.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Not shown.
    Hidden,
    /// Shown, but the post-open grace period has not elapsed: dismissal
    /// requests are ignored.
    Opening,
    /// Shown and dismissable.
    Open,
    /// Logically closed; the scrim survives until the exit transition ends.
    Closing,
}

/// Engine outputs, drained by the host via
/// [`drain_events`](crate::Overlays::drain_events).
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayEvent {
    /// The engine flipped an overlay's visibility on its own (outside click,
    /// cascade close, anchor removal). The caller must reflect this into its
    /// own visible-intent flag; direct `set_visible` calls are not echoed.
    VisibilityChanged {
        /// Affected overlay.
        id: OverlayId,
        /// New effective visibility.
        visible: bool,
    },
    /// A new solved position (and size-sync result) for the popover.
    StyleChanged {
        /// Affected overlay.
        id: OverlayId,
        /// The solver output to apply as the popover's computed style.
        style: Resolved,
    },
    /// The background scrim should be mounted or removed.
    ScrimChanged {
        /// Affected overlay.
        id: OverlayId,
        /// Whether the scrim should now be present.
        visible: bool,
    },
    /// The state machine moved; informational (hosts usually only need the
    /// other events, but inspectors and tests want the transitions).
    StateChanged {
        /// Affected overlay.
        id: OverlayId,
        /// State entered.
        state: Visibility,
    },
}
