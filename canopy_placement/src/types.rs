// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the placement solver: sides, alignments, options, results.

use kurbo::{Rect, Size};

/// The primary side of the anchor a popover attaches to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the anchor.
    Top,
    /// Below the anchor.
    Bottom,
    /// To the left of the anchor.
    Left,
    /// To the right of the anchor.
    Right,
}

impl Side {
    /// The opposite side, used by the flip middleware.
    pub const fn mirror(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The primary axis of this side: the axis along which the popover is
    /// pushed away from the anchor.
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }
}

/// An axis in the solver's axis-aligned coordinate space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

/// Alignment of the popover along the anchor's cross-axis edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Align {
    /// Leading edges line up (left edge for top/bottom sides, top edge for
    /// left/right sides).
    Start,
    /// Centers line up.
    Center,
    /// Trailing edges line up.
    End,
}

/// Where a popover sits relative to its anchor: a [`Side`] plus an [`Align`].
///
/// Twelve combinations exist; named constants cover all of them. Only the
/// solver's flip step substitutes a different placement (the mirror side,
/// same alignment); callers should treat the requested placement as a
/// preference, and read [`Resolved::placement`] for the side actually used.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Primary side of the anchor.
    pub side: Side,
    /// Alignment along the cross axis.
    pub align: Align,
}

impl Placement {
    /// Above, leading edges aligned.
    pub const TOP_START: Self = Self::new(Side::Top, Align::Start);
    /// Above, centered.
    pub const TOP: Self = Self::new(Side::Top, Align::Center);
    /// Above, trailing edges aligned.
    pub const TOP_END: Self = Self::new(Side::Top, Align::End);
    /// Below, leading edges aligned.
    pub const BOTTOM_START: Self = Self::new(Side::Bottom, Align::Start);
    /// Below, centered.
    pub const BOTTOM: Self = Self::new(Side::Bottom, Align::Center);
    /// Below, trailing edges aligned.
    pub const BOTTOM_END: Self = Self::new(Side::Bottom, Align::End);
    /// Left, leading edges aligned.
    pub const LEFT_START: Self = Self::new(Side::Left, Align::Start);
    /// Left, centered.
    pub const LEFT: Self = Self::new(Side::Left, Align::Center);
    /// Left, trailing edges aligned.
    pub const LEFT_END: Self = Self::new(Side::Left, Align::End);
    /// Right, leading edges aligned.
    pub const RIGHT_START: Self = Self::new(Side::Right, Align::Start);
    /// Right, centered.
    pub const RIGHT: Self = Self::new(Side::Right, Align::Center);
    /// Right, trailing edges aligned.
    pub const RIGHT_END: Self = Self::new(Side::Right, Align::End);

    /// Create a placement from a side and an alignment.
    pub const fn new(side: Side, align: Align) -> Self {
        Self { side, align }
    }

    /// The placement on the opposite side, same alignment.
    pub const fn mirror(self) -> Self {
        Self::new(self.side.mirror(), self.align)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM_START
    }
}

/// Options controlling the solver's middleware pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveOptions {
    /// Distance to push the popover away from the anchor along the primary
    /// axis. A gap of exactly `0.0` skips the gap stage.
    pub gap: f64,
    /// Mirror the side when the popover would overflow the viewport along the
    /// primary axis.
    pub flip: bool,
    /// Force the popover's cross-axis dimension to match the anchor's
    /// (width for top/bottom placements, height for left/right).
    pub sync_size: bool,
    /// Allow the popover to extend past the viewport's cross-axis edges
    /// instead of being clamped by the shift stage.
    pub can_leave_viewport: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            gap: 0.0,
            flip: true,
            sync_size: false,
            can_leave_viewport: false,
        }
    }
}

/// Result of a [`solve`](crate::solve) call.
///
/// `PartialEq` is derived so trackers can compare successive results and
/// suppress redundant style updates; the solver is pure, so equal inputs
/// always compare equal.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// The placement actually used (preferred, or its mirror after flip).
    pub placement: Placement,
    /// Final x of the popover's top-left corner.
    pub x: f64,
    /// Final y of the popover's top-left corner.
    pub y: f64,
    /// Forced width when size-sync applied to a top/bottom placement.
    pub matched_width: Option<f64>,
    /// Forced height when size-sync applied to a left/right placement.
    pub matched_height: Option<f64>,
    /// False when the anchor had zero area (not laid out yet). Hosts should
    /// skip drawing rather than treat this as an error.
    pub valid: bool,
}

impl Resolved {
    /// The popover's effective size: the measured size with any size-sync
    /// override applied.
    pub fn size(&self, measured: Size) -> Size {
        Size::new(
            self.matched_width.unwrap_or(measured.width),
            self.matched_height.unwrap_or(measured.height),
        )
    }

    /// The popover's final bounding rectangle, for the host's inspectable
    /// placement metadata.
    pub fn rect(&self, measured: Size) -> Rect {
        let size = self.size(measured);
        Rect::new(self.x, self.y, self.x + size.width, self.y + size.height)
    }
}
