// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The solve pipeline: base offset, gap, flip, size-sync, shift.

use kurbo::{Point, Rect, Size};

use crate::types::{Align, Axis, Placement, Resolved, Side, SolveOptions};

/// Compute the popover position for `preferred` relative to `anchor`.
///
/// `anchor` and `viewport` must be axis-aligned rectangles in the same
/// coordinate space; `overlay` is the popover's measured size in that space.
/// The middleware stages run in a fixed order (gap → flip → size-sync →
/// shift); see the crate docs for the full contract.
///
/// The solver is total: a zero-area anchor yields a [`Resolved`] at the
/// origin with `valid = false` instead of an error.
pub fn solve(
    anchor: Rect,
    overlay: Size,
    viewport: Rect,
    preferred: Placement,
    options: &SolveOptions,
) -> Resolved {
    // Anchor not laid out yet: nothing meaningful to position against.
    if anchor.width() == 0.0 || anchor.height() == 0.0 {
        return Resolved {
            placement: preferred,
            x: 0.0,
            y: 0.0,
            matched_width: None,
            matched_height: None,
            valid: false,
        };
    }

    let gap = options.gap;
    let mut placement = preferred;
    let mut origin = base_position(anchor, overlay, placement, gap);

    // Flip substitutes the mirror side whenever the popover overflows the
    // viewport along the primary axis, then recomputes the base position
    // (including the gap) on the new side.
    if options.flip && overflows_primary(origin, overlay, viewport, placement.side) {
        placement = placement.mirror();
        origin = base_position(anchor, overlay, placement, gap);
    }

    // Size-sync is a hard override of the cross-axis dimension, applied after
    // flip has settled the final side. The synced size feeds back into the
    // cross-axis alignment (center/end depend on it) and into shift.
    let mut matched_width = None;
    let mut matched_height = None;
    let mut size = overlay;
    if options.sync_size {
        match placement.side.axis() {
            Axis::Vertical => {
                size.width = anchor.width();
                matched_width = Some(anchor.width());
            }
            Axis::Horizontal => {
                size.height = anchor.height();
                matched_height = Some(anchor.height());
            }
        }
        origin = base_position(anchor, size, placement, gap);
    }

    // Shift clamps the cross-axis position so the popover stays inside the
    // viewport. The trailing edge is pulled in first, then the leading edge
    // wins if the popover is larger than the viewport.
    if !options.can_leave_viewport {
        match placement.side.axis() {
            Axis::Vertical => {
                origin.x = clamp_span(origin.x, size.width, viewport.x0, viewport.x1);
            }
            Axis::Horizontal => {
                origin.y = clamp_span(origin.y, size.height, viewport.y0, viewport.y1);
            }
        }
    }

    Resolved {
        placement,
        x: origin.x,
        y: origin.y,
        matched_width,
        matched_height,
        valid: true,
    }
}

/// Base offset: the popover's near edge against the anchor's far edge on the
/// primary axis (plus gap), aligned per [`Align`] on the cross axis.
fn base_position(anchor: Rect, size: Size, placement: Placement, gap: f64) -> Point {
    let (x, y) = match placement.side {
        Side::Top => (
            align_span(anchor.x0, anchor.x1, size.width, placement.align),
            anchor.y0 - size.height - gap,
        ),
        Side::Bottom => (
            align_span(anchor.x0, anchor.x1, size.width, placement.align),
            anchor.y1 + gap,
        ),
        Side::Left => (
            anchor.x0 - size.width - gap,
            align_span(anchor.y0, anchor.y1, size.height, placement.align),
        ),
        Side::Right => (
            anchor.x1 + gap,
            align_span(anchor.y0, anchor.y1, size.height, placement.align),
        ),
    };
    Point::new(x, y)
}

fn align_span(lo: f64, hi: f64, len: f64, align: Align) -> f64 {
    match align {
        Align::Start => lo,
        Align::Center => (lo + hi - len) / 2.0,
        Align::End => hi - len,
    }
}

/// Whether the popover at `origin` overflows `viewport` along the primary
/// axis of `side`. Only the direction the popover extends toward matters;
/// cross-axis overflow is the shift stage's concern.
fn overflows_primary(origin: Point, size: Size, viewport: Rect, side: Side) -> bool {
    match side {
        Side::Top => origin.y < viewport.y0,
        Side::Bottom => origin.y + size.height > viewport.y1,
        Side::Left => origin.x < viewport.x0,
        Side::Right => origin.x + size.width > viewport.x1,
    }
}

fn clamp_span(pos: f64, len: f64, lo: f64, hi: f64) -> f64 {
    let mut pos = pos;
    if pos + len > hi {
        pos = hi - len;
    }
    if pos < lo {
        pos = lo;
    }
    pos
}
