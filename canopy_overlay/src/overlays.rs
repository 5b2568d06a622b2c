// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay instance arena and its state machine.

use alloc::vec::Vec;
use core::mem;

use smallvec::SmallVec;

use canopy_dismiss::{DismissRegistry, Marker, Verdict};
use canopy_placement::{Resolved, solve};
use canopy_timer::{TimerId, TimerQueue};
use canopy_track::{LayoutSignals, TrackHandle, TrackMode, TrackRegistry};

use crate::types::{
    GeometrySample, OverlayEvent, OverlayId, OverlayOptions, Visibility,
};

/// Tokens carried by the engine's timer queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TimerToken {
    /// The post-open grace period elapsed: the overlay becomes dismissable.
    Grace(OverlayId),
    /// A transition-less close reached its removal tick: hide the scrim and
    /// finish the `Closing → Hidden` transition.
    ScrimRemove(OverlayId),
}

#[derive(Clone, Debug)]
struct Instance {
    generation: u32,
    parent: Option<OverlayId>,
    /// Registered descendants for cascade close; cleared by each cascade and
    /// re-filled when a child opens again.
    children: SmallVec<[OverlayId; 2]>,
    options: OverlayOptions,
    state: Visibility,
    /// The caller's intent. Effective visibility additionally requires an
    /// anchor in the latest sample.
    requested_visible: bool,
    closable: bool,
    scrim_visible: bool,
    sample: Option<GeometrySample>,
    style: Option<Resolved>,
    track: Option<TrackHandle>,
    grace_timer: Option<TimerId>,
    scrim_timer: Option<TimerId>,
}

impl Instance {
    fn new(generation: u32, parent: Option<OverlayId>, options: OverlayOptions) -> Self {
        Self {
            generation,
            parent,
            children: SmallVec::new(),
            options,
            state: Visibility::Hidden,
            requested_visible: false,
            closable: false,
            scrim_visible: false,
            sample: None,
            style: None,
            track: None,
            grace_timer: None,
            scrim_timer: None,
        }
    }

    fn anchor_present(&self) -> bool {
        self.sample.as_ref().is_some_and(|s| s.anchor.is_some())
    }

    fn showing(&self) -> bool {
        matches!(self.state, Visibility::Opening | Visibility::Open)
    }
}

fn get(slots: &[Option<Instance>], id: OverlayId) -> Option<&Instance> {
    slots
        .get(id.idx())
        .and_then(|slot| slot.as_ref())
        .filter(|inst| inst.generation == id.1)
}

fn get_mut(slots: &mut [Option<Instance>], id: OverlayId) -> Option<&mut Instance> {
    slots
        .get_mut(id.idx())
        .and_then(|slot| slot.as_mut())
        .filter(|inst| inst.generation == id.1)
}

/// The overlay engine: an arena of popover instances plus the shared
/// process-wide machinery (timer queue, tracking sessions, dismissal
/// registry, outbound event queue).
///
/// All methods are total: a stale [`OverlayId`] makes any call a no-op, so
/// teardown order between parents and dynamically-removed children does not
/// matter, and a timer firing after an unmount cannot touch anything.
#[derive(Clone, Debug, Default)]
pub struct Overlays {
    /// slots
    slots: Vec<Option<Instance>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    timers: TimerQueue<TimerToken>,
    tracks: TrackRegistry<OverlayId>,
    dismiss: DismissRegistry<OverlayId>,
    events: Vec<OverlayEvent>,
}

impl Overlays {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount an overlay instance.
    ///
    /// `parent` threads the nesting context explicitly: pass the enclosing
    /// overlay when this popover's anchor lives inside another popover's
    /// content, or `None` at the root. The parent relation drives cascade
    /// close and outside-click scoping; it is unrelated to where the host
    /// actually renders the popover (which is typically portaled to the
    /// document root).
    ///
    /// The instance starts hidden; drive it with [`Overlays::set_visible`]
    /// and [`Overlays::update_geometry`].
    pub fn mount(&mut self, parent: Option<OverlayId>, options: OverlayOptions) -> OverlayId {
        let parent = parent.filter(|p| get(&self.slots, *p).is_some());
        let id = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Instance::new(generation, parent, options));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "OverlayId uses 32-bit indices by design."
            )]
            let idx = idx as u32;
            OverlayId::new(idx, generation)
        } else {
            let generation = 1_u32;
            self.slots
                .push(Some(Instance::new(generation, parent, options)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "OverlayId uses 32-bit indices by design."
            )]
            let idx = (self.slots.len() - 1) as u32;
            OverlayId::new(idx, generation)
        };
        if let Some(p) = parent
            && let Some(parent_inst) = get_mut(&mut self.slots, p)
        {
            parent_inst.children.push(id);
        }
        self.dismiss.register(id, parent);
        id
    }

    /// Unmount an overlay and, recursively, its registered children.
    ///
    /// Works from any state: pending timers are canceled, the tracking
    /// session stopped, and the dismissal registration removed before the
    /// slot is freed, so nothing can fire against the destroyed instance.
    /// Stale ids are ignored.
    pub fn unmount(&mut self, id: OverlayId) {
        // Descendants complete their teardown before the ancestor's own, so
        // hosts never observe a parent hidden while a child is still up.
        let Some(children) = get_mut(&mut self.slots, id).map(|inst| mem::take(&mut inst.children))
        else {
            return;
        };
        for child in children {
            self.unmount(child);
        }

        let Some(inst) = self
            .slots
            .get_mut(id.idx())
            .and_then(|slot| slot.take_if(|inst| inst.generation == id.1))
        else {
            return;
        };
        self.free_list.push(id.idx());

        if inst.showing() {
            self.events
                .push(OverlayEvent::VisibilityChanged { id, visible: false });
        }
        if inst.scrim_visible {
            self.events
                .push(OverlayEvent::ScrimChanged { id, visible: false });
        }
        if let Some(timer) = inst.grace_timer {
            self.timers.cancel(timer);
        }
        if let Some(timer) = inst.scrim_timer {
            self.timers.cancel(timer);
        }
        if let Some(track) = inst.track {
            self.tracks.stop(track);
        }
        self.dismiss.deregister(id);
        if let Some(p) = inst.parent
            && let Some(parent_inst) = get_mut(&mut self.slots, p)
        {
            parent_inst.children.retain(|c| *c != id);
        }
    }

    /// Set the caller's visibility intent.
    ///
    /// Showing only takes effect once an anchor is present (the latest
    /// [`GeometrySample`] carries one); the intent is remembered otherwise.
    /// Hiding is authoritative and is not gated by the grace period (the
    /// caller's own toggle always wins), and is not echoed as a
    /// [`OverlayEvent::VisibilityChanged`].
    pub fn set_visible(&mut self, id: OverlayId, visible: bool, now: u64) {
        let Some(inst) = get_mut(&mut self.slots, id) else {
            return;
        };
        if inst.requested_visible == visible {
            return;
        }
        inst.requested_visible = visible;
        if visible {
            if inst.anchor_present() {
                self.open_now(id, now);
            }
        } else {
            self.close_now(id, now, false);
        }
    }

    /// Push a layout measurement for an overlay.
    ///
    /// `signals` names what changed so tracking sessions can decide whether
    /// to resample ([`TrackMode::Fixed`] overlays ignore everything past
    /// their initial sample). The anchor disappearing closes a showing
    /// overlay; an anchor appearing satisfies a remembered show intent.
    pub fn update_geometry(
        &mut self,
        id: OverlayId,
        sample: GeometrySample,
        signals: LayoutSignals,
        now: u64,
    ) {
        let Some(inst) = get_mut(&mut self.slots, id) else {
            return;
        };
        let anchor_present = sample.anchor.is_some();
        inst.sample = Some(sample);

        if !anchor_present {
            if inst.showing() {
                self.close_now(id, now, true);
            }
            return;
        }
        if inst.requested_visible && !inst.showing() {
            self.open_now(id, now);
            return;
        }
        if inst.showing()
            && let Some(track) = inst.track
        {
            let initial = self.tracks.take_initial(track);
            if initial || self.tracks.needs_sample(track, signals) {
                self.solve_and_emit(id);
            }
        }
    }

    /// Recompute the position from the latest sample, regardless of mode.
    ///
    /// This is the manual retrigger for [`OverlayOptions::fixed`] overlays;
    /// it still suppresses the emit when the result is unchanged.
    pub fn reposition(&mut self, id: OverlayId) {
        if get(&self.slots, id).is_some_and(Instance::showing) {
            self.solve_and_emit(id);
        }
    }

    /// Feed one document-level pointer interaction, described by its marker
    /// path (innermost first; empty for a bare document hit).
    ///
    /// Classification runs over a snapshot, then verdicts are applied:
    /// dismissals for overlays the interaction is an outside click for, and
    /// child-cascades for overlays whose own surface was hit.
    pub fn pointer_event(&mut self, path: &[Marker<OverlayId>], now: u64) {
        let verdicts = self.dismiss.classify(path);
        for verdict in verdicts {
            match verdict {
                Verdict::Dismiss(id) => self.dismiss_overlay(id, now),
                Verdict::CloseChildren(id) => self.close_children(id, now),
            }
        }
    }

    /// Request dismissal of one overlay, honoring the grace gate.
    ///
    /// Ignored unless the overlay is `Open` and closable: a request arriving
    /// during the post-open grace period is dropped so the gesture that
    /// opened the popover cannot also close it. A permitted dismissal
    /// cascade-closes registered children first (bypassing *their* gates; a
    /// parent close must complete), then emits
    /// [`OverlayEvent::VisibilityChanged`] for the overlay itself.
    pub fn dismiss_overlay(&mut self, id: OverlayId, now: u64) {
        let permitted = get(&self.slots, id)
            .is_some_and(|inst| inst.state == Visibility::Open && inst.closable);
        if permitted {
            self.close_now(id, now, true);
        }
    }

    /// Close every registered child of `id` (depth-first), leaving `id` open.
    pub fn close_children(&mut self, id: OverlayId, now: u64) {
        let children = match get_mut(&mut self.slots, id) {
            Some(inst) => mem::take(&mut inst.children),
            None => return,
        };
        for child in children {
            self.close_now(child, now, true);
        }
    }

    /// Advance virtual time: fire due grace periods and transition-less
    /// scrim removals. Call this from the host frame loop.
    pub fn advance(&mut self, now: u64) {
        for token in self.timers.advance(now) {
            match token {
                TimerToken::Grace(id) => {
                    let Some(inst) = get_mut(&mut self.slots, id) else {
                        continue;
                    };
                    if inst.state == Visibility::Opening {
                        inst.grace_timer = None;
                        inst.closable = true;
                        inst.state = Visibility::Open;
                        self.dismiss.set_state(id, true, true);
                        self.events.push(OverlayEvent::StateChanged {
                            id,
                            state: Visibility::Open,
                        });
                    }
                }
                TimerToken::ScrimRemove(id) => {
                    if get(&self.slots, id).is_some_and(|inst| inst.state == Visibility::Closing) {
                        self.finish_hide(id);
                    }
                }
            }
        }
    }

    /// Host report: the enter transition finished.
    ///
    /// The state machine does not depend on it (the grace timer governs
    /// dismissability); the hook exists so hosts have a single bridge for
    /// both transition ends.
    pub fn enter_complete(&mut self, _id: OverlayId) {}

    /// Host report: the exit transition finished. Removes the scrim and
    /// completes `Closing → Hidden`. No-op in any other state.
    pub fn exit_complete(&mut self, id: OverlayId) {
        if get(&self.slots, id).is_some_and(|inst| inst.state == Visibility::Closing) {
            self.finish_hide(id);
        }
    }

    /// Drain the accumulated engine outputs, in emission order.
    pub fn drain_events(&mut self) -> Vec<OverlayEvent> {
        mem::take(&mut self.events)
    }

    /// Current state of a mounted overlay.
    pub fn visibility(&self, id: OverlayId) -> Option<Visibility> {
        get(&self.slots, id).map(|inst| inst.state)
    }

    /// Whether the overlay is currently showing (`Opening` or `Open`).
    pub fn is_open(&self, id: OverlayId) -> bool {
        get(&self.slots, id).is_some_and(Instance::showing)
    }

    /// Whether the post-open grace period has elapsed.
    pub fn closable(&self, id: OverlayId) -> bool {
        get(&self.slots, id).is_some_and(|inst| inst.closable)
    }

    /// The last emitted computed style, while showing.
    pub fn computed_style(&self, id: OverlayId) -> Option<&Resolved> {
        get(&self.slots, id).and_then(|inst| inst.style.as_ref())
    }

    /// The currently registered children of an overlay.
    pub fn children(&self, id: OverlayId) -> Option<&[OverlayId]> {
        get(&self.slots, id).map(|inst| inst.children.as_slice())
    }

    /// The nesting parent given at mount, if still alive.
    pub fn parent_of(&self, id: OverlayId) -> Option<OverlayId> {
        get(&self.slots, id).and_then(|inst| inst.parent)
    }

    /// Number of mounted overlays.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no overlays are mounted.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Transition Hidden/Closing → Opening. Precondition: alive, requested
    /// visible, anchor present.
    fn open_now(&mut self, id: OverlayId, now: u64) {
        let (parent, grace_deadline, background, fixed) = {
            let Some(inst) = get_mut(&mut self.slots, id) else {
                return;
            };
            if inst.showing() {
                return;
            }
            (
                inst.parent,
                now + inst.options.grace_delay,
                inst.options.background,
                inst.options.fixed,
            )
        };

        // A cascade may have dropped us from the parent's child list; opening
        // re-registers so the next parent close reaches us exactly once.
        if let Some(p) = parent
            && let Some(parent_inst) = get_mut(&mut self.slots, p)
            && !parent_inst.children.contains(&id)
        {
            parent_inst.children.push(id);
        }

        let mode = if fixed { TrackMode::Fixed } else { TrackMode::Auto };
        let grace_timer = self.timers.schedule(grace_deadline, TimerToken::Grace(id));
        let track = self.tracks.start(id, mode);

        {
            let Some(inst) = get_mut(&mut self.slots, id) else {
                return;
            };
            // An interrupted close may still have a removal scheduled.
            if let Some(timer) = inst.scrim_timer.take() {
                self.timers.cancel(timer);
            }
            if let Some(timer) = inst.grace_timer.replace(grace_timer) {
                self.timers.cancel(timer);
            }
            inst.track = Some(track);
            inst.state = Visibility::Opening;
            inst.closable = false;
            self.events.push(OverlayEvent::StateChanged {
                id,
                state: Visibility::Opening,
            });
            if background && !inst.scrim_visible {
                inst.scrim_visible = true;
                self.events
                    .push(OverlayEvent::ScrimChanged { id, visible: true });
            }
        }
        self.dismiss.set_state(id, true, false);

        // Initial sample: always computed, whatever the mode.
        let _ = self.tracks.take_initial(track);
        self.solve_and_emit(id);
    }

    /// Transition Opening/Open → Closing, cascading registered children
    /// first. `notify` emits [`OverlayEvent::VisibilityChanged`] for this
    /// overlay (engine-initiated closes); children are always notified.
    fn close_now(&mut self, id: OverlayId, now: u64, notify: bool) {
        let children = {
            let Some(inst) = get_mut(&mut self.slots, id) else {
                return;
            };
            if !inst.showing() {
                return;
            }
            mem::take(&mut inst.children)
        };
        // Depth-first: every descendant completes its close before the
        // ancestor's own transition proceeds.
        for child in children {
            self.close_now(child, now, true);
        }

        let animated = {
            let Some(inst) = get_mut(&mut self.slots, id) else {
                return;
            };
            if notify {
                self.events
                    .push(OverlayEvent::VisibilityChanged { id, visible: false });
            }
            inst.requested_visible = false;
            inst.closable = false;
            if let Some(timer) = inst.grace_timer.take() {
                self.timers.cancel(timer);
            }
            if let Some(track) = inst.track.take() {
                self.tracks.stop(track);
            }
            inst.state = Visibility::Closing;
            self.events.push(OverlayEvent::StateChanged {
                id,
                state: Visibility::Closing,
            });
            inst.options.transition.is_animated()
        };
        self.dismiss.set_state(id, false, false);

        if !animated {
            // No transition: the scrim removal and the Hidden transition
            // land on the next advance tick.
            let timer = self.timers.schedule(now, TimerToken::ScrimRemove(id));
            if let Some(inst) = get_mut(&mut self.slots, id) {
                inst.scrim_timer = Some(timer);
            }
        }
    }

    /// Complete Closing → Hidden and drop the scrim.
    fn finish_hide(&mut self, id: OverlayId) {
        let Some(inst) = get_mut(&mut self.slots, id) else {
            return;
        };
        inst.state = Visibility::Hidden;
        inst.scrim_timer = None;
        inst.style = None;
        self.events.push(OverlayEvent::StateChanged {
            id,
            state: Visibility::Hidden,
        });
        if inst.scrim_visible {
            inst.scrim_visible = false;
            self.events
                .push(OverlayEvent::ScrimChanged { id, visible: false });
        }
    }

    /// Solve from the latest sample and emit when the result changed.
    fn solve_and_emit(&mut self, id: OverlayId) {
        let (style, track) = {
            let Some(inst) = get(&self.slots, id) else {
                return;
            };
            let (Some(sample), Some(track)) = (&inst.sample, inst.track) else {
                return;
            };
            let Some(anchor) = sample.anchor else {
                return;
            };
            let style = solve(
                anchor,
                sample.overlay_size(),
                sample.viewport,
                inst.options.placement,
                &inst.options.solve_options(),
            );
            (style, track)
        };
        if self.tracks.record(track, &style)
            && let Some(inst) = get_mut(&mut self.slots, id)
        {
            inst.style = Some(style.clone());
            self.events.push(OverlayEvent::StyleChanged { id, style });
        }
    }
}
