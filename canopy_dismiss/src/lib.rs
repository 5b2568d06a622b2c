// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Dismiss: outside-interaction classification for nested dismissible
//! popovers.
//!
//! One process-wide pointer listener serves every open popover. On each
//! interaction the host describes the event by its **marker path** (the
//! [`Marker`]s encountered walking from the event target up to the document
//! root, innermost first), and [`DismissRegistry::classify`] decides, for
//! every registered popover independently, whether the interaction is an
//! outside click.
//!
//! Three marker kinds exist (unmarked ancestors simply do not appear in the
//! path):
//!
//! - [`Marker::Scope`] tags a popover's rendered content root. A click inside
//!   a scope belongs to that popover's interactive territory.
//! - [`Marker::Scrim`] tags a popover's background element.
//! - [`Marker::Stop`] exempts an element and its descendants from dismissal
//!   entirely, without suppressing normal event bubbling on the host side.
//!
//! ## Classification
//!
//! A `Stop` anywhere on the path ends classification with no verdicts.
//! Otherwise the first `Scope` or `Scrim` marker on the path sets the
//! context, and each open entry is judged against it:
//!
//! - its own scope → [`Verdict::CloseChildren`]: the popover stays open, but
//!   its child popovers collapse (interacting with a parent surface closes
//!   nested pickers);
//! - the scope hosting its **anchor** → [`Verdict::Dismiss`]: a click on the
//!   surface the popover hangs off is an outside click for it;
//! - another popover's scope or scrim → no verdict (scope isolation: a click
//!   inside an unrelated popover never dismisses this one);
//! - its own scrim, or no marker at all (bare document) →
//!   [`Verdict::Dismiss`].
//!
//! Dismiss verdicts are withheld while an entry is not closable (the
//! open-gesture grace period); this is expected, not an error.
//!
//! `classify` is read-only and the caller applies verdicts afterwards, so a
//! verdict handler that deregisters entries (cascade-close tearing down
//! children) never invalidates an iteration in progress.
//!
//! ## Minimal example
//!
//! ```rust
//! use canopy_dismiss::{DismissRegistry, Marker, Verdict};
//!
//! let mut registry: DismissRegistry<u32> = DismissRegistry::new();
//! // Popover 1 anchored at document level, popover 2 anchored inside 1.
//! registry.register(1, None);
//! registry.register(2, Some(1));
//! registry.set_state(1, true, true);
//! registry.set_state(2, true, true);
//!
//! // Click on popover 1's content: 1 keeps open but collapses its children;
//! // for 2, whose anchor lives on that surface, it is an outside click.
//! let verdicts = registry.classify(&[Marker::Scope(1), Marker::Scrim(1)]);
//! assert!(verdicts.contains(&Verdict::CloseChildren(1)));
//! assert!(verdicts.contains(&Verdict::Dismiss(2)));
//!
//! // Click on the bare document dismisses both.
//! let verdicts = registry.classify(&[]);
//! assert!(verdicts.contains(&Verdict::Dismiss(1)));
//! assert!(verdicts.contains(&Verdict::Dismiss(2)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// A tag on the ancestor path of a pointer event's target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Marker<K> {
    /// The element and its descendants never trigger dismissal.
    Stop,
    /// The content root of the popover `K`.
    Scope(K),
    /// The background scrim of the popover `K`.
    Scrim(K),
}

/// Per-popover outcome of classifying one pointer interaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verdict<K> {
    /// The interaction is an outside click for this popover: request close.
    Dismiss(K),
    /// The interaction landed on this popover's own surface: keep it open,
    /// collapse its child popovers.
    CloseChildren(K),
}

#[derive(Clone, Debug)]
struct Registration<K> {
    /// Innermost scope containing this popover's anchor, if any.
    anchor_scope: Option<K>,
    open: bool,
    closable: bool,
}

/// The process-wide list of dismissal-aware popovers.
///
/// Registration order is preserved, so verdicts come out deterministically.
/// State updates ([`DismissRegistry::set_state`]) are O(1) via the key map.
#[derive(Clone, Debug)]
pub struct DismissRegistry<K> {
    entries: HashMap<K, Registration<K>>,
    /// Registration order; drives `classify` iteration.
    order: Vec<K>,
}

impl<K> Default for DismissRegistry<K>
where
    K: Copy + Eq + core::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DismissRegistry<K>
where
    K: Copy + Eq + core::hash::Hash,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a popover. `anchor_scope` names the innermost [`Marker::Scope`]
    /// containing the popover's anchor, or `None` when the anchor sits
    /// outside any popover. Re-registering an existing key updates its anchor scope
    /// and keeps its position in the dispatch order.
    ///
    /// New registrations start closed and not closable; drive them with
    /// [`DismissRegistry::set_state`].
    pub fn register(&mut self, key: K, anchor_scope: Option<K>) {
        match self.entries.get_mut(&key) {
            Some(existing) => existing.anchor_scope = anchor_scope,
            None => {
                self.entries.insert(
                    key,
                    Registration {
                        anchor_scope,
                        open: false,
                        closable: false,
                    },
                );
                self.order.push(key);
            }
        }
    }

    /// Remove a popover. Unknown keys are ignored, so teardown order between
    /// a parent and an already-removed child does not matter.
    pub fn deregister(&mut self, key: K) {
        if self.entries.remove(&key).is_some() {
            self.order.retain(|k| *k != key);
        }
    }

    /// Update a popover's visibility and closability.
    pub fn set_state(&mut self, key: K, open: bool, closable: bool) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.open = open;
            entry.closable = closable;
        }
    }

    /// Number of registered popovers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no popovers are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Classify one pointer interaction described by its marker path
    /// (innermost marker first).
    ///
    /// Every open entry is evaluated independently; there is no
    /// short-circuiting across entries. The registry is not mutated; apply
    /// the verdicts after iteration.
    pub fn classify(&self, path: &[Marker<K>]) -> SmallVec<[Verdict<K>; 4]> {
        let mut verdicts = SmallVec::new();

        // A stop marker anywhere on the path exempts the whole interaction.
        if path.iter().any(|m| matches!(m, Marker::Stop)) {
            return verdicts;
        }

        // The innermost scope or scrim sets the context for every entry.
        let context = path
            .iter()
            .find(|m| matches!(m, Marker::Scope(_) | Marker::Scrim(_)));

        for key in &self.order {
            let Some(entry) = self.entries.get(key) else {
                continue;
            };
            if !entry.open {
                continue;
            }
            match context {
                Some(Marker::Scope(s)) => {
                    if s == key {
                        verdicts.push(Verdict::CloseChildren(*key));
                    } else if Some(*s) == entry.anchor_scope && entry.closable {
                        verdicts.push(Verdict::Dismiss(*key));
                    }
                    // Another popover's territory: not an outside click here.
                }
                Some(Marker::Scrim(b)) => {
                    if b == key && entry.closable {
                        verdicts.push(Verdict::Dismiss(*key));
                    }
                    // A different popover's scrim never dismisses this one.
                }
                Some(Marker::Stop) | None => {
                    if entry.closable {
                        verdicts.push(Verdict::Dismiss(*key));
                    }
                }
            }
        }
        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_registry() -> DismissRegistry<u32> {
        // 1 at document level; 2 anchored inside 1's content; 3 a sibling of
        // 2, also anchored inside 1.
        let mut registry = DismissRegistry::new();
        registry.register(1, None);
        registry.register(2, Some(1));
        registry.register(3, Some(1));
        for key in [1, 2, 3] {
            registry.set_state(key, true, true);
        }
        registry
    }

    #[test]
    fn document_click_dismisses_every_open_popover() {
        let registry = open_registry();
        let verdicts = registry.classify(&[]);
        assert_eq!(
            verdicts.as_slice(),
            &[Verdict::Dismiss(1), Verdict::Dismiss(2), Verdict::Dismiss(3)],
            "registration order is preserved"
        );
    }

    #[test]
    fn stop_marker_exempts_the_interaction() {
        let registry = open_registry();
        assert!(registry.classify(&[Marker::Stop]).is_empty());
        // Also when the stop sits above the target's scope.
        assert!(
            registry
                .classify(&[Marker::Scope(2), Marker::Stop, Marker::Scope(1)])
                .is_empty()
        );
    }

    #[test]
    fn own_scope_collapses_children_only() {
        let registry = open_registry();
        let verdicts = registry.classify(&[Marker::Scope(1), Marker::Scrim(1)]);
        assert!(verdicts.contains(&Verdict::CloseChildren(1)));
        assert!(!verdicts.contains(&Verdict::Dismiss(1)), "own content never dismisses");
        // Popovers anchored on that surface see an outside click.
        assert!(verdicts.contains(&Verdict::Dismiss(2)));
        assert!(verdicts.contains(&Verdict::Dismiss(3)));
    }

    #[test]
    fn click_in_child_scope_spares_ancestors_and_siblings() {
        let registry = open_registry();
        let verdicts = registry.classify(&[Marker::Scope(2), Marker::Scrim(2)]);
        // 2's own content: collapse its children, keep it open.
        assert!(verdicts.contains(&Verdict::CloseChildren(2)));
        // Neither the hosting popover 1 nor sibling 3 is dismissed: 2's scope
        // contains no anchor of theirs.
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(1))));
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(3))));
    }

    #[test]
    fn own_scrim_dismisses_only_its_popover() {
        let registry = open_registry();
        let verdicts = registry.classify(&[Marker::Scrim(2)]);
        assert_eq!(verdicts.as_slice(), &[Verdict::Dismiss(2)]);
    }

    #[test]
    fn foreign_scrim_is_ignored() {
        let mut registry = DismissRegistry::new();
        registry.register(1_u32, None);
        registry.register(2, None);
        registry.set_state(1, true, true);
        registry.set_state(2, true, true);
        // A click caught by 2's scrim must not dismiss 1, and vice versa.
        assert_eq!(registry.classify(&[Marker::Scrim(2)]).as_slice(), &[Verdict::Dismiss(2)]);
        assert_eq!(registry.classify(&[Marker::Scrim(1)]).as_slice(), &[Verdict::Dismiss(1)]);
    }

    #[test]
    fn closed_entries_are_skipped() {
        let mut registry = open_registry();
        registry.set_state(2, false, false);
        let verdicts = registry.classify(&[]);
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(2))));
    }

    #[test]
    fn dismiss_withheld_while_not_closable() {
        let mut registry = open_registry();
        registry.set_state(1, true, false);
        let verdicts = registry.classify(&[]);
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(1))));
        assert!(verdicts.contains(&Verdict::Dismiss(2)));
    }

    #[test]
    fn close_children_applies_even_while_not_closable() {
        let mut registry = open_registry();
        registry.set_state(1, true, false);
        let verdicts = registry.classify(&[Marker::Scope(1)]);
        assert!(verdicts.contains(&Verdict::CloseChildren(1)));
    }

    #[test]
    fn deregister_is_idempotent() {
        let mut registry = open_registry();
        registry.deregister(2);
        registry.deregister(2);
        assert_eq!(registry.len(), 2);
        let verdicts = registry.classify(&[]);
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(2))));
    }

    #[test]
    fn reregistering_updates_the_anchor_scope() {
        let mut registry = open_registry();
        // 2's anchor moves out of popover 1 to the document.
        registry.register(2, None);
        registry.set_state(2, true, true);
        let verdicts = registry.classify(&[Marker::Scope(1)]);
        assert!(!verdicts.iter().any(|v| matches!(v, Verdict::Dismiss(2))));
    }
}
