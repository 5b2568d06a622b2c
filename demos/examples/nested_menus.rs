// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested context menus driven from a scripted host loop.
//!
//! This example stands in for a real windowing host: it feeds the engine
//! measured geometry, pointer interactions described by marker paths, and
//! time ticks, then prints the events it drains. It walks through the
//! behaviors a popover host cares about:
//! - opening a menu and a submenu anchored inside it,
//! - the post-open grace tick that keeps the opening click from closing it,
//! - clicking the parent menu's body (collapses the submenu, keeps the menu),
//! - clicking outside everything (closes the whole chain, children first).
//!
//! Run:
//! - `cargo run -p canopy_demos --example nested_menus`

use canopy_overlay::{
    GeometrySample, Marker, OverlayEvent, OverlayOptions, Overlays, Placement, Transition,
};
use canopy_track::LayoutSignals;
use kurbo::{Rect, Size};

fn print_events(overlays: &mut Overlays, label: &str) {
    println!("-- {label}");
    for event in overlays.drain_events() {
        match event {
            OverlayEvent::VisibilityChanged { id, visible } => {
                println!("   visibility {id:?} -> {visible}");
            }
            OverlayEvent::StyleChanged { id, style } => {
                println!(
                    "   style      {id:?} -> ({:.0}, {:.0}) via {:?}",
                    style.x, style.y, style.placement
                );
            }
            OverlayEvent::ScrimChanged { id, visible } => {
                println!("   scrim      {id:?} -> {visible}");
            }
            OverlayEvent::StateChanged { id, state } => {
                println!("   state      {id:?} -> {state:?}");
            }
        }
    }
}

fn main() {
    let viewport = Rect::new(0.0, 0.0, 1280.0, 720.0);
    let mut overlays = Overlays::new();
    let mut now = 0_u64;

    // A context menu anchored to a toolbar button, and a submenu anchored to
    // one of the menu's rows. Menus close instantly; no scrim.
    let menu_options = OverlayOptions {
        gap: 4.0,
        background: false,
        transition: Transition::None,
        ..OverlayOptions::default()
    };
    let menu = overlays.mount(None, menu_options.clone());
    let submenu = overlays.mount(
        Some(menu),
        OverlayOptions {
            placement: Placement::RIGHT_START,
            ..menu_options
        },
    );

    // Frame 0: the host measured the button; the user clicks it.
    overlays.update_geometry(
        menu,
        GeometrySample {
            anchor: Some(Rect::new(40.0, 10.0, 120.0, 38.0)),
            overlay: Some(Size::new(220.0, 260.0)),
            viewport,
        },
        LayoutSignals::empty(),
        now,
    );
    overlays.set_visible(menu, true, now);
    // The click that opened the menu also bubbles to the document; the grace
    // period makes it harmless.
    overlays.pointer_event(&[], now);
    print_events(&mut overlays, "open menu (opening click bubbles)");
    assert!(overlays.is_open(menu));

    // Frame 1: grace elapses; the user hovers a row and the submenu opens.
    now += 16;
    overlays.advance(now);
    overlays.update_geometry(
        submenu,
        GeometrySample {
            anchor: Some(Rect::new(44.0, 120.0, 256.0, 148.0)),
            overlay: Some(Size::new(200.0, 180.0)),
            viewport,
        },
        LayoutSignals::empty(),
        now,
    );
    overlays.set_visible(submenu, true, now);
    print_events(&mut overlays, "open submenu");

    // Frame 2: clicking the menu's own body collapses the submenu only.
    now += 16;
    overlays.advance(now);
    overlays.pointer_event(&[Marker::Scope(menu)], now);
    overlays.advance(now);
    print_events(&mut overlays, "click menu body (submenu collapses)");
    assert!(overlays.is_open(menu));
    assert!(!overlays.is_open(submenu));

    // Frame 3: the submenu reopens, then a click on the empty canvas closes
    // the whole chain, submenu first.
    now += 16;
    overlays.set_visible(submenu, true, now);
    overlays.advance(now);
    overlays.pointer_event(&[], now + 1);
    overlays.advance(now + 1);
    print_events(&mut overlays, "outside click (chain closes)");
    assert!(!overlays.is_open(menu));
    assert!(!overlays.is_open(submenu));

    overlays.unmount(menu);
    assert!(overlays.is_empty());
    println!("done");
}
