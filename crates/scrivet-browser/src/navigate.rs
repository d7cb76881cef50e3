//! Marker navigation: the keystroke session and the fragment jump.
//!
//! Every keystroke re-derives everything — active surface, selection,
//! marker list — from the live document. Nothing is cached between
//! keystrokes, so other scripts mutating the surface between operations
//! can never desynchronize navigation.

use std::cell::RefCell;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use scrivet_core::{Direction, advance, fragment_start_marker, scan_markers};

use crate::active::ActiveSurfaceTracker;
use crate::classify::classify;
use crate::focus::deep_event_target;
use crate::selection::{apply_selection, selection_offsets, surface_text};

const SHORTCUT_KEY: &str = "tab";

/// A running navigation session: one global capturing keydown listener.
/// Dropping (or deactivating) the session removes it.
pub struct NavigatorSession {
    listener: RefCell<Option<EventListener>>,
}

impl NavigatorSession {
    pub fn deactivate(&self) {
        self.listener.borrow_mut().take();
    }
}

/// Install the Tab / Shift+Tab marker-cycling shortcut.
pub fn activate() -> NavigatorSession {
    let Some(window) = web_sys::window() else {
        return NavigatorSession {
            listener: RefCell::new(None),
        };
    };

    // Capture phase so the page cannot swallow the keystroke first, and
    // non-passive because a found target suppresses the default tab move.
    let options = EventListenerOptions {
        phase: EventListenerPhase::Capture,
        passive: false,
    };
    let listener = EventListener::new_with_options(
        window.as_ref(),
        "keydown",
        options,
        |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                handle_shortcut(event);
            }
        },
    );

    NavigatorSession {
        listener: RefCell::new(Some(listener)),
    }
}

/// One navigation keystroke: scan, pick a target, apply. Every exit
/// without a target is silent, and Tab keeps its default focus-move
/// behavior unless a marker was actually found.
fn handle_shortcut(event: &KeyboardEvent) {
    if !event.key().eq_ignore_ascii_case(SHORTCUT_KEY) {
        return;
    }

    let Some(target) = deep_event_target(event) else {
        return;
    };
    let Some(surface) = classify(&target) else {
        return;
    };
    let Some(selection) = selection_offsets(&surface) else {
        return;
    };

    let markers = scan_markers(&surface_text(&surface));
    if markers.is_empty() {
        return;
    }

    let direction = if event.shift_key() {
        Direction::Backward
    } else {
        Direction::Forward
    };
    let Some(target_span) = advance(&markers, selection.start, selection.end, direction) else {
        return;
    };

    event.prevent_default();
    event.stop_propagation();

    tracing::trace!(
        target: "scrivet::cursor",
        start = target_span.start,
        end = target_span.end,
        ?direction,
        "moving selection to marker"
    );
    if let Err(error) = apply_selection(&surface, target_span.start, target_span.end) {
        tracing::warn!(target: "scrivet::cursor", %error, "marker selection failed");
    }
}

/// Move the selection onto the first marker of a fragment the insertion
/// collaborator just placed into the active surface.
///
/// `fragment_text` is the literal pre-rendering fragment; only its marker
/// count matters, so it does not need to match what the surface rendered.
pub fn jump_to_fragment_start(tracker: &ActiveSurfaceTracker, fragment_text: &str) {
    let Some(surface) = tracker.active_surface() else {
        return;
    };
    let Some(selection) = selection_offsets(&surface) else {
        return;
    };

    let fragment_markers = scan_markers(fragment_text);
    if fragment_markers.is_empty() {
        return;
    }

    let live_markers = scan_markers(&surface_text(&surface));
    let Some(target) =
        fragment_start_marker(&live_markers, fragment_markers.len(), selection.start)
    else {
        return;
    };

    if let Err(error) = apply_selection(&surface, target.start, target.end) {
        tracing::warn!(target: "scrivet::cursor", %error, "fragment marker selection failed");
    }
}
