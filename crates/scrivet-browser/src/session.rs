//! Content-layer composition.
//!
//! One activation entry point wiring the tracker and the navigator
//! together, with the paired teardown the rest of the content script
//! drives. All focus-registry and active-surface state lives inside this
//! session; nothing survives a shutdown → start cycle.

use crate::active::{ActiveSurfaceTracker, TrackerHooks};
use crate::classify::Surface;
use crate::navigate::{self, NavigatorSession};

/// The running content layer: focus routing, active-surface tracking and
/// marker navigation. Dropping the session tears everything down.
pub struct ContentSession {
    tracker: ActiveSurfaceTracker,
    navigator: NavigatorSession,
}

impl ContentSession {
    pub fn start(hooks: TrackerHooks) -> Self {
        Self {
            tracker: ActiveSurfaceTracker::start(hooks),
            navigator: navigate::activate(),
        }
    }

    /// The surface insertion and navigation currently target, if any.
    pub fn active_surface(&self) -> Option<Surface> {
        self.tracker.active_surface()
    }

    /// Entry point for the insertion collaborator: select the first
    /// marker of the fragment it just inserted.
    pub fn jump_to_fragment_start(&self, fragment_text: &str) {
        navigate::jump_to_fragment_start(&self.tracker, fragment_text);
    }

    /// Idempotent teardown of both subsystems.
    pub fn shutdown(&self) {
        self.navigator.deactivate();
        self.tracker.stop();
    }
}
