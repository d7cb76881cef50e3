//! Browser DOM layer for the scrivet content script.
//!
//! This crate tracks which editable surface has focus — across nested
//! shadow roots — and cycles the selection through placeholder markers in
//! inserted template content. It assumes a `wasm32-unknown-unknown`
//! target environment.
//!
//! # Architecture
//!
//! - `classify`: surface-classification predicates and capability flags
//! - `focus`: boundary-transparent focus routing over shadow roots
//! - `active`: active-surface tracker session
//! - `selection`: linear-offset ⇄ DOM-range selection handling
//! - `navigate`: Tab/Shift+Tab marker cycling and the fragment jump
//! - `session`: one activation entry point with paired teardown
//!
//! # Re-exports
//!
//! This crate re-exports `scrivet-core` for convenience, so consumers
//! only need to depend on `scrivet-browser`.

// Re-export core crate
pub use scrivet_core;
pub use scrivet_core::*;

pub mod active;
pub mod classify;
pub mod focus;
pub mod navigate;
pub mod selection;
pub mod session;

pub use active::{ActiveSurfaceTracker, TrackerHooks, deep_active_element};
pub use classify::{Surface, classify, is_companion_ui, is_flat_field, is_structured_field};
pub use focus::{FocusSession, deep_event_target};
pub use navigate::NavigatorSession;
pub use session::ContentSession;
