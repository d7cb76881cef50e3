//! Active-surface tracking.
//!
//! Thin consumer of the focus router: remembers the most recently focused
//! qualifying surface so that navigation commands and template insertion
//! have a target even while focus transiently sits on one of the tool's
//! own controls. The reference is deliberately left stale on focus-out and
//! only cleared on teardown.

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{Document, Element, Node};

use crate::classify::{Surface, classify, is_companion_ui};
use crate::focus::{self, FocusCallback, FocusSession};

/// Optional notifications for UI collaborators (floating button, dialog).
/// Each receives the qualifying DOM node.
#[derive(Default)]
pub struct TrackerHooks {
    pub on_surface_focus: Option<FocusCallback>,
    pub on_surface_blur: Option<FocusCallback>,
}

/// A running tracker session. Owns its focus-router session; dropping the
/// tracker tears both down.
pub struct ActiveSurfaceTracker {
    current: Rc<RefCell<Option<Surface>>>,
    session: FocusSession,
}

impl ActiveSurfaceTracker {
    pub fn start(hooks: TrackerHooks) -> Self {
        let current: Rc<RefCell<Option<Surface>>> = Rc::new(RefCell::new(None));

        let on_focus = {
            let current = Rc::clone(&current);
            let on_surface_focus = hooks.on_surface_focus;
            move |node: &Node| {
                if is_companion_ui(node) {
                    return;
                }
                let Some(surface) = classify(node) else {
                    return;
                };
                tracing::trace!(
                    target: "scrivet::focus",
                    kind = ?surface.kind,
                    "active surface updated"
                );
                *current.borrow_mut() = Some(surface);
                if let Some(hook) = &on_surface_focus {
                    hook(node);
                }
            }
        };

        let on_blur = hooks.on_surface_blur.map(|hook| {
            Box::new(move |node: &Node| {
                if is_companion_ui(node) {
                    return;
                }
                if classify(node).is_some() {
                    hook(node);
                }
            }) as FocusCallback
        });

        let session = focus::activate(on_focus, on_blur);

        Self { current, session }
    }

    /// The surface navigation should act on, if any.
    ///
    /// Prefers the tracked surface as long as its element is still in the
    /// document; otherwise falls back to classifying whatever is deeply
    /// focused right now.
    pub fn active_surface(&self) -> Option<Surface> {
        if let Some(surface) = self.current.borrow().clone() {
            if surface.element.is_connected() {
                return Some(surface);
            }
        }

        let document = web_sys::window()?.document()?;
        let element = deep_active_element(&document)?;
        let node: &Node = element.as_ref();
        if is_companion_ui(node) {
            return None;
        }
        classify(node)
    }

    /// Tear the session down: no further notifications, reference cleared.
    pub fn stop(&self) {
        self.session.deactivate();
        self.current.borrow_mut().take();
    }
}

/// The focused element, descending through `shadowRoot.activeElement`
/// chains so that focus inside nested shadow trees is not hidden behind
/// the host.
pub fn deep_active_element(document: &Document) -> Option<Element> {
    let mut element = document.active_element()?;
    while let Some(inner) = element
        .shadow_root()
        .and_then(|root| root.active_element())
    {
        element = inner;
    }
    Some(element)
}
