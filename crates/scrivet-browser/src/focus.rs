//! Boundary-transparent focus routing across shadow roots.
//!
//! `focusin`/`focusout` are composed events, but they only escape a shadow
//! root when the host itself gains or loses focus: a transition that stays
//! inside one shadow tree is retargeted into nothing and never reaches the
//! document. Observing every transition therefore requires attaching the
//! same listener pair directly inside each shadow root — and shadow roots
//! can be nested arbitrarily deep and created long after the session
//! started, so they are discovered opportunistically from the composed
//! path of every focus event that does reach an installed listener.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, Node, ShadowRoot};

use crate::active::deep_active_element;

/// Callback receiving the deep event target of a focus transition.
pub type FocusCallback = Box<dyn Fn(&Node)>;

/// Where one listener pair of the session is installed.
#[derive(Clone)]
enum ListenerHost {
    Top,
    Root(ShadowRoot),
}

/// Per-session router state, shared by every listener closure.
struct RouterState {
    active: Cell<bool>,
    /// Set once any real focus event reaches the session; the deferred
    /// startup catch-up bails out when it lost that race.
    saw_focus_event: Cell<bool>,
    /// Shadow roots already instrumented this session. Membership is
    /// checked before instrumenting, so re-discovery is idempotent.
    roots: RefCell<Vec<ShadowRoot>>,
    /// Every listener installed during the session; dropping one removes
    /// it from its target, so teardown is "clear the vec".
    listeners: RefCell<Vec<EventListener>>,
    /// The event whose callback has already been delivered. Dispatch runs
    /// to completion one event at a time, so a single slot is enough; it
    /// exists so that a synthesized replay is never double-counted by
    /// sibling listeners later on the same path.
    delivered: RefCell<Option<Event>>,
    on_focus: FocusCallback,
    on_blur: Option<FocusCallback>,
}

impl RouterState {
    fn is_delivered(&self, event: &Event) -> bool {
        self.delivered.borrow().as_ref() == Some(event)
    }

    fn mark_delivered(&self, event: &Event) {
        *self.delivered.borrow_mut() = Some(event.clone());
    }

    fn is_instrumented(&self, root: &ShadowRoot) -> bool {
        self.roots.borrow().iter().any(|known| known == root)
    }
}

/// A running focus-routing session.
///
/// Returned by [`activate`]; deactivating (or dropping) removes every
/// listener the session ever installed, empties the registry and cancels
/// any pending startup catch-up. Safe to deactivate more than once.
pub struct FocusSession {
    state: Rc<RouterState>,
    catch_up: RefCell<Option<Timeout>>,
}

impl FocusSession {
    pub fn deactivate(&self) {
        self.state.active.set(false);
        self.catch_up.borrow_mut().take();
        self.state.listeners.borrow_mut().clear();
        self.state.roots.borrow_mut().clear();
        *self.state.delivered.borrow_mut() = None;
    }
}

impl Drop for FocusSession {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Begin a routing session.
///
/// `on_focus` fires exactly once per real focus-in transition anywhere in
/// the page, including transitions confined to (nested) shadow roots that
/// have been discovered; `on_blur` mirrors it for focus-out. If an element
/// is already focused when the session starts, one catch-up notification
/// is delivered asynchronously on the next timer tick — skipped when a
/// real event arrives first, so callers installing the session and moving
/// focus in the same turn never see a duplicate.
pub fn activate(
    on_focus: impl Fn(&Node) + 'static,
    on_blur: Option<FocusCallback>,
) -> FocusSession {
    let state = Rc::new(RouterState {
        active: Cell::new(true),
        saw_focus_event: Cell::new(false),
        roots: RefCell::new(Vec::new()),
        listeners: RefCell::new(Vec::new()),
        delivered: RefCell::new(None),
        on_focus: Box::new(on_focus),
        on_blur,
    });

    if web_sys::window().is_none() {
        state.active.set(false);
        return FocusSession {
            state,
            catch_up: RefCell::new(None),
        };
    }

    instrument(&state, ListenerHost::Top);

    let catch_up = Timeout::new(0, {
        let state = Rc::clone(&state);
        move || run_catch_up(&state)
    });

    FocusSession {
        state,
        catch_up: RefCell::new(Some(catch_up)),
    }
}

/// Resolve the composed-path origin of an event, piercing retargeting.
pub fn deep_event_target(event: &Event) -> Option<Node> {
    let path = event.composed_path();
    if path.length() > 0 {
        if let Ok(node) = path.get(0).dyn_into::<Node>() {
            return Some(node);
        }
    }
    event.target()?.dyn_into::<Node>().ok()
}

/// Install the session's capturing focusin/focusout pair on one target.
fn instrument(state: &Rc<RouterState>, host: ListenerHost) {
    let target: EventTarget = match &host {
        ListenerHost::Top => match web_sys::window() {
            Some(window) => window.unchecked_into(),
            None => return,
        },
        ListenerHost::Root(root) => root.clone().unchecked_into(),
    };

    let focus_in = EventListener::new_with_options(
        &target,
        "focusin",
        EventListenerOptions::run_in_capture_phase(),
        {
            let state = Rc::clone(state);
            let host = host.clone();
            move |event| handle_focus_in(&state, &host, event)
        },
    );
    let focus_out = EventListener::new_with_options(
        &target,
        "focusout",
        EventListenerOptions::run_in_capture_phase(),
        {
            let state = Rc::clone(state);
            move |event| handle_focus_out(&state, &host, event)
        },
    );

    state.listeners.borrow_mut().extend([focus_in, focus_out]);
}

fn handle_focus_in(state: &Rc<RouterState>, host: &ListenerHost, event: &Event) {
    if !state.active.get() {
        return;
    }
    state.saw_focus_event.set(true);

    let path = composed_path_values(event);
    let innermost = innermost_shadow_root(&path);
    let newly = discover_roots(state, &path);

    if state.is_delivered(event) {
        return;
    }

    // Exactly one listener on the path delivers: the top-level one when no
    // shadow root is involved, otherwise the one sitting on the innermost
    // root. Everything else only participates in discovery above.
    let eligible = match host {
        ListenerHost::Top => innermost.is_none(),
        ListenerHost::Root(root) => innermost.as_ref() == Some(root),
    };

    // A listener added mid-dispatch never receives the in-flight event, so
    // when the would-be deliverer was just instrumented, the discovering
    // listener synthesizes the notification in its place.
    let replay = matches!(
        &innermost,
        Some(root) if newly.iter().any(|new_root| new_root == root)
    );

    if eligible || replay {
        state.mark_delivered(event);
        if let Some(target) = deep_event_target(event) {
            (state.on_focus)(&target);
        }
    }
}

fn handle_focus_out(state: &Rc<RouterState>, host: &ListenerHost, event: &Event) {
    if !state.active.get() {
        return;
    }

    let path = composed_path_values(event);
    let innermost = innermost_shadow_root(&path);

    if state.is_delivered(event) {
        return;
    }

    let eligible = match host {
        ListenerHost::Top => innermost.is_none(),
        ListenerHost::Root(root) => innermost.as_ref() == Some(root),
    };

    if eligible {
        state.mark_delivered(event);
        if let Some(callback) = &state.on_blur {
            if let Some(target) = deep_event_target(event) {
                callback(&target);
            }
        }
    }
}

/// Instrument every not-yet-known shadow root on the path, returning the
/// newly instrumented ones. Closed roots never appear in composed paths,
/// so inaccessible subtrees are skipped without ever erroring.
fn discover_roots(state: &Rc<RouterState>, path: &[wasm_bindgen::JsValue]) -> Vec<ShadowRoot> {
    let mut newly = Vec::new();
    for value in path {
        let Some(root) = value.dyn_ref::<ShadowRoot>() else {
            continue;
        };
        if state.is_instrumented(root) {
            continue;
        }
        tracing::trace!(target: "scrivet::focus", "instrumenting shadow root");
        state.roots.borrow_mut().push(root.clone());
        instrument(state, ListenerHost::Root(root.clone()));
        newly.push(root.clone());
    }
    newly
}

fn composed_path_values(event: &Event) -> Vec<wasm_bindgen::JsValue> {
    event.composed_path().iter().collect()
}

/// The composed path runs from the target outward, so the first shadow
/// root on it is the innermost one.
fn innermost_shadow_root(path: &[wasm_bindgen::JsValue]) -> Option<ShadowRoot> {
    path.iter()
        .find_map(|value| value.dyn_ref::<ShadowRoot>().cloned())
}

/// Deferred startup check: when an element is already focused before any
/// transition happens, instrument its chain of shadow roots and deliver
/// the focus callback once.
fn run_catch_up(state: &Rc<RouterState>) {
    if !state.active.get() || state.saw_focus_event.get() {
        return;
    }

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    let Some(element) = deep_active_element(&document) else {
        return;
    };

    let mut node: Node = element.clone().unchecked_into();
    loop {
        match node.get_root_node().dyn_into::<ShadowRoot>() {
            Ok(shadow) => {
                if !state.is_instrumented(&shadow) {
                    state.roots.borrow_mut().push(shadow.clone());
                    instrument(state, ListenerHost::Root(shadow.clone()));
                }
                node = shadow.host().unchecked_into();
            }
            Err(_) => break,
        }
    }

    tracing::trace!(target: "scrivet::focus", "delivering startup catch-up focus");
    (state.on_focus)(element.unchecked_ref());
}
