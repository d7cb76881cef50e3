//! Surface classification predicates.
//!
//! Pure functions of a DOM node: which nodes are editable surfaces, which
//! kind they are, and what they are capable of. This module is the only
//! place that knows any third-party editor's markup; everything downstream
//! consults the capability flags on [`Surface`] instead.

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement, Node, ShadowRoot};

use scrivet_core::SurfaceKind;

/// A classified editable surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub element: HtmlElement,
    pub kind: SurfaceKind,
    /// Whether marker text may be deleted by mutating the DOM directly.
    /// Editors that route all edits through their own model reject such
    /// mutation, so empty markers are only selected there, never removed.
    pub direct_mutation: bool,
}

/// Tag prefix of the tool's own custom elements (floating button, dialog).
const COMPANION_TAG_PREFIX: &str = "scrivet-";

/// Plain-text field with a linear selection API.
///
/// Text inputs only qualify when they actually expose `selectionStart`;
/// email inputs are supported anyway, with the caret assumed at the end.
/// Password inputs and read-only fields never qualify.
pub fn is_flat_field(node: &Node) -> bool {
    if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
        return !textarea.read_only();
    }

    if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
        if input.read_only() || input.type_() == "password" {
            return false;
        }
        return matches!(input.selection_start(), Ok(Some(_))) || input.type_() == "email";
    }

    false
}

/// Rich-text subtree (contenteditable host or descendant).
///
/// Mutually exclusive with [`is_flat_field`]: form fields are never
/// structured surfaces, even when an editable ancestor makes
/// `isContentEditable` report true for them.
pub fn is_structured_field(node: &Node) -> bool {
    if node.dyn_ref::<HtmlInputElement>().is_some()
        || node.dyn_ref::<HtmlTextAreaElement>().is_some()
    {
        return false;
    }

    node.dyn_ref::<HtmlElement>()
        .is_some_and(|element| element.is_content_editable())
}

/// Whether the node sits inside one of the tool's own UI components.
///
/// The floating button and the dialog are custom elements hosting shadow
/// trees; anything focused inside them must never become the active
/// surface, or opening the dialog would retarget the insertion.
pub fn is_companion_ui(node: &Node) -> bool {
    let root = node.get_root_node();
    let Ok(shadow) = root.dyn_into::<ShadowRoot>() else {
        return false;
    };
    shadow
        .host()
        .tag_name()
        .to_ascii_lowercase()
        .starts_with(COMPANION_TAG_PREFIX)
}

/// Classify a node into a [`Surface`], or `None` for non-editable nodes.
pub fn classify(node: &Node) -> Option<Surface> {
    let kind = if is_flat_field(node) {
        SurfaceKind::Flat
    } else if is_structured_field(node) {
        SurfaceKind::Structured
    } else {
        return None;
    };

    let element = node.dyn_ref::<HtmlElement>()?.clone();
    let direct_mutation = kind == SurfaceKind::Flat || supports_direct_mutation(&element);

    Some(Surface {
        element,
        kind,
        direct_mutation,
    })
}

/// CKEditor 5 prevents direct DOM manipulation, even through the Range
/// API: deleting an empty marker there neither removes the text nor moves
/// the caret. Recognized here so the navigation engine can skip the
/// deletion step on such surfaces.
fn supports_direct_mutation(element: &HtmlElement) -> bool {
    !element.matches(".ck-editor__editable").unwrap_or(false)
}
