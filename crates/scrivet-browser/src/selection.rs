//! Selection state on both surface kinds, through one linear-offset lens.
//!
//! Flat fields expose linear offsets natively. Structured surfaces expose
//! tree ranges; this module converts between those and offsets into the
//! surface's flattened text so the navigation engine never sees a range.
//! All offsets are UTF-16 code units, the unit the DOM itself counts in.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CharacterData, Document, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Node, Range,
};

use scrivet_core::{SelectionSpan, SurfaceError, SurfaceKind};

use crate::classify::Surface;

/// `TreeWalker` whatToShow mask for text nodes.
const SHOW_TEXT: u32 = 0x4;

const NBSP: &str = "\u{00A0}";

pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn js_error(context: &str, error: JsValue) -> SurfaceError {
    SurfaceError::Dom(format!("{context}: {error:?}"))
}

/// The flattened text that linear offsets index into: the field value for
/// flat surfaces, the concatenated text nodes for structured ones.
pub fn surface_text(surface: &Surface) -> String {
    match surface.kind {
        SurfaceKind::Flat => flat_field(&surface.element)
            .map(|field| field.value())
            .unwrap_or_default(),
        SurfaceKind::Structured => surface.element.text_content().unwrap_or_default(),
    }
}

/// Current selection bounds inside the surface, or `None` when the surface
/// has no usable selection (no ranges, selection outside the surface, or a
/// field type without the selection API).
pub fn selection_offsets(surface: &Surface) -> Option<SelectionSpan> {
    match surface.kind {
        SurfaceKind::Flat => flat_field(&surface.element)?.selection(),
        SurfaceKind::Structured => structured_selection_offsets(&surface.element),
    }
}

/// Select `start..end` inside the surface.
///
/// A span of exactly two code units is a collapsed marker pair: its
/// delimiter characters are deleted from the document before the selection
/// collapses there — unless the surface rejects direct mutation, in which
/// case the marker is only selected (typing over it still removes it, the
/// documented degraded mode for that integration).
pub fn apply_selection(surface: &Surface, start: usize, end: usize) -> Result<(), SurfaceError> {
    let empty_marker = end - start == 2;

    match surface.kind {
        SurfaceKind::Flat => {
            let field =
                flat_field(&surface.element).ok_or(SurfaceError::SelectionUnavailable)?;
            field.set_selection(start, end)?;
            if empty_marker {
                // Replacing the selected delimiters with nothing collapses
                // the field's selection onto the marker position.
                field.replace_selection("")?;
            }
            Ok(())
        }
        SurfaceKind::Structured => {
            let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
            let document = window.document().ok_or(SurfaceError::NoDocument)?;
            let range = range_from_offsets(&document, surface.element.as_ref(), start, end)?
                .ok_or(SurfaceError::OffsetsOutOfRange { start, end })?;

            if empty_marker && surface.direct_mutation {
                delete_marker_contents(&range)?;
            }

            let selection = window
                .get_selection()
                .map_err(|error| js_error("get_selection failed", error))?
                .ok_or(SurfaceError::SelectionUnavailable)?;
            selection
                .remove_all_ranges()
                .map_err(|error| js_error("remove_all_ranges failed", error))?;
            selection
                .add_range(&range)
                .map_err(|error| js_error("add_range failed", error))?;
            Ok(())
        }
    }
}

// === Flat surfaces ===

enum FlatField<'a> {
    TextArea(&'a HtmlTextAreaElement),
    Input(&'a HtmlInputElement),
}

fn flat_field(element: &HtmlElement) -> Option<FlatField<'_>> {
    if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
        return Some(FlatField::TextArea(textarea));
    }
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(FlatField::Input(input));
    }
    None
}

impl FlatField<'_> {
    fn value(&self) -> String {
        match self {
            FlatField::TextArea(textarea) => textarea.value(),
            FlatField::Input(input) => input.value(),
        }
    }

    fn selection(&self) -> Option<SelectionSpan> {
        let (start, end) = match self {
            FlatField::TextArea(textarea) => {
                (textarea.selection_start(), textarea.selection_end())
            }
            FlatField::Input(input) => (input.selection_start(), input.selection_end()),
        };
        match (start, end) {
            (Ok(Some(start)), Ok(Some(end))) => Some(SelectionSpan {
                start: start as usize,
                end: end as usize,
            }),
            _ => None,
        }
    }

    fn set_selection(&self, start: usize, end: usize) -> Result<(), SurfaceError> {
        let result = match self {
            FlatField::TextArea(textarea) => {
                textarea.set_selection_range(start as u32, end as u32)
            }
            FlatField::Input(input) => input.set_selection_range(start as u32, end as u32),
        };
        result.map_err(|error| js_error("set_selection_range failed", error))
    }

    fn replace_selection(&self, replacement: &str) -> Result<(), SurfaceError> {
        let result = match self {
            FlatField::TextArea(textarea) => textarea.set_range_text(replacement),
            FlatField::Input(input) => input.set_range_text(replacement),
        };
        result.map_err(|error| js_error("set_range_text failed", error))
    }
}

// === Structured surfaces ===

fn structured_selection_offsets(element: &HtmlElement) -> Option<SelectionSpan> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let selection = window.get_selection().ok().flatten()?;
    if selection.range_count() == 0 {
        return None;
    }
    let range = selection.get_range_at(0).ok()?;

    let start_container = range.start_container().ok()?;
    let end_container = range.end_container().ok()?;
    let root: &Node = element.as_ref();
    if !root.contains(Some(&start_container)) || !root.contains(Some(&end_container)) {
        return None;
    }

    // Prefix range from the surface start up to the selection start gives
    // the linear start offset; the selection's own text gives the length.
    let start_offset = range.start_offset().ok()?;
    let prefix = document.create_range().ok()?;
    prefix.select_node_contents(root).ok()?;
    prefix.set_end(&start_container, start_offset).ok()?;
    let start = utf16_len(&range_text(&prefix)?);

    let content = document.create_range().ok()?;
    content.set_start(&start_container, start_offset).ok()?;
    content.set_end(&end_container, range.end_offset().ok()?).ok()?;
    let end = start + utf16_len(&range_text(&content)?);

    Some(SelectionSpan { start, end })
}

fn range_text(range: &Range) -> Option<String> {
    let fragment = range.clone_contents().ok()?;
    let node: &Node = fragment.as_ref();
    Some(node.text_content().unwrap_or_default())
}

/// Build a range whose boundary points correspond to linear offsets, by
/// walking the surface's text nodes in pre-order and accumulating their
/// UTF-16 lengths. Boundaries are end-inclusive per node, so an offset on
/// a node seam resolves into the earlier node.
fn range_from_offsets(
    document: &Document,
    root: &Node,
    start: usize,
    end: usize,
) -> Result<Option<Range>, SurfaceError> {
    let walker = document
        .create_tree_walker_with_what_to_show(root, SHOW_TEXT)
        .map_err(|error| js_error("create_tree_walker failed", error))?;

    let mut counted = 0usize;
    let mut start_boundary: Option<(Node, usize)> = None;
    let mut end_boundary: Option<(Node, usize)> = None;

    while let Ok(Some(node)) = walker.next_node() {
        let next = counted + utf16_len(&node.text_content().unwrap_or_default());

        if start_boundary.is_none() && start >= counted && start <= next {
            start_boundary = Some((node.clone(), start - counted));
        }
        if start_boundary.is_some() && end >= counted && end <= next {
            end_boundary = Some((node, end - counted));
            break;
        }

        counted = next;
    }

    let (Some((start_node, start_offset)), Some((end_node, end_offset))) =
        (start_boundary, end_boundary)
    else {
        return Ok(None);
    };

    let range = document
        .create_range()
        .map_err(|error| js_error("create_range failed", error))?;
    range
        .set_start(&start_node, start_offset as u32)
        .map_err(|error| js_error("set_start failed", error))?;
    range
        .set_end(&end_node, end_offset as u32)
        .map_err(|error| js_error("set_end failed", error))?;
    Ok(Some(range))
}

/// Delete the marker text selected by `range`, shielding adjacent spaces.
///
/// Plain `deleteContents` on an empty marker leaves the regular whitespace
/// around it eligible for collapsing once the zero-width characters are
/// gone. A plain space immediately before or after the span is first
/// rewritten to a no-break space, which renders identically; the browser
/// turns them back into regular spaces as the user types around them.
fn delete_marker_contents(range: &Range) -> Result<(), SurfaceError> {
    const SPACE: u16 = b' ' as u16;

    let node = range
        .start_container()
        .map_err(|error| js_error("start_container failed", error))?;
    let start = range
        .start_offset()
        .map_err(|error| js_error("start_offset failed", error))? as usize;
    let end = range
        .end_offset()
        .map_err(|error| js_error("end_offset failed", error))? as usize;

    let same_text_node = node.node_type() == Node::TEXT_NODE
        && range
            .end_container()
            .map(|container| container == node)
            .unwrap_or(false);
    if !same_text_node {
        // Whitespace shielding only applies within one text node; markers
        // split across nodes fall back to plain range deletion.
        return range
            .delete_contents()
            .map_err(|error| js_error("delete_contents failed", error));
    }

    let data: CharacterData = node.unchecked_into();
    let units: Vec<u16> = data.data().encode_utf16().collect();

    if start > 0 && units.get(start - 1) == Some(&SPACE) {
        data.replace_data((start - 1) as u32, 1, NBSP)
            .map_err(|error| js_error("replace_data failed", error))?;
    }
    if units.get(end) == Some(&SPACE) {
        data.replace_data(end as u32, 1, NBSP)
            .map_err(|error| js_error("replace_data failed", error))?;
    }

    data.delete_data(start as u32, (end - start) as u32)
        .map_err(|error| js_error("delete_data failed", error))?;
    range.collapse();
    Ok(())
}
