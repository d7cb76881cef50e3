//! Placeholder markers: scanning, cycling order and fragment targeting.
//!
//! A placeholder is bracketed by a zero-width delimiter on each side. The
//! content between the delimiters may be empty, plain text or markup; the
//! scanner only looks for delimiter occurrences and never parses what sits
//! between them. Markers are not persisted anywhere — callers re-scan the
//! surface text on every request, so concurrent mutation of the document
//! by other scripts can never leave stale spans behind.

use crate::surface::Direction;

/// Zero-width delimiter bracketing a placeholder on both sides.
pub const MARKER: char = '\u{200B}';

/// One placeholder occurrence, as UTF-16 code-unit offsets into the
/// surface's flattened text. `end` is exclusive and includes the closing
/// delimiter, so `end - start >= 2` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    pub start: usize,
    pub end: usize,
}

impl MarkerSpan {
    /// Just the two delimiters with nothing between them. Empty
    /// placeholders are removed from the document when selected.
    pub fn is_empty_placeholder(&self) -> bool {
        self.end - self.start == 2
    }
}

/// Scan `text` for placeholder markers, left to right.
///
/// Each delimiter is paired with the next one after it: non-greedy (a
/// marker never spans past the nearest closing delimiter) and
/// non-overlapping. A trailing unpaired delimiter is ignored. Empty input
/// yields an empty vec.
pub fn scan_markers(text: &str) -> Vec<MarkerSpan> {
    const DELIMITER: u16 = MARKER as u16;

    let mut markers = Vec::new();
    let mut open: Option<usize> = None;

    for (index, unit) in text.encode_utf16().enumerate() {
        if unit != DELIMITER {
            continue;
        }
        match open.take() {
            None => open = Some(index),
            Some(start) => markers.push(MarkerSpan {
                start,
                end: index + 1,
            }),
        }
    }

    markers
}

/// Pick the marker the selection should move to, or `None` for a no-op.
///
/// Forward: a selection sitting exactly on a marker span advances past it;
/// any other selection lands on the first marker starting at or after it.
/// Backward: the last marker starting strictly before the selection.
/// There is no wraparound in either direction.
pub fn advance(
    markers: &[MarkerSpan],
    current_start: usize,
    current_end: usize,
    direction: Direction,
) -> Option<MarkerSpan> {
    match direction {
        Direction::Backward => markers
            .iter()
            .rev()
            .find(|marker| marker.start < current_start)
            .copied(),
        Direction::Forward => {
            let on_marker = markers
                .iter()
                .any(|marker| marker.start == current_start && marker.end == current_end);
            if on_marker {
                markers
                    .iter()
                    .find(|marker| marker.start > current_start)
                    .copied()
            } else {
                markers
                    .iter()
                    .find(|marker| marker.start >= current_start)
                    .copied()
            }
        }
    }
}

/// Locate the first marker of a just-inserted fragment inside the live
/// surface.
///
/// The host surface may have re-rendered the fragment (wrapper elements,
/// normalized whitespace), so spans cannot be matched by content. Counting
/// survives re-rendering: the caret sits right after the insertion, so of
/// the live markers ending at or before it, the last
/// `fragment_marker_count` belong to the fragment. When the counts cannot
/// line up the fragment is not identifiable and the result is `None`.
pub fn fragment_start_marker(
    live_markers: &[MarkerSpan],
    fragment_marker_count: usize,
    caret: usize,
) -> Option<MarkerSpan> {
    if fragment_marker_count == 0 {
        return None;
    }

    let before_caret: Vec<&MarkerSpan> = live_markers
        .iter()
        .filter(|marker| marker.end <= caret)
        .collect();

    let Some(index) = before_caret.len().checked_sub(fragment_marker_count) else {
        tracing::debug!(
            target: "scrivet::cursor",
            live = before_caret.len(),
            fragment = fragment_marker_count,
            "fewer live markers before caret than the fragment holds"
        );
        return None;
    };

    before_caret.get(index).map(|marker| **marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(placeholder: &str) -> String {
        format!("{MARKER}{placeholder}{MARKER}")
    }

    #[test]
    fn scan_empty_input() {
        assert!(scan_markers("").is_empty());
        assert!(scan_markers("no markers here").is_empty());
    }

    #[test]
    fn scan_finds_pairs_in_document_order() {
        let text = format!("Hello {}! Next {}", marked("world"), marked("here"));
        let markers = scan_markers(&text);
        assert_eq!(
            markers,
            vec![
                MarkerSpan { start: 6, end: 13 },
                MarkerSpan { start: 20, end: 26 },
            ]
        );
        for marker in &markers {
            assert!(marker.end - marker.start >= 2);
        }
    }

    #[test]
    fn scan_is_non_greedy() {
        // Four delimiters pair up as two short markers, never one long one.
        let text = format!("{}{}", marked("a"), marked("b"));
        let markers = scan_markers(&text);
        assert_eq!(
            markers,
            vec![MarkerSpan { start: 0, end: 3 }, MarkerSpan { start: 3, end: 6 }]
        );
    }

    #[test]
    fn scan_ignores_unpaired_trailing_delimiter() {
        let text = format!("{}tail{MARKER}", marked("a"));
        assert_eq!(scan_markers(&text).len(), 1);
    }

    #[test]
    fn scan_pairs_across_newlines() {
        let text = format!("{MARKER}line one\nline two{MARKER}");
        assert_eq!(scan_markers(&text), vec![MarkerSpan { start: 0, end: 19 }]);
    }

    #[test]
    fn scan_offsets_are_utf16_units() {
        // The emoji is two UTF-16 code units, shifting everything after it.
        let text = format!("\u{1F600} {}", marked("x"));
        assert_eq!(scan_markers(&text), vec![MarkerSpan { start: 3, end: 6 }]);
    }

    #[test]
    fn empty_placeholder_detection() {
        let markers = scan_markers(&marked(""));
        assert_eq!(markers, vec![MarkerSpan { start: 0, end: 2 }]);
        assert!(markers[0].is_empty_placeholder());
        assert!(!scan_markers(&marked("x"))[0].is_empty_placeholder());
    }

    #[test]
    fn forward_from_caret_lands_on_upcoming_marker() {
        let text = format!("Hello {}! Next {}", marked("world"), marked("here"));
        let markers = scan_markers(&text);
        let target = advance(&markers, 0, 0, Direction::Forward).unwrap();
        assert_eq!(target, MarkerSpan { start: 6, end: 13 });
    }

    #[test]
    fn forward_from_marker_span_advances_past_it() {
        let text = format!("Hello {}! Next {}", marked("world"), marked("here"));
        let markers = scan_markers(&text);
        let target = advance(&markers, 6, 13, Direction::Forward).unwrap();
        assert_eq!(target, MarkerSpan { start: 20, end: 26 });
    }

    #[test]
    fn forward_past_last_marker_is_a_no_op() {
        let text = format!("Hello {}! Next {}", marked("world"), marked("here"));
        let markers = scan_markers(&text);
        assert_eq!(advance(&markers, 20, 26, Direction::Forward), None);
    }

    #[test]
    fn backward_lands_on_previous_marker() {
        let text = format!("{} and {}", marked("first"), marked("second"));
        let markers = scan_markers(&text);
        let target = advance(&markers, 12, 20, Direction::Backward).unwrap();
        assert_eq!(target, MarkerSpan { start: 0, end: 7 });
    }

    #[test]
    fn backward_before_first_marker_is_a_no_op() {
        let text = format!("pre {}", marked("a"));
        let markers = scan_markers(&text);
        assert_eq!(advance(&markers, 0, 0, Direction::Backward), None);
        assert_eq!(advance(&markers, 4, 7, Direction::Backward), None);
    }

    #[test]
    fn fragment_targeting_skips_pre_existing_markers() {
        // One unrelated marker, then a fragment holding one marker; the
        // caret sits at the end of the insertion.
        let fragment = format!("cursor={}", marked("target"));
        let live = format!("Pre-existing cursor={} {}", marked(""), fragment);
        let live_markers = scan_markers(&live);
        let fragment_count = scan_markers(&fragment).len();
        let caret = live.encode_utf16().count();

        let target = fragment_start_marker(&live_markers, fragment_count, caret).unwrap();
        assert_eq!(target, live_markers[1]);
    }

    #[test]
    fn fragment_targeting_only_counts_markers_before_the_caret() {
        let live = format!("{}{}{}", marked("a"), marked("b"), marked("c"));
        let live_markers = scan_markers(&live);
        // Caret right after the second marker; a one-marker fragment must
        // resolve to that marker, not the one after the caret.
        let target = fragment_start_marker(&live_markers, 1, live_markers[1].end).unwrap();
        assert_eq!(target, live_markers[1]);
    }

    #[test]
    fn fragment_targeting_refuses_mismatched_counts() {
        let live = format!("{}", marked("a"));
        let live_markers = scan_markers(&live);
        let caret = live.encode_utf16().count();
        assert_eq!(fragment_start_marker(&live_markers, 2, caret), None);
        assert_eq!(fragment_start_marker(&live_markers, 0, caret), None);
        assert_eq!(fragment_start_marker(&[], 1, 10), None);
    }
}
