//! Editable-surface and selection data model.

/// How an editable surface exposes its content and selection.
///
/// Classification is a pure function of the node and is never revisited
/// for a surface once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Plain-text field with linear selection offsets (textarea, input).
    Flat,
    /// Rich-text subtree addressed through DOM ranges (contenteditable).
    Structured,
}

/// Direction of marker cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Linear selection bounds in UTF-16 code units.
///
/// Structured surfaces only ever see this after range conversion, so the
/// navigation logic operates uniformly on linear offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: usize,
    pub end: usize,
}

impl SelectionSpan {
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// A collapsed selection.
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_is_collapsed() {
        assert!(SelectionSpan::caret(4).is_caret());
        assert!(
            !SelectionSpan { start: 1, end: 3 }.is_caret()
        );
    }
}
