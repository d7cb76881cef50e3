//! Error taxonomy for surface operations.
//!
//! Nothing in this crate is fatal: every variant degrades to a logged
//! no-op at the event-handler boundary. A caret-navigation feature that
//! fails silently is preferable to one that breaks the host page.

use thiserror::Error;

/// Failure of a DOM-facing surface operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("surface exposes no usable selection")]
    SelectionUnavailable,

    #[error("offsets {start}..{end} not present in surface text")]
    OffsetsOutOfRange { start: usize, end: usize },

    /// A DOM call rejected; carries the formatted browser error.
    #[error("{0}")]
    Dom(String),
}

impl From<String> for SurfaceError {
    fn from(message: String) -> Self {
        SurfaceError::Dom(message)
    }
}

impl From<&str> for SurfaceError {
    fn from(message: &str) -> Self {
        SurfaceError::Dom(message.to_string())
    }
}
