#![forbid(unsafe_code)]

//! Errors raised by direct document manipulation.

use crate::layer::LayerId;

/// Errors from the low-level [`Document`](crate::Document) and
/// [`Layer`](crate::Layer) mutators.
///
/// Commands translate these into their own error taxonomy; the model itself
/// never decides whether a failure is a user-facing precondition or drift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    /// No layer with this id is present.
    #[error("layer {0} not found")]
    UnknownLayer(LayerId),
    /// A layer with this id is already present.
    #[error("layer {0} already exists")]
    DuplicateLayer(LayerId),
    /// Layer index outside the layer list.
    #[error("layer index {index} out of range (layer count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// Cell coordinate outside the layer.
    #[error("cell ({x}, {y}) out of bounds for {width}x{height} layer")]
    CellOutOfBounds { x: u16, y: u16, width: u16, height: u16 },
    /// Zero or oversized dimensions.
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: u16, height: u16 },
    /// A layer whose size differs from the document's.
    #[error("layer is {found_width}x{found_height}, document is {width}x{height}")]
    SizeMismatch {
        width: u16,
        height: u16,
        found_width: u16,
        found_height: u16,
    },
    /// The id is the last one the allocator can represent; no id could
    /// follow it.
    #[error("layer id {0} exhausts the id space")]
    IdSpaceExhausted(LayerId),
    /// The active-layer cursor references a layer that is not present,
    /// or is empty while layers exist.
    #[error("active layer cursor is invalid: {0}")]
    CursorInvalid(String),
}
