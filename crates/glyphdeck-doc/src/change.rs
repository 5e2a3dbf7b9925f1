#![forbid(unsafe_code)]

//! Change journal entries.
//!
//! The document appends a [`DocumentChange`] for every mutation made through
//! its API. Renderers drain the journal with
//! [`Document::take_changes`](crate::Document::take_changes) to decide what
//! to repaint. The journal is informational only: it is not part of document
//! equality and never influences undo/redo.

use crate::cursor::Cursor;
use crate::layer::LayerId;

/// A single observable change to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChange {
    /// A layer was inserted at `index`.
    LayerInserted { id: LayerId, index: usize },
    /// A layer was removed from `index`.
    LayerRemoved { id: LayerId, index: usize },
    /// A layer moved from `from` to `to` (shift semantics).
    LayerMoved { id: LayerId, from: usize, to: usize },
    /// Name, visibility, or lock flag of a layer changed.
    LayerUpdated { id: LayerId },
    /// `count` cells of a layer changed value.
    CellsChanged { id: LayerId, count: usize },
    /// Every cell of a layer was blanked; `count` of them were non-blank.
    LayerCleared { id: LayerId, count: usize },
    /// The document (and every layer) changed size.
    Resized { from: (u16, u16), to: (u16, u16) },
    /// The active-layer cursor moved.
    ActiveLayerChanged { from: Cursor, to: Cursor },
    /// The whole layer stack was replaced from a snapshot.
    Restored,
}

impl DocumentChange {
    /// Short event name, e.g. `"cell:changed"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LayerInserted { .. } => "layer:inserted",
            Self::LayerRemoved { .. } => "layer:removed",
            Self::LayerMoved { .. } => "layer:moved",
            Self::LayerUpdated { .. } => "layer:updated",
            Self::CellsChanged { .. } => "cell:changed",
            Self::LayerCleared { .. } => "layer:cleared",
            Self::Resized { .. } => "document:resized",
            Self::ActiveLayerChanged { .. } => "layer:active",
            Self::Restored => "document:restored",
        }
    }

    /// The layer this change concerns, if it concerns exactly one.
    #[must_use]
    pub const fn layer(&self) -> Option<LayerId> {
        match self {
            Self::LayerInserted { id, .. }
            | Self::LayerRemoved { id, .. }
            | Self::LayerMoved { id, .. }
            | Self::LayerUpdated { id }
            | Self::CellsChanged { id, .. }
            | Self::LayerCleared { id, .. } => Some(*id),
            Self::Resized { .. } | Self::ActiveLayerChanged { .. } | Self::Restored => None,
        }
    }
}
