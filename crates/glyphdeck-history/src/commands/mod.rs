#![forbid(unsafe_code)]

//! Concrete commands.
//!
//! Structural commands change the shape of the layer list or the document:
//! [`AddLayerCmd`], [`RemoveLayerCmd`], [`ReorderLayerCmd`],
//! [`ResizeDocumentCmd`]. [`ClearCmd`] and [`PaintCellsCmd`] edit cell
//! content, [`SetLayerPropsCmd`] edits layer attributes, and
//! [`CommandBatch`] groups any of them into one undo step.

mod add_layer;
mod batch;
mod clear;
mod paint;
mod props;
mod remove_layer;
mod reorder;
mod resize;

pub use add_layer::AddLayerCmd;
pub use batch::CommandBatch;
pub use clear::{ClearCmd, ClearTarget};
pub use paint::PaintCellsCmd;
pub use props::{LayerProps, SetLayerPropsCmd};
pub use remove_layer::RemoveLayerCmd;
pub use reorder::ReorderLayerCmd;
pub use resize::ResizeDocumentCmd;
