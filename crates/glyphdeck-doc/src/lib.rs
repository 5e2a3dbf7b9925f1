#![forbid(unsafe_code)]

//! Glyphdeck document model.
//!
//! A [`Document`] is an ordered stack of [`Layer`]s, each a fixed-size grid
//! of [`Cell`]s, plus a [`Cursor`] naming the active layer. This crate only
//! holds state and offers low-level, validated mutators; undo/redo lives in
//! `glyphdeck-history`.
//!
//! ```
//! use glyphdeck_doc::{Cell, Document};
//!
//! let mut doc = Document::with_layer(8, 4, "Background");
//! let id = doc.active_layer_id().unwrap();
//! doc.layer_mut(id).unwrap().set_cell(1, 1, Cell::new('@')).unwrap();
//! assert_eq!(doc.layer(id).unwrap().non_blank_count(), 1);
//! ```

pub mod cell;
pub mod change;
pub mod cursor;
pub mod document;
pub mod error;
pub mod layer;
pub mod resize;
pub mod snapshot;

pub use cell::{Cell, ColorIndex};
pub use change::DocumentChange;
pub use cursor::Cursor;
pub use document::{Document, MAX_DIMENSION};
pub use error::DocError;
pub use layer::{Layer, LayerId};
pub use resize::ResizeStrategy;
pub use snapshot::{CellSnapshot, DocumentSnapshot, LayerSnapshot};
