#![forbid(unsafe_code)]

//! Immutable snapshot values used to restore state exactly.
//!
//! Snapshots are plain values with structural equality. Cell storage is
//! shared through an [`Arc`], so cloning a snapshot (for example when a
//! command is redone and undone repeatedly) never copies the grid again.

use std::sync::Arc;

use crate::cell::Cell;
use crate::cursor::Cursor;
use crate::layer::{Layer, LayerId};

/// A single cell captured together with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSnapshot {
    x: u16,
    y: u16,
    cell: Cell,
}

impl CellSnapshot {
    /// Capture `cell` at `(x, y)`.
    #[must_use]
    pub const fn new(x: u16, y: u16, cell: Cell) -> Self {
        Self { x, y, cell }
    }

    /// Column.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Captured cell value.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }
}

/// Full value of a layer: every attribute and every cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSnapshot {
    id: LayerId,
    name: Arc<str>,
    visible: bool,
    locked: bool,
    width: u16,
    height: u16,
    cells: Arc<[Cell]>,
}

impl LayerSnapshot {
    pub(crate) fn capture(layer: &Layer) -> Self {
        Self {
            id: layer.id(),
            name: Arc::from(layer.name()),
            visible: layer.is_visible(),
            locked: layer.is_locked(),
            width: layer.width(),
            height: layer.height(),
            cells: Arc::from(layer.cells()),
        }
    }

    /// Identity of the captured layer.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Captured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Captured visibility flag.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Captured lock flag.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Captured width.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Captured height.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Captured cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Count of captured cells that differ from blank.
    #[must_use]
    pub fn non_blank_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    /// Rebuild an owned layer from this snapshot.
    #[must_use]
    pub fn to_layer(&self) -> Layer {
        Layer::from(self)
    }

    /// Approximate footprint in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.len() + self.cells.len() * std::mem::size_of::<Cell>()
    }
}

/// Everything a whole-document structural change can disturb: the size,
/// every layer, and the active-layer cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) layers: Vec<LayerSnapshot>,
    pub(crate) cursor: Cursor,
}

impl DocumentSnapshot {
    /// Captured document width.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Captured document height.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Captured layers in paint order.
    #[must_use]
    pub fn layers(&self) -> &[LayerSnapshot] {
        &self.layers
    }

    /// Captured active-layer cursor.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Approximate footprint in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.layers.iter().map(LayerSnapshot::size_bytes).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_clone_shares_cells() {
        let layer = Layer::new(LayerId::new(1), "a", 8, 8);
        let snap = layer.snapshot();
        let copy = snap.clone();
        assert!(Arc::ptr_eq(&snap.cells, &copy.cells));
        assert_eq!(snap, copy);
    }

    #[test]
    fn snapshot_equality_is_structural() {
        let mut a = Layer::new(LayerId::new(1), "a", 2, 2);
        let b = a.clone();
        assert_eq!(a.snapshot(), b.snapshot());
        a.set_cell(0, 0, Cell::new('x')).unwrap();
        assert_ne!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn snapshot_counts_non_blank() {
        let mut layer = Layer::new(LayerId::new(1), "a", 3, 3);
        layer.set_cell(0, 0, Cell::new('1')).unwrap();
        layer.set_cell(2, 2, Cell::new('2')).unwrap();
        assert_eq!(layer.snapshot().non_blank_count(), 2);
    }

    #[test]
    fn size_bytes_scales_with_area() {
        let small = Layer::new(LayerId::new(1), "a", 2, 2).snapshot();
        let big = Layer::new(LayerId::new(1), "a", 20, 20).snapshot();
        assert!(big.size_bytes() > small.size_bytes());
    }
}
