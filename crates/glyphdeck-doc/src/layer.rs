#![forbid(unsafe_code)]

//! Layer: a named 2D cell matrix with visibility and lock flags.
//!
//! Cells are stored in row-major order in a flat `Vec<Cell>` of length
//! `width * height`. Coordinates are `(x, y)` = `(column, row)`.

use std::fmt;

use crate::cell::Cell;
use crate::error::DocError;
use crate::resize::ResizeStrategy;
use crate::snapshot::{CellSnapshot, LayerSnapshot};

/// Stable identity of a layer.
///
/// Ids are minted by the owning [`Document`](crate::Document) and never
/// reused while anything may still refer to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerId(pub u64);

impl LayerId {
    /// Create a layer id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One layer of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    id: LayerId,
    name: String,
    visible: bool,
    locked: bool,
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Layer {
    /// Create a visible, unlocked layer filled with blank cells.
    #[must_use]
    pub fn new(id: LayerId, name: impl Into<String>, width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            width,
            height,
            cells: vec![Cell::BLANK; len],
        }
    }

    /// Layer identity.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the layer is painted.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether content edits are refused.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock or unlock content edits.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get the cell at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get a mutable reference to the cell at `(x, y)`.
    pub fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Replace the cell at `(x, y)`, returning the previous value.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) -> Result<Cell, DocError> {
        let (width, height) = (self.width, self.height);
        let slot = self.cell_mut(x, y).ok_or(DocError::CellOutOfBounds {
            x,
            y,
            width,
            height,
        })?;
        Ok(std::mem::replace(slot, cell))
    }

    /// Slice of cells for row `y`.
    #[must_use]
    pub fn row_cells(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = usize::from(y) * usize::from(self.width);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Number of cells that differ from [`Cell::BLANK`].
    #[must_use]
    pub fn non_blank_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blank()).count()
    }

    /// Capture every non-blank cell with its coordinates.
    #[must_use]
    pub fn non_blank_cells(&self) -> Vec<CellSnapshot> {
        let width = usize::from(self.width.max(1));
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_blank())
            .map(|(i, c)| CellSnapshot::new((i % width) as u16, (i / width) as u16, *c))
            .collect()
    }

    /// Blank every cell. Returns how many cells actually changed.
    pub fn clear(&mut self) -> usize {
        let mut changed = 0;
        for cell in &mut self.cells {
            if !cell.is_blank() {
                cell.erase();
                changed += 1;
            }
        }
        changed
    }

    /// Fill every cell with `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Change the layer size, placing old content according to `strategy`.
    ///
    /// Newly exposed cells take the value of `fill`. Content that falls
    /// outside the new bounds is dropped.
    pub fn resize(&mut self, new_width: u16, new_height: u16, strategy: ResizeStrategy, fill: Cell) {
        if new_width == self.width && new_height == self.height {
            return;
        }
        let (dx, dy) = strategy.offset((self.width, self.height), (new_width, new_height));
        let mut new_cells = vec![fill; usize::from(new_width) * usize::from(new_height)];

        for y in 0..self.height {
            let ny = i32::from(y) + dy;
            if ny < 0 || ny >= i32::from(new_height) {
                continue;
            }
            for x in 0..self.width {
                let nx = i32::from(x) + dx;
                if nx < 0 || nx >= i32::from(new_width) {
                    continue;
                }
                let new_idx = (ny as usize) * usize::from(new_width) + nx as usize;
                new_cells[new_idx] = self.cells[self.index(x, y)];
            }
        }

        self.cells = new_cells;
        self.width = new_width;
        self.height = new_height;
    }

    /// Capture the full value of this layer.
    #[must_use]
    pub fn snapshot(&self) -> LayerSnapshot {
        LayerSnapshot::capture(self)
    }

    /// Overwrite cell contents from a snapshot of the same size.
    ///
    /// Attributes (name, flags) are left alone.
    pub fn restore_cells(&mut self, snapshot: &LayerSnapshot) -> Result<(), DocError> {
        if snapshot.width() != self.width || snapshot.height() != self.height {
            return Err(DocError::SizeMismatch {
                width: self.width,
                height: self.height,
                found_width: snapshot.width(),
                found_height: snapshot.height(),
            });
        }
        self.cells.copy_from_slice(snapshot.cells());
        Ok(())
    }

    /// Approximate heap + inline footprint in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.len() + self.cells.len() * std::mem::size_of::<Cell>()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

impl From<&LayerSnapshot> for Layer {
    fn from(snapshot: &LayerSnapshot) -> Self {
        Self {
            id: snapshot.id(),
            name: snapshot.name().to_owned(),
            visible: snapshot.is_visible(),
            locked: snapshot.is_locked(),
            width: snapshot.width(),
            height: snapshot.height(),
            cells: snapshot.cells().to_vec(),
        }
    }
}
