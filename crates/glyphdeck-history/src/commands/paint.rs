#![forbid(unsafe_code)]

//! Cell-content edits on a single layer.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use glyphdeck_doc::{Cell, CellSnapshot, Document, DocumentChange, LayerId};
use web_time::Instant;

use crate::command::{Command, CommandDetails, CommandMetadata, MergeConfig};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

/// Write cells on one layer.
///
/// Each position appears at most once (later writes in the input win).
/// Paints on the same layer that share a stroke id merge while they arrive
/// inside the merge window: the earliest prior value and the newest painted
/// value per position are kept.
#[derive(Debug)]
pub struct PaintCellsCmd {
    metadata: CommandMetadata,
    layer_id: LayerId,
    stroke: Option<u64>,
    /// New values, one per position.
    cells: Vec<CellSnapshot>,
    /// Values replaced by the most recent execute, one per position.
    previous: Vec<CellSnapshot>,
}

/// Keep the last value for every position, in first-seen order.
fn dedupe_last(cells: impl IntoIterator<Item = CellSnapshot>) -> Vec<CellSnapshot> {
    let mut out: Vec<CellSnapshot> = Vec::new();
    let mut slots: HashMap<(u16, u16), usize> = HashMap::new();
    for cell in cells {
        match slots.get(&(cell.x(), cell.y())) {
            Some(&i) => out[i] = cell,
            None => {
                slots.insert((cell.x(), cell.y()), out.len());
                out.push(cell);
            }
        }
    }
    out
}

impl PaintCellsCmd {
    /// Paint `cells` on `layer_id`.
    #[must_use]
    pub fn new(layer_id: LayerId, cells: impl IntoIterator<Item = CellSnapshot>) -> Self {
        Self {
            metadata: CommandMetadata::new("Paint"),
            layer_id,
            stroke: None,
            cells: dedupe_last(cells),
            previous: Vec::new(),
        }
    }

    /// Paint a single cell.
    #[must_use]
    pub fn single(layer_id: LayerId, x: u16, y: u16, cell: Cell) -> Self {
        Self::new(layer_id, [CellSnapshot::new(x, y, cell)])
    }

    /// Tag with a stroke id; only paints of the same stroke merge.
    #[must_use]
    pub fn with_stroke(mut self, stroke: u64) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Override the creation time used by the merge window.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.metadata = self.metadata.with_timestamp(timestamp);
        self
    }

    /// Target layer.
    #[must_use]
    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    /// Stroke id, if any.
    #[must_use]
    pub fn stroke(&self) -> Option<u64> {
        self.stroke
    }

    /// Painted values.
    #[must_use]
    pub fn cells(&self) -> &[CellSnapshot] {
        &self.cells
    }

    /// Replaced values.
    #[must_use]
    pub fn previous(&self) -> &[CellSnapshot] {
        &self.previous
    }

    fn write(
        doc: &mut Document,
        id: LayerId,
        cells: &[CellSnapshot],
    ) -> CommandResult<Vec<CellSnapshot>> {
        let Some(layer) = doc.layer_mut(id) else {
            return Err(CommandError::drift(format!("layer {id}"), "no such layer"));
        };
        if let Some(bad) = cells.iter().find(|c| layer.cell(c.x(), c.y()).is_none()) {
            return Err(CommandError::drift(
                format!("cell ({}, {}) inside layer {id}", bad.x(), bad.y()),
                format!("{}x{} layer", layer.width(), layer.height()),
            ));
        }
        let mut replaced = Vec::with_capacity(cells.len());
        for c in cells {
            let old = layer.set_cell(c.x(), c.y(), c.cell())?;
            replaced.push(CellSnapshot::new(c.x(), c.y(), old));
        }
        doc.record(DocumentChange::CellsChanged {
            id,
            count: cells.len(),
        });
        Ok(replaced)
    }
}

impl Command for PaintCellsCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        }
        self.previous = Self::write(doc, self.layer_id, &self.cells)?;
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        Self::write(doc, self.layer_id, &self.previous)?;
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        let Some(layer) = doc.layer(self.layer_id) else {
            return Err(ValidationFailure::UnknownLayer(self.layer_id));
        };
        if layer.is_locked() {
            return Err(ValidationFailure::LayerLocked(self.layer_id));
        }
        if self.cells.is_empty() {
            return Err(ValidationFailure::NoChange("no cells to paint"));
        }
        if let Some(bad) = self.cells.iter().find(|c| layer.cell(c.x(), c.y()).is_none()) {
            return Err(ValidationFailure::CellOutOfBounds {
                x: bad.x(),
                y: bad.y(),
            });
        }
        Ok(())
    }

    fn can_merge(&self, other: &dyn Command, config: &MergeConfig) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.layer_id == other.layer_id
            && self.stroke.is_some()
            && self.stroke == other.stroke
            && self.cells.len() + other.cells.len() <= config.max_merged_cells
            && config.within_window(self.metadata.timestamp, other.metadata.timestamp)
    }

    fn merge(&mut self, other: &dyn Command) -> CommandResult {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return Err(MisuseError::IncompatibleMerge.into());
        };
        self.cells = dedupe_last(self.cells.iter().chain(&other.cells).copied());

        let known: HashSet<(u16, u16)> = self.previous.iter().map(|c| (c.x(), c.y())).collect();
        self.previous.extend(
            other
                .previous
                .iter()
                .filter(|c| !known.contains(&(c.x(), c.y())))
                .copied(),
        );
        self.metadata.timestamp = other.metadata.timestamp;
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + (self.cells.len() + self.previous.len()) * std::mem::size_of::<CellSnapshot>()
    }

    fn details(&self) -> CommandDetails {
        let details = CommandDetails::of(self)
            .field("layer", self.layer_id)
            .field("cells", self.cells.len());
        match self.stroke {
            Some(stroke) => details.field("stroke", stroke),
            None => details,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "PaintCellsCmd"
    }
}
