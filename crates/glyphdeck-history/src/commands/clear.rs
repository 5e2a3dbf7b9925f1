#![forbid(unsafe_code)]

//! Blank the cells of one layer or of every unlocked layer.

use std::any::Any;
use std::fmt;

use glyphdeck_doc::{Document, DocumentChange, LayerId, LayerSnapshot};

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandError, CommandResult, ValidationFailure};

/// What a [`ClearCmd`] blanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearTarget {
    /// A single layer. Rejected if locked.
    Layer(LayerId),
    /// Every layer; locked ones are skipped.
    All,
}

impl fmt::Display for ClearTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(id) => write!(f, "layer {id}"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Reset cells to blank, keeping the prior contents for undo.
#[derive(Debug)]
pub struct ClearCmd {
    metadata: CommandMetadata,
    target: ClearTarget,
    /// Prior contents of each cleared layer, in paint order.
    cleared: Vec<LayerSnapshot>,
    affected: usize,
}

impl ClearCmd {
    /// Clear one layer.
    #[must_use]
    pub fn layer(id: LayerId) -> Self {
        Self::with_target(ClearTarget::Layer(id), "Clear layer")
    }

    /// Clear every unlocked layer.
    #[must_use]
    pub fn all() -> Self {
        Self::with_target(ClearTarget::All, "Clear all layers")
    }

    fn with_target(target: ClearTarget, description: &str) -> Self {
        Self {
            metadata: CommandMetadata::new(description),
            target,
            cleared: Vec::new(),
            affected: 0,
        }
    }

    /// What this command clears.
    #[must_use]
    pub fn target(&self) -> ClearTarget {
        self.target
    }

    /// Number of cells that were non-blank before the most recent execute.
    #[must_use]
    pub fn affected_cell_count(&self) -> usize {
        self.affected
    }

    fn targets(&self, doc: &Document) -> Result<Vec<LayerId>, CommandError> {
        if self.metadata.is_fresh() {
            return Ok(match self.target {
                ClearTarget::Layer(id) => vec![id],
                ClearTarget::All => doc
                    .layers()
                    .iter()
                    .filter(|l| !l.is_locked())
                    .map(|l| l.id())
                    .collect(),
            });
        }
        let ids: Vec<LayerId> = self.cleared.iter().map(LayerSnapshot::id).collect();
        if let Some(missing) = ids.iter().find(|id| !doc.contains(**id)) {
            return Err(CommandError::drift(format!("layer {missing}"), "no such layer"));
        }
        Ok(ids)
    }
}

impl Command for ClearCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        }
        let ids = self.targets(doc)?;

        let mut cleared = Vec::with_capacity(ids.len());
        let mut affected = 0;
        for id in ids {
            let Some(layer) = doc.layer_mut(id) else {
                return Err(CommandError::drift(format!("layer {id}"), "no such layer"));
            };
            cleared.push(layer.snapshot());
            let count = layer.clear();
            affected += count;
            doc.record(DocumentChange::LayerCleared { id, count });
        }

        tracing::debug!(
            target: "glyphdeck.command",
            target_layers = %self.target,
            layers = cleared.len(),
            affected,
            "cells cleared"
        );
        self.cleared = cleared;
        self.affected = affected;
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        for snapshot in &self.cleared {
            match doc.layer(snapshot.id()) {
                Some(layer)
                    if (layer.width(), layer.height()) == (snapshot.width(), snapshot.height()) => {}
                Some(_) => {
                    return Err(CommandError::drift(
                        format!("{}x{} layer", snapshot.width(), snapshot.height()),
                        format!("{}x{}", doc.width(), doc.height()),
                    ));
                }
                None => {
                    return Err(CommandError::drift(
                        format!("layer {}", snapshot.id()),
                        "no such layer",
                    ));
                }
            }
        }
        for snapshot in &self.cleared {
            let id = snapshot.id();
            if let Some(layer) = doc.layer_mut(id) {
                layer.restore_cells(snapshot)?;
                let count = snapshot.non_blank_count();
                doc.record(DocumentChange::CellsChanged { id, count });
            }
        }
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        match self.target {
            ClearTarget::Layer(id) => match doc.layer(id) {
                None => Err(ValidationFailure::UnknownLayer(id)),
                Some(layer) if layer.is_locked() => Err(ValidationFailure::LayerLocked(id)),
                Some(_) => Ok(()),
            },
            ClearTarget::All => {
                if doc.layers().iter().all(|l| l.is_locked()) {
                    Err(ValidationFailure::NoChange("no unlocked layers to clear"))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.cleared.iter().map(LayerSnapshot::size_bytes).sum::<usize>()
    }

    fn details(&self) -> CommandDetails {
        CommandDetails::of(self)
            .field("target", self.target)
            .field("layers", self.cleared.len())
            .field("affected_cells", self.affected)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "ClearCmd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphdeck_doc::{Cell, ColorIndex};

    fn doc_with_art() -> Document {
        let mut doc = Document::with_layer(4, 3, "A");
        let b = doc.new_layer("B");
        doc.insert_layer(1, b).unwrap();
        let a = doc.layer_mut(LayerId::new(1)).unwrap();
        a.set_cell(0, 0, Cell::with_colors('x', ColorIndex::new(1), ColorIndex::new(2)))
            .unwrap();
        a.set_cell(3, 2, Cell::new('y')).unwrap();
        a.set_cell(1, 1, Cell::with_colors(' ', ColorIndex::new(7), ColorIndex::new(4)))
            .unwrap();
        doc.layer_mut(LayerId::new(2))
            .unwrap()
            .set_cell(2, 2, Cell::new('z'))
            .unwrap();
        doc
    }

    #[test]
    fn clear_layer_reports_and_restores() {
        let mut doc = doc_with_art();
        let before = doc.clone();
        let mut cmd = ClearCmd::layer(LayerId::new(1));
        cmd.execute(&mut doc).unwrap();
        // A space on a coloured background still counts as content.
        assert_eq!(cmd.affected_cell_count(), 3);
        assert_eq!(doc.layer(LayerId::new(1)).unwrap().non_blank_count(), 0);
        assert_eq!(doc.layer(LayerId::new(2)).unwrap().non_blank_count(), 1);

        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn clear_all_skips_locked() {
        let mut doc = doc_with_art();
        doc.layer_mut(LayerId::new(2)).unwrap().set_locked(true);
        let mut cmd = ClearCmd::all();
        cmd.execute(&mut doc).unwrap();
        assert_eq!(cmd.affected_cell_count(), 3);
        assert_eq!(doc.layer(LayerId::new(2)).unwrap().non_blank_count(), 1);
    }

    #[test]
    fn clear_all_then_undo_redo() {
        let mut doc = doc_with_art();
        let before = doc.clone();
        let mut cmd = ClearCmd::all();
        cmd.execute(&mut doc).unwrap();
        assert_eq!(cmd.affected_cell_count(), 4);
        let after = doc.clone();
        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
        cmd.redo(&mut doc).unwrap();
        assert_eq!(doc, after);
    }

    #[test]
    fn locked_layer_is_rejected() {
        let mut doc = doc_with_art();
        doc.layer_mut(LayerId::new(1)).unwrap().set_locked(true);
        let cmd = ClearCmd::layer(LayerId::new(1));
        assert_eq!(
            cmd.validate(&doc),
            Err(ValidationFailure::LayerLocked(LayerId::new(1)))
        );
    }

    #[test]
    fn journal_records_counts() {
        let mut doc = doc_with_art();
        doc.take_changes();
        let mut cmd = ClearCmd::layer(LayerId::new(1));
        cmd.execute(&mut doc).unwrap();
        assert_eq!(
            doc.take_changes(),
            [DocumentChange::LayerCleared {
                id: LayerId::new(1),
                count: 3
            }]
        );
    }
}
