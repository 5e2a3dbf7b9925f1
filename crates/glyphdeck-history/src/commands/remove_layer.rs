#![forbid(unsafe_code)]

//! Remove a layer, keeping a full value snapshot for undo.

use std::any::Any;

use glyphdeck_doc::{Cursor, Document, LayerId, LayerSnapshot};

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

#[derive(Debug, Clone)]
struct Removed {
    snapshot: LayerSnapshot,
    index: usize,
    was_active: bool,
    prev_cursor: Cursor,
}

/// Remove a layer by id.
///
/// Rejected when the layer is unknown or is the only layer. If the removed
/// layer was active, the layer that shifts into its index becomes active,
/// else the one below it.
#[derive(Debug)]
pub struct RemoveLayerCmd {
    metadata: CommandMetadata,
    layer_id: LayerId,
    removed: Option<Removed>,
}

impl RemoveLayerCmd {
    /// Remove layer `layer_id`.
    #[must_use]
    pub fn new(layer_id: LayerId) -> Self {
        Self {
            metadata: CommandMetadata::new("Remove layer"),
            layer_id,
            removed: None,
        }
    }

    /// Target layer.
    #[must_use]
    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    /// Snapshot of the removed layer, once executed.
    #[must_use]
    pub fn removed_layer(&self) -> Option<&LayerSnapshot> {
        self.removed.as_ref().map(|r| &r.snapshot)
    }

    /// Index the layer was removed from, once executed.
    #[must_use]
    pub fn removed_index(&self) -> Option<usize> {
        self.removed.as_ref().map(|r| r.index)
    }

    /// Whether the removed layer was the active one.
    #[must_use]
    pub fn was_active(&self) -> bool {
        self.removed.as_ref().is_some_and(|r| r.was_active)
    }

    fn check_redo(&self, doc: &Document) -> CommandResult {
        let Some(removed) = &self.removed else {
            return Ok(());
        };
        let id = self.layer_id;
        if doc.index_of(id) != Some(removed.index) || doc.layer_count() < 2 {
            return Err(CommandError::drift(
                format!("layer {id} at index {} of 2+ layers", removed.index),
                format!(
                    "index {:?} of {} layers",
                    doc.index_of(id),
                    doc.layer_count()
                ),
            ));
        }
        Ok(())
    }
}

/// Layer that takes over when the active layer at `index` disappears.
fn successor(doc: &Document, index: usize) -> Cursor {
    doc.layer_at(index)
        .or_else(|| index.checked_sub(1).and_then(|i| doc.layer_at(i)))
        .map_or(Cursor::NONE, |l| Cursor::at(l.id()))
}

impl Command for RemoveLayerCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        } else {
            self.check_redo(doc)?;
        }

        let id = self.layer_id;
        let prev_cursor = doc.cursor();
        let was_active = prev_cursor.is_on(id);
        let Some(snapshot) = doc.layer(id).map(|l| l.snapshot()) else {
            return Err(ValidationFailure::UnknownLayer(id).into());
        };
        let (index, _) = doc.remove_layer(id)?;
        if was_active {
            let next = successor(doc, index);
            doc.restore_cursor(next)?;
        }

        tracing::debug!(
            target: "glyphdeck.command",
            layer = %id,
            index,
            was_active,
            "layer removed"
        );
        self.removed = Some(Removed {
            snapshot,
            index,
            was_active,
            prev_cursor,
        });
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        let Some(removed) = &self.removed else {
            return Err(MisuseError::UndoBeforeExecute.into());
        };
        let id = self.layer_id;
        if doc.contains(id) {
            return Err(CommandError::drift(
                format!("layer {id} absent"),
                "layer present",
            ));
        }
        if removed.index > doc.layer_count() {
            return Err(CommandError::drift(
                format!("at least {} layers", removed.index),
                format!("{} layers", doc.layer_count()),
            ));
        }
        if let Some(prev) = removed.prev_cursor.layer_id()
            && prev != id
            && !doc.contains(prev)
        {
            return Err(CommandError::drift(
                format!("previously active layer {prev}"),
                "no such layer",
            ));
        }

        doc.insert_layer(removed.index, removed.snapshot.to_layer())?;
        doc.restore_cursor(removed.prev_cursor)?;
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        if !doc.contains(self.layer_id) {
            return Err(ValidationFailure::UnknownLayer(self.layer_id));
        }
        if doc.layer_count() <= 1 {
            return Err(ValidationFailure::LastLayer);
        }
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self
                .removed
                .as_ref()
                .map_or(0, |r| r.snapshot.size_bytes())
    }

    fn details(&self) -> CommandDetails {
        let details = CommandDetails::of(self).field("layer", self.layer_id);
        match &self.removed {
            Some(r) => details
                .field("index", r.index)
                .field("was_active", r.was_active)
                .field("cells", r.snapshot.non_blank_count()),
            None => details,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "RemoveLayerCmd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphdeck_doc::Cell;

    fn doc_abc() -> Document {
        let mut doc = Document::with_layer(3, 3, "A");
        for name in ["B", "C"] {
            let layer = doc.new_layer(name);
            let len = doc.layer_count();
            doc.insert_layer(len, layer).unwrap();
        }
        doc
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.layers().iter().map(|l| l.name()).collect()
    }

    #[test]
    fn removing_active_selects_shifted_layer() {
        let mut doc = doc_abc();
        let b = LayerId::new(2);
        doc.set_active(b).unwrap();
        doc.layer_mut(b).unwrap().set_cell(1, 1, Cell::new('b')).unwrap();
        let before = doc.clone();

        let mut cmd = RemoveLayerCmd::new(b);
        cmd.execute(&mut doc).unwrap();
        assert_eq!(names(&doc), ["A", "C"]);
        assert_eq!(doc.active_layer().unwrap().name(), "C");
        assert!(cmd.was_active());

        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
        assert_eq!(doc.active_layer_id(), Some(b));
    }

    #[test]
    fn removing_top_active_selects_previous() {
        let mut doc = doc_abc();
        let c = LayerId::new(3);
        doc.set_active(c).unwrap();
        let mut cmd = RemoveLayerCmd::new(c);
        cmd.execute(&mut doc).unwrap();
        assert_eq!(doc.active_layer().unwrap().name(), "B");
    }

    #[test]
    fn removing_inactive_keeps_cursor() {
        let mut doc = doc_abc();
        let mut cmd = RemoveLayerCmd::new(LayerId::new(3));
        cmd.execute(&mut doc).unwrap();
        assert_eq!(doc.active_layer().unwrap().name(), "A");
        assert!(!cmd.was_active());
    }

    #[test]
    fn last_layer_is_rejected() {
        let mut doc = Document::with_layer(3, 3, "only");
        let before = doc.clone();
        let mut cmd = RemoveLayerCmd::new(LayerId::new(1));
        assert_eq!(cmd.validate(&doc), Err(ValidationFailure::LastLayer));
        assert_eq!(
            cmd.execute(&mut doc),
            Err(CommandError::Validation(ValidationFailure::LastLayer))
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn unknown_layer_is_rejected() {
        let doc = doc_abc();
        let cmd = RemoveLayerCmd::new(LayerId::new(42));
        assert_eq!(
            cmd.validate(&doc),
            Err(ValidationFailure::UnknownLayer(LayerId::new(42)))
        );
    }

    #[test]
    fn redo_reproduces_post_state() {
        let mut doc = doc_abc();
        let mut cmd = RemoveLayerCmd::new(LayerId::new(1));
        cmd.execute(&mut doc).unwrap();
        let after = doc.clone();
        cmd.undo(&mut doc).unwrap();
        cmd.redo(&mut doc).unwrap();
        assert_eq!(doc, after);
    }

    #[test]
    fn undo_reports_drift_when_id_reappeared() {
        let mut doc = doc_abc();
        let mut cmd = RemoveLayerCmd::new(LayerId::new(3));
        cmd.execute(&mut doc).unwrap();
        let snapshot = cmd.removed_layer().unwrap().clone();
        doc.insert_layer(0, snapshot.to_layer()).unwrap();
        let err = cmd.undo(&mut doc).unwrap_err();
        assert!(err.is_drift());
        assert!(cmd.is_executed());
    }
}
