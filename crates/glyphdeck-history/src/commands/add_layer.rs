#![forbid(unsafe_code)]

//! Insert a new blank layer and make it active.

use std::any::Any;

use glyphdeck_doc::{Cursor, Document, Layer, LayerId};

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

/// Add a blank layer at a given index, or directly above the active layer.
///
/// The first execute mints the layer id; redo reuses it. If a layer with
/// that id is already present on redo, the command only re-selects it.
#[derive(Debug)]
pub struct AddLayerCmd {
    metadata: CommandMetadata,
    name: String,
    position: Option<usize>,
    /// Id minted by the first execute.
    layer_id: Option<LayerId>,
    /// Index the layer was inserted at.
    index: usize,
    prev_cursor: Cursor,
    /// Allocator value before minting.
    prev_next_id: u64,
}

impl AddLayerCmd {
    /// Add a layer named `name` above the active layer (or on top).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: CommandMetadata::new("Add layer"),
            name: name.into(),
            position: None,
            layer_id: None,
            index: 0,
            prev_cursor: Cursor::NONE,
            prev_next_id: 0,
        }
    }

    /// Insert at paint-order `index` instead of above the active layer.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.position = Some(index);
        self
    }

    /// Id of the added layer, once executed.
    #[must_use]
    pub fn layer_id(&self) -> Option<LayerId> {
        self.layer_id
    }

    /// Name given to the new layer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn target_index(&self, doc: &Document) -> usize {
        self.position
            .unwrap_or_else(|| doc.active_index().map_or(doc.layer_count(), |i| i + 1))
    }

    fn first_execute(&mut self, doc: &mut Document) -> CommandResult {
        self.validate(doc)?;
        let index = self.target_index(doc);
        let prev_cursor = doc.cursor();
        let prev_next_id = doc.next_layer_id();

        let layer = doc.new_layer(self.name.clone());
        let id = layer.id();
        if let Err(err) = doc.insert_layer(index, layer) {
            doc.rewind_layer_ids(prev_next_id);
            return Err(err.into());
        }
        doc.set_active(id)?;

        self.layer_id = Some(id);
        self.index = index;
        self.prev_cursor = prev_cursor;
        self.prev_next_id = prev_next_id;
        Ok(())
    }

    fn reapply(&self, doc: &mut Document, id: LayerId) -> CommandResult {
        if doc.contains(id) {
            doc.set_active(id)?;
            return Ok(());
        }
        if self.index > doc.layer_count() {
            return Err(CommandError::drift(
                format!("room for layer {id} at index {}", self.index),
                format!("{} layers", doc.layer_count()),
            ));
        }
        let layer = Layer::new(id, self.name.clone(), doc.width(), doc.height());
        doc.insert_layer(self.index, layer)?;
        doc.set_active(id)?;
        Ok(())
    }
}

impl Command for AddLayerCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        match self.layer_id {
            None => self.first_execute(doc)?,
            Some(id) => self.reapply(doc, id)?,
        }
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        let Some(id) = self.layer_id else {
            return Err(MisuseError::UndoBeforeExecute.into());
        };
        if !doc.contains(id) {
            return Err(CommandError::drift(format!("layer {id}"), "no such layer"));
        }

        doc.remove_layer(id)?;
        let cursor = match self.prev_cursor.layer_id() {
            Some(prev) if doc.contains(prev) => Cursor::at(prev),
            _ => doc.layer_at(0).map_or(Cursor::NONE, |l| Cursor::at(l.id())),
        };
        doc.restore_cursor(cursor)?;
        if doc.next_layer_id() == id.raw() + 1 {
            doc.rewind_layer_ids(self.prev_next_id);
        }

        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        match self.position {
            Some(index) if index > doc.layer_count() => Err(ValidationFailure::IndexOutOfRange {
                index,
                len: doc.layer_count(),
            }),
            _ => Ok(()),
        }
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes() + self.name.len()
    }

    fn details(&self) -> CommandDetails {
        let details = CommandDetails::of(self).field("name", &self.name);
        match self.layer_id {
            Some(id) => details.field("layer", id).field("index", self.index),
            None => details,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "AddLayerCmd"
    }
}
