#![forbid(unsafe_code)]

//! Document: an ordered stack of equally sized layers plus the active-layer
//! cursor.
//!
//! # Invariants
//!
//! 1. Every layer has the document's width and height.
//! 2. Layer ids are unique, and all are below the id allocator's next value.
//! 3. If `layers` is non-empty the cursor references one of them; if it is
//!    empty the cursor is [`Cursor::NONE`].
//!
//! Low-level mutators enforce (1) and (2) on every call. The cursor is
//! deliberately left alone by [`Document::remove_layer`] so a command can
//! choose the successor; [`Document::check_invariants`] validates all three
//! in one place.

use crate::cell::Cell;
use crate::change::DocumentChange;
use crate::cursor::Cursor;
use crate::error::DocError;
use crate::layer::{Layer, LayerId};
use crate::resize::ResizeStrategy;
use crate::snapshot::DocumentSnapshot;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u16 = 4096;

/// A layered character-grid document.
///
/// Layer order is paint order: index 0 is painted first (bottom).
#[derive(Debug, Clone)]
pub struct Document {
    width: u16,
    height: u16,
    layers: Vec<Layer>,
    cursor: Cursor,
    next_layer_id: u64,
    changes: Vec<DocumentChange>,
}

impl PartialEq for Document {
    // The change journal is a side channel and does not take part.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.layers == other.layers
            && self.cursor == other.cursor
            && self.next_layer_id == other.next_layer_id
    }
}

impl Eq for Document {}

impl Document {
    /// Create an empty document (no layers, no cursor).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            cursor: Cursor::NONE,
            next_layer_id: 1,
            changes: Vec::new(),
        }
    }

    /// Create a document with a single active layer named `name`.
    #[must_use]
    pub fn with_layer(width: u16, height: u16, name: impl Into<String>) -> Self {
        let mut doc = Self::new(width, height);
        let layer = doc.new_layer(name);
        let id = layer.id();
        doc.layers.push(layer);
        doc.cursor = Cursor::at(id);
        doc
    }

    /// Check that `width x height` is an acceptable document size.
    pub fn check_size(width: u16, height: u16) -> Result<(), DocError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DocError::InvalidSize { width, height });
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Width in columns.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Layers in paint order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether the document has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer ids in paint order.
    #[must_use]
    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(Layer::id).collect()
    }

    /// Find a layer by id.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Find a layer by id for direct mutation.
    ///
    /// Direct cell edits bypass the journal; callers report them with
    /// [`Document::record`].
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    /// Layer at paint-order `index`.
    #[must_use]
    pub fn layer_at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Paint-order index of layer `id`.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    /// Whether a layer with `id` is present.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// The active-layer cursor.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Id of the active layer.
    #[must_use]
    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.cursor.layer_id()
    }

    /// The active layer.
    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.cursor.layer_id().and_then(|id| self.layer(id))
    }

    /// Paint-order index of the active layer.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.cursor.layer_id().and_then(|id| self.index_of(id))
    }

    /// Make `id` the active layer. Returns the previous cursor.
    pub fn set_active(&mut self, id: LayerId) -> Result<Cursor, DocError> {
        self.restore_cursor(Cursor::at(id))
    }

    /// Move the cursor to `cursor`, validating it against the current layers.
    ///
    /// An empty cursor is only accepted when the document has no layers.
    /// Returns the previous cursor.
    pub fn restore_cursor(&mut self, cursor: Cursor) -> Result<Cursor, DocError> {
        self.validate_cursor(cursor)?;
        let previous = self.cursor;
        if previous != cursor {
            self.cursor = cursor;
            self.record(DocumentChange::ActiveLayerChanged {
                from: previous,
                to: cursor,
            });
        }
        Ok(previous)
    }

    fn validate_cursor(&self, cursor: Cursor) -> Result<(), DocError> {
        match cursor.layer_id() {
            Some(id) if !self.contains(id) => {
                Err(DocError::CursorInvalid(format!("layer {id} is not present")))
            }
            None if !self.layers.is_empty() => Err(DocError::CursorInvalid(
                "no active layer while layers exist".to_string(),
            )),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Layer ids
    // ========================================================================

    /// Allocate a fresh layer id.
    pub fn mint_layer_id(&mut self) -> LayerId {
        let id = LayerId::new(self.next_layer_id);
        self.next_layer_id = self.next_layer_id.saturating_add(1);
        id
    }

    /// Raw value the next minted id will have.
    #[must_use]
    pub fn next_layer_id(&self) -> u64 {
        self.next_layer_id
    }

    /// Wind the id allocator back to `next`.
    ///
    /// Refused (returns `false`) if `next` would move forward or would make
    /// a present layer's id reachable again.
    pub fn rewind_layer_ids(&mut self, next: u64) -> bool {
        if next > self.next_layer_id || self.layers.iter().any(|l| l.id().raw() >= next) {
            return false;
        }
        self.next_layer_id = next;
        true
    }

    /// Build a blank layer of document size with a freshly minted id.
    /// The layer is not inserted.
    pub fn new_layer(&mut self, name: impl Into<String>) -> Layer {
        let id = self.mint_layer_id();
        Layer::new(id, name, self.width, self.height)
    }

    // ========================================================================
    // Structural mutators
    // ========================================================================

    /// Insert `layer` at paint-order `index` (`index == len` appends).
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<(), DocError> {
        if index > self.layers.len() {
            return Err(DocError::IndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        if self.contains(layer.id()) {
            return Err(DocError::DuplicateLayer(layer.id()));
        }
        if (layer.width(), layer.height()) != self.size() {
            return Err(DocError::SizeMismatch {
                width: self.width,
                height: self.height,
                found_width: layer.width(),
                found_height: layer.height(),
            });
        }
        let id = layer.id();
        let Some(after) = id.raw().checked_add(1) else {
            return Err(DocError::IdSpaceExhausted(id));
        };
        self.next_layer_id = self.next_layer_id.max(after);
        self.layers.insert(index, layer);
        self.record(DocumentChange::LayerInserted { id, index });
        Ok(())
    }

    /// Remove layer `id`, returning its former index and the layer itself.
    ///
    /// The cursor is not adjusted.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<(usize, Layer), DocError> {
        let index = self.index_of(id).ok_or(DocError::UnknownLayer(id))?;
        let layer = self.layers.remove(index);
        self.record(DocumentChange::LayerRemoved { id, index });
        Ok((index, layer))
    }

    /// Move the layer at `from` to `to`, shifting everything in between by
    /// one. Returns the id of the moved layer.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<LayerId, DocError> {
        let len = self.layers.len();
        for index in [from, to] {
            if index >= len {
                return Err(DocError::IndexOutOfRange { index, len });
            }
        }
        let layer = self.layers.remove(from);
        let id = layer.id();
        self.layers.insert(to, layer);
        if from != to {
            self.record(DocumentChange::LayerMoved { id, from, to });
        }
        Ok(id)
    }

    /// Resize the document and every layer.
    pub fn resize(
        &mut self,
        width: u16,
        height: u16,
        strategy: ResizeStrategy,
        fill: Cell,
    ) -> Result<(), DocError> {
        Self::check_size(width, height)?;
        let from = self.size();
        for layer in &mut self.layers {
            layer.resize(width, height, strategy, fill);
        }
        self.width = width;
        self.height = height;
        self.record(DocumentChange::Resized {
            from,
            to: (width, height),
        });
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Deep snapshot of size, every layer, and the cursor.
    ///
    /// Cost is proportional to the total cell count.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            width: self.width,
            height: self.height,
            layers: self.layers.iter().map(Layer::snapshot).collect(),
            cursor: self.cursor,
        }
    }

    /// Replace size, layers, and cursor with the captured values.
    ///
    /// The id allocator never moves backwards here.
    pub fn restore(&mut self, snapshot: &DocumentSnapshot) {
        let from = self.size();
        self.width = snapshot.width;
        self.height = snapshot.height;
        self.layers = snapshot.layers.iter().map(Layer::from).collect();
        let max_id = self
            .layers
            .iter()
            .map(|l| l.id().raw().saturating_add(1))
            .max()
            .unwrap_or(1);
        self.next_layer_id = self.next_layer_id.max(max_id);
        let previous = self.cursor;
        self.cursor = snapshot.cursor;
        self.record(DocumentChange::Restored);
        if from != self.size() {
            self.record(DocumentChange::Resized {
                from,
                to: self.size(),
            });
        }
        if previous != self.cursor {
            self.record(DocumentChange::ActiveLayerChanged {
                from: previous,
                to: self.cursor,
            });
        }
    }

    /// Validate every document invariant.
    pub fn check_invariants(&self) -> Result<(), DocError> {
        for (i, layer) in self.layers.iter().enumerate() {
            if (layer.width(), layer.height()) != self.size() {
                return Err(DocError::SizeMismatch {
                    width: self.width,
                    height: self.height,
                    found_width: layer.width(),
                    found_height: layer.height(),
                });
            }
            if self.layers[..i].iter().any(|other| other.id() == layer.id()) {
                return Err(DocError::DuplicateLayer(layer.id()));
            }
            if layer.id().raw() >= self.next_layer_id {
                return Err(DocError::DuplicateLayer(layer.id()));
            }
        }
        self.validate_cursor(self.cursor)
    }

    // ========================================================================
    // Change journal
    // ========================================================================

    /// Append a change to the journal.
    pub fn record(&mut self, change: DocumentChange) {
        self.changes.push(change);
    }

    /// Pending journal entries, oldest first.
    #[must_use]
    pub fn changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    /// Drain the journal.
    pub fn take_changes(&mut self) -> Vec<DocumentChange> {
        std::mem::take(&mut self.changes)
    }

    /// Approximate footprint in bytes (excluding the journal).
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.layers.iter().map(Layer::size_bytes).sum::<usize>()
    }
}
