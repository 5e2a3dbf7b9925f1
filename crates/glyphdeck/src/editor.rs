#![forbid(unsafe_code)]

//! An editing session: one [`Document`] plus its [`CommandHistory`].

use glyphdeck_doc::{CellSnapshot, Document, DocumentChange, LayerId, ResizeStrategy};
use glyphdeck_history::commands::{
    AddLayerCmd, ClearCmd, ClearTarget, PaintCellsCmd, RemoveLayerCmd, ReorderLayerCmd,
    ResizeDocumentCmd, SetLayerPropsCmd,
};
use glyphdeck_history::{
    Command, CommandHistory, CommandResult, ConfigError, DocumentDefaults, EditorConfig,
    ExecuteOutcome, HistoryEvent, HistoryStatus, SubscriptionId,
};

/// Owns a document and routes every edit through the undo history.
///
/// Gestures group continuous input (a drag, a brush stroke) into one undo
/// step: between [`begin_gesture`](Self::begin_gesture) and
/// [`end_gesture`](Self::end_gesture), paints share a stroke id and
/// mergeable commands coalesce.
#[derive(Debug)]
pub struct Editor {
    document: Document,
    history: CommandHistory,
    defaults: DocumentDefaults,
    merging_enabled: bool,
    stroke: Option<u64>,
    next_stroke: u64,
}

impl Editor {
    /// Create an editor with a fresh single-layer document sized from
    /// `config.document`.
    pub fn new(config: EditorConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let DocumentDefaults {
            width,
            height,
            ref layer_name_prefix,
        } = config.document;
        let document = Document::with_layer(width, height, format!("{layer_name_prefix} 1"));
        Ok(Self::with_document(document, config))
    }

    /// Wrap an existing document.
    #[must_use]
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            merging_enabled: config.history.merging_enabled,
            history: CommandHistory::new(config.history),
            defaults: config.document,
            stroke: None,
            next_stroke: 1,
        }
    }

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Give up the document, dropping the history.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Execute any command through the history.
    pub fn execute(&mut self, cmd: impl Command + 'static) -> CommandResult<ExecuteOutcome> {
        self.history.execute(Box::new(cmd), &mut self.document)
    }

    /// Add a layer named from the configured prefix ("Layer 2", ...) above
    /// the active layer.
    pub fn add_layer(&mut self) -> CommandResult<ExecuteOutcome> {
        let name = format!(
            "{} {}",
            self.defaults.layer_name_prefix,
            self.document.next_layer_id()
        );
        self.add_layer_named(name)
    }

    /// Add a layer with an explicit name above the active layer.
    pub fn add_layer_named(&mut self, name: impl Into<String>) -> CommandResult<ExecuteOutcome> {
        self.execute(AddLayerCmd::new(name))
    }

    pub fn remove_layer(&mut self, id: LayerId) -> CommandResult<ExecuteOutcome> {
        self.execute(RemoveLayerCmd::new(id))
    }

    /// Move the layer at `from` to `to`. Inside a gesture, consecutive moves
    /// of the same layer merge into one step.
    pub fn move_layer(&mut self, from: usize, to: usize) -> CommandResult<ExecuteOutcome> {
        match ReorderLayerCmd::at(&self.document, from, to) {
            Ok(cmd) => self.execute(cmd),
            Err(failure) => Ok(ExecuteOutcome::Rejected(failure)),
        }
    }

    pub fn resize(
        &mut self,
        width: u16,
        height: u16,
        strategy: ResizeStrategy,
    ) -> CommandResult<ExecuteOutcome> {
        self.execute(ResizeDocumentCmd::new(width, height, strategy))
    }

    pub fn clear(&mut self, target: ClearTarget) -> CommandResult<ExecuteOutcome> {
        let cmd = match target {
            ClearTarget::Layer(id) => ClearCmd::layer(id),
            ClearTarget::All => ClearCmd::all(),
        };
        self.execute(cmd)
    }

    /// Paint cells on one layer. Inside a gesture the paint carries the
    /// gesture's stroke id.
    pub fn paint(
        &mut self,
        id: LayerId,
        cells: impl IntoIterator<Item = CellSnapshot>,
    ) -> CommandResult<ExecuteOutcome> {
        let mut cmd = PaintCellsCmd::new(id, cells);
        if let Some(stroke) = self.stroke {
            cmd = cmd.with_stroke(stroke);
        }
        self.execute(cmd)
    }

    pub fn rename_layer(
        &mut self,
        id: LayerId,
        name: impl Into<String>,
    ) -> CommandResult<ExecuteOutcome> {
        self.execute(SetLayerPropsCmd::rename(id, name))
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> CommandResult<ExecuteOutcome> {
        self.execute(SetLayerPropsCmd::set_visible(id, visible))
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> CommandResult<ExecuteOutcome> {
        self.execute(SetLayerPropsCmd::set_locked(id, locked))
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> CommandResult<bool> {
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> CommandResult<bool> {
        self.history.redo(&mut self.document)
    }

    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        self.history.status()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HistoryEvent) + Send + 'static,
    {
        self.history.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.history.unsubscribe(id)
    }

    /// Drain the document's change journal.
    pub fn take_changes(&mut self) -> Vec<DocumentChange> {
        self.document.take_changes()
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Start a gesture and return its stroke id.
    ///
    /// Nothing from before the call can absorb the gesture's commands.
    /// Merging is on for the gesture's duration even if the configuration
    /// turns it off.
    pub fn begin_gesture(&mut self) -> u64 {
        if self.stroke.is_some() {
            self.end_gesture();
        }
        let stroke = self.next_stroke;
        self.next_stroke += 1;
        self.history.set_merging_enabled(false);
        self.history.set_merging_enabled(true);
        self.stroke = Some(stroke);
        tracing::trace!(target: "glyphdeck.history", stroke, "gesture started");
        stroke
    }

    /// End the current gesture. The next command starts a new undo step.
    pub fn end_gesture(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        self.history.set_merging_enabled(false);
        self.history.set_merging_enabled(self.merging_enabled);
        tracing::trace!(target: "glyphdeck.history", stroke, "gesture ended");
    }

    /// Stroke id of the gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> Option<u64> {
        self.stroke
    }
}
