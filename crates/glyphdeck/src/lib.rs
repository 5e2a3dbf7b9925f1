#![forbid(unsafe_code)]

//! Glyphdeck public facade crate.
//!
//! Re-exports the document model and the command engine, and offers an
//! [`Editor`] that owns one document together with its undo history.
//!
//! ```
//! use glyphdeck::prelude::*;
//!
//! let mut editor = Editor::new(EditorConfig::default())?;
//! let base = editor.document().layer_ids()[0];
//!
//! editor.paint(base, [CellSnapshot::new(2, 1, Cell::new('@'))])?;
//! editor.add_layer()?;
//! assert_eq!(editor.document().layer_count(), 2);
//!
//! editor.undo()?;
//! editor.undo()?;
//! assert!(editor.document().layer(base).unwrap().cell(2, 1).unwrap().is_blank());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod editor;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use editor::Editor;

// --- Document re-exports ---------------------------------------------------

pub use glyphdeck_doc::{
    Cell, CellSnapshot, ColorIndex, Cursor, DocError, Document, DocumentChange,
    DocumentSnapshot, Layer, LayerId, LayerSnapshot, MAX_DIMENSION, ResizeStrategy,
};

// --- History re-exports ----------------------------------------------------

pub use glyphdeck_history::commands::{
    AddLayerCmd, ClearCmd, ClearTarget, CommandBatch, LayerProps, PaintCellsCmd,
    RemoveLayerCmd, ReorderLayerCmd, ResizeDocumentCmd, SetLayerPropsCmd,
};
pub use glyphdeck_history::{
    Command, CommandDetails, CommandError, CommandHistory, CommandResult, ConfigError,
    DocumentDefaults, EditorConfig, ExecuteOutcome, HistoryConfig, HistoryEvent, HistoryStatus,
    MergeConfig, MisuseError, SubscriptionId, ValidationFailure, history_counters,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Cell, CellSnapshot, ClearTarget, ColorIndex, Command, CommandError, CommandHistory,
        Document, Editor, EditorConfig, ExecuteOutcome, HistoryEvent, LayerId, ResizeStrategy,
    };

    pub use crate::{doc, history};
}

pub use glyphdeck_doc as doc;
pub use glyphdeck_history as history;
