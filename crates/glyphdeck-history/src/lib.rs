#![forbid(unsafe_code)]

//! Undoable command engine for Glyphdeck documents.
//!
//! - [`Command`]: the unit of undoable work (execute / undo / merge /
//!   validate).
//! - [`CommandHistory`]: undo and redo stacks, merging of continuous
//!   gestures, bounded eviction, and [`HistoryEvent`] notifications.
//! - [`commands`]: the concrete commands (add, remove, reorder, resize,
//!   clear, paint, layer properties, batch).
//!
//! The history owns commands, never the document: every call takes the
//! document by `&mut` and forwards it to the command.
//!
//! ```
//! use glyphdeck_doc::Document;
//! use glyphdeck_history::commands::AddLayerCmd;
//! use glyphdeck_history::{CommandHistory, ExecuteOutcome};
//!
//! let mut doc = Document::with_layer(16, 8, "Background");
//! let mut history = CommandHistory::default();
//!
//! let outcome = history.execute(Box::new(AddLayerCmd::new("Ink")), &mut doc)?;
//! assert_eq!(outcome, ExecuteOutcome::Executed);
//! assert_eq!(doc.layer_count(), 2);
//!
//! history.undo(&mut doc)?;
//! assert_eq!(doc.layer_count(), 1);
//! # Ok::<(), glyphdeck_history::CommandError>(())
//! ```
//!
//! # Tracing
//!
//! History operations log under the `glyphdeck.history` target; command
//! bodies run inside `command.execute` / `command.undo` spans under
//! `glyphdeck.command`.

pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod history;

pub use command::{Command, CommandDetails, CommandMetadata, CommandState, MergeConfig};
pub use config::{ConfigError, DocumentDefaults, EditorConfig};
pub use error::{CommandError, CommandResult, MisuseError, ValidationFailure};
pub use events::{EventBus, HistoryEvent, SubscriptionId};
pub use history::{
    CommandHistory, ExecuteOutcome, HistoryConfig, HistoryCounters, HistoryStatus,
    history_counters,
};
