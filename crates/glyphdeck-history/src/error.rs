#![forbid(unsafe_code)]

//! Error taxonomy for commands and the history engine.
//!
//! | kind | meaning | surfaced as |
//! |------|---------|-------------|
//! | [`ValidationFailure`] | a precondition is false | `Ok(ExecuteOutcome::Rejected)` from the history |
//! | [`MisuseError`] | the caller broke the command protocol | `Err(CommandError::Misuse)` |
//! | drift | the entity a command recorded is gone or moved | `Err(CommandError::StructuralDrift)` |

use glyphdeck_doc::{DocError, LayerId};

/// A precondition that does not hold. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Removing the only remaining layer.
    #[error("cannot remove the last layer")]
    LastLayer,
    /// The target layer does not exist.
    #[error("layer {0} not found")]
    UnknownLayer(LayerId),
    /// Index outside the layer list.
    #[error("index {index} out of range (layer count {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// The layer at `index` is not the one the command was built for.
    #[error("layer {id} is not at index {index}")]
    StalePosition { id: LayerId, index: usize },
    /// Moving a layer onto its own index.
    #[error("layer is already at index {index}")]
    NoOpMove { index: usize },
    /// Editing a locked layer.
    #[error("layer {0} is locked")]
    LayerLocked(LayerId),
    /// Zero or oversized target size.
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: u16, height: u16 },
    /// Resize to the current size.
    #[error("document is already {width}x{height}")]
    SizeUnchanged { width: u16, height: u16 },
    /// Pad keeps every cell and therefore cannot shrink either axis.
    #[error("pad resize cannot shrink {from_width}x{from_height} to {width}x{height}")]
    PadCannotShrink {
        from_width: u16,
        from_height: u16,
        width: u16,
        height: u16,
    },
    /// Cell coordinate outside the document.
    #[error("cell ({x}, {y}) out of bounds")]
    CellOutOfBounds { x: u16, y: u16 },
    /// The command would not change anything.
    #[error("nothing to do: {0}")]
    NoChange(&'static str),
}

/// Protocol violations by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MisuseError {
    /// `undo` on a command that was never executed.
    #[error("undo called before execute")]
    UndoBeforeExecute,
    /// `undo` on a command that is already undone.
    #[error("command is already undone")]
    AlreadyUndone,
    /// `execute` on a command that is currently applied.
    #[error("command is already executed")]
    AlreadyExecuted,
    /// `merge` with a command that `can_merge` would refuse.
    #[error("merge called with an incompatible command")]
    IncompatibleMerge,
}

/// Errors from command execution, undo, redo, or merge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// A precondition failed before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    /// The command protocol was violated.
    #[error(transparent)]
    Misuse(#[from] MisuseError),
    /// The document no longer matches what the command recorded.
    #[error("structural drift: expected {expected}, found {found}")]
    StructuralDrift { expected: String, found: String },
    /// A low-level document mutator refused the change.
    #[error("document error: {0}")]
    Document(#[from] DocError),
}

impl CommandError {
    /// Build a [`CommandError::StructuralDrift`].
    pub fn drift(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::StructuralDrift {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Whether this is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this is structural drift.
    #[must_use]
    pub fn is_drift(&self) -> bool {
        matches!(self, Self::StructuralDrift { .. })
    }
}

/// Result of a command operation.
pub type CommandResult<T = ()> = Result<T, CommandError>;
