#![forbid(unsafe_code)]

//! The command contract.
//!
//! A [`Command`] is one undoable unit of document mutation. It is built by a
//! caller with enough parameters to apply itself, captures whatever inverse
//! state it needs the first time it executes, and afterwards cycles between
//! executed and undone:
//!
//! ```text
//! Constructed --execute--> Executed --undo--> Undone --redo--> Executed ...
//! ```
//!
//! # Invariants
//!
//! - `undo` right after `execute` restores the document bit-for-bit.
//! - `redo` right after `undo` reproduces the post-execute document
//!   bit-for-bit, reusing every identity minted by the first execute.
//! - `merge` is only called when `can_merge` holds for the same pair.
//! - `size_bytes` covers the captured snapshots, so the history can budget
//!   memory.
//!
//! # Failure Modes
//!
//! - **Precondition**: reported by `validate` (and by the first `execute`)
//!   as a [`ValidationFailure`]; nothing is mutated.
//! - **Misuse**: `undo` before `execute`, double execute, or an incompatible
//!   `merge` is a [`MisuseError`].
//! - **Drift**: a later `undo`/`redo` that cannot find the entity it
//!   recorded returns [`CommandError::StructuralDrift`] without mutating.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use glyphdeck_doc::Document;
use web_time::Instant;

use crate::error::{CommandResult, MisuseError, ValidationFailure};

/// Lifecycle state of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandState {
    /// Built but never executed.
    #[default]
    Constructed,
    /// Forward effect applied.
    Executed,
    /// Forward effect reverted.
    Undone,
}

impl CommandState {
    /// Lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Executed => "executed",
            Self::Undone => "undone",
        }
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared by every command: label, creation time, lifecycle.
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Human-readable description for UI (e.g., "Add layer").
    pub description: String,
    /// When the command was created.
    pub timestamp: Instant,
    state: CommandState,
}

impl CommandMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            timestamp: Instant::now(),
            state: CommandState::Constructed,
        }
    }

    /// Override the creation time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Whether the forward effect is currently applied.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.state == CommandState::Executed
    }

    /// Whether the command has never been executed.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.state == CommandState::Constructed
    }

    /// Time since creation.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }

    /// Fails unless the command may execute now.
    pub fn check_execute(&self) -> Result<(), MisuseError> {
        match self.state {
            CommandState::Executed => Err(MisuseError::AlreadyExecuted),
            CommandState::Constructed | CommandState::Undone => Ok(()),
        }
    }

    /// Fails unless the command may undo now.
    pub fn check_undo(&self) -> Result<(), MisuseError> {
        match self.state {
            CommandState::Executed => Ok(()),
            CommandState::Constructed => Err(MisuseError::UndoBeforeExecute),
            CommandState::Undone => Err(MisuseError::AlreadyUndone),
        }
    }

    /// Record a successful execute or redo.
    pub fn mark_executed(&mut self) {
        self.state = CommandState::Executed;
    }

    /// Record a successful undo.
    pub fn mark_undone(&mut self) {
        self.state = CommandState::Undone;
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.description.len()
    }
}

impl Default for CommandMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Configuration for command merging behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct MergeConfig {
    /// Maximum time between two commands for them to coalesce (milliseconds).
    pub window_ms: u64,
    /// Maximum number of cells a merged paint command may hold.
    pub max_merged_cells: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            window_ms: 2000,
            max_merged_cells: 4096,
        }
    }
}

impl MergeConfig {
    /// The merge window as a duration.
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Whether `later` was created within the window after `earlier`.
    ///
    /// A `later` that precedes `earlier` counts as zero elapsed time.
    #[must_use]
    pub fn within_window(&self, earlier: Instant, later: Instant) -> bool {
        later.saturating_duration_since(earlier) <= self.window()
    }
}

/// Structured debug/UI description of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDetails {
    /// Concrete command kind (e.g. `"RemoveLayerCmd"`).
    pub kind: &'static str,
    /// Human-readable description.
    pub description: String,
    /// Lifecycle state at capture time.
    pub state: CommandState,
    /// Age at capture time.
    pub age: Duration,
    /// Memory accounted to the command.
    pub size_bytes: usize,
    /// Kind-specific fields in display order.
    pub fields: Vec<(&'static str, String)>,
}

impl CommandDetails {
    /// Base details for `cmd`.
    #[must_use]
    pub fn of<C: Command + ?Sized>(cmd: &C) -> Self {
        let meta = cmd.metadata();
        Self {
            kind: cmd.debug_name(),
            description: meta.description.clone(),
            state: meta.state(),
            age: meta.age(),
            size_bytes: cmd.size_bytes(),
            fields: Vec::new(),
        }
    }

    /// Append a kind-specific field.
    #[must_use]
    pub fn field(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for CommandDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" [{}]", self.kind, self.description, self.state)?;
        for (name, value) in &self.fields {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

/// A reversible document mutation.
///
/// Commands receive the document on every call; they never hold a reference
/// to it between calls.
pub trait Command: Send + Sync {
    /// Apply the forward effect.
    ///
    /// The first call validates and captures inverse state. Later calls
    /// (redo) reproduce the identical effect from the captured state.
    fn execute(&mut self, doc: &mut Document) -> CommandResult;

    /// Revert the most recent `execute`.
    fn undo(&mut self, doc: &mut Document) -> CommandResult;

    /// Re-apply after `undo`.
    fn redo(&mut self, doc: &mut Document) -> CommandResult {
        self.execute(doc)
    }

    /// Check preconditions against `doc` without mutating it.
    fn validate(&self, _doc: &Document) -> Result<(), ValidationFailure> {
        Ok(())
    }

    /// Whether `other` (executed right after `self`) can be folded into
    /// `self`. Pure.
    fn can_merge(&self, _other: &dyn Command, _config: &MergeConfig) -> bool {
        false
    }

    /// Absorb `other`'s effect. Only valid when `can_merge` holds; the
    /// compatibility is not re-checked.
    fn merge(&mut self, _other: &dyn Command) -> CommandResult {
        Err(MisuseError::IncompatibleMerge.into())
    }

    /// Shared metadata.
    fn metadata(&self) -> &CommandMetadata;

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Whether the forward effect is currently applied.
    fn is_executed(&self) -> bool {
        self.metadata().is_executed()
    }

    /// Size of this command in bytes for memory budgeting.
    fn size_bytes(&self) -> usize;

    /// Structured debug/UI information.
    fn details(&self) -> CommandDetails {
        CommandDetails::of(self)
    }

    /// Downcast to concrete type for merging.
    fn as_any(&self) -> &dyn Any;

    /// Concrete type name.
    fn debug_name(&self) -> &'static str {
        "Command"
    }
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .field("state", &self.metadata().state())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

impl fmt::Display for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.debug_name(), self.description())
    }
}

/// Run `cmd.execute` (or `cmd.redo`) inside a `command.execute` span.
pub(crate) fn traced_execute(
    cmd: &mut dyn Command,
    doc: &mut Document,
    redo: bool,
) -> CommandResult {
    let _span = tracing::debug_span!(
        target: "glyphdeck.command",
        "command.execute",
        kind = cmd.debug_name(),
        description = %cmd.description(),
        redo,
    )
    .entered();
    if redo { cmd.redo(doc) } else { cmd.execute(doc) }
}

/// Run `cmd.undo` inside a `command.undo` span.
pub(crate) fn traced_undo(cmd: &mut dyn Command, doc: &mut Document) -> CommandResult {
    let _span = tracing::debug_span!(
        target: "glyphdeck.command",
        "command.undo",
        kind = cmd.debug_name(),
        description = %cmd.description(),
    )
    .entered();
    cmd.undo(doc)
}
