#![forbid(unsafe_code)]

//! Several commands applied and reverted as one history entry.

use std::any::Any;
use std::fmt;

use glyphdeck_doc::Document;

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandResult, ValidationFailure};

/// A batch of commands that execute and undo together.
///
/// Only the first member is validated up front; later members validate
/// when they are reached. If a member fails, members already applied in the
/// same pass are rolled back before the member's error is returned. If the
/// rollback itself fails, the rollback error is returned instead, so a
/// validation failure always means the document is unchanged.
pub struct CommandBatch {
    /// Commands in execution order.
    commands: Vec<Box<dyn Command>>,
    metadata: CommandMetadata,
    /// Number of leading commands currently applied.
    executed_to: usize,
}

impl fmt::Debug for CommandBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBatch")
            .field("commands_count", &self.commands.len())
            .field("metadata", &self.metadata)
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl CommandBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            metadata: CommandMetadata::new(description),
            executed_to: 0,
        }
    }

    /// Append a command.
    pub fn push(&mut self, cmd: Box<dyn Command>) {
        self.commands.push(cmd);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, cmd: impl Command + 'static) -> Self {
        self.commands.push(Box::new(cmd));
        self
    }

    /// Number of commands in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Undo members `[0, upto)` in reverse. Every step is attempted; the
    /// first failure is returned.
    fn roll_back(&mut self, doc: &mut Document, upto: usize) -> CommandResult {
        let mut first_err = None;
        for cmd in self.commands[..upto].iter_mut().rev() {
            if let Err(err) = cmd.undo(doc) {
                tracing::warn!(
                    target: "glyphdeck.command",
                    kind = cmd.debug_name(),
                    error = %err,
                    "batch rollback step failed"
                );
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Command for CommandBatch {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        let fresh = self.metadata.is_fresh();
        if fresh {
            self.validate(doc)?;
        }
        for i in 0..self.commands.len() {
            let cmd = &mut self.commands[i];
            let result = if cmd.metadata().is_fresh() {
                cmd.execute(doc)
            } else {
                cmd.redo(doc)
            };
            if let Err(err) = result {
                // A failed rollback outranks the member's error: the
                // document is no longer as it was before the batch.
                let rolled_back = self.roll_back(doc, i);
                self.executed_to = 0;
                rolled_back?;
                return Err(err);
            }
            self.executed_to = i + 1;
        }
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        for i in (0..self.executed_to).rev() {
            if let Err(err) = self.commands[i].undo(doc) {
                // Re-apply what was already undone so the batch stays whole.
                for cmd in &mut self.commands[i + 1..self.executed_to] {
                    if let Err(redo_err) = cmd.redo(doc) {
                        tracing::warn!(
                            target: "glyphdeck.command",
                            kind = cmd.debug_name(),
                            error = %redo_err,
                            "batch re-apply step failed"
                        );
                    }
                }
                return Err(err);
            }
        }
        self.executed_to = 0;
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        match self.commands.first() {
            None => Err(ValidationFailure::NoChange("empty batch")),
            Some(first) => first.validate(doc),
        }
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.commands.iter().map(|c| c.size_bytes()).sum::<usize>()
    }

    fn details(&self) -> CommandDetails {
        let kinds: Vec<&str> = self.commands.iter().map(|c| c.debug_name()).collect();
        CommandDetails::of(self)
            .field("commands", self.commands.len())
            .field("kinds", kinds.join(","))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "CommandBatch"
    }
}
