#![forbid(unsafe_code)]

//! Move one layer to another index (shift semantics).

use std::any::Any;

use glyphdeck_doc::{Document, LayerId};
use web_time::Instant;

use crate::command::{Command, CommandDetails, CommandMetadata, MergeConfig};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

/// Move layer `layer_id` from index `from` to index `to`.
///
/// Layers between the two indices shift by one. Consecutive moves of the
/// same layer, where each starts where the previous ended, merge into a
/// single move from the first `from` to the last `to`.
#[derive(Debug)]
pub struct ReorderLayerCmd {
    metadata: CommandMetadata,
    layer_id: LayerId,
    from: usize,
    to: usize,
}

impl ReorderLayerCmd {
    /// Move `layer_id`, expected at `from`, to `to`.
    #[must_use]
    pub fn new(layer_id: LayerId, from: usize, to: usize) -> Self {
        Self {
            metadata: CommandMetadata::new("Move layer"),
            layer_id,
            from,
            to,
        }
    }

    /// Build a move of whatever layer currently sits at `from`, failing
    /// fast on bad indices.
    pub fn at(doc: &Document, from: usize, to: usize) -> Result<Self, ValidationFailure> {
        let len = doc.layer_count();
        let Some(layer) = doc.layer_at(from) else {
            return Err(ValidationFailure::IndexOutOfRange { index: from, len });
        };
        let cmd = Self::new(layer.id(), from, to);
        cmd.validate(doc)?;
        Ok(cmd)
    }

    /// Override the creation time used by the merge window.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Instant) -> Self {
        self.metadata = self.metadata.with_timestamp(timestamp);
        self
    }

    /// Layer being moved.
    #[must_use]
    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    /// Source index.
    #[must_use]
    pub fn from(&self) -> usize {
        self.from
    }

    /// Destination index.
    #[must_use]
    pub fn to(&self) -> usize {
        self.to
    }

    fn expect_at(&self, doc: &Document, index: usize) -> CommandResult {
        let found = doc.layer_at(index).map(|l| l.id());
        if found == Some(self.layer_id) {
            return Ok(());
        }
        tracing::warn!(
            target: "glyphdeck.command",
            layer = %self.layer_id,
            index,
            "layer not where the move recorded it"
        );
        Err(CommandError::drift(
            format!("layer {} at index {index}", self.layer_id),
            found.map_or_else(|| "no layer".to_string(), |id| format!("layer {id}")),
        ))
    }
}

impl Command for ReorderLayerCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        } else {
            self.expect_at(doc, self.from)?;
        }
        if self.to >= doc.layer_count() {
            return Err(ValidationFailure::IndexOutOfRange {
                index: self.to,
                len: doc.layer_count(),
            }
            .into());
        }
        doc.move_layer(self.from, self.to)?;
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        self.expect_at(doc, self.to)?;
        if self.from >= doc.layer_count() {
            return Err(CommandError::drift(
                format!("index {} in range", self.from),
                format!("{} layers", doc.layer_count()),
            ));
        }
        doc.move_layer(self.to, self.from)?;
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        let len = doc.layer_count();
        for index in [self.from, self.to] {
            if index >= len {
                return Err(ValidationFailure::IndexOutOfRange { index, len });
            }
        }
        if self.from == self.to {
            return Err(ValidationFailure::NoOpMove { index: self.from });
        }
        if doc.layer_at(self.from).map(|l| l.id()) != Some(self.layer_id) {
            return Err(ValidationFailure::StalePosition {
                id: self.layer_id,
                index: self.from,
            });
        }
        Ok(())
    }

    fn can_merge(&self, other: &dyn Command, config: &MergeConfig) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.layer_id == other.layer_id
            && other.from == self.to
            && config.within_window(self.metadata.timestamp, other.metadata.timestamp)
    }

    fn merge(&mut self, other: &dyn Command) -> CommandResult {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return Err(MisuseError::IncompatibleMerge.into());
        };
        self.to = other.to;
        // The window slides with the gesture.
        self.metadata.timestamp = other.metadata.timestamp;
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.metadata.size_bytes()
    }

    fn details(&self) -> CommandDetails {
        CommandDetails::of(self)
            .field("layer", self.layer_id)
            .field("from", self.from)
            .field("to", self.to)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "ReorderLayerCmd"
    }
}
