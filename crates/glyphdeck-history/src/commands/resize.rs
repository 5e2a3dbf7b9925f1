#![forbid(unsafe_code)]

//! Resize the whole document under a [`ResizeStrategy`].
//!
//! Crop and center can discard content, so undo never tries to invert the
//! strategy: it restores a full [`DocumentSnapshot`] taken before the change.

use std::any::Any;

use glyphdeck_doc::{Cell, Document, DocumentSnapshot, ResizeStrategy};

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

/// Change the document width and height.
#[derive(Debug)]
pub struct ResizeDocumentCmd {
    metadata: CommandMetadata,
    width: u16,
    height: u16,
    strategy: ResizeStrategy,
    fill: Cell,
    before: Option<DocumentSnapshot>,
}

impl ResizeDocumentCmd {
    /// Resize to `width x height` using `strategy`, filling new area with
    /// blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16, strategy: ResizeStrategy) -> Self {
        Self {
            metadata: CommandMetadata::new(format!("Resize to {width}x{height}")),
            width,
            height,
            strategy,
            fill: Cell::BLANK,
            before: None,
        }
    }

    /// Use `fill` for newly exposed cells.
    #[must_use]
    pub fn with_fill(mut self, fill: Cell) -> Self {
        self.fill = fill;
        self
    }

    /// Target size.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Placement strategy.
    #[must_use]
    pub fn strategy(&self) -> ResizeStrategy {
        self.strategy
    }

    /// Snapshot taken before the most recent execute.
    #[must_use]
    pub fn before(&self) -> Option<&DocumentSnapshot> {
        self.before.as_ref()
    }
}

impl Command for ResizeDocumentCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        } else if let Some(before) = &self.before
            && doc.size() != (before.width(), before.height())
        {
            return Err(CommandError::drift(
                format!("{}x{} document", before.width(), before.height()),
                format!("{}x{}", doc.width(), doc.height()),
            ));
        }

        let before = doc.snapshot();
        doc.resize(self.width, self.height, self.strategy, self.fill)?;
        tracing::debug!(
            target: "glyphdeck.command",
            from_width = before.width(),
            from_height = before.height(),
            width = self.width,
            height = self.height,
            strategy = self.strategy.as_str(),
            snapshot_bytes = before.size_bytes(),
            "document resized"
        );
        self.before = Some(before);
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        let Some(before) = &self.before else {
            return Err(MisuseError::UndoBeforeExecute.into());
        };
        if doc.size() != (self.width, self.height) {
            return Err(CommandError::drift(
                format!("{}x{} document", self.width, self.height),
                format!("{}x{}", doc.width(), doc.height()),
            ));
        }
        doc.restore(before);
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        let (width, height) = (self.width, self.height);
        if Document::check_size(width, height).is_err() {
            return Err(ValidationFailure::InvalidSize { width, height });
        }
        if doc.size() == (width, height) {
            return Err(ValidationFailure::SizeUnchanged { width, height });
        }
        if !self.strategy.allows_shrink() && (width < doc.width() || height < doc.height()) {
            return Err(ValidationFailure::PadCannotShrink {
                from_width: doc.width(),
                from_height: doc.height(),
                width,
                height,
            });
        }
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.before.as_ref().map_or(0, DocumentSnapshot::size_bytes)
    }

    fn details(&self) -> CommandDetails {
        let details = CommandDetails::of(self)
            .field("width", self.width)
            .field("height", self.height)
            .field("strategy", self.strategy);
        match &self.before {
            Some(before) => details
                .field("from_width", before.width())
                .field("from_height", before.height()),
            None => details,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "ResizeDocumentCmd"
    }
}
