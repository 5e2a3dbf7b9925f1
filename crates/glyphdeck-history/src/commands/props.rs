#![forbid(unsafe_code)]

//! Rename, show/hide, and lock/unlock a layer.

use std::any::Any;

use glyphdeck_doc::{Document, DocumentChange, Layer, LayerId};

use crate::command::{Command, CommandDetails, CommandMetadata};
use crate::error::{CommandError, CommandResult, MisuseError, ValidationFailure};

/// Layer attributes to change. `None` leaves an attribute alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerProps {
    pub name: Option<String>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl LayerProps {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.visible.is_none() && self.locked.is_none()
    }

    /// Whether applying these props to `layer` would change nothing.
    fn matches(&self, layer: &Layer) -> bool {
        self.name.as_deref().is_none_or(|n| n == layer.name())
            && self.visible.is_none_or(|v| v == layer.is_visible())
            && self.locked.is_none_or(|l| l == layer.is_locked())
    }

    /// Apply to `layer`, returning the values that were replaced.
    fn apply(&self, layer: &mut Layer) -> Self {
        let mut previous = Self::default();
        if let Some(name) = &self.name {
            previous.name = Some(layer.name().to_string());
            layer.set_name(name.clone());
        }
        if let Some(visible) = self.visible {
            previous.visible = Some(layer.is_visible());
            layer.set_visible(visible);
        }
        if let Some(locked) = self.locked {
            previous.locked = Some(layer.is_locked());
            layer.set_locked(locked);
        }
        previous
    }

    fn size_bytes(&self) -> usize {
        self.name.as_ref().map_or(0, String::len)
    }
}

/// Change layer attributes. Allowed on locked layers, so they can be
/// unlocked.
#[derive(Debug)]
pub struct SetLayerPropsCmd {
    metadata: CommandMetadata,
    layer_id: LayerId,
    props: LayerProps,
    previous: Option<LayerProps>,
}

impl SetLayerPropsCmd {
    /// Apply `props` to `layer_id`.
    #[must_use]
    pub fn new(layer_id: LayerId, props: LayerProps) -> Self {
        Self::described(layer_id, props, "Change layer properties")
    }

    /// Rename a layer.
    #[must_use]
    pub fn rename(layer_id: LayerId, name: impl Into<String>) -> Self {
        let props = LayerProps {
            name: Some(name.into()),
            ..LayerProps::default()
        };
        Self::described(layer_id, props, "Rename layer")
    }

    /// Show or hide a layer.
    #[must_use]
    pub fn set_visible(layer_id: LayerId, visible: bool) -> Self {
        let props = LayerProps {
            visible: Some(visible),
            ..LayerProps::default()
        };
        let description = if visible { "Show layer" } else { "Hide layer" };
        Self::described(layer_id, props, description)
    }

    /// Lock or unlock a layer.
    #[must_use]
    pub fn set_locked(layer_id: LayerId, locked: bool) -> Self {
        let props = LayerProps {
            locked: Some(locked),
            ..LayerProps::default()
        };
        let description = if locked { "Lock layer" } else { "Unlock layer" };
        Self::described(layer_id, props, description)
    }

    fn described(layer_id: LayerId, props: LayerProps, description: &str) -> Self {
        Self {
            metadata: CommandMetadata::new(description),
            layer_id,
            props,
            previous: None,
        }
    }

    /// Requested attribute values.
    #[must_use]
    pub fn props(&self) -> &LayerProps {
        &self.props
    }

    fn apply(doc: &mut Document, id: LayerId, props: &LayerProps) -> CommandResult<LayerProps> {
        let Some(layer) = doc.layer_mut(id) else {
            return Err(CommandError::drift(format!("layer {id}"), "no such layer"));
        };
        let previous = props.apply(layer);
        doc.record(DocumentChange::LayerUpdated { id });
        Ok(previous)
    }
}

impl Command for SetLayerPropsCmd {
    fn execute(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_execute()?;
        if self.metadata.is_fresh() {
            self.validate(doc)?;
        }
        self.previous = Some(Self::apply(doc, self.layer_id, &self.props)?);
        self.metadata.mark_executed();
        Ok(())
    }

    fn undo(&mut self, doc: &mut Document) -> CommandResult {
        self.metadata.check_undo()?;
        let Some(previous) = &self.previous else {
            return Err(MisuseError::UndoBeforeExecute.into());
        };
        Self::apply(doc, self.layer_id, previous)?;
        self.metadata.mark_undone();
        Ok(())
    }

    fn validate(&self, doc: &Document) -> Result<(), ValidationFailure> {
        let Some(layer) = doc.layer(self.layer_id) else {
            return Err(ValidationFailure::UnknownLayer(self.layer_id));
        };
        if self.props.is_empty() {
            return Err(ValidationFailure::NoChange("no properties given"));
        }
        if self.props.matches(layer) {
            return Err(ValidationFailure::NoChange("layer already has these properties"));
        }
        Ok(())
    }

    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.metadata.size_bytes()
            + self.props.size_bytes()
            + self.previous.as_ref().map_or(0, LayerProps::size_bytes)
    }

    fn details(&self) -> CommandDetails {
        let mut details = CommandDetails::of(self).field("layer", self.layer_id);
        if let Some(name) = &self.props.name {
            details = details.field("name", name);
        }
        if let Some(visible) = self.props.visible {
            details = details.field("visible", visible);
        }
        if let Some(locked) = self.props.locked {
            details = details.field("locked", locked);
        }
        details
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "SetLayerPropsCmd"
    }
}
