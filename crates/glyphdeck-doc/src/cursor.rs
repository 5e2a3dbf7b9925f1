#![forbid(unsafe_code)]

//! Active-layer cursor.

use std::fmt;

use crate::layer::LayerId;

/// Which layer is currently selected for editing.
///
/// A cursor is a plain value: commands capture it before a change and hand
/// it back to [`Document::restore_cursor`](crate::Document::restore_cursor),
/// which is the single place the "cursor is valid or empty" rule is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor(Option<LayerId>);

impl Cursor {
    /// No active layer.
    pub const NONE: Self = Self(None);

    /// Cursor on `id`.
    #[must_use]
    pub const fn at(id: LayerId) -> Self {
        Self(Some(id))
    }

    /// The referenced layer, if any.
    #[must_use]
    pub const fn layer_id(self) -> Option<LayerId> {
        self.0
    }

    /// Whether no layer is active.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0.is_none()
    }

    /// Whether the cursor points at `id`.
    #[must_use]
    pub fn is_on(self, id: LayerId) -> bool {
        self.0 == Some(id)
    }
}

impl From<Option<LayerId>> for Cursor {
    fn from(id: Option<LayerId>) -> Self {
        Self(id)
    }
}

impl From<LayerId> for Cursor {
    fn from(id: LayerId) -> Self {
        Self(Some(id))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("none"),
        }
    }
}
