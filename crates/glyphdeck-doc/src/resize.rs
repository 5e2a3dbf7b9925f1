#![forbid(unsafe_code)]

//! Resize strategies for layers and documents.

use std::fmt;

/// How existing content is placed when a layer changes size.
///
/// None of the strategies is assumed to be invertible: shrinking with
/// `Crop` or `Center` discards cells for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResizeStrategy {
    /// Keep content anchored top-left and extend with the fill cell.
    /// Only valid when neither dimension shrinks.
    #[default]
    Pad,
    /// Keep content anchored top-left and truncate whatever falls outside.
    Crop,
    /// Re-anchor content so the old and new centres coincide.
    Center,
}

impl ResizeStrategy {
    /// Stable lowercase name (`"pad"`, `"crop"`, `"center"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Crop => "crop",
            Self::Center => "center",
        }
    }

    /// Whether this strategy accepts a size that shrinks either dimension.
    #[must_use]
    pub const fn allows_shrink(self) -> bool {
        !matches!(self, Self::Pad)
    }

    /// Offset applied to old coordinates to obtain new ones.
    #[must_use]
    pub fn offset(self, old: (u16, u16), new: (u16, u16)) -> (i32, i32) {
        match self {
            Self::Pad | Self::Crop => (0, 0),
            Self::Center => (
                (i32::from(new.0) - i32::from(old.0)) / 2,
                (i32::from(new.1) - i32::from(old.1)) / 2,
            ),
        }
    }
}

impl fmt::Display for ResizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_strategies_have_zero_offset() {
        assert_eq!(ResizeStrategy::Pad.offset((10, 10), (20, 20)), (0, 0));
        assert_eq!(ResizeStrategy::Crop.offset((10, 10), (5, 5)), (0, 0));
    }

    #[test]
    fn center_offset_grows_and_shrinks() {
        assert_eq!(ResizeStrategy::Center.offset((10, 4), (20, 8)), (5, 2));
        assert_eq!(ResizeStrategy::Center.offset((10, 10), (4, 6)), (-3, -2));
    }

    #[test]
    fn only_pad_refuses_to_shrink() {
        assert!(!ResizeStrategy::Pad.allows_shrink());
        assert!(ResizeStrategy::Crop.allows_shrink());
        assert!(ResizeStrategy::Center.allows_shrink());
    }

    #[test]
    fn display_uses_lowercase_names() {
        assert_eq!(ResizeStrategy::Center.to_string(), "center");
    }
}
