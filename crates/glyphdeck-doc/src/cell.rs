#![forbid(unsafe_code)]

//! Grid cell: the fundamental unit of a layer.
//!
//! Each cell stores one glyph and a foreground/background pair of palette
//! indices. Cells are plain `Copy` values, so snapshots and comparisons are
//! structural.

use std::fmt;

/// Index into the document palette.
///
/// The editor works with a fixed indexed palette (16 named colors plus the
/// extended 256-color range), so a color is just a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorIndex(pub u8);

impl ColorIndex {
    /// Default foreground (light gray).
    pub const DEFAULT_FG: Self = Self(7);
    /// Default background (black).
    pub const DEFAULT_BG: Self = Self(0);

    /// Create a color index from a raw palette slot.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Raw palette slot.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A single cell in a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// The glyph. A space for empty/erased cells.
    pub glyph: char,
    /// Foreground palette index.
    pub fg: ColorIndex,
    /// Background palette index.
    pub bg: ColorIndex,
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Cell {
    /// The blank cell every fresh or cleared layer is filled with.
    pub const BLANK: Self = Self {
        glyph: ' ',
        fg: ColorIndex::DEFAULT_FG,
        bg: ColorIndex::DEFAULT_BG,
    };

    /// Create a cell with the given glyph and default colors.
    #[must_use]
    pub const fn new(glyph: char) -> Self {
        Self {
            glyph,
            fg: ColorIndex::DEFAULT_FG,
            bg: ColorIndex::DEFAULT_BG,
        }
    }

    /// Create a cell with explicit colors.
    #[must_use]
    pub const fn with_colors(glyph: char, fg: ColorIndex, bg: ColorIndex) -> Self {
        Self { glyph, fg, bg }
    }

    /// Whether this cell is indistinguishable from [`Cell::BLANK`].
    ///
    /// A space with a non-default background still counts as content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }

    /// Reset to the blank cell.
    pub fn erase(&mut self) {
        *self = Self::BLANK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_blank_space() {
        let cell = Cell::default();
        assert_eq!(cell.glyph, ' ');
        assert_eq!(cell.fg, ColorIndex::DEFAULT_FG);
        assert_eq!(cell.bg, ColorIndex::DEFAULT_BG);
        assert!(cell.is_blank());
    }

    #[test]
    fn glyph_makes_cell_non_blank() {
        assert!(!Cell::new('#').is_blank());
    }

    #[test]
    fn colored_space_is_not_blank() {
        let cell = Cell::with_colors(' ', ColorIndex::DEFAULT_FG, ColorIndex::new(4));
        assert!(!cell.is_blank());
    }

    #[test]
    fn erase_resets_everything() {
        let mut cell = Cell::with_colors('X', ColorIndex::new(1), ColorIndex::new(2));
        cell.erase();
        assert_eq!(cell, Cell::BLANK);
    }

    #[test]
    fn color_index_display() {
        assert_eq!(ColorIndex::new(12).to_string(), "c12");
        assert_eq!(ColorIndex::new(200).raw(), 200);
    }
}
