use bitflags::bitflags;

use crate::style::Style;

bitflags! {
    /// Per-cell flags unrelated to SGR styling: wide-character tracking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u8 {
        /// Trailing half of a width-2 cell; never drawn on its own.
        const WIDE_SPACER = 1 << 0;
    }
}

/// A single terminal cell: one code point, its column width, and its style.
///
/// Invariant: a `width == 2` cell is always immediately followed on the
/// same line by a `width == 0` cell carrying `CellFlags::WIDE_SPACER`,
/// unless it sits in the last column of the line (in which case there
/// is no following column for a spacer to occupy — see
/// `Terminal::print_char`).
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub c: char,
    pub width: u8,
    pub style: Style,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            width: 1,
            style: Style::new(),
            flags: CellFlags::empty(),
        }
    }
}

impl Cell {
    pub fn new(c: char, width: u8, style: Style) -> Self {
        Self {
            c,
            width,
            style,
            flags: CellFlags::empty(),
        }
    }

    /// The trailing half of a wide character: blank, width 0, spacer-flagged.
    pub fn wide_spacer() -> Self {
        Self {
            c: ' ',
            width: 0,
            style: Style::new(),
            flags: CellFlags::WIDE_SPACER,
        }
    }

    /// Reset to a blank cell with default style (used by full clears).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Erase per ECMA-48: blank out the glyph but paint the current
    /// background color into the cell (so `CSI 2 J` with a colored
    /// background clears to that color, not to the terminal default).
    pub fn erase(&mut self, bg: crate::style::Color) {
        self.c = ' ';
        self.width = 1;
        self.style = Style {
            bg,
            ..Style::new()
        };
        self.flags = CellFlags::empty();
    }

    pub fn is_wide_spacer(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_SPACER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    #[test]
    fn wide_spacer_has_zero_width() {
        let spacer = Cell::wide_spacer();
        assert_eq!(spacer.width, 0);
        assert!(spacer.is_wide_spacer());
    }

    #[test]
    fn erase_paints_background_not_default() {
        let mut cell = Cell::new('x', 1, Style::new());
        cell.erase(Color::Indexed(4));
        assert_eq!(cell.c, ' ');
        assert_eq!(cell.style.bg, Color::Indexed(4));
        assert_eq!(cell.style.fg, Color::Default);
    }
}
