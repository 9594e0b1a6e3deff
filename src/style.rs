use bitflags::bitflags;

/// Terminal color representation supporting 16-color, 256-color, and truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

bitflags! {
    /// SGR text attributes as a compact bitflag set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellAttrs: u16 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const REVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

/// Immutable, value-typed per-cell style: foreground, background, and
/// SGR flags. Two styles with the same content compare equal regardless
/// of when or how they were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub flags: CellAttrs,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            flags: CellAttrs::empty(),
        }
    }

    /// `ESC [ 0 m` resets every attribute back to defaults.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True once every field matches a fresh `Style::new()`. Used to test
    /// the SGR-idempotence property (feeding `ESC[0m` always returns here).
    pub fn is_default(&self) -> bool {
        *self == Self::new()
    }
}

/// Convert a 256-color palette index to an RGB triple.
///
/// 0-15 are the standard/bright ANSI colors, 16-231 are a 6x6x6 color
/// cube, and 232-255 are a 24-step grayscale ramp, per ISO 8613-6 /
/// xterm's 256-color extension.
pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        0 => (0x00, 0x00, 0x00),
        1 => (0xcd, 0x00, 0x00),
        2 => (0x00, 0xcd, 0x00),
        3 => (0xcd, 0xcd, 0x00),
        4 => (0x00, 0x00, 0xee),
        5 => (0xcd, 0x00, 0xcd),
        6 => (0x00, 0xcd, 0xcd),
        7 => (0xe5, 0xe5, 0xe5),
        8 => (0x7f, 0x7f, 0x7f),
        9 => (0xff, 0x00, 0x00),
        10 => (0x00, 0xff, 0x00),
        11 => (0xff, 0xff, 0x00),
        12 => (0x5c, 0x5c, 0xff),
        13 => (0xff, 0x00, 0xff),
        14 => (0x00, 0xff, 0xff),
        15 => (0xff, 0xff, 0xff),
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + 40 * v };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            (v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_default() {
        assert!(Style::new().is_default());
    }

    #[test]
    fn reset_clears_any_prior_attribute() {
        let mut style = Style::new();
        style.fg = Color::Indexed(1);
        style.bg = Color::Rgb(1, 2, 3);
        style.flags.insert(CellAttrs::BOLD | CellAttrs::UNDERLINE);
        style.reset();
        assert!(style.is_default());
    }

    #[test]
    fn indexed_to_rgb_cube_and_grayscale() {
        assert_eq!(indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(indexed_to_rgb(255), (238, 238, 238));
    }
}
