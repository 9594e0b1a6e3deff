//! `CSI m` (SGR) handling. Understands both the legacy
//! semicolon-separated extended-color form (`38;2;r;g;b`) and the ISO
//! 8613-6 colon sub-parameter form (`38:2::r:g:b`) that `vte` surfaces
//! as a single multi-valued parameter group.

use super::dcs::DecrqssSnapshot;
use super::Delegate;
use super::Terminal;
use crate::options::CursorStyle;
use crate::style::{CellAttrs, Color};

impl<D: Delegate> Terminal<D> {
    /// The SGR parameter list that would reproduce the current style,
    /// used to answer `DECRQSS "m"`.
    pub(super) fn current_sgr_params(&self) -> Vec<u16> {
        if self.style.is_default() {
            return vec![0];
        }
        let mut v = Vec::new();
        let flags = self.style.flags;
        if flags.contains(CellAttrs::BOLD) {
            v.push(1);
        }
        if flags.contains(CellAttrs::DIM) {
            v.push(2);
        }
        if flags.contains(CellAttrs::ITALIC) {
            v.push(3);
        }
        if flags.contains(CellAttrs::UNDERLINE) {
            v.push(4);
        }
        if flags.contains(CellAttrs::BLINK) {
            v.push(5);
        }
        if flags.contains(CellAttrs::REVERSE) {
            v.push(7);
        }
        if flags.contains(CellAttrs::HIDDEN) {
            v.push(8);
        }
        if flags.contains(CellAttrs::STRIKETHROUGH) {
            v.push(9);
        }
        push_color_params(&mut v, self.style.fg, 30, 90, 38);
        push_color_params(&mut v, self.style.bg, 40, 100, 48);
        v
    }

    pub(super) fn decrqss_snapshot(&self) -> DecrqssSnapshot {
        let buf = self.active_buffer();
        DecrqssSnapshot {
            sgr_params: self.current_sgr_params(),
            cursor_style_ps: match self.options.cursor_style {
                CursorStyle::Block => 2,
                CursorStyle::Underline => 4,
                CursorStyle::Bar => 6,
            },
            scroll_top: buf.scroll_top,
            scroll_bottom: buf.scroll_bottom,
        }
    }

    pub(super) fn handle_sgr(&mut self, params: &vte::Params) {
        let groups: Vec<Vec<u16>> = params.iter().map(|g| g.to_vec()).collect();
        if groups.is_empty() || (groups.len() == 1 && groups[0] == [0]) {
            self.style.reset();
            return;
        }

        let mut i = 0;
        while i < groups.len() {
            let code = groups[i].first().copied().unwrap_or(0);
            match code {
                0 => self.style.reset(),
                1 => self.style.flags.insert(CellAttrs::BOLD),
                2 => self.style.flags.insert(CellAttrs::DIM),
                3 => self.style.flags.insert(CellAttrs::ITALIC),
                4 => self.style.flags.insert(CellAttrs::UNDERLINE),
                5 | 6 => self.style.flags.insert(CellAttrs::BLINK),
                7 => self.style.flags.insert(CellAttrs::REVERSE),
                8 => self.style.flags.insert(CellAttrs::HIDDEN),
                9 => self.style.flags.insert(CellAttrs::STRIKETHROUGH),
                22 => self.style.flags.remove(CellAttrs::BOLD | CellAttrs::DIM),
                23 => self.style.flags.remove(CellAttrs::ITALIC),
                24 => self.style.flags.remove(CellAttrs::UNDERLINE),
                25 => self.style.flags.remove(CellAttrs::BLINK),
                27 => self.style.flags.remove(CellAttrs::REVERSE),
                28 => self.style.flags.remove(CellAttrs::HIDDEN),
                29 => self.style.flags.remove(CellAttrs::STRIKETHROUGH),
                30..=37 => self.style.fg = Color::Indexed((code - 30) as u8),
                38 => {
                    let (color, consumed) = parse_extended_color(&groups, i);
                    self.style.fg = color;
                    i += consumed;
                }
                39 => self.style.fg = Color::Default,
                40..=47 => self.style.bg = Color::Indexed((code - 40) as u8),
                48 => {
                    let (color, consumed) = parse_extended_color(&groups, i);
                    self.style.bg = color;
                    i += consumed;
                }
                49 => self.style.bg = Color::Default,
                90..=97 => self.style.fg = Color::Indexed((code - 90 + 8) as u8),
                100..=107 => self.style.bg = Color::Indexed((code - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }
}

fn push_color_params(v: &mut Vec<u16>, color: Color, base: u16, bright_base: u16, extended: u16) {
    match color {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => v.push(base + i as u16),
        Color::Indexed(i) if i < 16 => v.push(bright_base + (i as u16 - 8)),
        Color::Indexed(i) => {
            v.push(extended);
            v.push(5);
            v.push(i as u16);
        }
        Color::Rgb(r, g, b) => {
            v.push(extended);
            v.push(2);
            v.push(r as u16);
            v.push(g as u16);
            v.push(b as u16);
        }
    }
}

/// Parse the color-kind + components following a `38`/`48` SGR code,
/// returning the resolved color and how many *extra* groups (beyond
/// the `38`/`48` group itself) it consumed — 0 for the colon form,
/// since everything lives in one group there.
fn parse_extended_color(groups: &[Vec<u16>], i: usize) -> (Color, usize) {
    let group = &groups[i];
    if group.len() >= 2 {
        match group[1] {
            2 if group.len() >= 5 => {
                let r = group[group.len() - 3] as u8;
                let g = group[group.len() - 2] as u8;
                let b = group[group.len() - 1] as u8;
                (Color::Rgb(r, g, b), 0)
            }
            5 if group.len() >= 3 => (Color::Indexed(group[2] as u8), 0),
            _ => (Color::Default, 0),
        }
    } else {
        match groups.get(i + 1).and_then(|g| g.first()).copied() {
            Some(2) => {
                let r = groups.get(i + 2).and_then(|g| g.first()).copied().unwrap_or(0) as u8;
                let g = groups.get(i + 3).and_then(|g| g.first()).copied().unwrap_or(0) as u8;
                let b = groups.get(i + 4).and_then(|g| g.first()).copied().unwrap_or(0) as u8;
                (Color::Rgb(r, g, b), 4)
            }
            Some(5) => {
                let idx = groups.get(i + 2).and_then(|g| g.first()).copied().unwrap_or(0) as u8;
                (Color::Indexed(idx), 2)
            }
            _ => (Color::Default, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::delegate::NullDelegate;
    use crate::options::Options;
    use crate::style::Color;
    use crate::terminal::Terminal;

    fn terminal() -> Terminal<NullDelegate> {
        Terminal::new(Options::default(), NullDelegate).unwrap()
    }

    fn feed(term: &mut Terminal<NullDelegate>, bytes: &[u8]) {
        let mut parser = vte::Parser::new();
        for &b in bytes {
            parser.advance(term, b);
        }
    }

    #[test]
    fn legacy_semicolon_truecolor_sets_rgb_fg() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[38;2;10;20;30m");
        assert_eq!(term.style.fg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn colon_subparam_truecolor_sets_rgb_bg() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[48:2::10:20:30m");
        assert_eq!(term.style.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn indexed_256_color_via_semicolons() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[38;5;202m");
        assert_eq!(term.style.fg, Color::Indexed(202));
    }

    #[test]
    fn bold_and_reset_are_idempotent() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[1;31m\x1b[0m");
        assert!(term.style.is_default());
    }
}
