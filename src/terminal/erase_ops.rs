//! Erase and insert/delete-line/char CSI handlers (`J K @ P X L M`).

use super::Delegate;
use super::Terminal;

impl<D: Delegate> Terminal<D> {
    /// `CSI J` (ED): 0 = cursor to end of screen, 1 = start to cursor,
    /// 2 = whole screen, 3 = whole screen + scrollback.
    pub(super) fn erase_display(&mut self, mode: u16) {
        let rows = self.rows();
        let cols = self.cols();
        let bg = self.style.bg;
        let (row, col) = self.get_cursor_location();
        let using_alt = self.using_alt;
        let buf = self.active_buffer_mut();
        match mode {
            0 => {
                buf.erase_cells(row, col, cols, bg);
                for r in (row + 1)..rows {
                    buf.erase_cells(r, 0, cols, bg);
                }
            }
            1 => {
                buf.erase_cells(row, 0, col + 1, bg);
                for r in 0..row {
                    buf.erase_cells(r, 0, cols, bg);
                }
            }
            2 | 3 => {
                for r in 0..rows {
                    buf.erase_cells(r, 0, cols, bg);
                }
            }
            _ => {}
        }
        if mode == 3 && !using_alt {
            self.buffer.clear_scrollback();
            self.delegate.scrollback_cleared();
        }
    }

    /// `CSI K` (EL): 0 = cursor to end of line, 1 = start to cursor,
    /// 2 = whole line.
    pub(super) fn erase_line(&mut self, mode: u16) {
        let cols = self.cols();
        let bg = self.style.bg;
        let (row, col) = self.get_cursor_location();
        let buf = self.active_buffer_mut();
        match mode {
            0 => buf.erase_cells(row, col, cols, bg),
            1 => buf.erase_cells(row, 0, col + 1, bg),
            2 => buf.erase_cells(row, 0, cols, bg),
            _ => {}
        }
    }

    /// `CSI L` (IL): insert `n` blank lines at the cursor row, within
    /// the scroll region, shifting the tail down and off the bottom.
    pub(super) fn insert_lines(&mut self, n: u16) {
        let row = self.active_buffer().cursor_row;
        self.active_buffer_mut().insert_line(n, row);
    }

    /// `CSI M` (DL): delete `n` lines at the cursor row, within the
    /// scroll region, pulling the tail up.
    pub(super) fn delete_lines(&mut self, n: u16) {
        let row = self.active_buffer().cursor_row;
        let _ = self.active_buffer_mut().delete_line(n, row);
    }

    /// `CSI @` (ICH): shift the rest of the line right by `n` cells,
    /// filling with blanks, discarding what runs off the right edge.
    pub(super) fn insert_chars(&mut self, n: u16) {
        let (row, col) = self.get_cursor_location();
        self.active_buffer_mut().insert_cells(row, col, n);
    }

    /// `CSI P` (DCH): delete `n` cells at the cursor, shifting the rest
    /// of the line left, filling the vacated tail with blanks.
    pub(super) fn delete_chars(&mut self, n: u16) {
        let (row, col) = self.get_cursor_location();
        self.active_buffer_mut().delete_cells(row, col, n);
    }

    /// `CSI X` (ECH): blank `n` cells starting at the cursor, without
    /// shifting anything.
    pub(super) fn erase_chars(&mut self, n: u16) {
        let (row, col) = self.get_cursor_location();
        let bg = self.style.bg;
        self.active_buffer_mut().erase_cells(row, col, col.saturating_add(n), bg);
    }
}

#[cfg(test)]
mod tests {
    use crate::delegate::NullDelegate;
    use crate::options::Options;
    use crate::terminal::Terminal;

    fn terminal(cols: u16, rows: u16) -> Terminal<NullDelegate> {
        let mut opts = Options::default();
        opts.cols = cols;
        opts.rows = rows;
        Terminal::new(opts, NullDelegate).unwrap()
    }

    fn feed(term: &mut Terminal<NullDelegate>, bytes: &[u8]) {
        let mut parser = vte::Parser::new();
        for &b in bytes {
            parser.advance(term, b);
        }
    }

    #[test]
    fn erase_display_whole_screen_clears_every_line() {
        let mut term = terminal(10, 3);
        feed(&mut term, b"AAAAAAAAAA\r\nBBBBBBBBBB\r\nCCCCCCCCCC");
        feed(&mut term, b"\x1b[2J");
        let offset = term.get_scrollback_size();
        assert_eq!(term.get_line(offset), "");
    }

    #[test]
    fn delete_chars_shifts_line_left() {
        let mut term = terminal(5, 1);
        feed(&mut term, b"ABCDE\r\x1b[2P");
        let offset = term.get_scrollback_size();
        assert_eq!(term.get_line(offset), "CDE");
    }

    #[test]
    fn insert_chars_shifts_line_right_and_drops_tail() {
        let mut term = terminal(5, 1);
        feed(&mut term, b"ABCDE\r\x1b[2@");
        let offset = term.get_scrollback_size();
        assert_eq!(term.get_line(offset), "  ABC");
    }

    #[test]
    fn insert_lines_pushes_rows_down_within_region() {
        let mut term = terminal(5, 3);
        feed(&mut term, b"AAAAA\r\nBBBBB\r\nCCCCC\x1b[2;3H\x1b[L");
        let offset = term.get_scrollback_size();
        assert_eq!(term.get_line(offset), "AAAAA");
        assert_eq!(term.get_line(offset + 1), "");
        assert_eq!(term.get_line(offset + 2), "BBBBB");
    }
}
