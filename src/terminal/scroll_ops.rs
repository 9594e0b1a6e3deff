//! Scroll-region CSI handlers (`S T r`).

use super::Delegate;
use super::Terminal;

impl<D: Delegate> Terminal<D> {
    /// `CSI S` (SU): scroll the whole scroll region up by `n`, as if
    /// `n` linefeeds had occurred at the bottom margin.
    pub(super) fn scroll_up_n(&mut self, n: u16) {
        let top = self.active_buffer().scroll_top;
        let bottom = self.active_buffer().scroll_bottom;
        for _ in 0..n {
            self.active_buffer_mut().scroll_up(top, bottom);
        }
    }

    /// `CSI T` (SD): scroll the whole scroll region down by `n`.
    pub(super) fn scroll_down_n(&mut self, n: u16) {
        let top = self.active_buffer().scroll_top;
        let bottom = self.active_buffer().scroll_bottom;
        for _ in 0..n {
            self.active_buffer_mut().scroll_down(top, bottom);
        }
    }

    /// `CSI r` (DECSTBM): set the scroll region to `[top, bottom]`
    /// (1-based, inclusive); omitted params mean the full screen. Also
    /// homes the cursor, per DEC's documented behavior.
    pub(super) fn set_scroll_region(&mut self, params: &[u16]) {
        let rows = self.rows();
        let top = params.first().copied().unwrap_or(1).max(1) - 1;
        let bottom = params
            .get(1)
            .copied()
            .filter(|&b| b != 0)
            .unwrap_or(rows)
            .min(rows)
            - 1;
        if top >= bottom {
            return;
        }
        let buf = self.active_buffer_mut();
        buf.scroll_top = top;
        buf.scroll_bottom = bottom;
        buf.cursor_row = 0;
        buf.cursor_col = 0;
        self.pending_wrap = false;
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
    fn scroll_region_restricts_scroll_up_to_band() {
        let mut term = terminal(5, 5);
        feed(&mut term, b"11111\r\n22222\r\n33333\r\n44444\r\n55555");
        feed(&mut term, b"\x1b[2;4r\x1b[S");
        let offset = term.get_scrollback_size();
        assert_eq!(term.get_line(offset), "11111");
        assert_eq!(term.get_line(offset + 4), "55555");
    }
}
