//! Cursor-movement CSI handlers (`A B C D E F G H f d` and friends).

use super::Delegate;
use super::Terminal;

impl<D: Delegate> Terminal<D> {
    /// The row range cursor movement clamps to: the scroll region when
    /// origin mode (DECOM) is set, the whole screen otherwise.
    fn vertical_bounds(&self) -> (u16, u16) {
        if self.modes.origin {
            (self.active_buffer().scroll_top, self.active_buffer().scroll_bottom)
        } else {
            (0, self.rows().saturating_sub(1))
        }
    }

    pub(super) fn cursor_up(&mut self, n: u16) {
        self.pending_wrap = false;
        let (top, _) = self.vertical_bounds();
        let buf = self.active_buffer_mut();
        buf.cursor_row = buf.cursor_row.saturating_sub(n).max(top);
    }

    pub(super) fn cursor_down(&mut self, n: u16) {
        self.pending_wrap = false;
        let (_, bottom) = self.vertical_bounds();
        let buf = self.active_buffer_mut();
        buf.cursor_row = buf.cursor_row.saturating_add(n).min(bottom);
    }

    pub(super) fn cursor_forward(&mut self, n: u16) {
        self.pending_wrap = false;
        let cols = self.cols();
        let buf = self.active_buffer_mut();
        buf.cursor_col = buf.cursor_col.saturating_add(n).min(cols.saturating_sub(1));
    }

    pub(super) fn cursor_back(&mut self, n: u16) {
        self.pending_wrap = false;
        let buf = self.active_buffer_mut();
        buf.cursor_col = buf.cursor_col.saturating_sub(n);
    }

    pub(super) fn cursor_next_line(&mut self, n: u16) {
        self.cursor_down(n);
        self.active_buffer_mut().cursor_col = 0;
    }

    pub(super) fn cursor_prev_line(&mut self, n: u16) {
        self.cursor_up(n);
        self.active_buffer_mut().cursor_col = 0;
    }

    pub(super) fn cursor_column(&mut self, n: u16) {
        self.pending_wrap = false;
        let cols = self.cols();
        let buf = self.active_buffer_mut();
        buf.cursor_col = n.saturating_sub(1).min(cols.saturating_sub(1));
    }

    pub(super) fn cursor_row(&mut self, n: u16) {
        self.pending_wrap = false;
        let (top, bottom) = self.vertical_bounds();
        let offset = if self.modes.origin { top } else { 0 };
        let buf = self.active_buffer_mut();
        buf.cursor_row = n.saturating_sub(1).saturating_add(offset).min(bottom);
    }

    pub(super) fn cursor_position(&mut self, row: u16, col: u16) {
        self.pending_wrap = false;
        let (top, bottom) = self.vertical_bounds();
        let row_offset = if self.modes.origin { top } else { 0 };
        let cols = self.cols();
        let buf = self.active_buffer_mut();
        buf.cursor_row = row.saturating_sub(1).saturating_add(row_offset).min(bottom);
        buf.cursor_col = col.saturating_sub(1).min(cols.saturating_sub(1));
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

    #[test]
    fn cursor_up_clamps_to_top_of_screen() {
        let mut term = terminal(10, 10);
        term.cursor_up(5);
        assert_eq!(term.get_cursor_location(), (0, 0));
    }

    #[test]
    fn cursor_position_is_one_based() {
        let mut term = terminal(10, 10);
        term.cursor_position(3, 4);
        assert_eq!(term.get_cursor_location(), (3, 2));
    }

    #[test]
    fn origin_mode_clamps_to_scroll_region() {
        let mut term = terminal(10, 10);
        term.modes.origin = true;
        term.active_buffer_mut().scroll_top = 2;
        term.active_buffer_mut().scroll_bottom = 5;
        term.cursor_position(1, 1);
        assert_eq!(term.get_cursor_location().1, 2);
    }

    #[test]
    fn cursor_forward_with_a_huge_count_clamps_instead_of_overflowing() {
        let mut term = terminal(10, 10);
        term.cursor_forward(u16::MAX);
        assert_eq!(term.get_cursor_location().0, 9);
    }

    #[test]
    fn cursor_down_with_a_huge_count_clamps_instead_of_overflowing() {
        let mut term = terminal(10, 10);
        term.cursor_down(u16::MAX);
        assert_eq!(term.get_cursor_location().1, 9);
    }
}
