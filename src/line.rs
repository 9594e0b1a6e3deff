use crate::cell::Cell;
use crate::style::Color;

/// An ordered sequence of cells making up one row of the buffer.
///
/// `is_wrapped` marks this line as the visual continuation of its
/// predecessor: the previous line reached the right margin with
/// wraparound armed and the cursor advanced onto this one without an
/// explicit CR/LF. Continuation lines are joined back together by
/// `Buffer::translate_line_to_string` and by the column-resize reflow.
#[derive(Debug, Clone)]
pub struct Line {
    pub cells: Vec<Cell>,
    pub is_wrapped: bool,
    pub dirty: bool,
}

impl Line {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            is_wrapped: false,
            dirty: true,
        }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.is_wrapped = false;
        self.dirty = true;
    }

    pub fn erase_with_bg(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
        self.dirty = true;
    }

    /// Grow or shrink the cell vector to `cols`, padding with blank cells.
    /// Does not reflow content — callers needing reflow use
    /// `Buffer::resize`, which operates across whole wrapped paragraphs.
    pub fn resize_cols(&mut self, cols: u16) {
        let new_len = cols as usize;
        if self.cells.len() != new_len {
            self.cells.resize(new_len, Cell::default());
            self.dirty = true;
        }
    }

    /// Render this line to a plain string for search/copy, skipping
    /// width-0 wide-character spacer cells and optionally trimming
    /// trailing whitespace.
    pub fn to_string_trimmed(&self, trim_right: bool) -> String {
        let s: String = self
            .cells
            .iter()
            .filter(|c| !c.is_wide_spacer())
            .map(|c| c.c)
            .collect();
        if trim_right {
            s.trim_end().to_string()
        } else {
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_line_is_blank_and_dirty() {
        let line = Line::new(10);
        assert_eq!(line.cols(), 10);
        assert!(line.dirty);
        assert!(!line.is_wrapped);
        assert!(line.cells.iter().all(|c| c.c == ' '));
    }

    #[test]
    fn resize_cols_pads_with_blanks() {
        let mut line = Line::new(4);
        line.resize_cols(8);
        assert_eq!(line.cols(), 8);
        line.resize_cols(2);
        assert_eq!(line.cols(), 2);
    }

    #[test]
    fn to_string_trimmed_skips_wide_spacers() {
        let mut line = Line::new(4);
        line.cells[0].c = 'A';
        line.cells[1] = crate::cell::Cell::wide_spacer();
        line.cells[2].c = 'B';
        assert_eq!(line.to_string_trimmed(true), "AB");
    }
}
