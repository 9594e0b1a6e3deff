use std::collections::VecDeque;

use crate::cell::Cell;
use crate::charset::CharsetState;
use crate::line::Line;
use crate::style::{Color, Style};

/// Cursor position plus the style/charset snapshot captured by DECSC
/// (`ESC 7`) / DECSLRM `CSI s`, restored by DECRC (`ESC 8` / `CSI u`).
#[derive(Debug, Clone)]
struct SavedCursor {
    row: u16,
    col: u16,
    style: Style,
    charset: CharsetState,
}

/// A bounded two-dimensional grid with scrollback, cursor, saved cursor,
/// tab stops, and a scroll region.
///
/// `Terminal` owns two of these (normal and alternate); the alternate
/// buffer is constructed with `scrollback_limit == 0` so scrolled-off
/// lines are simply dropped rather than retained, matching real
/// terminals' "alt screen has no scrollback" behavior.
pub struct Buffer {
    /// Scrollback + visible lines. The visible region is the last
    /// `visible_rows` entries.
    lines: VecDeque<Line>,
    cols: u16,
    visible_rows: u16,
    scrollback_limit: usize,
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub scroll_top: u16,
    pub scroll_bottom: u16,
    tab_stops: Vec<bool>,
    tab_stop_width: u16,
    saved: Option<SavedCursor>,
}

impl Buffer {
    pub fn new(rows: u16, cols: u16, scrollback_limit: usize, tab_stop_width: u16) -> Self {
        let mut lines = VecDeque::with_capacity(rows as usize);
        for _ in 0..rows {
            lines.push_back(Line::new(cols));
        }
        let mut buffer = Self {
            lines,
            cols,
            visible_rows: rows,
            scrollback_limit,
            cursor_row: 0,
            cursor_col: 0,
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            tab_stops: Vec::new(),
            tab_stop_width: tab_stop_width.max(1),
            saved: None,
        };
        buffer.reset_tab_stops();
        buffer
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn visible_rows(&self) -> u16 {
        self.visible_rows
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn visible_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.visible_rows as usize)
    }

    pub fn scrollback_len(&self) -> usize {
        self.visible_offset()
    }

    /// `CSI 3 J` (xterm extension): drop everything above the viewport.
    pub fn clear_scrollback(&mut self) {
        let drop = self.visible_offset();
        self.lines.drain(0..drop);
    }

    pub fn visible_line(&self, row: u16) -> &Line {
        let idx = self.visible_offset() + row as usize;
        &self.lines[idx]
    }

    pub fn visible_line_mut(&mut self, row: u16) -> &mut Line {
        let idx = self.visible_offset() + row as usize;
        &mut self.lines[idx]
    }

    /// Absolute line at `index` counting scrollback from 0, independent
    /// of the current viewport. Used by `translate_line_to_string`.
    pub fn line_at(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    // ---- cell access -----------------------------------------------

    pub fn set_cell(&mut self, row: u16, col: u16, cell: Cell) {
        if col < self.cols && row < self.visible_rows {
            let line = self.visible_line_mut(row);
            line.cells[col as usize] = cell;
            line.dirty = true;
        }
    }

    pub fn erase_cells(&mut self, row: u16, start_col: u16, end_col: u16, bg: Color) {
        if row >= self.visible_rows {
            return;
        }
        let line = self.visible_line_mut(row);
        let start = start_col as usize;
        let end = (end_col as usize).min(line.cells.len());
        for cell in &mut line.cells[start.min(end)..end] {
            cell.erase(bg);
        }
        line.dirty = true;
    }

    pub fn insert_cells(&mut self, row: u16, col: u16, count: u16) {
        if row >= self.visible_rows {
            return;
        }
        let line = self.visible_line_mut(row);
        let col = col as usize;
        let count = (count as usize).min(line.cells.len().saturating_sub(col));
        for _ in 0..count {
            line.cells.pop();
            line.cells.insert(col, Cell::default());
        }
        line.dirty = true;
    }

    pub fn delete_cells(&mut self, row: u16, col: u16, count: u16) {
        if row >= self.visible_rows {
            return;
        }
        let line = self.visible_line_mut(row);
        let col = col as usize;
        let to_remove = (count as usize).min(line.cells.len().saturating_sub(col));
        for _ in 0..to_remove {
            if col < line.cells.len() {
                line.cells.remove(col);
                line.cells.push(Cell::default());
            }
        }
        line.dirty = true;
    }

    // ---- line/scroll operations --------------------------------------

    /// Scroll `[top, bottom]` up by one line: the top line of the region
    /// is removed, a blank line is appended at the bottom. When `top ==
    /// 0` the removed line becomes scrollback (subject to
    /// `scrollback_limit`) and is returned to the caller so it can be
    /// surfaced (e.g. for a scrollback-changed notification); past the
    /// limit the oldest scrollback line is evicted instead.
    pub fn scroll_up(&mut self, top: u16, bottom: u16) -> Option<Line> {
        let offset = self.visible_offset();
        let top_idx = offset + top as usize;
        let bottom_idx = offset + bottom as usize;
        if top_idx > bottom_idx || bottom_idx >= self.lines.len() {
            return None;
        }

        let mut evicted = None;
        if top == 0 {
            evicted = Some(self.lines[top_idx].clone_for_scrollback());
            self.lines.insert(bottom_idx + 1, Line::new(self.cols));
            while self.lines.len() > self.visible_rows as usize + self.scrollback_limit {
                self.lines.pop_front();
            }
        } else {
            self.lines.remove(top_idx);
            self.lines.insert(bottom_idx, Line::new(self.cols));
        }

        for r in top..=bottom {
            self.visible_line_mut(r).dirty = true;
        }
        evicted
    }

    pub fn scroll_down(&mut self, top: u16, bottom: u16) {
        let offset = self.visible_offset();
        let top_idx = offset + top as usize;
        let bottom_idx = offset + bottom as usize;
        if top_idx > bottom_idx || bottom_idx >= self.lines.len() {
            return;
        }
        self.lines.remove(bottom_idx);
        self.lines.insert(top_idx, Line::new(self.cols));
        for r in top..=bottom {
            self.visible_line_mut(r).dirty = true;
        }
    }

    /// `IL` — splice `n` blank lines at screen row `at` within the
    /// current scroll region, dropping `n` lines off the bottom of the
    /// region. No effect if `at` is outside `[scroll_top, scroll_bottom]`.
    pub fn insert_line(&mut self, n: u16, at: u16) {
        if at < self.scroll_top || at > self.scroll_bottom {
            return;
        }
        let bottom = self.scroll_bottom;
        for _ in 0..n {
            self.scroll_down(at, bottom);
        }
    }

    /// `DL` — symmetric to `insert_line`: remove `n` lines at `at`,
    /// pulling `n` blank lines in at the bottom of the region.
    pub fn delete_line(&mut self, n: u16, at: u16) -> Vec<Line> {
        if at < self.scroll_top || at > self.scroll_bottom {
            return Vec::new();
        }
        let bottom = self.scroll_bottom;
        let mut evicted = Vec::new();
        for _ in 0..n {
            if let Some(line) = self.scroll_up(at, bottom) {
                evicted.push(line);
            }
        }
        evicted
    }

    // ---- tab stops ------------------------------------------------

    /// Recompute the default tab-stop grid (every `tab_stop_width`
    /// columns), discarding any custom HTS/TBC stops. Called at
    /// construction and on every resize — real terminals reset tab
    /// stops on resize rather than trying to preserve custom ones
    /// against a grid whose width just changed.
    pub fn reset_tab_stops(&mut self) {
        self.tab_stops = vec![false; self.cols as usize];
        let mut col = 0usize;
        while col < self.tab_stops.len() {
            self.tab_stops[col] = true;
            col += self.tab_stop_width as usize;
        }
    }

    pub fn set_tab_stop(&mut self, col: u16) {
        if let Some(slot) = self.tab_stops.get_mut(col as usize) {
            *slot = true;
        }
    }

    pub fn clear_tab_stop(&mut self, col: u16) {
        if let Some(slot) = self.tab_stops.get_mut(col as usize) {
            *slot = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        for slot in &mut self.tab_stops {
            *slot = false;
        }
    }

    /// Next tab stop strictly after `from`, or the last column if none.
    pub fn next_tab_stop(&self, from: u16) -> u16 {
        let start = from as usize + 1;
        for (i, set) in self.tab_stops.iter().enumerate().skip(start) {
            if *set {
                return i as u16;
            }
        }
        self.cols.saturating_sub(1)
    }

    // ---- saved cursor -----------------------------------------------

    pub fn save_cursor(&mut self, style: Style, charset: CharsetState) {
        self.saved = Some(SavedCursor {
            row: self.cursor_row,
            col: self.cursor_col,
            style,
            charset,
        });
    }

    /// Restores position and returns the saved style/charset for the
    /// caller (`Terminal`) to reapply as its current SGR/charset state.
    pub fn restore_cursor(&mut self) -> Option<(Style, CharsetState)> {
        let saved = self.saved.take()?;
        self.cursor_row = saved.row.min(self.visible_rows.saturating_sub(1));
        self.cursor_col = saved.col.min(self.cols.saturating_sub(1));
        Some((saved.style, saved.charset))
    }

    // ---- resize / reflow --------------------------------------------

    /// Resize the normal buffer, reflowing wrapped paragraphs to the new
    /// column count and adjusting the visible row window, pulling rows
    /// back from scrollback when growing or pushing rows into it when
    /// shrinking.
    pub fn resize(&mut self, new_rows: u16, new_cols: u16) {
        if new_cols != self.cols {
            self.reflow_columns(new_cols);
            self.cols = new_cols;
        }
        self.resize_rows(new_rows);
        self.scroll_top = 0;
        self.scroll_bottom = new_rows.saturating_sub(1);
        self.reset_tab_stops();
        self.cursor_row = self.cursor_row.min(self.visible_rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(self.cols.saturating_sub(1));
        self.mark_all_dirty();
    }

    /// Resize the alternate buffer. Alt-screen content is disposable —
    /// full-screen TUI applications always repaint from scratch on
    /// SIGWINCH — so this clears and rebuilds at the new size rather
    /// than reflowing, matching xterm/Alacritty.
    pub fn resize_discard(&mut self, new_rows: u16, new_cols: u16) {
        self.lines.clear();
        for _ in 0..new_rows {
            self.lines.push_back(Line::new(new_cols));
        }
        self.cols = new_cols;
        self.visible_rows = new_rows;
        self.scroll_top = 0;
        self.scroll_bottom = new_rows.saturating_sub(1);
        self.reset_tab_stops();
        self.cursor_row = self.cursor_row.min(new_rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(new_cols.saturating_sub(1));
        self.mark_all_dirty();
    }

    fn resize_rows(&mut self, new_rows: u16) {
        let current = self.visible_rows as usize;
        let target = new_rows as usize;
        if target > current {
            let needed = target - current;
            for _ in 0..needed {
                self.lines.push_back(Line::new(self.cols));
            }
        }
        // Shrinking: existing rows simply fall out of the visible window
        // and become scrollback; nothing to remove here.
        self.visible_rows = new_rows;
    }

    fn reflow_columns(&mut self, new_cols: u16) {
        if self.lines.is_empty() {
            return;
        }
        let cursor_global = self.visible_offset() + self.cursor_row as usize;
        let mut new_lines: VecDeque<Line> = VecDeque::with_capacity(self.lines.len());
        let mut new_cursor_global = 0usize;

        let mut i = 0usize;
        while i < self.lines.len() {
            let para_start = i;
            let mut para_end = i + 1;
            while para_end < self.lines.len() && self.lines[para_end].is_wrapped {
                para_end += 1;
            }

            let mut flat: Vec<Cell> = Vec::new();
            let mut cursor_offset_in_para: Option<usize> = None;
            for idx in para_start..para_end {
                if idx == cursor_global {
                    cursor_offset_in_para =
                        Some(flat.len() + (self.cursor_col as usize).min(self.lines[idx].cols()));
                }
                flat.extend(self.lines[idx].cells.iter().cloned());
            }

            // Trim trailing default blanks so unwritten padding on the
            // last line of the paragraph doesn't manufacture extra rows,
            // but never trim past the cursor if it lives in that tail.
            let mut trimmed_len = flat.len();
            while trimmed_len > 0 && is_blank_default(&flat[trimmed_len - 1]) {
                if let Some(off) = cursor_offset_in_para {
                    if trimmed_len - 1 < off {
                        break;
                    }
                }
                trimmed_len -= 1;
            }
            if let Some(off) = cursor_offset_in_para {
                trimmed_len = trimmed_len.max(off + 1);
            }
            flat.truncate(trimmed_len.max(if cursor_offset_in_para.is_some() { 1 } else { 0 }));

            let new_para_start_idx = new_lines.len();
            if flat.is_empty() {
                new_lines.push_back(Line::new(new_cols));
            } else {
                let mut chunk_start = 0usize;
                let mut first = true;
                while chunk_start < flat.len() {
                    let chunk_end = (chunk_start + new_cols as usize).min(flat.len());
                    let mut cells: Vec<Cell> = flat[chunk_start..chunk_end].to_vec();
                    cells.resize(new_cols as usize, Cell::default());
                    new_lines.push_back(Line {
                        cells,
                        is_wrapped: !first,
                        dirty: true,
                    });
                    first = false;
                    chunk_start = chunk_end;
                }
            }

            if let Some(off) = cursor_offset_in_para {
                let new_row_in_para = off / new_cols.max(1) as usize;
                new_cursor_global = new_para_start_idx + new_row_in_para;
            }

            i = para_end;
        }

        self.lines = new_lines;
        let new_offset = self
            .lines
            .len()
            .saturating_sub(self.visible_rows as usize);
        self.cursor_row = new_cursor_global.saturating_sub(new_offset) as u16;
    }

    pub fn mark_all_dirty(&mut self) {
        let offset = self.visible_offset();
        for i in 0..self.visible_rows as usize {
            if offset + i < self.lines.len() {
                self.lines[offset + i].dirty = true;
            }
        }
    }

    /// Collect and clear dirty visible lines, returning (screen-relative
    /// row, cloned line) pairs in top-to-bottom order.
    pub fn collect_dirty_lines(&mut self) -> Vec<(u16, Line)> {
        let offset = self.visible_offset();
        let mut result = Vec::new();
        for i in 0..self.visible_rows {
            let idx = offset + i as usize;
            if idx < self.lines.len() && self.lines[idx].dirty {
                result.push((i, self.lines[idx].clone()));
                self.lines[idx].dirty = false;
            }
        }
        result
    }

    /// Join wrapped continuation lines starting at `index` into one
    /// string for search/copy.
    pub fn translate_line_to_string(&self, index: usize, trim_right: bool, join_wrapped: bool) -> String {
        let Some(start) = self.lines.get(index) else {
            return String::new();
        };
        let mut out = start.to_string_trimmed(false);
        if join_wrapped {
            let mut next = index + 1;
            while let Some(line) = self.lines.get(next) {
                if !line.is_wrapped {
                    break;
                }
                out.push_str(&line.to_string_trimmed(false));
                next += 1;
            }
        }
        if trim_right {
            out.trim_end().to_string()
        } else {
            out
        }
    }
}

fn is_blank_default(cell: &Cell) -> bool {
    cell.c == ' ' && cell.width == 1 && cell.style == Style::new() && cell.flags.is_empty()
}

impl Line {
    /// Clone used when capturing a line for scrollback eviction; kept as
    /// a named method so callers reading `scroll_up` don't need to know
    /// it's just a `Clone` under the hood.
    fn clone_for_scrollback(&self) -> Line {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_text(buf: &mut Buffer, row: u16, text: &str) {
        for (i, c) in text.chars().enumerate() {
            buf.set_cell(row, i as u16, Cell::new(c, 1, Style::new()));
        }
    }

    #[test]
    fn scroll_up_evicts_into_scrollback() {
        let mut buf = Buffer::new(3, 10, 100, 8);
        set_text(&mut buf, 0, "AAA");
        set_text(&mut buf, 1, "BBB");
        set_text(&mut buf, 2, "CCC");
        let evicted = buf.scroll_up(0, 2).unwrap();
        assert_eq!(evicted.to_string_trimmed(true), "AAA");
        assert_eq!(buf.visible_line(0).to_string_trimmed(true), "BBB");
        assert_eq!(buf.visible_line(2).to_string_trimmed(true), "");
        assert_eq!(buf.scrollback_len(), 1);
    }

    #[test]
    fn scrollback_is_bounded() {
        let mut buf = Buffer::new(2, 5, 3, 8);
        for i in 0..10 {
            set_text(&mut buf, 1, &format!("{i}"));
            buf.scroll_up(0, 1);
        }
        assert!(buf.scrollback_len() <= 3);
    }

    #[test]
    fn alt_buffer_scrollback_limit_zero_drops_immediately() {
        let mut buf = Buffer::new(2, 5, 0, 8);
        set_text(&mut buf, 0, "X");
        buf.scroll_up(0, 1);
        assert_eq!(buf.scrollback_len(), 0);
    }

    #[test]
    fn tab_stops_default_every_width() {
        let buf = Buffer::new(5, 40, 10, 8);
        assert_eq!(buf.next_tab_stop(0), 8);
        assert_eq!(buf.next_tab_stop(7), 8);
        assert_eq!(buf.next_tab_stop(8), 16);
    }

    #[test]
    fn custom_tab_stop_is_respected_until_resize() {
        let mut buf = Buffer::new(5, 40, 10, 8);
        buf.set_tab_stop(5);
        assert_eq!(buf.next_tab_stop(0), 5);
        buf.clear_all_tab_stops();
        assert_eq!(buf.next_tab_stop(0), buf.cols() - 1);
    }

    #[test]
    fn save_restore_cursor_roundtrips_position() {
        let mut buf = Buffer::new(10, 20, 10, 8);
        buf.cursor_row = 3;
        buf.cursor_col = 7;
        buf.save_cursor(Style::new(), CharsetState::new());
        buf.cursor_row = 0;
        buf.cursor_col = 0;
        buf.restore_cursor();
        assert_eq!(buf.cursor_row, 3);
        assert_eq!(buf.cursor_col, 7);
    }

    #[test]
    fn resize_shrink_reflows_wrapped_paragraph() {
        let mut buf = Buffer::new(5, 10, 100, 8);
        // Simulate a paragraph that wrapped at col 10: "HELLO" + "WORLD"
        set_text(&mut buf, 0, "HELLOWORLD");
        buf.visible_line_mut(1).is_wrapped = true;
        // second line empty in this synthetic setup (wrap already fits in one row)
        buf.resize(5, 5);
        assert_eq!(buf.cols(), 5);
        let joined = buf.translate_line_to_string(buf.visible_offset(), true, true);
        assert_eq!(joined, "HELLOWORLD");
    }

    #[test]
    fn resize_grow_rejoins_and_can_unwrap() {
        let mut buf = Buffer::new(5, 5, 100, 8);
        set_text(&mut buf, 0, "HELLO");
        buf.visible_line_mut(1).is_wrapped = true;
        set_text(&mut buf, 1, "WORLD");
        buf.resize(5, 10);
        let idx = buf.visible_offset();
        assert_eq!(buf.translate_line_to_string(idx, true, true), "HELLOWORLD");
    }

    #[test]
    fn insert_and_delete_line_respect_scroll_region() {
        let mut buf = Buffer::new(5, 10, 10, 8);
        buf.scroll_top = 1;
        buf.scroll_bottom = 3;
        set_text(&mut buf, 1, "A");
        set_text(&mut buf, 2, "B");
        set_text(&mut buf, 3, "C");
        buf.insert_line(1, 1);
        assert_eq!(buf.visible_line(1).to_string_trimmed(true), "");
        assert_eq!(buf.visible_line(2).to_string_trimmed(true), "A");
        assert_eq!(buf.visible_line(3).to_string_trimmed(true), "B");
        // row 0 and row 4 are outside the region and untouched
        assert_eq!(buf.visible_line(4).to_string_trimmed(true), "");
    }
}
