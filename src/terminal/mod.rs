mod cursor_ops;
mod dcs;
mod erase_ops;
mod mode_ops;
pub mod modes;
mod osc_ops;
mod reports;
mod scroll_ops;
mod sgr_ops;

pub use dcs::{DcsBuildContext, DcsHandler, DcsOutcome};
pub use modes::{MouseEncoding, TerminalModes};

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::charset::{dec_special_graphics, Charset, CharsetState};
use crate::delegate::{Delegate, TitleKind};
use crate::options::{AmbiguousWidth, Options, OptionsError};
use crate::style::Style;

use self::dcs::DcsRegistry;

/// The action sink driving a single VT-family terminal session. Owns
/// both screen buffers, the mode/charset/style state that sits outside
/// any one buffer, and the delegate used for outbound bytes and
/// notifications. Implements `vte::Perform` directly, so feeding a byte
/// stream is `let mut parser = vte::Parser::new(); for b in bytes {
/// parser.advance(&mut terminal, b) }`.
pub struct Terminal<D: Delegate> {
    buffer: Buffer,
    alt_buffer: Buffer,
    using_alt: bool,
    modes: TerminalModes,
    charset: CharsetState,
    style: Style,
    pending_wrap: bool,
    options: Options,
    delegate: D,
    title: String,
    icon_name: String,
    current_directory: Option<String>,
    active_hyperlink: Option<String>,
    palette_overrides: [Option<(u8, u8, u8)>; 256],
    default_fg_override: Option<(u8, u8, u8)>,
    default_bg_override: Option<(u8, u8, u8)>,
    last_printed_char: Option<char>,
    dcs_registry: DcsRegistry,
    active_dcs: Option<Box<dyn DcsHandler>>,
}

impl<D: Delegate> Terminal<D> {
    pub fn new(options: Options, delegate: D) -> Result<Self, OptionsError> {
        options.validate()?;
        tracing::debug!(cols = options.cols, rows = options.rows, "constructing terminal");
        let buffer = Buffer::new(
            options.rows,
            options.cols,
            options.scrollback,
            options.tab_stop_width,
        );
        let alt_buffer = Buffer::new(options.rows, options.cols, 0, options.tab_stop_width);
        Ok(Self {
            buffer,
            alt_buffer,
            using_alt: false,
            modes: TerminalModes::default(),
            charset: CharsetState::new(),
            style: Style::new(),
            pending_wrap: false,
            options,
            delegate,
            title: String::new(),
            icon_name: String::new(),
            current_directory: None,
            active_hyperlink: None,
            palette_overrides: [None; 256],
            default_fg_override: None,
            default_bg_override: None,
            last_printed_char: None,
            dcs_registry: DcsRegistry::with_builtins(),
            active_dcs: None,
        })
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    fn active_buffer(&self) -> &Buffer {
        if self.using_alt {
            &self.alt_buffer
        } else {
            &self.buffer
        }
    }

    fn active_buffer_mut(&mut self) -> &mut Buffer {
        if self.using_alt {
            &mut self.alt_buffer
        } else {
            &mut self.buffer
        }
    }

    fn cols(&self) -> u16 {
        self.options.cols
    }

    fn rows(&self) -> u16 {
        self.options.rows
    }

    /// Current cursor position as `(col, row)`, both 0-based.
    pub fn get_cursor_location(&self) -> (u16, u16) {
        let buf = self.active_buffer();
        (buf.cursor_col, buf.cursor_row)
    }

    /// `getLine(index)`, joining wrapped continuations.
    pub fn get_line(&self, index: usize) -> String {
        self.active_buffer()
            .translate_line_to_string(index, true, true)
    }

    pub fn get_scrollback_size(&self) -> usize {
        self.buffer.scrollback_len()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Register a handler factory for a DCS sequence keyed by its
    /// intermediates and final byte, alongside the built-in Sixel,
    /// XTGETTCAP, DECRQSS, and tmux-passthrough registrations. A second
    /// registration for the same key replaces the first.
    pub fn register_dcs(
        &mut self,
        intermediates: Vec<u8>,
        action: char,
        factory: impl Fn(&DcsBuildContext) -> Option<Box<dyn DcsHandler>> + Send + Sync + 'static,
    ) {
        self.dcs_registry.register(intermediates, action, factory);
    }

    /// Replace the active options wholesale. Geometry changes
    /// (`cols`/`rows`) are applied via `resize` rather than here so
    /// reflow stays a single code path.
    pub fn set_option(&mut self, new_options: Options) -> Result<(), OptionsError> {
        new_options.validate()?;
        if new_options.cols != self.options.cols || new_options.rows != self.options.rows {
            self.resize(new_options.cols, new_options.rows);
        }
        self.options = new_options;
        Ok(())
    }

    /// The normal buffer reflows its content to the new width; the
    /// alternate buffer, if active, discards and rebuilds blank since a
    /// full-screen app repaints it on the next redraw anyway.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        tracing::debug!(cols, rows, "resizing terminal");
        self.buffer.resize(rows, cols);
        self.alt_buffer.resize_discard(rows, cols);
        self.options.cols = cols;
        self.options.rows = rows;
        self.pending_wrap = false;
    }

    /// A straight pass-through to `delegate.send`, used for encoded
    /// keystrokes the embedder already turned into bytes (see the
    /// `keys` module for the encoding tables).
    pub fn send_from_user(&mut self, bytes: &[u8]) {
        self.delegate.send(bytes);
    }

    fn send(&mut self, bytes: Vec<u8>) {
        self.delegate.send(&bytes);
    }

    /// `unicode-width` already reports 1 for ambiguous code points, so
    /// widening them is a crate-local table rather than something
    /// `UnicodeWidthChar` exposes directly. A compact check over the
    /// common ambiguous blocks (Latin-1 Supplement punctuation, Greek,
    /// Cyrillic, box drawing, CJK punctuation/symbols) covers the
    /// characters terminal users actually hit.
    fn is_ambiguous_width(c: char) -> bool {
        matches!(c as u32,
            0x00A1..=0x00FF | 0x0391..=0x03A9 | 0x0410..=0x044F |
            0x2010..=0x2027 | 0x2030..=0x205E | 0x2190..=0x2211 | 0x2500..=0x25FF)
    }

    fn effective_width(&self, c: char) -> u16 {
        let raw = UnicodeWidthChar::width(c).unwrap_or(1) as u16;
        if raw == 1
            && self.options.ambiguous_width == AmbiguousWidth::Wide
            && Self::is_ambiguous_width(c)
        {
            2
        } else {
            raw
        }
    }

    /// The shared print path used both by `print()` and `CSI b` (REP).
    fn print_char(&mut self, c: char) {
        let c = if self.charset.active_gl() == Charset::DecSpecialGraphics {
            dec_special_graphics(c)
        } else {
            c
        };
        self.last_printed_char = Some(c);
        let width = self.effective_width(c).max(1);

        if self.pending_wrap {
            self.pending_wrap = false;
            let row = self.active_buffer().cursor_row;
            let bottom = self.active_buffer().scroll_bottom;
            self.active_buffer_mut().cursor_col = 0;
            if row == bottom {
                self.scroll_active_up();
            } else {
                self.active_buffer_mut().cursor_row += 1;
            }
            let new_row = self.active_buffer().cursor_row;
            self.active_buffer_mut().visible_line_mut(new_row).is_wrapped = true;
        }

        let cols = self.cols();
        if self.active_buffer().cursor_col.saturating_add(width) > cols && !self.modes.autowrap {
            self.active_buffer_mut().cursor_col = cols.saturating_sub(1);
        }

        if self.modes.insert {
            let row = self.active_buffer().cursor_row;
            let col = self.active_buffer().cursor_col;
            self.active_buffer_mut().insert_cells(row, col, width);
        }

        let row = self.active_buffer().cursor_row;
        let col = self.active_buffer().cursor_col;
        let cell = Cell::new(c, width.min(2) as u8, self.style);
        self.active_buffer_mut().set_cell(row, col, cell);
        if width == 2 && col + 1 < cols {
            self.active_buffer_mut().set_cell(row, col + 1, Cell::wide_spacer());
        }

        if col + width >= cols {
            if self.modes.autowrap {
                self.pending_wrap = true;
                self.active_buffer_mut().cursor_col = cols.saturating_sub(1);
            }
        } else {
            self.active_buffer_mut().cursor_col = col + width;
        }
    }

    fn scroll_active_up(&mut self) {
        let top = self.active_buffer().scroll_top;
        let bottom = self.active_buffer().scroll_bottom;
        self.active_buffer_mut().scroll_up(top, bottom);
    }

    fn linefeed(&mut self) {
        self.pending_wrap = false;
        let row = self.active_buffer().cursor_row;
        let bottom = self.active_buffer().scroll_bottom;
        if row == bottom {
            self.scroll_active_up();
        } else if row < self.rows().saturating_sub(1) {
            self.active_buffer_mut().cursor_row += 1;
        }
    }

    fn reverse_linefeed(&mut self) {
        self.pending_wrap = false;
        let row = self.active_buffer().cursor_row;
        let top = self.active_buffer().scroll_top;
        if row == top {
            let bottom = self.active_buffer().scroll_bottom;
            self.active_buffer_mut().scroll_down(top, bottom);
        } else if row > 0 {
            self.active_buffer_mut().cursor_row -= 1;
        }
    }

    fn carriage_return(&mut self) {
        self.pending_wrap = false;
        self.active_buffer_mut().cursor_col = 0;
    }

    fn backspace(&mut self) {
        self.pending_wrap = false;
        let buf = self.active_buffer_mut();
        if buf.cursor_col > 0 {
            buf.cursor_col -= 1;
        }
    }

    fn tab(&mut self) {
        let buf = self.active_buffer_mut();
        let next = buf.next_tab_stop(buf.cursor_col);
        buf.cursor_col = next;
    }

    fn enter_alt_screen(&mut self) {
        if !self.using_alt {
            self.alt_buffer.resize_discard(self.rows(), self.cols());
            self.using_alt = true;
            self.delegate.alt_screen_entered();
        }
    }

    fn exit_alt_screen(&mut self) {
        if self.using_alt {
            self.using_alt = false;
            self.buffer.mark_all_dirty();
            self.delegate.alt_screen_exited();
        }
    }

    fn clear_screen(&mut self) {
        let rows = self.rows();
        let bg = self.style.bg;
        let buf = self.active_buffer_mut();
        for r in 0..rows {
            buf.visible_line_mut(r).erase_with_bg(bg);
        }
        buf.cursor_row = 0;
        buf.cursor_col = 0;
    }

    fn save_cursor(&mut self) {
        let style = self.style;
        let charset = self.charset.clone();
        self.active_buffer_mut().save_cursor(style, charset);
    }

    fn restore_cursor(&mut self) {
        if let Some((style, charset)) = self.active_buffer_mut().restore_cursor() {
            self.style = style;
            self.charset = charset;
        }
        self.pending_wrap = false;
    }
}

impl<D: Delegate> vte::Perform for Terminal<D> {
    fn print(&mut self, c: char) {
        self.print_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => self.delegate.bell(),
            0x08 => self.backspace(),
            0x09 => self.tab(),
            0x0A | 0x0B | 0x0C => {
                self.linefeed();
                if self.modes.linefeed_newline {
                    self.carriage_return();
                }
            }
            0x0D => self.carriage_return(),
            0x0E => self.charset.shift_out(),
            0x0F => self.charset.shift_in(),
            _ => {}
        }
    }

    fn csi_dispatch(
        &mut self,
        params: &vte::Params,
        intermediates: &[u8],
        _ignore: bool,
        action: char,
    ) {
        self.dispatch_csi(params, intermediates, action);
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        self.dispatch_osc(params);
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        match (byte, intermediates) {
            (b'c', []) => self.full_reset(),
            (b'D', []) => self.linefeed(),
            (b'E', []) => {
                self.carriage_return();
                self.linefeed();
            }
            (b'H', []) => {
                let col = self.active_buffer().cursor_col;
                self.active_buffer_mut().set_tab_stop(col);
            }
            (b'M', []) => self.reverse_linefeed(),
            (b'7', []) => self.save_cursor(),
            (b'8', []) => self.restore_cursor(),
            (b'=', []) => self.modes.cursor_keys_application = true,
            (b'>', []) => self.modes.cursor_keys_application = false,
            (final_byte, [b'(']) => self.charset.designate(0, final_byte),
            (final_byte, [b')']) => self.charset.designate(1, final_byte),
            (final_byte, [b'*']) => self.charset.designate(2, final_byte),
            (final_byte, [b'+']) => self.charset.designate(3, final_byte),
            _ => {}
        }
    }

    fn hook(&mut self, _params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        let ctx = DcsBuildContext {
            cursor: self.get_cursor_location(),
            sixel_enabled: self.options.enable_sixel,
            term_name: self.options.term_name.clone(),
            decrqss: self.decrqss_snapshot(),
        };
        self.active_dcs = self.dcs_registry.build(intermediates, action, &ctx);
        if self.active_dcs.is_none() {
            tracing::trace!(?intermediates, action = %action, "unrecognized DCS sequence ignored");
        }
    }

    fn put(&mut self, byte: u8) {
        if let Some(handler) = self.active_dcs.as_mut() {
            handler.put(byte);
        }
    }

    fn unhook(&mut self) {
        if let Some(handler) = self.active_dcs.take() {
            match handler.finish() {
                DcsOutcome::None => {}
                DcsOutcome::Response(bytes) => self.send(bytes),
                DcsOutcome::SixelImage(image) => {
                    self.delegate
                        .create_image_from_bitmap(&image.rgba, image.width, image.height);
                    let buf = self.active_buffer_mut();
                    buf.cursor_col = 0;
                    let cell_rows = (image.height / 6).max(1);
                    for _ in 0..cell_rows {
                        let row = buf.cursor_row;
                        let bottom = buf.scroll_bottom;
                        if row == bottom {
                            let top = buf.scroll_top;
                            buf.scroll_up(top, bottom);
                        } else if row < buf.visible_rows().saturating_sub(1) {
                            buf.cursor_row += 1;
                        }
                    }
                }
            }
        }
    }
}

/// Pull the first sub-parameter of each CSI parameter group into a flat
/// `Vec`, discarding ISO 8613-6 colon sub-parameters — every CSI final
/// byte except `m` (SGR) ignores them.
pub(super) fn extract_params(params: &vte::Params) -> Vec<u16> {
    params.iter().map(|p| p[0]).collect()
}

/// ECMA-48 numeric parameters default to 1 when omitted *or* zero for
/// movement/count operations; `idx` out of range counts as omitted.
pub(super) fn count_param(params: &[u16], idx: usize) -> u16 {
    match params.get(idx) {
        Some(0) | None => 1,
        Some(&n) => n,
    }
}

/// Same as `count_param` but the default is 0, for parameters (erase
/// mode, mode numbers) where 0 is a meaningful, distinct value.
pub(super) fn raw_param(params: &[u16], idx: usize, default: u16) -> u16 {
    params.get(idx).copied().unwrap_or(default)
}

impl<D: Delegate> Terminal<D> {
    /// Routes a fully-parsed CSI sequence to the per-concern handler
    /// methods defined across `cursor_ops`/`erase_ops`/`scroll_ops`/
    /// `sgr_ops`/`mode_ops`/`reports`.
    fn dispatch_csi(&mut self, params: &vte::Params, intermediates: &[u8], action: char) {
        let private = matches!(intermediates.first(), Some(b'?'));
        let secondary = matches!(intermediates.first(), Some(b'>'));
        let dollar = intermediates.contains(&b'$');
        let space = intermediates.contains(&b' ');
        let p = extract_params(params);

        match action {
            'A' => self.cursor_up(count_param(&p, 0)),
            'B' | 'e' => self.cursor_down(count_param(&p, 0)),
            'C' | 'a' => self.cursor_forward(count_param(&p, 0)),
            'D' => self.cursor_back(count_param(&p, 0)),
            'E' => self.cursor_next_line(count_param(&p, 0)),
            'F' => self.cursor_prev_line(count_param(&p, 0)),
            'G' | '`' => self.cursor_column(count_param(&p, 0)),
            'd' => self.cursor_row(count_param(&p, 0)),
            'H' | 'f' => self.cursor_position(count_param(&p, 0), count_param(&p, 1)),
            'J' => self.erase_display(raw_param(&p, 0, 0)),
            'K' => self.erase_line(raw_param(&p, 0, 0)),
            'L' => self.insert_lines(count_param(&p, 0)),
            'M' => self.delete_lines(count_param(&p, 0)),
            '@' => self.insert_chars(count_param(&p, 0)),
            'P' => self.delete_chars(count_param(&p, 0)),
            'X' => self.erase_chars(count_param(&p, 0)),
            'S' => self.scroll_up_n(count_param(&p, 0)),
            'T' if p.len() <= 1 => self.scroll_down_n(count_param(&p, 0)),
            'r' => self.set_scroll_region(&p),
            'm' => self.handle_sgr(params),
            'h' if dollar && private => self.report_dec_mode(raw_param(&p, 0, 0)),
            'h' if dollar => self.report_ansi_mode(raw_param(&p, 0, 0)),
            'h' if private => self.set_dec_modes(&p, true),
            'h' => self.set_ansi_modes(&p, true),
            'l' if private => self.set_dec_modes(&p, false),
            'l' => self.set_ansi_modes(&p, false),
            'c' if secondary => self.secondary_device_attributes(),
            'c' => self.primary_device_attributes(),
            'n' => self.device_status_report(raw_param(&p, 0, 0), private),
            's' => self.save_cursor(),
            'u' => self.restore_cursor(),
            'q' if space => self.set_cursor_style(raw_param(&p, 0, 0)),
            'b' => self.repeat_last_char(count_param(&p, 0)),
            't' => self.window_manipulation(raw_param(&p, 0, 0)),
            _ => {}
        }
    }

    /// Splits the leading numeric OSC code from its string parameters
    /// and hands off to `handle_osc`.
    fn dispatch_osc(&mut self, params: &[&[u8]]) {
        let Some(&first) = params.first() else { return };
        let Ok(code) = std::str::from_utf8(first) else { return };
        let Ok(code) = code.parse::<u32>() else { return };
        self.handle_osc(code, &params[1..]);
    }
}

impl<D: Delegate> Terminal<D> {
    fn full_reset(&mut self) {
        tracing::info!("full reset (RIS)");
        let cols = self.cols();
        let rows = self.rows();
        let scrollback = self.options.scrollback;
        let tab_width = self.options.tab_stop_width;
        self.buffer = Buffer::new(rows, cols, scrollback, tab_width);
        self.alt_buffer = Buffer::new(rows, cols, 0, tab_width);
        self.using_alt = false;
        self.modes = TerminalModes::default();
        self.charset = CharsetState::new();
        self.style = Style::new();
        self.pending_wrap = false;
        self.title.clear();
        self.icon_name.clear();
        self.current_directory = None;
        self.active_hyperlink = None;
        self.palette_overrides = [None; 256];
        self.default_fg_override = None;
        self.default_bg_override = None;
        self.last_printed_char = None;
        self.active_dcs = None;
    }

    fn title_changed(&mut self, kind: TitleKind, text: &str) {
        match kind {
            TitleKind::IconName => self.icon_name = text.to_string(),
            TitleKind::WindowTitle => self.title = text.to_string(),
            TitleKind::Both => {
                self.icon_name = text.to_string();
                self.title = text.to_string();
            }
        }
        self.delegate.title_changed(kind, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::NullDelegate;

    fn feed<D: Delegate>(term: &mut Terminal<D>, bytes: &[u8]) {
        let mut parser = vte::Parser::new();
        for &b in bytes {
            parser.advance(term, b);
        }
    }

    fn terminal(cols: u16, rows: u16) -> Terminal<NullDelegate> {
        let mut opts = Options::default();
        opts.cols = cols;
        opts.rows = rows;
        Terminal::new(opts, NullDelegate).unwrap()
    }

    #[test]
    fn printable_ascii_advances_cursor_and_writes_line() {
        let mut term = terminal(80, 25);
        feed(&mut term, b"ABC");
        assert_eq!(term.get_cursor_location(), (3, 0));
        let offset = term.buffer.visible_offset();
        assert_eq!(term.get_line(offset), "ABC");
    }

    #[test]
    fn sgr_reset_restores_default_style() {
        let mut term = terminal(80, 25);
        feed(&mut term, b"\x1b[31mX\x1b[0mY");
        assert!(term.style.is_default());
    }

    #[test]
    fn cursor_position_report_round_trips() {
        use crate::delegate::Delegate;
        #[derive(Default)]
        struct Capture(Vec<u8>);
        impl Delegate for Capture {
            fn send(&mut self, bytes: &[u8]) {
                self.0.extend_from_slice(bytes);
            }
        }
        let mut opts = Options::default();
        let mut term = Terminal::new(opts.clone(), Capture::default()).unwrap();
        opts.cols = 80;
        feed(&mut term, b"\x1b[6n");
        assert_eq!(term.delegate_mut().0, b"\x1b[1;1R");
    }

    #[test]
    fn alt_screen_isolates_normal_buffer() {
        let mut term = terminal(10, 3);
        feed(&mut term, b"\x1b[?1049h");
        feed(&mut term, &[b'X'; 10]);
        assert!(term.using_alt);
        feed(&mut term, b"\x1b[?1049l");
        assert!(!term.using_alt);
        let offset = term.buffer.visible_offset();
        assert_eq!(term.get_line(offset), "");
    }

    #[test]
    fn scroll_region_clamps_linefeeds() {
        let mut term = terminal(10, 10);
        feed(&mut term, b"\x1b[2;5r\x1b[H");
        for _ in 0..10 {
            feed(&mut term, b"\n");
        }
        assert_eq!(term.get_cursor_location().1, 4);
    }
}
