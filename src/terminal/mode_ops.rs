//! DEC private (`CSI ? ... h/l`) and ANSI (`CSI ... h/l`) mode set/reset,
//! plus DECRPM mode reporting.

use super::Delegate;
use super::Terminal;

impl<D: Delegate> Terminal<D> {
    pub(super) fn set_dec_modes(&mut self, params: &[u16], enable: bool) {
        for &mode in params {
            self.set_dec_mode(mode, enable);
        }
    }

    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            1 => self.modes.cursor_keys_application = enable,
            6 => {
                self.modes.origin = enable;
                self.cursor_position(1, 1);
            }
            7 => self.modes.autowrap = enable,
            25 => self.modes.cursor_visible = enable,
            45 => self.modes.reverse_wraparound = enable,
            47 => {
                if enable {
                    self.enter_alt_screen();
                } else {
                    self.exit_alt_screen();
                }
            }
            1000 => self.modes.mouse_tracking = enable,
            1002 => self.modes.mouse_motion = enable,
            1003 => self.modes.mouse_all_motion = enable,
            1004 => self.modes.focus_events = enable,
            1005 => self.modes.utf8_mouse = enable,
            1006 => self.modes.sgr_mouse = enable,
            1007 => self.modes.alternate_scroll = enable,
            1015 => self.modes.urxvt_mouse = enable,
            1047 => {
                if enable {
                    self.enter_alt_screen();
                } else {
                    self.clear_screen();
                    self.exit_alt_screen();
                }
            }
            1048 => {
                if enable {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            1049 => {
                if enable {
                    self.save_cursor();
                    self.enter_alt_screen();
                    self.clear_screen();
                } else {
                    self.clear_screen();
                    self.exit_alt_screen();
                    self.restore_cursor();
                }
            }
            2004 => self.modes.bracketed_paste = enable,
            2026 => self.modes.synchronized_output = enable,
            _ => {}
        }
        self.notify_mouse_mode();
    }

    pub(super) fn set_ansi_modes(&mut self, params: &[u16], enable: bool) {
        for &mode in params {
            match mode {
                4 => self.modes.insert = enable,
                20 => self.modes.linefeed_newline = enable,
                _ => {}
            }
        }
    }

    fn notify_mouse_mode(&mut self) {
        use crate::delegate::MouseMode;
        let encoding = self.modes.preferred_mouse_encoding();
        self.delegate.mouse_mode_changed(MouseMode {
            tracking: self.modes.mouse_tracking,
            motion: self.modes.mouse_motion,
            all_motion: self.modes.mouse_all_motion,
            sgr: matches!(encoding, super::MouseEncoding::Sgr),
            focus: self.modes.focus_events,
            alt_scroll: self.modes.alternate_scroll,
            bracketed_paste: self.modes.bracketed_paste,
        });
    }

    /// `CSI ? Ps $ p` (DECRPM): report a DEC private mode's state as
    /// `CSI ? Ps ; Pm $ y`, `Pm` 0 = not recognized, 1/2 = set/reset,
    /// 3/4 = permanently set/reset.
    pub(super) fn report_dec_mode(&mut self, mode: u16) {
        let state = match mode {
            1 => self.modes.cursor_keys_application,
            6 => self.modes.origin,
            7 => self.modes.autowrap,
            25 => self.modes.cursor_visible,
            47 | 1047 | 1049 => self.using_alt,
            1000 => self.modes.mouse_tracking,
            1002 => self.modes.mouse_motion,
            1003 => self.modes.mouse_all_motion,
            1004 => self.modes.focus_events,
            1006 => self.modes.sgr_mouse,
            2004 => self.modes.bracketed_paste,
            2026 => self.modes.synchronized_output,
            _ => {
                self.send(format!("\x1b[?{};0$y", mode).into_bytes());
                return;
            }
        };
        let pm = if state { 1 } else { 2 };
        self.send(format!("\x1b[?{};{}$y", mode, pm).into_bytes());
    }

    /// `CSI Ps $ p` (DECRPM, ANSI modes).
    pub(super) fn report_ansi_mode(&mut self, mode: u16) {
        let state = match mode {
            4 => self.modes.insert,
            20 => self.modes.linefeed_newline,
            _ => {
                self.send(format!("\x1b[{};0$y", mode).into_bytes());
                return;
            }
        };
        let pm = if state { 1 } else { 2 };
        self.send(format!("\x1b[{};{}$y", mode, pm).into_bytes());
    }
}

#[cfg(test)]
mod tests {
    use crate::delegate::NullDelegate;
    use crate::options::Options;
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
    fn dec_1049_enters_and_restores_on_exit() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[?1049h");
        assert!(term.using_alt);
        feed(&mut term, b"\x1b[?1049l");
        assert!(!term.using_alt);
    }

    #[test]
    fn origin_mode_homes_cursor_to_scroll_region_top() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[5;10r\x1b[?6h");
        assert_eq!(term.get_cursor_location().1, 4);
    }

    #[test]
    fn insert_mode_is_an_ansi_not_dec_mode() {
        let mut term = terminal();
        feed(&mut term, b"\x1b[4h");
        assert!(term.modes.insert);
    }
}
