//! Status-report and identification CSI handlers (`n c > c` and
//! friends), plus `DECSCUSR`/`REP`/`XTWINOPS`.

use super::Delegate;
use super::Terminal;
use crate::options::CursorStyle;

impl<D: Delegate> Terminal<D> {
    /// `CSI n` (DSR): `5` asks "are you OK" (always yes), `6` asks for
    /// the cursor position (CPR), with a DEC-private `?` variant that
    /// additionally reports a page number of 1 (DECXCPR).
    pub(super) fn device_status_report(&mut self, n: u16, private: bool) {
        match n {
            5 => self.send(b"\x1b[0n".to_vec()),
            6 => {
                let (col, row) = self.get_cursor_location();
                let reply = if private {
                    format!("\x1b[?{};{};1R", row + 1, col + 1)
                } else {
                    format!("\x1b[{};{}R", row + 1, col + 1)
                };
                self.send(reply.into_bytes());
            }
            _ => {}
        }
    }

    /// `CSI c` (DA1): identify as a VT100 with the advanced video option.
    pub(super) fn primary_device_attributes(&mut self) {
        self.send(b"\x1b[?1;2c".to_vec());
    }

    /// `CSI > c` (DA2): terminal type / firmware version / keyboard type.
    pub(super) fn secondary_device_attributes(&mut self) {
        self.send(b"\x1b[>0;100;0c".to_vec());
    }

    /// `CSI Ps SP q` (DECSCUSR): set the cursor shape. Blink variants
    /// (odd `Ps` below 6, and `0`) collapse to their steady counterpart
    /// since this crate has no notion of a blink timer.
    pub(super) fn set_cursor_style(&mut self, ps: u16) {
        self.options.cursor_style = match ps {
            0 | 1 | 2 => CursorStyle::Block,
            3 | 4 => CursorStyle::Underline,
            5 | 6 => CursorStyle::Bar,
            _ => return,
        };
    }

    /// `CSI Ps b` (REP): repeat the last printed character `Ps` times.
    pub(super) fn repeat_last_char(&mut self, n: u16) {
        if let Some(c) = self.last_printed_char {
            for _ in 0..n {
                self.print_char(c);
            }
        }
    }

    /// `CSI Ps t` (XTWINOPS): only the size-report subset is meaningful
    /// without a real window (`18`/`19`); manipulation requests (raise,
    /// iconify, move) are no-ops since there's no window to act on.
    pub(super) fn window_manipulation(&mut self, ps: u16) {
        match ps {
            18 | 19 => {
                let rows = self.rows();
                let cols = self.cols();
                self.send(format!("\x1b[8;{};{}t", rows, cols).into_bytes());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::delegate::{Delegate, NullDelegate};
    use crate::options::Options;
    use crate::terminal::Terminal;

    #[derive(Default)]
    struct Capture(Vec<u8>);
    impl Delegate for Capture {
        fn send(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    fn feed<D: Delegate>(term: &mut Terminal<D>, bytes: &[u8]) {
        let mut parser = vte::Parser::new();
        for &b in bytes {
            parser.advance(term, b);
        }
    }

    #[test]
    fn repeat_last_char_repeats_print() {
        let mut term = Terminal::new(Options::default(), NullDelegate).unwrap();
        feed(&mut term, b"A\x1b[3b");
        assert_eq!(term.get_cursor_location().0, 4);
    }

    #[test]
    fn primary_device_attributes_responds() {
        let mut term = Terminal::new(Options::default(), Capture::default()).unwrap();
        feed(&mut term, b"\x1b[c");
        assert_eq!(term.delegate_mut().0, b"\x1b[?1;2c");
    }
}
