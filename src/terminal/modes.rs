/// DEC/ANSI mode flags tracked outside the buffer itself: cursor and
/// mouse reporting modes, autowrap/origin/insert, bracketed paste,
/// synchronized output, and focus events. Whether the alternate screen
/// is active lives on `Terminal::using_alt` instead of a flag here, so
/// there's a single source of truth for it.
#[derive(Debug, Clone)]
pub struct TerminalModes {
    pub cursor_keys_application: bool,
    pub origin: bool,
    pub autowrap: bool,
    pub reverse_wraparound: bool,
    pub cursor_visible: bool,
    pub mouse_tracking: bool,
    pub mouse_motion: bool,
    pub mouse_all_motion: bool,
    pub sgr_mouse: bool,
    pub utf8_mouse: bool,
    pub urxvt_mouse: bool,
    pub alternate_scroll: bool,
    pub bracketed_paste: bool,
    pub synchronized_output: bool,
    pub focus_events: bool,
    pub insert: bool,
    pub linefeed_newline: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            cursor_keys_application: false,
            origin: false,
            autowrap: true,
            reverse_wraparound: false,
            cursor_visible: true,
            mouse_tracking: false,
            mouse_motion: false,
            mouse_all_motion: false,
            sgr_mouse: false,
            utf8_mouse: false,
            urxvt_mouse: false,
            alternate_scroll: false,
            bracketed_paste: false,
            synchronized_output: false,
            focus_events: false,
            insert: false,
            linefeed_newline: false,
        }
    }
}

/// Which mouse-report wire format an external encoder should use: SGR
/// (1006) beats URXVT (1015) beats the original X10/normal format when
/// more than one is armed at once. This crate
/// never encodes mouse reports itself — mouse events aren't fed into
/// `Terminal` at all — it only exposes which mode is currently armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEncoding {
    None,
    X10,
    Urxvt,
    Sgr,
}

impl TerminalModes {
    pub fn preferred_mouse_encoding(&self) -> MouseEncoding {
        if !(self.mouse_tracking || self.mouse_motion || self.mouse_all_motion) {
            return MouseEncoding::None;
        }
        if self.sgr_mouse {
            MouseEncoding::Sgr
        } else if self.urxvt_mouse {
            MouseEncoding::Urxvt
        } else {
            MouseEncoding::X10
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr_takes_precedence_over_urxvt_and_x10() {
        let mut modes = TerminalModes {
            mouse_tracking: true,
            sgr_mouse: true,
            urxvt_mouse: true,
            ..TerminalModes::default()
        };
        assert_eq!(modes.preferred_mouse_encoding(), MouseEncoding::Sgr);
        modes.sgr_mouse = false;
        assert_eq!(modes.preferred_mouse_encoding(), MouseEncoding::Urxvt);
        modes.urxvt_mouse = false;
        assert_eq!(modes.preferred_mouse_encoding(), MouseEncoding::X10);
    }

    #[test]
    fn no_tracking_mode_means_none() {
        let modes = TerminalModes::default();
        assert_eq!(modes.preferred_mouse_encoding(), MouseEncoding::None);
    }
}
