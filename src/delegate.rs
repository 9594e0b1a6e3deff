/// Rows/cols/pixel dimensions returned from `Delegate::window_size`,
/// consulted for `CSI 18 t` / `CSI 19 t` window-size reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

/// Which of OSC 0/1/2's title fields changed — OSC 0 sets both, OSC 1
/// only the icon name, OSC 2 only the window title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    IconName,
    WindowTitle,
    Both,
}

/// A requested width/height for a `create_image` call: iTerm2's OSC
/// 1337 accepts a bare cell count, a pixel count, a percentage of the
/// viewport, or `auto` (use the image's native size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    Auto,
    Cells(u16),
    Pixels(u16),
    Percent(u16),
}

/// The outward contract a host embeds to receive side effects from a
/// `Terminal` that aren't plain screen-buffer mutation: bytes the
/// application wants written back to the pty, and notifications for
/// title/bell/mouse-mode/image events, as a trait rather than an event
/// enum so a host can react to each kind directly without round-tripping
/// through a serialized event queue.
///
/// Every method has a default no-op body: hosts only override what
/// they care about. `Terminal::feed` never fails, so delegate methods
/// don't return `Result` either — a delegate that can't keep up (e.g.
/// a full output channel) should buffer or drop internally rather than
/// bubbling an error back into the parser. Callbacks are invoked
/// synchronously, from whatever thread is currently driving `feed`.
pub trait Delegate {
    /// Bytes the terminal wants sent back to the controlling process —
    /// CPR/DA/DSR responses, answerback for ENQ, paste-mode echoes.
    fn send(&mut self, _bytes: &[u8]) {}

    /// `CSI 18 t` / `CSI 19 t` request the window/screen size; the
    /// delegate supplies it since the core has no notion of an outer
    /// window.
    fn window_size(&mut self) -> WindowSize {
        WindowSize::default()
    }

    fn bell(&mut self) {}

    /// OSC 0/1/2.
    fn title_changed(&mut self, _kind: TitleKind, _text: &str) {}

    /// OSC 7.
    fn host_current_directory_updated(&mut self, _url: &str) {}

    fn alt_screen_entered(&mut self) {}
    fn alt_screen_exited(&mut self) {}

    fn mouse_mode_changed(&mut self, _mode: MouseMode) {}

    /// OSC 4/10/11/12 dynamic-color queries/changes; `slot` identifies
    /// which palette/dynamic slot changed.
    fn color_changed(&mut self, _slot: ColorSlot) {}

    fn scrollback_cleared(&mut self) {}

    /// A Sixel DCS sequence finished decoding into an RGBA bitmap.
    fn create_image_from_bitmap(&mut self, _rgba: &[u8], _width: u32, _height: u32) {}

    /// OSC 1337 (`File=...:base64data`, `inline=1`). `data` is the
    /// decoded image bytes in whatever container format the sender
    /// used (PNG, JPEG, ...); this crate doesn't decode or validate it.
    fn create_image(
        &mut self,
        _data: &[u8],
        _width: SizeSpec,
        _height: SizeSpec,
        _preserve_aspect_ratio: bool,
    ) {
    }

    /// OSC 52 query (`Pd == "?"`): return the text to report back, or
    /// `None` to answer nothing. The core has no clipboard of its own,
    /// so a host backed by a real clipboard overrides this.
    fn clipboard_read(&mut self, _selection: &str) -> Option<String> {
        None
    }

    /// OSC 52 set: `text` is already base64-decoded (empty clears the
    /// selection).
    fn clipboard_write(&mut self, _selection: &str, _text: &str) {}

    /// OSC 133 `A`: a shell prompt is about to be drawn.
    fn shell_prompt_start(&mut self) {}

    /// OSC 133 `B`: a command is about to run; `command` is the text
    /// the shell hook captured, if any.
    fn shell_command_start(&mut self, _command: &str) {}

    /// OSC 133 `C`: the command's output is starting.
    fn shell_command_executed(&mut self) {}

    /// OSC 133 `D`: the command finished with `exit_code`.
    fn shell_command_finished(&mut self, _exit_code: i32) {}
}

/// Snapshot of the mouse-tracking modes, reported together since they
/// interact (e.g. SGR encoding only matters if some tracking mode is on).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseMode {
    pub tracking: bool,
    pub motion: bool,
    pub all_motion: bool,
    pub sgr: bool,
    pub focus: bool,
    pub alt_scroll: bool,
    pub bracketed_paste: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Palette(u8),
    Foreground,
    Background,
    Cursor,
}

/// A `Delegate` that drops everything; used as the default for
/// `Terminal::new` and in tests that don't care about side effects.
#[derive(Debug, Default)]
pub struct NullDelegate;

impl Delegate for NullDelegate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_delegate_accepts_every_call_without_panicking() {
        let mut delegate = NullDelegate;
        delegate.send(b"hello");
        assert_eq!(delegate.window_size(), WindowSize::default());
        delegate.bell();
        delegate.title_changed(TitleKind::Both, "x");
        delegate.host_current_directory_updated("/tmp");
        delegate.alt_screen_entered();
        delegate.alt_screen_exited();
        delegate.mouse_mode_changed(MouseMode::default());
        delegate.color_changed(ColorSlot::Foreground);
        delegate.scrollback_cleared();
        delegate.create_image_from_bitmap(&[0, 0, 0, 255], 1, 1);
        delegate.create_image(&[], SizeSpec::Auto, SizeSpec::Auto, true);
        assert_eq!(delegate.clipboard_read("c"), None);
        delegate.clipboard_write("c", "hello");
        delegate.shell_prompt_start();
        delegate.shell_command_start("ls");
        delegate.shell_command_executed();
        delegate.shell_command_finished(0);
    }
}
