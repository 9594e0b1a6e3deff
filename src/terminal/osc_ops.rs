//! OSC dispatch (`0/1/2` title, `4` palette, `7` cwd, `8` hyperlink,
//! `10/11/12` dynamic colors, `52` clipboard, `104` palette reset,
//! `133` shell-integration markers, `1337` iTerm2 inline images). tmux
//! control-mode passthrough is handled at the DCS layer (`dcs.rs`), not
//! here — it arrives as `DCS t`, not an OSC.

use base64::Engine;

use super::Delegate;
use super::Terminal;
use crate::delegate::{ColorSlot, SizeSpec, TitleKind};

impl<D: Delegate> Terminal<D> {
    pub(super) fn handle_osc(&mut self, code: u32, params: &[&[u8]]) {
        match code {
            0 => self.handle_title_osc(params, TitleKind::Both),
            1 => self.handle_title_osc(params, TitleKind::IconName),
            2 => self.handle_title_osc(params, TitleKind::WindowTitle),
            4 => self.handle_osc4(params),
            7 => {
                if let Some(url) = text(params, 0) {
                    self.current_directory = Some(url.clone());
                    self.delegate.host_current_directory_updated(&url);
                }
            }
            8 => self.handle_osc8(params),
            10 => self.handle_dynamic_color(params, ColorSlot::Foreground),
            11 => self.handle_dynamic_color(params, ColorSlot::Background),
            12 => self.handle_dynamic_color(params, ColorSlot::Cursor),
            52 => self.handle_osc52(params),
            104 => self.handle_osc104(params),
            110 => {
                self.default_fg_override = None;
                self.delegate.color_changed(ColorSlot::Foreground);
            }
            111 => {
                self.default_bg_override = None;
                self.delegate.color_changed(ColorSlot::Background);
            }
            112 => self.delegate.color_changed(ColorSlot::Cursor),
            133 => self.handle_osc133(params),
            1337 => self.handle_osc1337(params),
            _ => {}
        }
    }

    fn handle_title_osc(&mut self, params: &[&[u8]], kind: TitleKind) {
        if let Some(s) = text(params, 0) {
            self.title_changed(kind, &s);
        }
    }

    /// `OSC 4 ; index ; spec [; index ; spec ...]` — define or query
    /// palette entries. `spec` of `?` is a query; otherwise it's an
    /// `rgb:`/`#` color spec.
    fn handle_osc4(&mut self, params: &[&[u8]]) {
        let mut i = 0;
        while i + 1 < params.len() {
            let idx = std::str::from_utf8(params[i]).ok().and_then(|s| s.parse::<u8>().ok());
            let spec = std::str::from_utf8(params[i + 1]).ok();
            if let (Some(idx), Some(spec)) = (idx, spec) {
                if spec == "?" {
                    let (r, g, b) = self.palette_overrides[idx as usize]
                        .unwrap_or_else(|| crate::style::indexed_to_rgb(idx));
                    self.send(
                        format!("\x1b]4;{};rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}\x07", idx)
                            .into_bytes(),
                    );
                } else if let Some(rgb) = parse_color_spec(spec) {
                    self.palette_overrides[idx as usize] = Some(rgb);
                    self.delegate.color_changed(ColorSlot::Palette(idx));
                }
            }
            i += 2;
        }
    }

    /// `OSC 8 ; params ; uri` — begin (non-empty `uri`) or end (empty
    /// `uri`) a hyperlink span; `params` (an `id=...:key=val` list) is
    /// accepted but not tracked since nothing in this crate re-emits it.
    fn handle_osc8(&mut self, params: &[&[u8]]) {
        let uri = text(params, 1).unwrap_or_default();
        self.active_hyperlink = if uri.is_empty() { None } else { Some(uri) };
    }

    fn handle_dynamic_color(&mut self, params: &[&[u8]], slot: ColorSlot) {
        let Some(spec) = text(params, 0) else { return };
        if spec == "?" {
            let (r, g, b) = match slot {
                ColorSlot::Foreground => self.default_fg_override.unwrap_or((0xe5, 0xe5, 0xe5)),
                ColorSlot::Background => self.default_bg_override.unwrap_or((0, 0, 0)),
                ColorSlot::Cursor => (0xff, 0xff, 0xff),
                ColorSlot::Palette(_) => return,
            };
            let code = match slot {
                ColorSlot::Foreground => 10,
                ColorSlot::Background => 11,
                ColorSlot::Cursor => 12,
                ColorSlot::Palette(_) => return,
            };
            self.send(
                format!("\x1b]{code};rgb:{r:02x}{r:02x}/{g:02x}{g:02x}/{b:02x}{b:02x}\x07").into_bytes(),
            );
        } else if let Some(rgb) = parse_color_spec(&spec) {
            match slot {
                ColorSlot::Foreground => self.default_fg_override = Some(rgb),
                ColorSlot::Background => self.default_bg_override = Some(rgb),
                ColorSlot::Cursor | ColorSlot::Palette(_) => {}
            }
            self.delegate.color_changed(slot);
        }
    }

    /// `OSC 52 ; Pc ; Pd` — clipboard read (`Pd` of `?`) or write (`Pd`
    /// a base64 payload, empty clears the selection). This crate has no
    /// clipboard of its own, so both directions round-trip through the
    /// delegate; `Pc` is passed through unparsed since xterm treats it
    /// as an opaque selector (`c`, `p`, `s`, `0`-`7`).
    fn handle_osc52(&mut self, params: &[&[u8]]) {
        let Some(selection) = text(params, 0) else { return };
        let Some(payload) = text(params, 1) else { return };
        if payload == "?" {
            if let Some(current) = self.delegate.clipboard_read(&selection) {
                let encoded = base64::engine::general_purpose::STANDARD.encode(current.as_bytes());
                self.send(format!("\x1b]52;{};{}\x1b\\", selection, encoded).into_bytes());
            }
            return;
        }
        if payload.is_empty() {
            self.delegate.clipboard_write(&selection, "");
            return;
        }
        if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(payload.as_bytes()) {
            if let Ok(decoded_text) = String::from_utf8(decoded) {
                self.delegate.clipboard_write(&selection, &decoded_text);
            }
        }
    }

    /// `OSC 104 [; index ...]` — reset one or more palette entries back
    /// to their default color, or all 256 when no indices are given.
    fn handle_osc104(&mut self, params: &[&[u8]]) {
        if params.is_empty() {
            for idx in 0..=u8::MAX {
                self.palette_overrides[idx as usize] = None;
                self.delegate.color_changed(ColorSlot::Palette(idx));
            }
            return;
        }
        for raw in params {
            if let Some(idx) = std::str::from_utf8(raw).ok().and_then(|s| s.parse::<u8>().ok()) {
                self.palette_overrides[idx as usize] = None;
                self.delegate.color_changed(ColorSlot::Palette(idx));
            }
        }
    }

    /// `OSC 133 ; marker [; ...]` shell-integration boundary markers:
    /// `A` prompt start, `B` command start (remaining params are the
    /// command text), `C` command output start, `D` command finished
    /// (optional exit code).
    fn handle_osc133(&mut self, params: &[&[u8]]) {
        let Some(marker) = text(params, 0) else { return };
        match marker.as_str() {
            "A" => self.delegate.shell_prompt_start(),
            "B" => {
                let command: Vec<String> = params
                    .get(1..)
                    .unwrap_or(&[])
                    .iter()
                    .filter_map(|p| std::str::from_utf8(p).ok())
                    .map(str::to_string)
                    .collect();
                if !command.is_empty() {
                    self.delegate.shell_command_start(&command.join(";"));
                }
            }
            "C" => self.delegate.shell_command_executed(),
            "D" => {
                let exit_code = text(params, 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                self.delegate.shell_command_finished(exit_code);
            }
            _ => {}
        }
    }

    /// `OSC 1337 ; File=key=value[;key=value...]:base64data` — iTerm2
    /// inline image. Only the `inline=1` form is forwarded (a bare file
    /// transfer with no inline flag has nowhere to render); `width`/
    /// `height` accept iTerm2's bare-number (cells), `px`, `%`, and
    /// `auto` forms.
    fn handle_osc1337(&mut self, params: &[&[u8]]) {
        // The key=value list before the colon routinely contains its own
        // `;` separators, which `vte` has already split `params` on — glue
        // them back into one string before parsing.
        if params.is_empty() {
            return;
        }
        let payload = params
            .iter()
            .filter_map(|p| std::str::from_utf8(p).ok())
            .collect::<Vec<_>>()
            .join(";");
        let Some(rest) = payload.strip_prefix("File=") else { return };
        let Some(colon_idx) = rest.find(':') else { return };
        let param_str = &rest[..colon_idx];
        let b64 = &rest[colon_idx + 1..];

        let mut width = SizeSpec::Auto;
        let mut height = SizeSpec::Auto;
        let mut inline = false;
        let mut preserve_aspect_ratio = true;
        for part in param_str.split(';') {
            let Some((key, val)) = part.split_once('=') else { continue };
            match key {
                "width" => width = parse_size_spec(val),
                "height" => height = parse_size_spec(val),
                "inline" => inline = val == "1",
                "preserveAspectRatio" => preserve_aspect_ratio = val != "0",
                _ => {}
            }
        }
        if !inline || b64.is_empty() {
            return;
        }
        if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(b64) {
            self.delegate.create_image(&data, width, height, preserve_aspect_ratio);
        }
    }
}

fn text(params: &[&[u8]], idx: usize) -> Option<String> {
    params.get(idx).and_then(|b| std::str::from_utf8(b).ok()).map(str::to_string)
}

/// Parse an X11-style `rgb:rrrr/gggg/bbbb` (1-4 hex digits per channel)
/// or `#rrggbb` color spec.
fn parse_color_spec(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some((r, g, b));
    }
    let rest = spec.strip_prefix("rgb:")?;
    let mut parts = rest.split('/');
    let scale = |s: &str| -> Option<u8> {
        let v = u32::from_str_radix(s, 16).ok()?;
        let max = (1u32 << (4 * s.len())).saturating_sub(1).max(1);
        Some(((v * 255) / max) as u8)
    };
    let r = scale(parts.next()?)?;
    let g = scale(parts.next()?)?;
    let b = scale(parts.next()?)?;
    Some((r, g, b))
}

/// Parse an iTerm2 `width`/`height` value: `auto`, a bare cell count,
/// `Npx`, or `N%`.
fn parse_size_spec(s: &str) -> SizeSpec {
    if s == "auto" {
        SizeSpec::Auto
    } else if let Some(n) = s.strip_suffix("px").and_then(|v| v.parse().ok()) {
        SizeSpec::Pixels(n)
    } else if let Some(n) = s.strip_suffix('%').and_then(|v| v.parse().ok()) {
        SizeSpec::Percent(n)
    } else if let Ok(n) = s.parse() {
        SizeSpec::Cells(n)
    } else {
        SizeSpec::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::parse_color_spec;
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
    fn parses_short_and_long_rgb_specs() {
        assert_eq!(parse_color_spec("rgb:ff/00/80"), Some((255, 0, 128)));
        assert_eq!(parse_color_spec("rgb:ffff/0000/8080"), Some((255, 0, 128)));
        assert_eq!(parse_color_spec("#ff0080"), Some((255, 0, 128)));
    }

    #[test]
    fn osc_0_sets_both_title_and_icon_name() {
        let mut term = Terminal::new(Options::default(), NullDelegate).unwrap();
        feed(&mut term, b"\x1b]0;hello\x07");
        assert_eq!(term.title, "hello");
        assert_eq!(term.icon_name, "hello");
    }

    #[test]
    fn osc_8_sets_and_clears_active_hyperlink() {
        let mut term = Terminal::new(Options::default(), NullDelegate).unwrap();
        feed(&mut term, b"\x1b]8;;http://example.com\x07");
        assert_eq!(term.active_hyperlink.as_deref(), Some("http://example.com"));
        feed(&mut term, b"\x1b]8;;\x07");
        assert_eq!(term.active_hyperlink, None);
    }

    #[test]
    fn osc_4_query_reports_palette_entry() {
        let mut term = Terminal::new(Options::default(), Capture::default()).unwrap();
        feed(&mut term, b"\x1b]4;1;?\x07");
        assert_eq!(term.delegate_mut().0, b"\x1b]4;1;rgb:cdcd/0000/0000\x07");
    }

    #[derive(Default)]
    struct Recorder {
        clipboard: Option<String>,
        clipboard_written: Vec<(String, String)>,
        shell_events: Vec<String>,
        image: Option<(Vec<u8>, crate::delegate::SizeSpec, crate::delegate::SizeSpec, bool)>,
        sent: Vec<u8>,
    }
    impl Delegate for Recorder {
        fn send(&mut self, bytes: &[u8]) {
            self.sent.extend_from_slice(bytes);
        }
        fn clipboard_read(&mut self, _selection: &str) -> Option<String> {
            self.clipboard.clone()
        }
        fn clipboard_write(&mut self, selection: &str, text: &str) {
            self.clipboard_written.push((selection.to_string(), text.to_string()));
        }
        fn shell_prompt_start(&mut self) {
            self.shell_events.push("A".to_string());
        }
        fn shell_command_start(&mut self, command: &str) {
            self.shell_events.push(format!("B:{command}"));
        }
        fn shell_command_executed(&mut self) {
            self.shell_events.push("C".to_string());
        }
        fn shell_command_finished(&mut self, exit_code: i32) {
            self.shell_events.push(format!("D:{exit_code}"));
        }
        fn create_image(
            &mut self,
            data: &[u8],
            width: crate::delegate::SizeSpec,
            height: crate::delegate::SizeSpec,
            preserve_aspect_ratio: bool,
        ) {
            self.image = Some((data.to_vec(), width, height, preserve_aspect_ratio));
        }
    }

    #[test]
    fn osc_52_write_decodes_base64_through_the_delegate() {
        let mut term = Terminal::new(Options::default(), Recorder::default()).unwrap();
        feed(&mut term, b"\x1b]52;c;aGVsbG8=\x07");
        assert_eq!(
            term.delegate_mut().clipboard_written,
            vec![("c".to_string(), "hello".to_string())]
        );
    }

    #[test]
    fn osc_52_query_reports_base64_of_the_delegates_clipboard() {
        let mut term = Terminal::new(Options::default(), Recorder::default()).unwrap();
        term.delegate_mut().clipboard = Some("hi".to_string());
        feed(&mut term, b"\x1b]52;c;?\x07");
        assert_eq!(term.delegate_mut().sent, b"\x1b]52;c;aGk=\x1b\\");
    }

    #[test]
    fn osc_104_with_no_params_clears_every_palette_override() {
        let mut term = Terminal::new(Options::default(), Capture::default()).unwrap();
        feed(&mut term, b"\x1b]4;1;#ff0080\x07");
        feed(&mut term, b"\x1b]104\x07");
        term.delegate_mut().0.clear();
        feed(&mut term, b"\x1b]4;1;?\x07");
        assert_eq!(term.delegate_mut().0, b"\x1b]4;1;rgb:cdcd/0000/0000\x07");
    }

    #[test]
    fn osc_104_with_an_index_resets_only_that_entry() {
        let mut term = Terminal::new(Options::default(), Capture::default()).unwrap();
        feed(&mut term, b"\x1b]4;1;#ff0080\x07");
        feed(&mut term, b"\x1b]104;1\x07");
        term.delegate_mut().0.clear();
        feed(&mut term, b"\x1b]4;1;?\x07");
        assert_eq!(term.delegate_mut().0, b"\x1b]4;1;rgb:cdcd/0000/0000\x07");
    }

    #[test]
    fn osc_133_markers_reach_the_delegate() {
        let mut term = Terminal::new(Options::default(), Recorder::default()).unwrap();
        feed(&mut term, b"\x1b]133;A\x07");
        feed(&mut term, b"\x1b]133;B;ls -la\x07");
        feed(&mut term, b"\x1b]133;C\x07");
        feed(&mut term, b"\x1b]133;D;1\x07");
        assert_eq!(
            term.delegate_mut().shell_events,
            vec!["A".to_string(), "B:ls -la".to_string(), "C".to_string(), "D:1".to_string()]
        );
    }

    #[test]
    fn osc_1337_inline_file_reaches_create_image() {
        let mut term = Terminal::new(Options::default(), Recorder::default()).unwrap();
        // "hi" base64-encoded is "aGk=".
        feed(&mut term, b"\x1b]1337;File=width=10;height=5px;inline=1:aGk=\x07");
        let (data, width, height, _) = term.delegate_mut().image.clone().unwrap();
        assert_eq!(data, b"hi");
        assert_eq!(width, crate::delegate::SizeSpec::Cells(10));
        assert_eq!(height, crate::delegate::SizeSpec::Pixels(5));
    }

    #[test]
    fn osc_1337_without_inline_flag_is_dropped() {
        let mut term = Terminal::new(Options::default(), Recorder::default()).unwrap();
        feed(&mut term, b"\x1b]1337;File=width=10:aGk=\x07");
        assert!(term.delegate_mut().image.is_none());
    }
}
