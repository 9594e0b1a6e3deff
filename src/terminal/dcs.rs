//! DCS (Device Control String) dispatch, modeled as a handler registry
//! rather than a hardcoded if/else chain: `hook` looks up a builder by
//! `(intermediates, final byte)` and constructs a fresh handler, `put`
//! feeds it bytes, `unhook` asks it to finish and report an outcome.

use std::collections::HashMap;

use crate::sixel::{SixelImage, SixelParser};

/// What a finished DCS sequence produced.
pub enum DcsOutcome {
    None,
    /// Bytes to write back to the controlling process (XTGETTCAP,
    /// DECRQSS).
    Response(Vec<u8>),
    SixelImage(SixelImage),
}

/// A DCS sequence's byte-by-byte consumer, built fresh by `hook` and
/// driven by `put` until `unhook` calls `finish`.
pub trait DcsHandler {
    fn put(&mut self, byte: u8);
    fn finish(self: Box<Self>) -> DcsOutcome;
}

/// Terminal state `DECRQSS` needs to answer a query, captured at `hook`
/// time since a `DcsHandler` has no back-reference to `Terminal`.
#[derive(Clone)]
pub(super) struct DecrqssSnapshot {
    pub sgr_params: Vec<u16>,
    pub cursor_style_ps: u16,
    pub scroll_top: u16,
    pub scroll_bottom: u16,
}

/// Everything a handler factory needs to build a handler for one `hook`
/// call. Bundled rather than threaded as separate arguments since the
/// set a future built-in (or a caller's custom registration) needs
/// varies, and this keeps `register_dcs`'s factory signature stable as
/// that set grows.
pub struct DcsBuildContext {
    pub cursor: (u16, u16),
    pub sixel_enabled: bool,
    pub term_name: String,
    pub(super) decrqss: DecrqssSnapshot,
}

type DcsFactory = Box<dyn Fn(&DcsBuildContext) -> Option<Box<dyn DcsHandler>> + Send + Sync>;

/// Maps a DCS sequence's `(intermediates, final byte)` to the factory
/// that builds its handler, so a caller can extend the set via
/// `Terminal::register_dcs` instead of patching a hardcoded match arm.
pub(super) struct DcsRegistry {
    handlers: HashMap<(Vec<u8>, char), DcsFactory>,
}

impl DcsRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = Self { handlers: HashMap::new() };
        registry.register(Vec::new(), 'q', |ctx| {
            ctx.sixel_enabled.then(|| Box::new(SixelHandler::new(ctx.cursor.1, ctx.cursor.0)) as _)
        });
        registry.register(vec![b'+'], 'q', |ctx| {
            Some(Box::new(XtGetTcapHandler::new(ctx.term_name.clone())) as _)
        });
        registry.register(vec![b'$'], 'q', |ctx| {
            Some(Box::new(DecrqssHandler::new(ctx.decrqss.clone())) as _)
        });
        registry.register(Vec::new(), 't', |_ctx| Some(Box::new(TmuxPassthroughHandler::new()) as _));
        registry
    }

    pub fn register(
        &mut self,
        intermediates: Vec<u8>,
        action: char,
        factory: impl Fn(&DcsBuildContext) -> Option<Box<dyn DcsHandler>> + Send + Sync + 'static,
    ) {
        self.handlers.insert((intermediates, action), Box::new(factory));
    }

    /// `intermediates` carries the DCS prefix byte that selects which
    /// sub-protocol this is: none for Sixel and tmux passthrough, `+`
    /// for XTGETTCAP, `$` for DECRQSS. Unrecognized combinations hook
    /// nothing, so `put`/`unhook` silently no-op for the rest of the
    /// string.
    pub fn build(&self, intermediates: &[u8], action: char, ctx: &DcsBuildContext) -> Option<Box<dyn DcsHandler>> {
        self.handlers.get(&(intermediates.to_vec(), action)).and_then(|factory| factory(ctx))
    }
}

/// Which token is currently accumulating numeric arguments in the
/// Sixel data stream.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SixelPending {
    None,
    Color,
    Repeat,
}

struct SixelHandler {
    parser: SixelParser,
    pending: SixelPending,
    number_buf: String,
    args: Vec<i64>,
}

impl SixelHandler {
    fn new(row: u16, col: u16) -> Self {
        Self {
            parser: SixelParser::new(row, col),
            pending: SixelPending::None,
            number_buf: String::new(),
            args: Vec::new(),
        }
    }

    fn push_number(&mut self) {
        if !self.number_buf.is_empty() {
            self.args.push(self.number_buf.parse().unwrap_or(0));
            self.number_buf.clear();
        }
    }

    fn finalize_command(&mut self) {
        self.push_number();
        if self.pending == SixelPending::Color {
            self.parser.select_or_define_color(&self.args);
        }
        self.pending = SixelPending::None;
        self.args.clear();
    }
}

impl DcsHandler for SixelHandler {
    fn put(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => self.number_buf.push(byte as char),
            b';' => self.push_number(),
            b'#' => {
                self.finalize_command();
                self.pending = SixelPending::Color;
            }
            b'!' => {
                self.finalize_command();
                self.pending = SixelPending::Repeat;
            }
            b'$' => {
                self.finalize_command();
                self.parser.carriage_return();
            }
            b'-' => {
                self.finalize_command();
                self.parser.new_line();
            }
            0x3F..=0x7E => {
                self.push_number();
                if self.pending == SixelPending::Repeat {
                    let count = self.args.first().copied().unwrap_or(1).max(1) as u32;
                    self.pending = SixelPending::None;
                    self.args.clear();
                    self.parser.parse_repeat(count, byte as char);
                } else {
                    self.finalize_command();
                    self.parser.parse_sixel(byte as char);
                }
            }
            _ => {}
        }
    }

    fn finish(self: Box<Self>) -> DcsOutcome {
        let image = self.parser.build_image();
        if image.width == 0 || image.height == 0 {
            DcsOutcome::None
        } else {
            DcsOutcome::SixelImage(image)
        }
    }
}

/// `DCS + q <hex-encoded capability names, ; separated> ST` — answers
/// with each name's value, hex-encoded, or `DCS 0 + r ST` if none of
/// the requested names are known.
struct XtGetTcapHandler {
    raw: Vec<u8>,
    term_name: String,
}

impl XtGetTcapHandler {
    fn new(term_name: String) -> Self {
        Self { raw: Vec::new(), term_name }
    }

    fn capability_value(&self, name: &str) -> Option<String> {
        match name {
            "TN" | "name" => Some(self.term_name.clone()),
            "Co" | "colors" => Some("256".to_string()),
            "RGB" => Some("8/8/8".to_string()),
            _ => None,
        }
    }
}

impl DcsHandler for XtGetTcapHandler {
    fn put(&mut self, byte: u8) {
        self.raw.push(byte);
    }

    fn finish(self: Box<Self>) -> DcsOutcome {
        let mut entries = Vec::new();
        for part in self.raw.split(|&b| b == b';') {
            let Some(name_bytes) = hex_decode(part) else { continue };
            let Ok(name) = String::from_utf8(name_bytes.clone()) else { continue };
            if let Some(value) = self.capability_value(&name) {
                entries.push(format!("{}={}", hex_encode(&name_bytes), hex_encode(value.as_bytes())));
            }
        }
        if entries.is_empty() {
            DcsOutcome::Response(b"\x1bP0+r\x1b\\".to_vec())
        } else {
            DcsOutcome::Response(format!("\x1bP1+r{}\x1b\\", entries.join(";")).into_bytes())
        }
    }
}

/// `DCS $ q <Ds> ST` — echoes the request string back with the current
/// value spliced in, per the handful of settings this crate tracks.
struct DecrqssHandler {
    query: Vec<u8>,
    snapshot: DecrqssSnapshot,
}

impl DecrqssHandler {
    fn new(snapshot: DecrqssSnapshot) -> Self {
        Self { query: Vec::new(), snapshot }
    }
}

impl DcsHandler for DecrqssHandler {
    fn put(&mut self, byte: u8) {
        self.query.push(byte);
    }

    fn finish(self: Box<Self>) -> DcsOutcome {
        let response = match self.query.as_slice() {
            b"m" => {
                let params: Vec<String> = self.snapshot.sgr_params.iter().map(u16::to_string).collect();
                format!("\x1bP1$r{}m\x1b\\", params.join(";"))
            }
            b" q" => format!("\x1bP1$r{} q\x1b\\", self.snapshot.cursor_style_ps),
            b"r" => format!(
                "\x1bP1$r{};{}r\x1b\\",
                self.snapshot.scroll_top + 1,
                self.snapshot.scroll_bottom + 1
            ),
            _ => "\x1bP0$r\x1b\\".to_string(),
        };
        DcsOutcome::Response(response.into_bytes())
    }
}

/// `DCS t ... ST` — tmux control-mode passthrough. A real tmux client
/// parses `%begin`/`%end`-delimited notifications out of this stream;
/// that protocol is out of scope here, so the bytes are accepted (kept
/// out of cell output) and discarded rather than left to the default
/// ignore path, which would otherwise be indistinguishable from an
/// unrecognized sequence in a trace.
struct TmuxPassthroughHandler {
    buf: Vec<u8>,
}

impl TmuxPassthroughHandler {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }
}

impl DcsHandler for TmuxPassthroughHandler {
    fn put(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn finish(self: Box<Self>) -> DcsOutcome {
        DcsOutcome::None
    }
}

fn hex_decode(s: &[u8]) -> Option<Vec<u8>> {
    if s.is_empty() || s.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    for chunk in s.chunks(2) {
        let hi = (chunk[0] as char).to_digit(16)?;
        let lo = (chunk[1] as char).to_digit(16)?;
        out.push((hi * 16 + lo) as u8);
    }
    Some(out)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
