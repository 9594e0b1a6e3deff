use thiserror::Error;

/// Cursor rendering hint, set at construction and mutable at runtime
/// via DECSCUSR (`CSI Ps SP q`); has no effect on parsing or buffer
/// state; a host reads it off `Terminal::options()` to draw the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Block,
    Underline,
    Bar,
}

impl Default for CursorStyle {
    fn default() -> Self {
        CursorStyle::Block
    }
}

/// How to treat code points with ambiguous East Asian width (Unicode
/// Ambiguous category): narrow (1 cell, the Western default) or wide (2
/// cells, common in CJK locales). A construction-time option rather
/// than a runtime CSI toggle, since no control sequence governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousWidth {
    Narrow,
    Wide,
}

impl Default for AmbiguousWidth {
    fn default() -> Self {
        AmbiguousWidth::Narrow
    }
}

/// Construction-time and `set_option`-mutable configuration.
/// Unlike `Terminal::feed`, which never errors, changing
/// options validates its input and can fail — there is no reasonable
/// "clamp and continue" for e.g. zero-sized geometry, so callers get an
/// explicit `Result` here instead of a silently-ignored clamp.
#[derive(Debug, Clone)]
pub struct Options {
    pub cols: u16,
    pub rows: u16,
    pub convert_eol: bool,
    pub term_name: String,
    pub cursor_style: CursorStyle,
    pub screen_reader_mode: bool,
    pub scrollback: usize,
    pub tab_stop_width: u16,
    pub enable_sixel: bool,
    pub sixel_cache_limit_bytes: usize,
    pub ambiguous_width: AmbiguousWidth,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            convert_eol: false,
            term_name: "xterm-256color".to_string(),
            cursor_style: CursorStyle::default(),
            screen_reader_mode: false,
            scrollback: 1000,
            tab_stop_width: 8,
            enable_sixel: true,
            sixel_cache_limit_bytes: 64 * 1024 * 1024,
            ambiguous_width: AmbiguousWidth::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("cols and rows must be at least 1, got {cols}x{rows}")]
    ZeroSizedGeometry { cols: u16, rows: u16 },
    #[error("tab_stop_width must be at least 1")]
    ZeroTabStopWidth,
    #[error("term_name must not be empty")]
    EmptyTermName,
}

impl Options {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(OptionsError::ZeroSizedGeometry {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if self.tab_stop_width == 0 {
            return Err(OptionsError::ZeroTabStopWidth);
        }
        if self.term_name.is_empty() {
            return Err(OptionsError::EmptyTermName);
        }
        Ok(())
    }
}
