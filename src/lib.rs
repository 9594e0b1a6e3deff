pub mod buffer;
pub mod cell;
pub mod charset;
pub mod delegate;
pub mod keys;
pub mod line;
pub mod options;
pub mod sixel;
pub mod style;
pub mod terminal;

pub use delegate::{ColorSlot, Delegate, MouseMode, NullDelegate, SizeSpec, TitleKind, WindowSize};
pub use options::{AmbiguousWidth, CursorStyle, Options, OptionsError};
pub use sixel::SixelImage;
pub use terminal::{MouseEncoding, Terminal};
