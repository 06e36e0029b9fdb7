//! Text written into layers as glyph coverage.
//!
//! Fonts are loaded with fontdue; glyphs are rasterized per draw and written
//! through [`Canvas`](crate::paint::Canvas) like any other pixel client.

mod draw;
mod font_system;

pub use draw::{draw_text, text_width, TextStyle};
pub use font_system::{FontId, FontSystem};
