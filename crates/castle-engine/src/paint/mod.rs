//! Pixel colors and procedural color generation.
//!
//! Scope:
//! - straight-alpha 8-bit `Color` (the layer storage format)
//! - palettes and the seeded noise generator
//! - the `Canvas` drawing contract shared by every writable surface

mod canvas;
mod color;
mod grid;
mod palette;

pub use canvas::Canvas;
pub use color::Color;
pub use grid::paint_grid;
pub use palette::{noise, ColorGenerator, Palette};
