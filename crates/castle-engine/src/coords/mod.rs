//! Pixel geometry shared by the chunk store, layers and renderers.
//!
//! Canonical space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! Renderers convert to NDC in shaders using a viewport uniform.

mod rect;
mod viewport;

pub use rect::PixelRect;
pub use viewport::Viewport;
