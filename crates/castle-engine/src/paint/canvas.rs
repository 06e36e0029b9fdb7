use super::Color;

/// Pixel-addressable drawing surface.
///
/// Implemented by CPU chunk grids, layers (both backends) and in-memory
/// textures. Coordinates are top-left origin pixels; rect corners are
/// inclusive and may be given in any order. Writes outside the surface are
/// dropped by the implementation.
pub trait Canvas {
    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);
}
