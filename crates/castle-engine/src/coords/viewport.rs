/// Viewport size in logical pixels.
///
/// Renderers upload this to their viewport uniform and convert pixel
/// positions to NDC in the vertex shader. Layer recordings install a
/// viewport sized to the layer, so layer pixels map 1:1 to target texels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Orthographic viewport covering a `width × height` pixel target.
    #[inline]
    pub fn for_target(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Maps a logical pixel position to clip space (+Y up).
    ///
    /// Mirrors the conversion done by the layer vertex shaders.
    #[inline]
    pub fn to_ndc(self, x: f32, y: f32) -> [f32; 2] {
        [
            x / self.width.max(1.0) * 2.0 - 1.0,
            1.0 - y / self.height.max(1.0) * 2.0,
        ]
    }
}
