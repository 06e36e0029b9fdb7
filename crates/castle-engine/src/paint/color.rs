/// Straight-alpha RGBA color with 8-bit channels.
///
/// This is the storage format of every layer pixel. Blending happens at
/// composite time; colors are never premultiplied in storage.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self::rgba(b[0], b[1], b[2], b[3])
    }

    /// Multiplies each channel by the matching channel of `m`, scaled to `[0, 255]`.
    ///
    /// A white modifier leaves the color unchanged.
    #[inline]
    pub fn modulate(self, m: Color) -> Self {
        let mul = |c: u8, m: u8| ((c as u16 * m as u16) / 255) as u8;
        Self::rgba(
            mul(self.r, m.r),
            mul(self.g, m.g),
            mul(self.b, m.b),
            mul(self.a, m.a),
        )
    }

    /// Normalized `[r, g, b, a]` floats for shader uniforms and vertex data.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Clear color for render passes.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_f32();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}
