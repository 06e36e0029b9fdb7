use crate::paint::Color;

// ── gpu blend states ──────────────────────────────────────────────────────

/// Straight-alpha source-over with separate alpha factors.
///
/// Color: `src * a_src + dst * (1 - a_src)`.
/// Alpha: `a_src + a_dst * (1 - a_src)`, so alpha accumulates correctly when
/// layers are composited into an offscreen target.
pub fn layer_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// `src + dst` on every channel. Used to lay glow and bloom output over the frame.
pub fn additive_blend() -> wgpu::BlendState {
    let add = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: add, alpha: add }
}

/// How a layer's texture is combined with what is already in the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompositeBlend {
    Alpha,
    Additive,
}

impl CompositeBlend {
    pub fn state(self) -> wgpu::BlendState {
        match self {
            CompositeBlend::Alpha => layer_blend(),
            CompositeBlend::Additive => additive_blend(),
        }
    }

    /// CPU evaluation of the same equation on 8-bit colors.
    pub fn apply(self, dst: Color, src: Color) -> Color {
        match self {
            CompositeBlend::Alpha => blend_over(dst, src),
            CompositeBlend::Additive => Color::rgba(
                dst.r.saturating_add(src.r),
                dst.g.saturating_add(src.g),
                dst.b.saturating_add(src.b),
                dst.a.saturating_add(src.a),
            ),
        }
    }
}

// ── cpu reference ─────────────────────────────────────────────────────────

/// Composites `src` over `dst` with [`layer_blend`] factors, rounding to bytes.
pub fn blend_over(dst: Color, src: Color) -> Color {
    let sa = src.a as f32 / 255.0;
    let ch = |s: u8, d: u8| (s as f32 * sa + d as f32 * (1.0 - sa)).round() as u8;
    let a = (src.a as f32 + dst.a as f32 * (1.0 - sa)).round().min(255.0) as u8;
    Color::rgba(ch(src.r, dst.r), ch(src.g, dst.g), ch(src.b, dst.b), a)
}
