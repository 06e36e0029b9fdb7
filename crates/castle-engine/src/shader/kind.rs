use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::render::CompositeBlend;

/// Built-in post-process effects plus user-supplied fragments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Mixes toward the tint-multiplied color by `coefficient`.
    Tint,
    /// Desaturates toward Rec.601 luma by `coefficient`.
    Grayscale,
    /// Adds a weighted 5×5 blur on top of the layer.
    Glow,
    /// Adds a cross blur of the bright (luma > 0.75) areas.
    Bloom,
    Custom,
}

impl ShaderKind {
    pub(crate) fn builtin_fragment(self) -> Option<&'static str> {
        match self {
            ShaderKind::Tint => Some(include_str!("shaders/tint.wgsl")),
            ShaderKind::Grayscale => Some(include_str!("shaders/grayscale.wgsl")),
            ShaderKind::Glow => Some(include_str!("shaders/glow.wgsl")),
            ShaderKind::Bloom => Some(include_str!("shaders/bloom.wgsl")),
            ShaderKind::Custom => None,
        }
    }

    /// Blend used when the processed output is composited.
    ///
    /// Glow and bloom carry the base image plus light, and are added on top of
    /// the frame.
    pub fn composite_blend(self) -> CompositeBlend {
        match self {
            ShaderKind::Glow | ShaderKind::Bloom => CompositeBlend::Additive,
            _ => CompositeBlend::Alpha,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Tint => "tint",
            ShaderKind::Grayscale => "grayscale",
            ShaderKind::Glow => "glow",
            ShaderKind::Bloom => "bloom",
            ShaderKind::Custom => "custom",
        }
    }
}

/// When an attached shader is recomputed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ShaderMode {
    /// Attached but inactive; the layer composites unshaded.
    #[default]
    None,
    /// Recomputed on every composite.
    EachFrame,
    /// Recomputed only after the layer content changed.
    BakeOnDirty,
}

/// Per-layer effect parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShaderUniforms {
    pub coefficient: f32,
    /// Defaults to opaque white.
    pub tint: Option<Color>,
    /// Sampling distance in texels. Defaults to 1.
    pub radius: Option<f32>,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ShaderUniforms {
    pub const fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            tint: None,
            radius: None,
        }
    }

    pub const fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    pub const fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub(crate) fn to_gpu(self, width: u32, height: u32) -> PostFxUniform {
        PostFxUniform {
            tint: self.tint.unwrap_or(Color::WHITE).to_f32(),
            resolution: [width as f32, height as f32],
            coefficient: self.coefficient,
            radius: self.radius.unwrap_or(1.0),
        }
    }
}

/// GPU layout of the `PostFx` uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub(crate) struct PostFxUniform {
    pub tint: [f32; 4],
    pub resolution: [f32; 2],
    pub coefficient: f32,
    pub radius: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_uniforms_use_defaults() {
        let u = ShaderUniforms::new(0.5).to_gpu(640, 480);
        assert_eq!(u.tint, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(u.radius, 1.0);
        assert_eq!(u.resolution, [640.0, 480.0]);
        assert_eq!(u.coefficient, 0.5);
    }

    #[test]
    fn explicit_uniforms_pass_through() {
        let u = ShaderUniforms::new(2.0)
            .with_tint(Color::rgba(255, 0, 0, 255))
            .with_radius(3.0)
            .to_gpu(1, 1);
        assert_eq!(u.tint, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.radius, 3.0);
    }

    #[test]
    fn uniform_block_is_32_bytes() {
        assert_eq!(std::mem::size_of::<PostFxUniform>(), 32);
    }

    #[test]
    fn light_effects_composite_additively() {
        assert_eq!(ShaderKind::Glow.composite_blend(), CompositeBlend::Additive);
        assert_eq!(ShaderKind::Bloom.composite_blend(), CompositeBlend::Additive);
        assert_eq!(ShaderKind::Tint.composite_blend(), CompositeBlend::Alpha);
        assert_eq!(ShaderKind::Custom.composite_blend(), CompositeBlend::Alpha);
    }
}
