//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and builds them
//! lazily for the target format it is first used with.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.
//! - Every texture stores row 0 at the top and is sampled with UV (0,0)-(1,1).

mod blend;
pub mod compositor;
mod ctx;
pub(crate) mod fill;
pub(crate) mod quad;
pub mod software;

pub use blend::{additive_blend, blend_over, layer_blend, CompositeBlend};
pub use compositor::{Compositor, DrawItem};
pub use ctx::{RenderCtx, RenderTarget};
pub use fill::FillRenderer;

/// Format of layer textures, processed targets and sprite textures.
///
/// Bytes written by the CPU are sampled back unchanged.
pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
