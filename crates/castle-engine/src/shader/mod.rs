//! Post-process shader pipeline.
//!
//! A shader reads a layer's texture and writes the layer's processed target
//! in one fullscreen pass. Built-in effects and user fragments share one
//! binding contract (see `shaders/prelude.wgsl`):
//!
//! - `@group(0) @binding(0)` input texture
//! - `@group(0) @binding(1)` sampler
//! - `@group(0) @binding(2)` `PostFx { tint, resolution, coefficient, radius }`

mod kind;
mod program;
mod schedule;
mod source;

pub use kind::{ShaderKind, ShaderMode, ShaderUniforms};
pub use program::{ProcessedTarget, Shader};
pub use schedule::BakeSchedule;
pub use source::{compose_source, validate_wgsl};
