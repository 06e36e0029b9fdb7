//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the window
//! surface and hands out per-frame encoders. Layers and shaders only ever see
//! the device through a [`crate::render::RenderCtx`].

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
