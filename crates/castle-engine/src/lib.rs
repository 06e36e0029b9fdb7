//! Castle engine crate.
//!
//! A 2D compositor built from layers: CPU layers are split into chunks that
//! are uploaded only when dirty, GPU layers are render targets drawn into
//! directly. Layers are composited in order with separate alpha blending and
//! may carry a post-process shader that runs every frame or only after their
//! content changed.
//!
//! The window runtime (`window`, `device`, `core`) is a thin collaborator:
//! everything under `layer`, `chunk`, `upload`, `render` and `shader` works
//! from a [`render::RenderCtx`] alone.

pub mod config;
pub mod error;

pub mod coords;
pub mod paint;
pub mod chunk;
pub mod upload;
pub mod layer;
pub mod render;
pub mod shader;
pub mod sprite;
pub mod text;
pub mod engine;

pub mod device;
pub mod window;
pub mod time;
pub mod core;
pub mod logging;

pub use config::EngineConfig;
pub use engine::{Engine, FrameStats};
pub use error::{RenderError, RenderResult};
pub use layer::{Backend, Layer, LayerId, Recording};
pub use paint::{Canvas, Color, ColorGenerator, Palette};
pub use shader::{Shader, ShaderKind, ShaderMode, ShaderUniforms};
pub use sprite::{Sprite, SpriteFrame};
