//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and windows, and wires each window to its GPU
//! surface.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
