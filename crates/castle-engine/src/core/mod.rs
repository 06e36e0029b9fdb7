//! Contract between the window runtime and applications.
//!
//! The runtime owns windows and the GPU device; applications see a
//! [`FrameCtx`] per frame and composite their layers through it.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
