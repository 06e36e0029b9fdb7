//! Frame timing.
//!
//! - one [`FrameClock`] per window, ticked once per presented frame
//! - an [`FpsTimer`] to gate fixed-rate updates and measure their rate

mod fps_timer;
mod frame_clock;

pub use fps_timer::FpsTimer;
pub use frame_clock::{FrameClock, FrameTime};
