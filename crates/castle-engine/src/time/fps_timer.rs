use std::time::{Duration, Instant};

/// Longest frame gap the accumulator accepts.
const MAX_LAG: Duration = Duration::from_millis(250);

/// Fixed-rate update gate with a measured FPS.
///
/// Call [`FpsTimer::should_update`] every loop iteration; it returns `true`
/// at most once per `1 / target_fps` of accumulated time. Gaps longer than
/// 0.25 s are clamped, so a stall does not trigger a burst of catch-up steps.
///
/// The FPS value counts accepted updates and is refreshed once per second,
/// with a preliminary estimate after the first 0.1 s of a window.
#[derive(Debug, Clone)]
pub struct FpsTimer {
    step: f64,
    last: Instant,
    accumulator: f64,
    window_start: Instant,
    window_frames: u32,
    fps: f64,
}

impl FpsTimer {
    pub fn new(target_fps: f64) -> Self {
        Self::starting_at(target_fps, Instant::now())
    }

    /// Timer whose clock starts at `now`.
    pub fn starting_at(target_fps: f64, now: Instant) -> Self {
        let target_fps = if target_fps > 0.0 && target_fps.is_finite() {
            target_fps
        } else {
            log::warn!("invalid target fps {target_fps}; using 60");
            60.0
        };
        Self {
            step: 1.0 / target_fps,
            last: now,
            accumulator: 0.0,
            window_start: now,
            window_frames: 0,
            fps: 0.0,
        }
    }

    #[inline]
    pub fn target_fps(&self) -> f64 {
        1.0 / self.step
    }

    /// Last measured updates per second.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn should_update(&mut self) -> bool {
        self.should_update_at(Instant::now())
    }

    /// [`FpsTimer::should_update`] against an explicit clock.
    pub fn should_update_at(&mut self, now: Instant) -> bool {
        let dt = now.saturating_duration_since(self.last).min(MAX_LAG);
        self.last = now;
        self.accumulator += dt.as_secs_f64();

        if self.accumulator < self.step {
            return false;
        }
        self.accumulator -= self.step;
        self.window_frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.window_frames as f64 / elapsed;
            self.window_frames = 0;
            self.window_start = now;
        } else if elapsed > 0.1 {
            self.fps = self.window_frames as f64 / elapsed;
        }
        true
    }
}
