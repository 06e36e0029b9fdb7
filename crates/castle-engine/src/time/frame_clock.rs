use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Per-window clock producing [`FrameTime`] snapshots.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Clock with custom delta-time clamps; the bounds are swapped if reversed.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        let (dt_min, dt_max) = if dt_min <= dt_max { (dt_min, dt_max) } else { (dt_max, dt_min) };
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline, e.g. after resuming from suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// [`FrameClock::tick`] against an explicit clock.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
