use std::time::Instant;

/// Upper bound on a single frame delta, so a stalled window does not fling
/// the simulation forward.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Wall-clock frame timer, reset on every tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous tick, clamped to `MAX_FRAME_DELTA`.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32().min(MAX_FRAME_DELTA);
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
