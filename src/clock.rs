use std::time::{Duration, Instant};

/// Monotonic time source for the frame loop. Sessions record the value of
/// `now()` when they start and measure elapsed time against it.
pub trait Clock {
    fn now(&self) -> Duration;

    /// Called once at the end of every frame.
    fn on_frame(&mut self) {}
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock driven by frame count, for headless runs and tests.
pub struct FrameClock {
    frames: u64,
    fps: u64,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        FrameClock {
            frames: 0,
            fps: u64::from(fps.max(1)),
        }
    }

    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
    }
}

impl Clock for FrameClock {
    fn now(&self) -> Duration {
        let secs = self.frames / self.fps;
        let rest = self.frames % self.fps;
        Duration::from_secs(secs) + Duration::from_nanos(rest * 1_000_000_000 / self.fps)
    }

    fn on_frame(&mut self) {
        self.advance(1);
    }
}
