// frame.rs - 固定步长帧时钟：把经过的时间换算成惯性 tick 数

use std::time::{Duration, Instant};

/// Deceleration constants were tuned for a 60 Hz display refresh.
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;
/// After a long stall (window drag, breakpoint) at most this many ticks are
/// replayed in one frame; the rest of the backlog is dropped.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// Source of deceleration ticks for the camera.
pub trait FrameClock {
    /// Ticks due since the previous call.
    fn ticks_due(&mut self, now: Instant) -> u32;

    /// Forget accumulated time, e.g. when a new page is shown.
    fn reset(&mut self, now: Instant);
}

#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: Duration,
    last: Instant,
    accumulator: Duration,
}

impl FixedStepClock {
    pub fn new(rate_hz: u32, now: Instant) -> Self {
        let rate_hz = rate_hz.max(1);
        Self {
            step: Duration::from_secs(1) / rate_hz,
            last: now,
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl FrameClock for FixedStepClock {
    fn ticks_due(&mut self, now: Instant) -> u32 {
        // Instant 单调，但测试里可能传入更早的时间点
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
            if ticks == MAX_TICKS_PER_FRAME {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    fn reset(&mut self, now: Instant) {
        self.last = now;
        self.accumulator = Duration::ZERO;
    }
}

/// Frames-per-second counter for the status bar.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn frame(&mut self, now: Instant) {
        self.frames += 1;
        let secs = now.duration_since(self.window_start).as_secs_f32();
        if secs >= 1.0 {
            self.fps = self.frames as f32 / secs;
            self.frames = 0;
            self.window_start = now;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
