// input.rs - 鼠标/触控板输入 -> 手势事件（拖拽增量、松手速度、滚轮捏合）

use crate::camera::GestureEvent;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Only pointer samples this recent contribute to the release velocity.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);
/// Each wheel line scales the view like a pinch by this factor.
const WHEEL_STEP_SCALE: f32 = 1.1;
/// A wheel "pinch" ends after this long without wheel input.
const WHEEL_IDLE_END: Duration = Duration::from_millis(250);

/// Converts a physical pixel position to logical points, the unit the pan
/// sensitivity and fling velocity are tuned in.
pub fn to_points(x: f64, y: f64, scale_factor: f64) -> (f32, f32) {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    ((x / scale) as f32, (y / scale) as f32)
}

/// Turns absolute pointer positions (in points) into incremental pan deltas
/// and a release velocity in points/s.
#[derive(Debug, Default)]
pub struct PanTracker {
    last: Option<(f32, f32)>,
    samples: VecDeque<(Instant, f32)>,
}

impl PanTracker {
    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    pub fn press(&mut self, x: f32, y: f32, now: Instant) {
        self.last = Some((x, y));
        self.samples.clear();
        self.samples.push_back((now, x));
    }

    pub fn moved(&mut self, x: f32, y: f32, now: Instant) -> Option<GestureEvent> {
        let (lx, ly) = self.last?;
        self.last = Some((x, y));

        self.samples.push_back((now, x));
        while let Some(&(t, _)) = self.samples.front() {
            if now.saturating_duration_since(t) > VELOCITY_WINDOW && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }

        Some(GestureEvent::PanChanged {
            dx: x - lx,
            dy: y - ly,
        })
    }

    pub fn release(&mut self, now: Instant) -> Option<GestureEvent> {
        self.last.take()?;
        let velocity_x = self.velocity_x(now);
        self.samples.clear();
        Some(GestureEvent::PanEnded { velocity_x })
    }

    fn velocity_x(&self, now: Instant) -> f32 {
        let (Some(&(t0, x0)), Some(&(t1, x1))) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        // 松手前停顿过久视为静止
        if now.saturating_duration_since(t1) > VELOCITY_WINDOW {
            return 0.0;
        }
        let dt = t1.saturating_duration_since(t0).as_secs_f32();
        if dt <= f32::EPSILON {
            return 0.0;
        }
        (x1 - x0) / dt
    }
}

/// Synthesizes a pinch gesture from wheel and touchpad-magnify input.
#[derive(Debug, Default)]
pub struct ZoomGesture {
    scale: f32,
    last_input: Option<Instant>,
}

impl ZoomGesture {
    /// Wheel lines: positive zooms in. Returns the events to apply in order.
    pub fn wheel(&mut self, lines: f32, now: Instant) -> Vec<GestureEvent> {
        self.step(WHEEL_STEP_SCALE.powf(lines), now)
    }

    /// Touchpad magnify delta (0.1 = 10% larger).
    pub fn magnify(&mut self, delta: f32, now: Instant) -> Vec<GestureEvent> {
        self.step(1.0 + delta, now)
    }

    fn step(&mut self, factor: f32, now: Instant) -> Vec<GestureEvent> {
        let mut events = Vec::with_capacity(2);
        if self.last_input.is_none() {
            self.scale = 1.0;
            events.push(GestureEvent::PinchBegan);
        }
        self.last_input = Some(now);

        if factor.is_finite() && factor > 0.0 {
            self.scale *= factor;
            events.push(GestureEvent::PinchChanged { scale: self.scale });
        }
        events
    }

    /// Ends the synthetic pinch once input has gone quiet.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        let last = self.last_input?;
        if now.saturating_duration_since(last) >= WHEEL_IDLE_END {
            self.last_input = None;
            return Some(GestureEvent::PinchEnded);
        }
        None
    }
}
