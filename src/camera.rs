// camera.rs - 全景相机：拖拽转向、松手惯性、捏合缩放

use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Radians of yaw/pitch per pixel of pan movement.
pub const PAN_SENSITIVITY: f32 = 0.005;
/// Pitch stays within ±90% of straight up/down so the view never flips over a pole.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 * 0.9;

pub const DEFAULT_FOV: f32 = 80.0;
pub const MIN_FOV: f32 = 30.0;
pub const MAX_FOV: f32 = 100.0;

/// Per-tick velocity multiplier while decelerating.
pub const DECELERATION_FACTOR: f32 = 0.95;
/// Converts release velocity (px/s) into yaw radians per tick.
pub const VELOCITY_TO_YAW_SCALE: f32 = 0.00005;
/// Below this speed deceleration stops.
pub const VELOCITY_THRESHOLD: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Pointer moved by `(dx, dy)` since the previous sample.
    PanChanged { dx: f32, dy: f32 },
    /// Pointer released with horizontal velocity.
    PanEnded { velocity_x: f32 },
    PinchBegan,
    /// Cumulative scale since the pinch began.
    PinchChanged { scale: f32 },
    PinchEnded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Idle,
    Panning,
    Decelerating { velocity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    fov: f32,
    motion: Motion,
    gesture_anchor_fov: Option<f32>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: DEFAULT_FOV,
            motion: Motion::Idle,
            gesture_anchor_fov: None,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn field_of_view(&self) -> f32 {
        self.fov
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_decelerating(&self) -> bool {
        matches!(self.motion, Motion::Decelerating { .. })
    }

    /// Zero unless decelerating.
    pub fn angular_velocity(&self) -> f32 {
        match self.motion {
            Motion::Decelerating { velocity } => velocity,
            _ => 0.0,
        }
    }

    pub fn gesture_anchor_fov(&self) -> Option<f32> {
        self.gesture_anchor_fov
    }

    pub fn orientation(&self) -> Orientation {
        Orientation {
            yaw: self.yaw,
            pitch: self.pitch,
            fov: self.fov,
        }
    }

    /// Unit look direction. Yaw 0 / pitch 0 looks down -Z, positive pitch looks up.
    pub fn forward(&self) -> Vec3 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        rotation * Vec3::NEG_Z
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn apply(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::PanChanged { dx, dy } => self.apply_pan(dx, dy),
            GestureEvent::PanEnded { velocity_x } => self.begin_deceleration(velocity_x),
            GestureEvent::PinchBegan => self.begin_zoom(),
            GestureEvent::PinchChanged { scale } => self.apply_zoom(scale),
            GestureEvent::PinchEnded => self.end_zoom(),
        }
    }

    /// Direct manipulation. Cancels any running deceleration.
    pub fn apply_pan(&mut self, dx: f32, dy: f32) {
        if self.is_decelerating() {
            log::debug!("pan resumed, deceleration cancelled");
        }
        self.motion = Motion::Panning;

        if dx.is_finite() {
            self.yaw -= dx * PAN_SENSITIVITY;
        }
        if dy.is_finite() {
            self.pitch = clamp_pitch(self.pitch - dy * PAN_SENSITIVITY);
        }
    }

    pub fn begin_deceleration(&mut self, velocity_x: f32) {
        let velocity = if velocity_x.is_finite() { velocity_x } else { 0.0 };
        log::debug!("deceleration started at {:.1}", velocity);
        self.motion = Motion::Decelerating { velocity };
    }

    /// One deceleration step. Returns `true` while still decelerating
    /// afterwards; a no-op returning `false` in any other state.
    pub fn tick(&mut self) -> bool {
        let Motion::Decelerating { velocity } = self.motion else {
            return false;
        };

        let velocity = velocity * DECELERATION_FACTOR;
        self.yaw -= velocity * VELOCITY_TO_YAW_SCALE;

        if velocity.abs() < VELOCITY_THRESHOLD {
            self.motion = Motion::Idle;
            log::debug!("deceleration finished");
            false
        } else {
            self.motion = Motion::Decelerating { velocity };
            true
        }
    }

    /// Run up to `ticks` deceleration steps, returning how many had an effect.
    pub fn advance(&mut self, ticks: u32) -> u32 {
        let mut consumed = 0;
        for _ in 0..ticks {
            if !self.is_decelerating() {
                break;
            }
            self.tick();
            consumed += 1;
        }
        consumed
    }

    pub fn begin_zoom(&mut self) {
        self.gesture_anchor_fov = Some(self.fov);
    }

    /// `scale` is cumulative since the pinch began. Non-positive or
    /// non-finite scales are ignored.
    pub fn apply_zoom(&mut self, scale: f32) {
        if !(scale.is_finite() && scale > 0.0) {
            log::debug!("ignoring zoom scale {}", scale);
            return;
        }
        let anchor = *self.gesture_anchor_fov.get_or_insert(self.fov);
        self.fov = clamp_fov(anchor / scale);
    }

    pub fn end_zoom(&mut self) {
        self.gesture_anchor_fov = None;
    }
}

pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

pub fn clamp_fov(fov: f32) -> f32 {
    fov.clamp(MIN_FOV, MAX_FOV)
}
