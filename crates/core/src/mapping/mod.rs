use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::ReactiveConfig;

/// Scale and rotation applied to a frame when it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTransform {
    pub scale: f32,
    /// Rotation in radians, unbounded.
    pub rotation: f32,
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Linearly remaps `value` from `[in_min, in_max]` onto `[out_min, out_max]`
/// without clamping.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (value - in_min) / (in_max - in_min) * (out_max - out_min)
}

/// Maps an audio level onto the display scale, clamped to the configured
/// scale range. Inverted bounds are reordered and a NaN bound is ignored.
pub fn reactive_scale(level: f32, config: &ReactiveConfig) -> f32 {
    let low = config.min_scale.min(config.max_scale);
    let high = config.max_scale.max(config.min_scale);
    map_range(
        level,
        0.0,
        config.level_ceiling,
        config.min_scale,
        config.max_scale,
    )
    .max(low)
    .min(high)
}

/// Direction of a held rotation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'a' => Some(Self::Clockwise),
            's' => Some(Self::CounterClockwise),
            _ => None,
        }
    }
}

/// Accumulates frame rotation while rotation keys are held.
#[derive(Debug, Default, Clone)]
pub struct ReactiveTransform {
    rotation: f32,
    clockwise_held: bool,
    counter_clockwise_held: bool,
}

impl ReactiveTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&mut self, direction: RotationDirection, held: bool) {
        match direction {
            RotationDirection::Clockwise => self.clockwise_held = held,
            RotationDirection::CounterClockwise => self.counter_clockwise_held = held,
        }
    }

    /// Advances rotation by one frame and returns the transform for `level`.
    pub fn advance(&mut self, level: f32, config: &ReactiveConfig) -> FrameTransform {
        if self.clockwise_held {
            self.rotation += config.rotation_step;
        }
        if self.counter_clockwise_held {
            self.rotation -= config.rotation_step;
        }

        FrameTransform {
            scale: reactive_scale(level, config),
            rotation: self.rotation,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Rotation folded into `[0, 360)` degrees.
    pub fn rotation_degrees(&self) -> f32 {
        let degrees = self.rotation.rem_euclid(TAU).to_degrees();
        if degrees >= 360.0 {
            0.0
        } else {
            degrees
        }
    }

    /// Returns to the unrotated state and releases held keys.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
