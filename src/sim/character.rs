//! Player character transform and movement
//!
//! Movement is applied once per input event, not integrated over frame time,
//! so walking speed follows the keyboard's repeat rate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::input::InputState;
use crate::tuning::Tuning;

/// Character position on the map and heading
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub position: Vec3,
    /// Rotation about the vertical axis (radians)
    pub yaw: f32,
}

impl Character {
    /// Local +Z axis in world space
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    /// Apply one input event's worth of movement and turning
    pub fn apply_input(&mut self, input: &InputState, tuning: &Tuning) {
        let step = tuning.step(input.run);
        if input.forward {
            self.translate_forward(step);
        }
        if input.backward {
            self.translate_forward(-step);
        }
        if input.left {
            self.yaw += tuning.turn_step;
        }
        if input.right {
            self.yaw -= tuning.turn_step;
        }
    }

    /// Turn from relative mouse movement (pixels)
    pub fn rotate_by_mouse(&mut self, movement_x: f32, tuning: &Tuning) {
        self.yaw -= movement_x * tuning.mouse_sensitivity;
    }

    /// Back to the origin facing +Z
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn translate_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }
}
