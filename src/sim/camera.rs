//! Third-person follow camera

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::character::Character;
use crate::tuning::Tuning;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

/// Place the camera behind and above the character, rotated with its heading
pub fn follow(character: &Character, tuning: &Tuning) -> CameraPose {
    let offset = tuning.camera_offset;
    let (sin, cos) = character.yaw.sin_cos();
    let eye = character.position + Vec3::new(-sin * offset.z, offset.y, -cos * offset.z);
    let target = character.position + Vec3::new(0.0, tuning.look_at_height, 0.0);
    CameraPose { eye, target }
}
