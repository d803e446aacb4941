//! Coin Quest - A third-person coin collecting game
//!
//! Core modules:
//! - `sim`: Deterministic gameplay (input, movement, coins, levels, timer)
//! - `tuning`: Data-driven game balance
//! - `audio`: Music and sound effect playback
//! - `settings`: Player preferences persisted in LocalStorage
//! - `ui`: HUD strings and the message overlay

pub mod audio;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Values that are not part of game balance
pub mod consts {
    /// Countdown interval in milliseconds
    pub const TIMER_INTERVAL_MS: i32 = 1000;
    /// Upper bound on a single frame delta (seconds), avoids huge mixer jumps after tab switches
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Asset paths served next to index.html
    pub const MAP_MODEL: &str = "/public/Model.glb";
    pub const CHARACTER_MODEL: &str = "/public/character.glb";
    pub const WALK_CLIP: &str = "/public/Walking.glb";
    pub const RUN_CLIP: &str = "/public/Running.glb";
    pub const JUMP_CLIP: &str = "/public/jumping.glb";
    pub const COIN_TEXTURE: &str = "/public/coin.jpeg";
    pub const MUSIC_TRACK: &str = "/public/space-station-247790.mp3";
    pub const COIN_SOUND: &str = "/public/coin-sound.mp3";
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) on the ground plane to a point at height `y`
#[inline]
pub fn polar_to_ground(r: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Horizontal distance from the origin
#[inline]
pub fn ground_radius(pos: Vec3) -> f32 {
    (pos.x * pos.x + pos.z * pos.z).sqrt()
}
