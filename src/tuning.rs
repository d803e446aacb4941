//! Data-driven game balance
//!
//! Every gameplay constant lives here so a level designer can override them
//! from a JSON file without touching the simulation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
    #[error("pass threshold {needed} is unreachable with {coins} coins worth {points} each")]
    Unreachable { needed: u32, coins: u32, points: u32 },
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Levels ===
    /// Number of levels in a full run
    pub total_levels: u32,
    /// Points awarded per collected coin
    pub points_per_coin: u32,
    /// Score needed to clear a level
    pub points_to_pass: u32,
    /// Countdown at the start of each level (seconds)
    pub level_time_secs: u32,

    // === Coins ===
    /// Coins scattered per level
    pub coin_count: u32,
    /// Inner radius of the scatter annulus
    pub coin_base_distance: f32,
    /// Outer radius grows by this much per level
    pub coin_level_multiplier: f32,
    /// Height coins float at
    pub coin_height: f32,
    /// Cosmetic spin per rendered frame (radians)
    pub coin_spin_per_frame: f32,
    /// Pickup happens strictly inside this distance
    pub pickup_radius: f32,

    // === Character ===
    /// Translation per input event while walking
    pub move_step: f32,
    /// Step multiplier while running
    pub run_multiplier: f32,
    /// Yaw change per input event (radians)
    pub turn_step: f32,
    /// Yaw change per pixel of mouse movement (radians)
    pub mouse_sensitivity: f32,
    /// Animation cross-fade duration (seconds)
    pub fade_secs: f32,

    // === Camera ===
    /// Camera offset: y above, z behind the character
    pub camera_offset: Vec3,
    /// Camera looks at this height above the character's feet
    pub look_at_height: f32,

    // === UI ===
    /// How long a message stays up when the game is not paused (seconds)
    pub message_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            total_levels: 10,
            points_per_coin: 10,
            points_to_pass: 100,
            level_time_secs: 120,

            coin_count: 20,
            coin_base_distance: 150.0,
            coin_level_multiplier: 2.0,
            coin_height: 1.0,
            coin_spin_per_frame: 0.05,
            pickup_radius: 1.5,

            move_step: 0.2,
            run_multiplier: 2.0,
            turn_step: 0.05,
            mouse_sensitivity: 0.005,
            fade_secs: 0.2,

            camera_offset: Vec3::new(0.0, 7.0, 10.0),
            look_at_height: 2.0,

            message_secs: 3.0,
        }
    }
}

impl Tuning {
    /// Parse a JSON tuning file. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.total_levels == 0 {
            return Err(TuningError::Invalid("total_levels must be at least 1"));
        }
        if self.coin_count == 0 {
            return Err(TuningError::Invalid("coin_count must be at least 1"));
        }
        if self.points_per_coin == 0 {
            return Err(TuningError::Invalid("points_per_coin must be at least 1"));
        }
        if self.level_time_secs == 0 {
            return Err(TuningError::Invalid("level_time_secs must be at least 1"));
        }
        let floats = [
            self.coin_base_distance,
            self.coin_level_multiplier,
            self.coin_height,
            self.coin_spin_per_frame,
            self.pickup_radius,
            self.move_step,
            self.run_multiplier,
            self.turn_step,
            self.mouse_sensitivity,
            self.fade_secs,
            self.camera_offset.x,
            self.camera_offset.y,
            self.camera_offset.z,
            self.look_at_height,
            self.message_secs,
        ];
        if floats.iter().any(|x| !x.is_finite()) {
            return Err(TuningError::Invalid("every number must be finite"));
        }
        if !self.max_coin_distance(self.total_levels).is_finite() {
            return Err(TuningError::Invalid("coin distance overflows on the last level"));
        }
        if !(self.pickup_radius > 0.0) {
            return Err(TuningError::Invalid("pickup_radius must be positive"));
        }
        if self.coin_base_distance < 0.0 || self.coin_level_multiplier < 0.0 {
            return Err(TuningError::Invalid("coin distances must not be negative"));
        }
        let reachable = self.coin_count.saturating_mul(self.points_per_coin);
        if self.points_to_pass > reachable {
            return Err(TuningError::Unreachable {
                needed: self.points_to_pass,
                coins: self.coin_count,
                points: self.points_per_coin,
            });
        }
        Ok(())
    }

    /// Outer radius of the scatter annulus for a level
    #[inline]
    pub fn max_coin_distance(&self, level: u32) -> f32 {
        self.coin_base_distance + level as f32 * self.coin_level_multiplier
    }

    /// Step length for one movement event
    #[inline]
    pub fn step(&self, running: bool) -> f32 {
        if running {
            self.move_step * self.run_multiplier
        } else {
            self.move_step
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "total_levels": 3, "level_time_secs": 30 }"#).unwrap();
        assert_eq!(tuning.total_levels, 3);
        assert_eq!(tuning.level_time_secs, 30);
        assert_eq!(tuning.coin_count, 20);
        assert_eq!(tuning.pickup_radius, 1.5);
    }

    #[test]
    fn test_unreachable_threshold_rejected() {
        let err = Tuning::from_json(r#"{ "coin_count": 5, "points_to_pass": 100 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Unreachable { needed: 100, coins: 5, points: 10 }));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_zero_pickup_radius_rejected() {
        let tuning = Tuning {
            pickup_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_infinite_multiplier_rejected() {
        // 1e39 overflows f32 to infinity while parsing
        let err = Tuning::from_json(r#"{ "coin_level_multiplier": 1e39 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_overflowing_outer_radius_rejected() {
        let tuning = Tuning {
            coin_level_multiplier: f32::MAX,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_nan_camera_offset_rejected() {
        let tuning = Tuning {
            camera_offset: Vec3::new(0.0, f32::NAN, 10.0),
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }

    #[test]
    fn test_max_distance_grows_with_level() {
        let tuning = Tuning::default();
        assert_eq!(tuning.max_coin_distance(1), 152.0);
        assert_eq!(tuning.max_coin_distance(10), 170.0);
        assert_eq!(tuning.step(false), 0.2);
        assert!((tuning.step(true) - 0.4).abs() < 1e-6);
    }
}
