//! Deterministic gameplay module
//!
//! All gameplay logic lives here. This module must stay free of browser and
//! rendering dependencies:
//! - Seeded RNG only
//! - Stable iteration order (coins in spawn order)
//! - Time enters only through explicit frame deltas and timer ticks

pub mod animation;
pub mod autopilot;
pub mod camera;
pub mod character;
pub mod collision;
pub mod field;
pub mod input;
pub mod level;
pub mod session;

pub use animation::{AnimState, AnimationBindings, AnimationSelector, ClipHandle, select};
pub use camera::{CameraPose, follow};
pub use character::Character;
pub use collision::{collect_pickups, within_pickup_range};
pub use field::{Collectible, CollectibleField};
pub use input::{Control, InputState, Key, KeyEvent};
pub use level::{Acknowledged, Countdown, LevelPhase, LevelState, TickOutcome, TimerToken};
pub use session::{FrameOutput, GameEvent, Session};
