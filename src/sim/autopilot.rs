//! Demo-mode player
//!
//! Steers toward the nearest coin by emitting the same key events a person
//! would, so it exercises the normal input path.

use glam::Vec3;

use super::input::{InputState, Key, KeyEvent};
use super::session::Session;
use crate::normalize_angle;

/// Heading error below which the character walks forward
const FACING_TOLERANCE: f32 = 0.15;
/// Run when the target is farther than this
const RUN_DISTANCE: f32 = 6.0;

/// Keys the autopilot wants held to approach `target`
pub fn desired_input(session: &Session, target: Vec3) -> InputState {
    let character = session.character();
    let to_target = (target - character.position).with_y(0.0);
    let desired_yaw = to_target.x.atan2(to_target.z);
    let error = normalize_angle(desired_yaw - character.yaw);
    let turn_step = session.tuning().turn_step;

    InputState {
        forward: error.abs() < FACING_TOLERANCE,
        left: error > turn_step / 2.0,
        right: error < -turn_step / 2.0,
        run: to_target.length() > RUN_DISTANCE,
        ..Default::default()
    }
}

/// Coin closest to the character on the ground plane
pub fn nearest_coin(session: &Session) -> Option<Vec3> {
    let here = session.character().position.with_y(0.0);
    session
        .coins()
        .map(|c| c.position)
        .min_by(|a, b| {
            let da = a.with_y(0.0).distance_squared(here);
            let db = b.with_y(0.0).distance_squared(here);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Key events to send this step.
///
/// Changed keys come first; when nothing changed but the character should
/// keep moving, a repeat of a held key stands in for keyboard auto-repeat.
pub fn next_events(session: &Session) -> Vec<KeyEvent> {
    let current = *session.input();
    let desired = if session.paused() {
        InputState::default()
    } else {
        nearest_coin(session)
            .map(|target| desired_input(session, target))
            .unwrap_or_default()
    };

    let mut events: Vec<KeyEvent> = Key::ALL
        .iter()
        .filter(|key| current.is_held(**key) != desired.is_held(**key))
        .map(|key| KeyEvent {
            key: *key,
            pressed: desired.is_held(*key),
        })
        .collect();

    if events.is_empty() && desired.is_moving() {
        let held = [Key::Forward, Key::Left, Key::Right]
            .into_iter()
            .find(|k| desired.is_held(*k));
        if let Some(key) = held {
            events.push(KeyEvent::down(key));
        }
    }
    events
}
