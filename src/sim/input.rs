//! Keyboard input tracking
//!
//! `InputState` is a plain value updated by a pure reducer so movement and
//! animation logic can be driven without a live event source.

use serde::{Deserialize, Serialize};

/// Movement keys the game recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Run,
    Jump,
}

impl Key {
    pub const ALL: [Key; 6] = [
        Key::Forward,
        Key::Backward,
        Key::Left,
        Key::Right,
        Key::Run,
        Key::Jump,
    ];

    /// Map a DOM `KeyboardEvent.code` to a movement key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(Key::Forward),
            "KeyS" => Some(Key::Backward),
            "KeyA" => Some(Key::Left),
            "KeyD" => Some(Key::Right),
            "ShiftLeft" => Some(Key::Run),
            "Space" => Some(Key::Jump),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Key::Forward => "KeyW",
            Key::Backward => "KeyS",
            Key::Left => "KeyA",
            Key::Right => "KeyD",
            Key::Run => "ShiftLeft",
            Key::Jump => "Space",
        }
    }
}

/// A key going down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self { key, pressed: true }
    }

    pub fn up(key: Key) -> Self {
        Self { key, pressed: false }
    }
}

/// Non-movement controls, matched on `KeyboardEvent.key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Dismiss the end-of-level message and (re)load
    Acknowledge,
    /// Pause/resume background music
    ToggleMute,
    /// Let the autopilot play
    ToggleDemo,
}

impl Control {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Control::Acknowledge),
            "m" => Some(Control::ToggleMute),
            "i" | "I" => Some(Control::ToggleDemo),
            _ => None,
        }
    }
}

/// Currently held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub jump: bool,
}

impl InputState {
    /// Fold one key event into the state. Key repeat is a no-op.
    #[must_use]
    pub fn apply(mut self, event: KeyEvent) -> Self {
        *self.flag_mut(event.key) = event.pressed;
        self
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Backward => self.backward,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Run => self.run,
            Key::Jump => self.jump,
        }
    }

    /// Any key that changes the character transform
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    fn flag_mut(&mut self, key: Key) -> &mut bool {
        match key {
            Key::Forward => &mut self.forward,
            Key::Backward => &mut self.backward,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Run => &mut self.run,
            Key::Jump => &mut self.jump,
        }
    }
}
