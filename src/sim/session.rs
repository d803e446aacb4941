//! Game session: all mutable gameplay state behind one owner
//!
//! Every host callback (key, mouse, interval tick, animation frame) goes
//! through a `Session` method and leaves the state consistent before it
//! returns. Things the host has to mirror into the scene or the DOM are
//! queued as `GameEvent`s.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::animation::{AnimState, AnimationBindings, AnimationSelector, ClipHandle};
use super::camera::{CameraPose, follow};
use super::character::Character;
use super::collision::collect_pickups;
use super::field::{Collectible, CollectibleField};
use super::input::{Control, InputState, Key, KeyEvent};
use super::level::{Acknowledged, LevelPhase, LevelState, TimerToken};
use crate::audio::{Sound, SoundPlayer};
use crate::tuning::Tuning;
use crate::ui::{GAME_COMPLETE_MSG, LEVEL_COMPLETE_MSG, LEVEL_FAILED_MSG, Overlay};

/// Something the host must reflect in the scene or the DOM
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CoinSpawned { id: u32, position: Vec3 },
    CoinRemoved { id: u32 },
    ScoreChanged(u32),
    TimerChanged(u32),
    LevelLoaded(u32),
    /// Cancel the running interval and start one delivering this token
    TimerRestarted(TimerToken),
    /// Cancel the running interval
    TimerStopped,
    MessageShown(String),
    MessageHidden,
    AnimationChanged(AnimState),
}

/// Per-frame result handed back to the render loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// New camera pose, or None to leave the camera frozen
    pub camera: Option<CameraPose>,
    pub character: Character,
    /// Coins picked up this frame
    pub pickups: usize,
}

/// One play session from level 1 to the end
pub struct Session {
    tuning: Tuning,
    rng: Pcg32,
    input: InputState,
    character: Character,
    animation: AnimationSelector,
    field: CollectibleField,
    level: LevelState,
    overlay: Overlay,
    events: Vec<GameEvent>,
    mouse_down: bool,
    mouse_scale: f32,
    demo: bool,
}

impl Session {
    /// Start at level 1 with coins scattered and the countdown armed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let level = LevelState::new(&tuning);
        let mut session = Self {
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            input: InputState::default(),
            character: Character::default(),
            animation: AnimationSelector::default(),
            field: CollectibleField::new(),
            level,
            overlay: Overlay::default(),
            events: Vec::new(),
            mouse_down: false,
            mouse_scale: 1.0,
            demo: false,
        };
        session.load_level();
        session
    }

    // === Input ===

    /// Keyboard movement event. Movement and animation are updated
    /// synchronously; while a message is up only the held-key state changes.
    pub fn handle_key<C: ClipHandle>(&mut self, event: KeyEvent, bindings: &AnimationBindings<C>) {
        self.input = self.input.apply(event);
        if self.level.paused() {
            return;
        }
        self.character.apply_input(&self.input, &self.tuning);
        if let Some(state) = self
            .animation
            .update(&self.input, bindings, self.tuning.fade_secs)
        {
            self.events.push(GameEvent::AnimationChanged(state));
        }
    }

    /// Keyboard event by DOM code. Returns false for keys the game ignores.
    pub fn handle_key_code<C: ClipHandle>(
        &mut self,
        code: &str,
        pressed: bool,
        bindings: &AnimationBindings<C>,
    ) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.handle_key(KeyEvent { key, pressed }, bindings);
                true
            }
            None => false,
        }
    }

    pub fn handle_control(&mut self, control: Control, audio: &mut impl SoundPlayer) {
        match control {
            Control::Acknowledge => {
                self.acknowledge();
            }
            Control::ToggleMute => audio.toggle_music(),
            Control::ToggleDemo => {
                self.demo = !self.demo;
                log::info!("Demo mode: {}", self.demo);
            }
        }
    }

    /// Relative mouse movement; turns the character while the button is held
    pub fn handle_mouse_move(&mut self, movement_x: f32) {
        if !self.mouse_down || self.level.paused() {
            return;
        }
        self.character
            .rotate_by_mouse(movement_x * self.mouse_scale, &self.tuning);
    }

    pub fn set_mouse_down(&mut self, down: bool) {
        self.mouse_down = down;
    }

    /// Losing pointer lock ends any drag in progress
    pub fn set_pointer_locked(&mut self, locked: bool) {
        if !locked {
            self.mouse_down = false;
        }
    }

    pub fn set_mouse_scale(&mut self, scale: f32) {
        self.mouse_scale = scale;
    }

    // === Level flow ===

    /// Dismiss the end-of-level message and start the next or same level
    pub fn acknowledge(&mut self) -> Option<Acknowledged> {
        let ack = self.level.acknowledge(&self.tuning)?;
        self.character.reset();
        if self.overlay.dismiss() {
            self.events.push(GameEvent::MessageHidden);
        }
        log::info!(
            "{} level {}",
            if ack.advanced { "Advancing to" } else { "Retrying" },
            ack.level
        );
        self.load_level();
        Some(ack)
    }

    /// Countdown interval callback
    pub fn on_timer_tick(&mut self, token: TimerToken) {
        let before = self.level.timer.remaining();
        let transition = self.level.on_timer_tick(token);
        let after = self.level.timer.remaining();
        if after != before {
            self.events.push(GameEvent::TimerChanged(after));
        }
        if let Some(phase) = transition {
            self.on_level_end(phase);
        }
    }

    // === Render loop ===

    /// One display frame: overlay timing, camera follow, pickups, coin spin.
    /// The host draws afterwards whether or not the game is paused.
    pub fn frame(&mut self, dt: f32, audio: &mut impl SoundPlayer) -> FrameOutput {
        if self.overlay.update(dt, self.level.paused()) {
            self.events.push(GameEvent::MessageHidden);
        }

        let camera = (!self.level.paused()).then(|| follow(&self.character, &self.tuning));

        let pickups = if self.level.phase == LevelPhase::Playing {
            self.check_pickups(audio)
        } else {
            0
        };

        self.field.spin(&self.tuning);

        FrameOutput {
            camera,
            character: self.character,
            pickups,
        }
    }

    fn check_pickups(&mut self, audio: &mut impl SoundPlayer) -> usize {
        let taken = collect_pickups(self.character.position, &mut self.field, &self.tuning);
        for coin in &taken {
            self.events.push(GameEvent::CoinRemoved { id: coin.id });

            // Coins after the one that ended the level are removed silently
            let scoring = self.level.phase == LevelPhase::Playing;
            let transition = self.level.add_score(self.tuning.points_per_coin, &self.tuning);
            if scoring {
                audio.play(Sound::Coin);
                self.events.push(GameEvent::ScoreChanged(self.level.score));
            }
            if let Some(phase) = transition {
                self.on_level_end(phase);
            }
        }
        if !taken.is_empty() {
            log::debug!("Picked up {} coin(s), score {}", taken.len(), self.level.score);
        }
        taken.len()
    }

    fn on_level_end(&mut self, phase: LevelPhase) {
        let message = match phase {
            LevelPhase::LevelComplete => LEVEL_COMPLETE_MSG,
            LevelPhase::GameComplete => GAME_COMPLETE_MSG,
            LevelPhase::LevelFailed => LEVEL_FAILED_MSG,
            LevelPhase::Playing => return,
        };
        self.events.push(GameEvent::TimerStopped);
        self.show_message(message);
    }

    fn show_message(&mut self, message: &str) {
        self.overlay.show(message, self.tuning.message_secs);
        self.events.push(GameEvent::MessageShown(message.to_string()));
    }

    /// Scatter coins and reset score and timer for the current level
    fn load_level(&mut self) {
        let level = self.level.current_level;
        log::info!("Loading Level {}...", level);

        let removed = self.field.scatter(level, &self.tuning, &mut self.rng);
        self.events
            .extend(removed.into_iter().map(|id| GameEvent::CoinRemoved { id }));
        self.events.extend(self.field.iter().map(|c| GameEvent::CoinSpawned {
            id: c.id,
            position: c.position,
        }));

        let token = self.level.reload(&self.tuning);
        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LevelLoaded(level));
        self.events.push(GameEvent::TimerRestarted(token));
        self.events
            .push(GameEvent::TimerChanged(self.level.timer.remaining()));
    }

    // === Accessors ===

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Test and debug hook: place the character directly
    pub fn set_character(&mut self, character: Character) {
        self.character = character;
    }

    pub fn animation(&self) -> &AnimationSelector {
        &self.animation
    }

    pub fn coins(&self) -> impl Iterator<Item = &Collectible> {
        self.field.iter()
    }

    pub fn coin_count(&self) -> usize {
        self.field.len()
    }

    pub fn level(&self) -> &LevelState {
        &self.level
    }

    pub fn phase(&self) -> LevelPhase {
        self.level.phase
    }

    pub fn paused(&self) -> bool {
        self.level.paused()
    }

    pub fn message(&self) -> Option<&str> {
        self.overlay.text()
    }

    pub fn timer_token(&self) -> TimerToken {
        self.level.timer.token()
    }

    pub fn demo_mode(&self) -> bool {
        self.demo
    }
}
