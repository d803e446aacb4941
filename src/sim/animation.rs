//! Character animation selection
//!
//! Picks Idle/Walk/Run/Jump from the held keys and cross-fades between the
//! matching clips. Clips arrive asynchronously, so any of them may be missing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::input::InputState;

/// Animation states, highest priority first: Jump, Run, Walk, Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Idle,
    Walk,
    Run,
    Jump,
}

impl AnimState {
    /// Clip name in the asset registry. Idle has no clip.
    pub fn clip_name(&self) -> Option<&'static str> {
        match self {
            AnimState::Idle => None,
            AnimState::Walk => Some("Walk"),
            AnimState::Run => Some("Run"),
            AnimState::Jump => Some("Jump"),
        }
    }
}

/// Pick the animation for the held keys
pub fn select(input: &InputState) -> AnimState {
    if input.jump {
        AnimState::Jump
    } else if input.forward && input.run {
        AnimState::Run
    } else if input.forward {
        AnimState::Walk
    } else {
        AnimState::Idle
    }
}

/// A playable animation clip owned by the external mixer
pub trait ClipHandle {
    fn reset(&self);
    fn fade_in(&self, secs: f32);
    fn fade_out(&self, secs: f32);
    fn play(&self);
}

/// Clips that have finished loading, keyed by the state they animate
#[derive(Debug)]
pub struct AnimationBindings<C> {
    clips: HashMap<AnimState, C>,
}

impl<C> Default for AnimationBindings<C> {
    fn default() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }
}

impl<C: ClipHandle> AnimationBindings<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded clip. Idle never gets one.
    pub fn bind(&mut self, state: AnimState, clip: C) {
        if state == AnimState::Idle {
            log::warn!("Ignoring clip bound to Idle");
            return;
        }
        self.clips.insert(state, clip);
    }

    pub fn get(&self, state: AnimState) -> Option<&C> {
        self.clips.get(&state)
    }

    pub fn is_bound(&self, state: AnimState) -> bool {
        self.clips.contains_key(&state)
    }
}

/// Tracks which clip is playing and drives the cross-fades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationSelector {
    /// State selected by the most recent input
    state: AnimState,
    /// State whose clip is actually faded in (None while idle or unbound)
    playing: Option<AnimState>,
}

impl AnimationSelector {
    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn playing(&self) -> Option<AnimState> {
        self.playing
    }

    /// Recompute the target animation and cross-fade if the clip changes.
    /// Returns the newly selected state when it differs from the previous one.
    pub fn update<C: ClipHandle>(
        &mut self,
        input: &InputState,
        bindings: &AnimationBindings<C>,
        fade_secs: f32,
    ) -> Option<AnimState> {
        let target = select(input);
        let wanted = Some(target).filter(|s| bindings.is_bound(*s));

        if wanted != self.playing {
            if let Some(clip) = self.playing.and_then(|s| bindings.get(s)) {
                clip.fade_out(fade_secs);
            }
            if let Some(clip) = wanted.and_then(|s| bindings.get(s)) {
                clip.reset();
                clip.fade_in(fade_secs);
                clip.play();
            }
            self.playing = wanted;
        }

        let previous = std::mem::replace(&mut self.state, target);
        (previous != target).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{Key, KeyEvent};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Clip that records every call into a shared log
    struct FakeClip {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl ClipHandle for FakeClip {
        fn reset(&self) {
            self.log.borrow_mut().push(format!("{}:reset", self.name));
        }
        fn fade_in(&self, _secs: f32) {
            self.log.borrow_mut().push(format!("{}:in", self.name));
        }
        fn fade_out(&self, _secs: f32) {
            self.log.borrow_mut().push(format!("{}:out", self.name));
        }
        fn play(&self) {
            self.log.borrow_mut().push(format!("{}:play", self.name));
        }
    }

    fn bindings(
        states: &[AnimState],
    ) -> (AnimationBindings<FakeClip>, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut b = AnimationBindings::new();
        for s in states {
            b.bind(
                *s,
                FakeClip {
                    name: s.clip_name().unwrap(),
                    log: log.clone(),
                },
            );
        }
        (b, log)
    }

    fn input(keys: &[Key]) -> InputState {
        keys.iter()
            .fold(InputState::default(), |s, k| s.apply(KeyEvent::down(*k)))
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(select(&input(&[])), AnimState::Idle);
        assert_eq!(select(&input(&[Key::Forward])), AnimState::Walk);
        assert_eq!(select(&input(&[Key::Forward, Key::Run])), AnimState::Run);
        assert_eq!(select(&input(&[Key::Run])), AnimState::Idle);
        assert_eq!(select(&input(&[Key::Backward])), AnimState::Idle);
        assert_eq!(
            select(&input(&[Key::Forward, Key::Run, Key::Jump])),
            AnimState::Jump
        );
    }

    #[test]
    fn test_releasing_jump_falls_back_to_run() {
        let held = input(&[Key::Forward, Key::Run, Key::Jump]);
        assert_eq!(select(&held), AnimState::Jump);
        let released = held.apply(KeyEvent::up(Key::Jump));
        assert_eq!(select(&released), AnimState::Run);
    }

    #[test]
    fn test_cross_fade_sequence() {
        let (b, log) = bindings(&[AnimState::Walk, AnimState::Run]);
        let mut sel = AnimationSelector::default();

        assert_eq!(sel.update(&input(&[Key::Forward]), &b, 0.2), Some(AnimState::Walk));
        assert_eq!(*log.borrow(), ["Walk:reset", "Walk:in", "Walk:play"]);
        log.borrow_mut().clear();

        // Same state: nothing happens
        assert_eq!(sel.update(&input(&[Key::Forward]), &b, 0.2), None);
        assert!(log.borrow().is_empty());

        assert_eq!(
            sel.update(&input(&[Key::Forward, Key::Run]), &b, 0.2),
            Some(AnimState::Run)
        );
        assert_eq!(*log.borrow(), ["Walk:out", "Run:reset", "Run:in", "Run:play"]);
        log.borrow_mut().clear();

        // Idle only fades out
        assert_eq!(sel.update(&input(&[]), &b, 0.2), Some(AnimState::Idle));
        assert_eq!(*log.borrow(), ["Run:out"]);
        assert_eq!(sel.playing(), None);
    }

    #[test]
    fn test_missing_binding_is_noop() {
        let (b, log) = bindings(&[AnimState::Walk]);
        let mut sel = AnimationSelector::default();

        sel.update(&input(&[Key::Forward]), &b, 0.2);
        log.borrow_mut().clear();

        // Jump not loaded yet: walk fades out, nothing fades in
        assert_eq!(sel.update(&input(&[Key::Jump]), &b, 0.2), Some(AnimState::Jump));
        assert_eq!(*log.borrow(), ["Walk:out"]);
        assert_eq!(sel.state(), AnimState::Jump);
        assert_eq!(sel.playing(), None);
    }

    #[test]
    fn test_late_binding_picked_up_on_next_input() {
        let (mut b, log) = bindings(&[]);
        let mut sel = AnimationSelector::default();
        sel.update(&input(&[Key::Forward]), &b, 0.2);
        assert!(log.borrow().is_empty());

        b.bind(
            AnimState::Walk,
            FakeClip {
                name: "Walk",
                log: log.clone(),
            },
        );
        // Key repeat delivers the same state again, now with a clip
        assert_eq!(sel.update(&input(&[Key::Forward]), &b, 0.2), None);
        assert_eq!(*log.borrow(), ["Walk:reset", "Walk:in", "Walk:play"]);
        assert_eq!(sel.playing(), Some(AnimState::Walk));
    }

    proptest! {
        #[test]
        fn prop_jump_dominates(forward: bool, backward: bool, left: bool, right: bool, run: bool) {
            let state = InputState { forward, backward, left, right, run, jump: true };
            prop_assert_eq!(select(&state), AnimState::Jump);
        }
    }
}
