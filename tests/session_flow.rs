//! Whole-session level flow: pickups, countdown, acknowledgment

use coin_quest::Tuning;
use glam::Vec3;
use coin_quest::audio::NullAudio;
use coin_quest::sim::{
    AnimationBindings, Character, ClipHandle, Control, GameEvent, Key, KeyEvent, LevelPhase,
    Session, TimerToken,
};
use coin_quest::ui::{GAME_COMPLETE_MSG, LEVEL_COMPLETE_MSG, LEVEL_FAILED_MSG};

const DT: f32 = 1.0 / 60.0;

struct NoClip;

impl ClipHandle for NoClip {
    fn reset(&self) {}
    fn fade_in(&self, _secs: f32) {}
    fn fade_out(&self, _secs: f32) {}
    fn play(&self) {}
}

/// A coin with no other coin inside pickup range, so standing on it
/// collects exactly one
fn lone_coin(session: &Session) -> Vec3 {
    let radius = session.tuning().pickup_radius;
    let coins: Vec<Vec3> = session.coins().map(|c| c.position).collect();
    coins
        .iter()
        .copied()
        .find(|p| coins.iter().all(|q| q == p || p.distance(*q) >= radius))
        .expect("an isolated coin")
}

/// Stand on a lone coin and run a frame
fn grab_coin(session: &mut Session, audio: &mut NullAudio) {
    let target = lone_coin(session);
    session.set_character(Character {
        position: target.with_y(0.0),
        yaw: 0.0,
    });
    session.frame(DT, audio);
}

fn clear_level(session: &mut Session, audio: &mut NullAudio) {
    for _ in 0..10 {
        grab_coin(session, audio);
    }
}

fn tick_seconds(session: &mut Session, token: TimerToken, secs: u32) {
    for _ in 0..secs {
        session.on_timer_tick(token);
    }
}

fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[test]
fn test_ten_coins_complete_level_once() {
    let mut session = Session::new(11, Tuning::default());
    let mut audio = NullAudio::default();
    session.drain_events();

    clear_level(&mut session, &mut audio);
    for _ in 0..120 {
        session.frame(DT, &mut audio);
    }

    let events = session.drain_events();
    assert_eq!(session.phase(), LevelPhase::LevelComplete);
    assert_eq!(
        count(&events, |e| *e == GameEvent::MessageShown(LEVEL_COMPLETE_MSG.into())),
        1
    );
    assert_eq!(count(&events, |e| *e == GameEvent::TimerStopped), 1);
    assert_eq!(session.level().score, 100);
    assert_eq!(session.coin_count(), 10);
}

#[test]
fn test_timeout_fails_level_once() {
    let mut session = Session::new(12, Tuning::default());
    session.drain_events();
    let token = session.timer_token();

    tick_seconds(&mut session, token, 119);
    assert_eq!(session.phase(), LevelPhase::Playing);
    assert_eq!(session.level().timer.remaining(), 1);

    tick_seconds(&mut session, token, 10);
    let events = session.drain_events();
    assert_eq!(session.phase(), LevelPhase::LevelFailed);
    assert_eq!(
        count(&events, |e| *e == GameEvent::MessageShown(LEVEL_FAILED_MSG.into())),
        1
    );
    assert_eq!(count(&events, |e| matches!(e, GameEvent::TimerChanged(_))), 120);
}

#[test]
fn test_reloads_keep_single_countdown() {
    let mut session = Session::new(13, Tuning::default());
    let mut tokens = vec![session.timer_token()];

    // Fail and retry three times, remembering every interval ever armed
    for _ in 0..3 {
        let token = session.timer_token();
        tick_seconds(&mut session, token, 120);
        assert!(session.paused());
        session.handle_control(Control::Acknowledge, &mut NullAudio::default());
        tokens.push(session.timer_token());
    }
    assert_eq!(session.level().current_level, 1);
    assert_eq!(session.level().timer.remaining(), 120);

    // Each second, every interval that was ever armed fires once
    for elapsed in 1..=5 {
        for token in &tokens {
            session.on_timer_tick(*token);
        }
        assert_eq!(session.level().timer.remaining(), 120 - elapsed);
    }
}

#[test]
fn test_acknowledge_failed_retries_same_level() {
    let mut session = Session::new(14, Tuning::default());
    let mut audio = NullAudio::default();
    grab_coin(&mut session, &mut audio);
    grab_coin(&mut session, &mut audio);
    assert_eq!(session.level().score, 20);
    assert_eq!(session.coin_count(), 18);

    let token = session.timer_token();
    tick_seconds(&mut session, token, 120);
    let old_coins: Vec<u32> = session.coins().map(|c| c.id).collect();
    session.drain_events();

    session.handle_control(Control::Acknowledge, &mut audio);
    let events = session.drain_events();

    assert_eq!(session.phase(), LevelPhase::Playing);
    assert_eq!(session.level().current_level, 1);
    assert_eq!(session.level().score, 0);
    assert_eq!(session.level().timer.remaining(), 120);
    assert_eq!(session.coin_count(), 20);
    assert_eq!(*session.character(), Character::default());
    assert!(events.contains(&GameEvent::MessageHidden));
    assert!(events.contains(&GameEvent::LevelLoaded(1)));
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::CoinRemoved { .. })),
        old_coins.len()
    );
}

#[test]
fn test_acknowledge_ignored_while_playing() {
    let mut session = Session::new(15, Tuning::default());
    session.drain_events();
    session.handle_control(Control::Acknowledge, &mut NullAudio::default());
    assert!(session.drain_events().is_empty());
    assert_eq!(session.level().current_level, 1);
}

#[test]
fn test_full_run_ends_at_last_level() {
    let tuning = Tuning::default();
    let total = tuning.total_levels;
    let mut session = Session::new(16, tuning);
    let mut audio = NullAudio::default();

    for level in 1..total {
        assert_eq!(session.level().current_level, level);
        clear_level(&mut session, &mut audio);
        assert_eq!(session.phase(), LevelPhase::LevelComplete);
        session.handle_control(Control::Acknowledge, &mut audio);
    }

    assert_eq!(session.level().current_level, total);
    clear_level(&mut session, &mut audio);
    assert_eq!(session.phase(), LevelPhase::GameComplete);
    assert_eq!(session.message(), Some(GAME_COMPLETE_MSG));
    assert!(!session.paused());

    // Nothing advances past the last level
    session.handle_control(Control::Acknowledge, &mut audio);
    assert_eq!(session.level().current_level, total);
    assert_eq!(session.phase(), LevelPhase::GameComplete);

    // The final message is not awaiting input, so it times out
    for _ in 0..(4.0 / DT) as usize {
        session.frame(DT, &mut audio);
    }
    assert_eq!(session.message(), None);
}

#[test]
fn test_coins_spread_out_with_level() {
    let tuning = Tuning::default();
    let mut session = Session::new(17, tuning.clone());
    let mut audio = NullAudio::default();
    for _ in 1..5 {
        clear_level(&mut session, &mut audio);
        session.handle_control(Control::Acknowledge, &mut audio);
    }
    let max = tuning.max_coin_distance(5);
    assert!(session
        .coins()
        .all(|c| c.position.with_y(0.0).length() <= max + 1e-3));
}

#[test]
fn test_walking_into_a_coin_collects_it() {
    let mut session = Session::new(18, Tuning::default());
    let mut audio = NullAudio::default();
    let bindings = AnimationBindings::<NoClip>::new();

    // Put the character one step short of a coin, facing it (+Z)
    let coin = lone_coin(&session);
    session.set_character(Character {
        position: coin.with_y(0.0) - Vec3::Z * 1.3,
        yaw: 0.0,
    });
    session.frame(DT, &mut audio);
    assert_eq!(session.level().score, 0);

    session.handle_key(KeyEvent::down(Key::Forward), &bindings);
    session.frame(DT, &mut audio);
    assert_eq!(session.level().score, 10);
}
