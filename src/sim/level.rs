//! Level progression, score and countdown
//!
//! The countdown is driven by an external one-second interval. Each restart
//! hands out a new `TimerToken`; ticks carrying an older token come from a
//! cancelled interval and are ignored, so a level reload can never leave two
//! sources decrementing the same timer.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Where the current level stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Timer running, coins collectable
    Playing,
    /// Pass threshold reached; waiting for Enter to start the next level
    LevelComplete,
    /// Timer ran out; waiting for Enter to retry
    LevelFailed,
    /// Final level cleared. Terminal.
    GameComplete,
}

impl LevelPhase {
    /// A message is up and input is blocked until acknowledged
    pub fn paused(&self) -> bool {
        matches!(self, LevelPhase::LevelComplete | LevelPhase::LevelFailed)
    }
}

/// Identifies one armed countdown interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Result of delivering one interval tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token or stopped timer
    Ignored,
    /// Decremented, seconds remaining
    Ticked(u32),
    /// Hit zero on this tick; the timer stopped itself
    Expired,
}

/// Level countdown in whole seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
    generation: u64,
    running: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining: secs,
            generation: 0,
            running: false,
        }
    }

    /// Cancel any armed interval and arm a new one at `secs`
    pub fn restart(&mut self, secs: u32) -> TimerToken {
        self.generation += 1;
        self.remaining = secs;
        self.running = true;
        TimerToken(self.generation)
    }

    /// Cancel the armed interval
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if !self.running || token != self.token() {
            return TickOutcome::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked(self.remaining)
        }
    }

    /// Token of the most recently armed interval
    pub fn token(&self) -> TimerToken {
        TimerToken(self.generation)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Outcome of acknowledging an end-of-level message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledged {
    /// Level to load next
    pub level: u32,
    /// True when moving on from a completed level
    pub advanced: bool,
}

/// Level, score and timer for the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub current_level: u32,
    pub score: u32,
    pub phase: LevelPhase,
    pub timer: Countdown,
}

impl LevelState {
    /// Level 1, nothing scored, timer not yet armed
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            current_level: 1,
            score: 0,
            phase: LevelPhase::Playing,
            timer: Countdown::new(tuning.level_time_secs),
        }
    }

    pub fn paused(&self) -> bool {
        self.phase.paused()
    }

    pub fn is_final_level(&self, tuning: &Tuning) -> bool {
        self.current_level >= tuning.total_levels
    }

    /// Award points. Returns the new phase if this crossed the pass threshold.
    pub fn add_score(&mut self, points: u32, tuning: &Tuning) -> Option<LevelPhase> {
        if self.phase != LevelPhase::Playing {
            return None;
        }
        self.score += points;
        if self.score < tuning.points_to_pass {
            return None;
        }

        self.timer.stop();
        self.phase = if self.is_final_level(tuning) {
            LevelPhase::GameComplete
        } else {
            LevelPhase::LevelComplete
        };
        log::info!(
            "Level {} complete with {} points ({:?})",
            self.current_level,
            self.score,
            self.phase
        );
        Some(self.phase)
    }

    /// Deliver one countdown tick. Returns `LevelFailed` when time runs out.
    pub fn on_timer_tick(&mut self, token: TimerToken) -> Option<LevelPhase> {
        if self.phase != LevelPhase::Playing {
            return None;
        }
        match self.timer.tick(token) {
            TickOutcome::Expired => {
                self.phase = LevelPhase::LevelFailed;
                log::info!("Level {} failed: time is up", self.current_level);
                Some(self.phase)
            }
            TickOutcome::Ticked(_) | TickOutcome::Ignored => None,
        }
    }

    /// Dismiss the end-of-level message. Only valid while paused.
    pub fn acknowledge(&mut self, tuning: &Tuning) -> Option<Acknowledged> {
        let advanced = match self.phase {
            LevelPhase::LevelComplete => true,
            LevelPhase::LevelFailed => false,
            LevelPhase::Playing | LevelPhase::GameComplete => return None,
        };
        if advanced {
            self.current_level = (self.current_level + 1).min(tuning.total_levels);
        }
        Some(Acknowledged {
            level: self.current_level,
            advanced,
        })
    }

    /// Start (or restart) the current level: zero score, full timer, playing
    pub fn reload(&mut self, tuning: &Tuning) -> TimerToken {
        self.score = 0;
        self.phase = LevelPhase::Playing;
        self.timer.restart(tuning.level_time_secs)
    }
}
