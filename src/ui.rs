//! HUD text and the centered message overlay
//!
//! Pure formatting and timing; the DOM writes happen in the browser host.

/// Shown when the countdown hits zero
pub const LEVEL_FAILED_MSG: &str = "Time is up! Press Enter To Try again.";
/// Shown when a non-final level is cleared
pub const LEVEL_COMPLETE_MSG: &str = "Congratulations! Press Enter to start the next level.";
/// Shown when the last level is cleared
pub const GAME_COMPLETE_MSG: &str = "Congratulations! You completed all levels!";

/// Text for the three HUD regions
pub struct HudText;

impl HudText {
    pub fn level(level: u32) -> String {
        format!("Level: {}", level)
    }

    pub fn score(score: u32) -> String {
        format!("Score: {}", score)
    }

    pub fn timer(secs: u32) -> String {
        format!("Time: {}s", secs)
    }
}

/// A transient message box.
///
/// Hides itself after its display time unless the game is paused, in which
/// case it stays until dismissed.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    text: Option<String>,
    remaining: f32,
}

impl Overlay {
    pub fn show(&mut self, text: impl Into<String>, secs: f32) {
        self.text = Some(text.into());
        self.remaining = secs;
    }

    /// Advance the display timer. Returns true if the message was hidden now.
    pub fn update(&mut self, dt: f32, paused: bool) -> bool {
        if self.text.is_none() {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining <= 0.0 && !paused {
            self.text = None;
            return true;
        }
        false
    }

    /// Hide immediately. Returns true if something was showing.
    pub fn dismiss(&mut self) -> bool {
        self.text.take().is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.text.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_strings() {
        assert_eq!(HudText::level(3), "Level: 3");
        assert_eq!(HudText::score(40), "Score: 40");
        assert_eq!(HudText::timer(97), "Time: 97s");
    }

    #[test]
    fn test_overlay_hides_after_timeout() {
        let mut overlay = Overlay::default();
        overlay.show(GAME_COMPLETE_MSG, 3.0);
        assert!(!overlay.update(2.9, false));
        assert_eq!(overlay.text(), Some(GAME_COMPLETE_MSG));
        assert!(overlay.update(0.2, false));
        assert!(!overlay.is_visible());
        assert!(!overlay.update(1.0, false));
    }

    #[test]
    fn test_overlay_stays_while_paused() {
        let mut overlay = Overlay::default();
        overlay.show(LEVEL_FAILED_MSG, 3.0);
        assert!(!overlay.update(10.0, true));
        assert!(overlay.is_visible());
        assert!(overlay.dismiss());
        assert!(!overlay.dismiss());
    }
}
