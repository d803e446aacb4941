//! Background music and sound effects
//!
//! Gameplay code only sees the `SoundPlayer` trait; the browser build plays
//! the game's mp3 files through `HtmlAudioElement`s. Every playback call is
//! fire-and-forget and failures are swallowed.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Coin picked up
    Coin,
}

/// Audio sink handed to the gameplay loop
pub trait SoundPlayer {
    /// Play a one-shot effect
    fn play(&mut self, sound: Sound);
    /// Pause music if playing, resume it otherwise
    fn toggle_music(&mut self);
    fn is_music_playing(&self) -> bool;
}

/// Silent player for native runs
#[derive(Debug, Default)]
pub struct NullAudio {
    music: bool,
}

impl SoundPlayer for NullAudio {
    fn play(&mut self, _sound: Sound) {}

    fn toggle_music(&mut self) {
        self.music = !self.music;
    }

    fn is_music_playing(&self) -> bool {
        self.music
    }
}

/// Base volume of the music track before settings are applied
pub const MUSIC_BASE_VOLUME: f32 = 0.5;
/// Base volume of the coin effect before settings are applied
pub const COIN_BASE_VOLUME: f32 = 0.7;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    use super::{COIN_BASE_VOLUME, MUSIC_BASE_VOLUME, Sound, SoundPlayer};
    use crate::consts::{COIN_SOUND, MUSIC_TRACK};
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        music: Option<HtmlAudioElement>,
        coin: Option<HtmlAudioElement>,
        /// Whether the player wants music on (autoplay may still be blocked)
        music_wanted: bool,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            let music = HtmlAudioElement::new_with_src(MUSIC_TRACK).ok();
            if let Some(music) = &music {
                music.set_loop(true);
            } else {
                log::warn!("Failed to create music element - music disabled");
            }
            let coin = HtmlAudioElement::new_with_src(COIN_SOUND).ok();
            if coin.is_none() {
                log::warn!("Failed to create coin sound element");
            }

            let manager = Self {
                music,
                coin,
                music_wanted: !settings.music_muted,
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                music_volume: settings.music_volume,
            };
            manager.apply_volumes();
            manager
        }

        /// Start music after a user gesture (browsers block autoplay before one)
        pub fn resume(&self) {
            if let Some(music) = &self.music {
                if self.music_wanted && music.paused() {
                    fire_and_forget(music.play());
                }
            }
        }

        /// Whether the player last asked for music (playback may still be blocked)
        pub fn music_wanted(&self) -> bool {
            self.music_wanted
        }

        fn effective_volume(&self, channel: f32, base: f32) -> f64 {
            (self.master_volume * channel * base) as f64
        }

        fn apply_volumes(&self) {
            let music_vol = self.effective_volume(self.music_volume, MUSIC_BASE_VOLUME);
            let coin_vol = self.effective_volume(self.sfx_volume, COIN_BASE_VOLUME);
            if let Some(music) = &self.music {
                music.set_volume(music_vol);
            }
            if let Some(coin) = &self.coin {
                coin.set_volume(coin_vol);
            }
        }
    }

    impl SoundPlayer for AudioManager {
        fn play(&mut self, sound: Sound) {
            match sound {
                Sound::Coin => {
                    let Some(coin) = &self.coin else { return };
                    // Restart so rapid pickups each get a chime
                    coin.set_current_time(0.0);
                    fire_and_forget(coin.play());
                }
            }
        }

        fn toggle_music(&mut self) {
            let Some(music) = &self.music else { return };
            if music.paused() {
                self.music_wanted = true;
                fire_and_forget(music.play());
            } else {
                self.music_wanted = false;
                let _ = music.pause();
            }
            log::info!("Music {}", if self.music_wanted { "on" } else { "off" });
        }

        fn is_music_playing(&self) -> bool {
            self.music.as_ref().map(|m| !m.paused()).unwrap_or(false)
        }
    }

    /// Await a play() promise in the background, ignoring rejection
    fn fire_and_forget(result: Result<js_sys::Promise, wasm_bindgen::JsValue>) {
        let Ok(promise) = result else { return };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("Audio playback rejected: {:?}", e);
            }
        });
    }
}
