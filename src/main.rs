//! Coin Quest entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{KeyboardEvent, MouseEvent};

    use coin_quest::Settings;
    use coin_quest::Tuning;
    use coin_quest::audio::AudioManager;
    use coin_quest::consts::*;
    use coin_quest::sim::{
        AnimState, AnimationBindings, ClipHandle, Control, GameEvent, Session, TimerToken,
        autopilot,
    };
    use coin_quest::ui::HudText;

    // three.js scene, loaders and mixer live on the JS side
    #[wasm_bindgen(module = "/web/scene_host.js")]
    extern "C" {
        type SceneHost;

        #[wasm_bindgen(constructor)]
        fn new(coin_texture: &str) -> SceneHost;
        #[wasm_bindgen(method, js_name = loadMap)]
        fn load_map(this: &SceneHost, path: &str) -> js_sys::Promise;
        #[wasm_bindgen(method, js_name = loadCharacter)]
        fn load_character(this: &SceneHost, path: &str) -> js_sys::Promise;
        /// Resolves to an AnimationAction once the character is in
        #[wasm_bindgen(method, js_name = loadClip)]
        fn load_clip(this: &SceneHost, path: &str) -> js_sys::Promise;
        #[wasm_bindgen(method, js_name = addCoin)]
        fn add_coin(this: &SceneHost, id: u32, x: f32, y: f32, z: f32);
        #[wasm_bindgen(method, js_name = removeCoin)]
        fn remove_coin(this: &SceneHost, id: u32);
        #[wasm_bindgen(method, js_name = setCoinSpin)]
        fn set_coin_spin(this: &SceneHost, id: u32, spin: f32);
        #[wasm_bindgen(method, js_name = setCharacter)]
        fn set_character(this: &SceneHost, x: f32, y: f32, z: f32, yaw: f32);
        #[wasm_bindgen(method, js_name = setCamera)]
        fn set_camera(this: &SceneHost, ex: f32, ey: f32, ez: f32, tx: f32, ty: f32, tz: f32);
        #[wasm_bindgen(method, js_name = updateMixer)]
        fn update_mixer(this: &SceneHost, dt: f32);
        #[wasm_bindgen(method)]
        fn render(this: &SceneHost);
        #[wasm_bindgen(method)]
        fn resize(this: &SceneHost, width: f64, height: f64);

        type ClipAction;

        #[wasm_bindgen(method, js_name = reset)]
        fn action_reset(this: &ClipAction);
        #[wasm_bindgen(method, js_name = fadeIn)]
        fn action_fade_in(this: &ClipAction, secs: f32);
        #[wasm_bindgen(method, js_name = fadeOut)]
        fn action_fade_out(this: &ClipAction, secs: f32);
        #[wasm_bindgen(method, js_name = play)]
        fn action_play(this: &ClipAction);
    }

    impl ClipHandle for ClipAction {
        fn reset(&self) {
            self.action_reset();
        }
        fn fade_in(&self, secs: f32) {
            self.action_fade_in(secs);
        }
        fn fade_out(&self, secs: f32) {
            self.action_fade_out(secs);
        }
        fn play(&self) {
            self.action_play();
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        host: SceneHost,
        bindings: AnimationBindings<ClipAction>,
        audio: AudioManager,
        settings: Settings,
        /// Movement keys are ignored until the character model is in the scene
        character_loaded: bool,
        last_time: f64,
        // Countdown interval; the closure must outlive its registration
        interval_id: Option<i32>,
        interval_closure: Option<Closure<dyn FnMut()>>,
        /// Last cancelled closure, kept alive in case it is the one running
        retired_closure: Option<Closure<dyn FnMut()>>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
            let mut session = Session::new(seed, tuning);
            session.set_mouse_scale(settings.mouse_sensitivity_scale);
            Self {
                session,
                host: SceneHost::new(COIN_TEXTURE),
                bindings: AnimationBindings::new(),
                audio: AudioManager::new(&settings),
                settings,
                character_loaded: false,
                last_time: 0.0,
                interval_id: None,
                interval_closure: None,
                retired_closure: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Cancel the running countdown interval, if any
        fn cancel_interval(&mut self) {
            if let Some(id) = self.interval_id.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_interval_with_handle(id);
                }
            }
            if self.interval_closure.is_some() {
                self.retired_closure = self.interval_closure.take();
            }
        }

        /// Advance one display frame (drawing happens after events are applied)
        fn frame(&mut self, dt: f32, time: f64) {
            // Demo mode stands in for a held keyboard
            if self.session.demo_mode() && self.character_loaded {
                for event in autopilot::next_events(&self.session) {
                    self.session.handle_key(event, &self.bindings);
                }
            }

            self.host.update_mixer(dt);
            let out = self.session.frame(dt, &mut self.audio);
            if let Some(pose) = out.camera {
                self.host.set_camera(
                    pose.eye.x,
                    pose.eye.y,
                    pose.eye.z,
                    pose.target.x,
                    pose.target.y,
                    pose.target.z,
                );
            }
            let c = out.character;
            self.host
                .set_character(c.position.x, c.position.y, c.position.z, c.yaw);
            for coin in self.session.coins() {
                self.host.set_coin_spin(coin.id, coin.spin);
            }

            self.track_fps(time);
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
            if self.settings.show_fps && self.frame_index == 0 {
                log::info!("FPS: {}", self.fps);
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show_message(text: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        hide_message();
        let Ok(el) = document.create_element("div") else {
            return;
        };
        el.set_id("message");
        el.set_class_name("message");
        el.set_text_content(Some(text));
        if let Some(body) = document.body() {
            let _ = body.append_child(&el);
        }
    }

    fn hide_message() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("message") {
            el.remove();
        }
    }

    /// Mirror queued session events into the scene, the DOM and the interval
    fn apply_events(game: &Rc<RefCell<Game>>) {
        let events = game.borrow_mut().session.drain_events();
        for event in events {
            match event {
                GameEvent::CoinSpawned { id, position } => {
                    game.borrow()
                        .host
                        .add_coin(id, position.x, position.y, position.z);
                }
                GameEvent::CoinRemoved { id } => game.borrow().host.remove_coin(id),
                GameEvent::ScoreChanged(score) => set_text("score", &HudText::score(score)),
                GameEvent::TimerChanged(secs) => set_text("timer", &HudText::timer(secs)),
                GameEvent::LevelLoaded(level) => set_text("level", &HudText::level(level)),
                GameEvent::TimerRestarted(token) => start_interval(game, token),
                GameEvent::TimerStopped => game.borrow_mut().cancel_interval(),
                GameEvent::MessageShown(text) => show_message(&text),
                GameEvent::MessageHidden => hide_message(),
                GameEvent::AnimationChanged(state) => log::debug!("Animation: {:?}", state),
            }
        }
    }

    /// Replace the countdown interval with one delivering `token`
    fn start_interval(game: &Rc<RefCell<Game>>, token: TimerToken) {
        game.borrow_mut().cancel_interval();

        let Some(window) = web_sys::window() else {
            return;
        };
        let game_cb = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            game_cb.borrow_mut().session.on_timer_tick(token);
            apply_events(&game_cb);
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TIMER_INTERVAL_MS,
        ) {
            Ok(id) => {
                let mut g = game.borrow_mut();
                g.interval_id = Some(id);
                g.interval_closure = Some(closure);
            }
            Err(e) => log::error!("Failed to start level timer: {:?}", e),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Coin Quest starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Tuning::default(), settings)));
        log::info!("Game initialized with seed: {}", seed);

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        load_assets(game.clone());
        setup_input_handlers(game.clone());
        setup_resize(game.clone());

        // Coins, HUD and the first interval come from the initial level load
        apply_events(&game);

        request_animation_frame(game);

        log::info!("Coin Quest running!");
    }

    /// Kick off every asset load. Failures leave the asset absent.
    fn load_assets(game: Rc<RefCell<Game>>) {
        let map = game.borrow().host.load_map(MAP_MODEL);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(map).await {
                log::warn!("Map failed to load: {:?}", e);
            }
        });

        let character = game.borrow().host.load_character(CHARACTER_MODEL);
        let clips = [
            (AnimState::Walk, WALK_CLIP),
            (AnimState::Run, RUN_CLIP),
            (AnimState::Jump, JUMP_CLIP),
        ];
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(character).await {
                log::warn!("Character failed to load: {:?}", e);
                return;
            }
            game.borrow_mut().character_loaded = true;
            log::info!("Character loaded");

            for (state, path) in clips {
                let promise = game.borrow().host.load_clip(path);
                let game = game.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match JsFuture::from(promise).await {
                        Ok(action) => {
                            game.borrow_mut()
                                .bindings
                                .bind(state, action.unchecked_into::<ClipAction>());
                            log::info!("Animation {:?} ready", state);
                        }
                        Err(e) => log::warn!("Animation {} failed to load: {:?}", path, e),
                    }
                });
            }
        });
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Keyboard down: controls first, then movement
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                {
                    let mut guard = game.borrow_mut();
                    let g = &mut *guard;
                    g.audio.resume();
                    if let Some(control) = Control::from_key(&event.key()) {
                        g.session.handle_control(control, &mut g.audio);
                        if control == Control::ToggleMute
                            && g.settings.remember_music(g.audio.music_wanted())
                        {
                            g.settings.save();
                        }
                    }
                    if g.character_loaded {
                        g.session.handle_key_code(&event.code(), true, &g.bindings);
                    }
                }
                apply_events(&game);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                {
                    let mut guard = game.borrow_mut();
                    let g = &mut *guard;
                    if g.character_loaded {
                        g.session.handle_key_code(&event.code(), false, &g.bindings);
                    }
                }
                apply_events(&game);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag turns the character
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.session.set_mouse_down(true);
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.set_mouse_down(false);
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.character_loaded {
                    g.session.handle_mouse_move(event.movement_x() as f32);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click anywhere requests pointer lock
        if let Some(body) = document.body() {
            let target = body.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                target.request_pointer_lock();
            });
            let _ = body.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer lock change
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                let locked = document.pointer_lock_element().is_some();
                if locked {
                    log::info!("Pointer lock ACQUIRED");
                } else {
                    log::info!("Pointer lock RELEASED");
                }
                game.borrow_mut().session.set_pointer_locked(locked);
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            if width > 0.0 && height > 0.0 {
                game.borrow().host.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            g.last_time = time;

            g.frame(dt, time);
        }

        apply_events(&game);
        game.borrow().host.render();

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Coin Quest (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => coin_quest::Tuning::default(),
    };

    headless::run(tuning, 42);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<coin_quest::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(coin_quest::Tuning::from_json(&json)?)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use coin_quest::Tuning;
    use coin_quest::audio::NullAudio;
    use coin_quest::sim::{AnimationBindings, ClipHandle, GameEvent, LevelPhase, Session, autopilot};

    /// Simulated display rate
    const FPS: u32 = 60;
    /// Give up after this many simulated minutes
    const MAX_MINUTES: u32 = 60;

    /// No animations load in headless runs
    struct NoClip;

    impl ClipHandle for NoClip {
        fn reset(&self) {}
        fn fade_in(&self, _secs: f32) {}
        fn fade_out(&self, _secs: f32) {}
        fn play(&self) {}
    }

    /// Let the autopilot play until the run ends or time runs out
    pub fn run(tuning: Tuning, seed: u64) {
        let mut session = Session::new(seed, tuning);
        let bindings = AnimationBindings::<NoClip>::new();
        let mut audio = NullAudio::default();
        let dt = 1.0 / FPS as f32;
        let mut paused_frames = 0;
        let mut failures = 0;
        let mut collected = 0;

        for frame in 0..(FPS * 60 * MAX_MINUTES) {
            for event in autopilot::next_events(&session) {
                session.handle_key(event, &bindings);
            }
            collected += session.frame(dt, &mut audio).pickups;
            if frame % FPS == FPS - 1 {
                let token = session.timer_token();
                session.on_timer_tick(token);
            }

            for event in session.drain_events() {
                match event {
                    GameEvent::MessageShown(text) => log::info!("[{}s] {}", frame / FPS, text),
                    GameEvent::LevelLoaded(level) => log::info!("[{}s] Level {}", frame / FPS, level),
                    _ => {}
                }
            }

            match session.phase() {
                LevelPhase::GameComplete => {
                    log::info!(
                        "All levels cleared in {}s with {} retries, {} coins collected",
                        frame / FPS,
                        failures,
                        collected
                    );
                    return;
                }
                LevelPhase::LevelFailed | LevelPhase::LevelComplete => {
                    // Press Enter after a second on the message
                    paused_frames += 1;
                    if paused_frames >= FPS {
                        if session.phase() == LevelPhase::LevelFailed {
                            failures += 1;
                        }
                        session.acknowledge();
                        paused_frames = 0;
                    }
                }
                LevelPhase::Playing => {}
            }
        }

        log::warn!(
            "Stopped after {} minutes on level {} ({} coins collected)",
            MAX_MINUTES,
            session.level().current_level,
            collected
        );
    }
}
