//! Claw Machine entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

    use claw_machine::audio::{AudioManager, SoundEffect};
    use claw_machine::consts::*;
    use claw_machine::renderer::SdfRenderState;
    use claw_machine::settings::Settings;
    use claw_machine::sim::{
        Direction, GameState, IDLE_STATUS, InputState, RapierWorld, new_session, tick,
    };

    /// Why the game could not start
    #[derive(Debug)]
    pub enum InitError {
        NoWindow,
        NoDocument,
        NoCanvas,
        Surface(String),
        NoAdapter(String),
        Device(String),
    }

    impl fmt::Display for InitError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                InitError::NoWindow => write!(f, "no browser window"),
                InitError::NoDocument => write!(f, "no document"),
                InitError::NoCanvas => write!(f, "no #canvas element"),
                InitError::Surface(e) => write!(f, "failed to create surface: {}", e),
                InitError::NoAdapter(e) => write!(f, "no WebGPU adapter: {}", e),
                InitError::Device(e) => write!(f, "failed to create device: {}", e),
            }
        }
    }

    impl std::error::Error for InitError {}

    struct Game {
        state: GameState,
        physics: RapierWorld,
        input: InputState,
        settings: Settings,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        last_time: f64,
        status: String,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut physics = RapierWorld::new();
            let state = new_session(seed, wall_clock_seconds(), &mut physics);
            let audio = AudioManager::new(&settings);
            Self {
                state,
                physics,
                input: InputState::new(),
                settings,
                render_state: None,
                audio,
                last_time: 0.0,
                status: IDLE_STATUS.to_string(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Advance the simulation and react to what happened
        fn update(&mut self, dt: f32, time: f64) {
            tick(&mut self.state, &mut self.physics, &mut self.input, dt);

            for event in self.state.drain_events() {
                if let Some(text) = event.status_text() {
                    self.status = text;
                }
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
            }

            self.state.scoreboard.refresh(wall_clock_seconds());

            // FPS over the last 60 frames
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (59000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "score", &self.state.score().to_string());
            set_text(&document, "toyCount", &self.state.toy_count().to_string());
            set_text(&document, "gameTime", self.state.scoreboard.elapsed_label());
            set_text(&document, "status", &self.status);

            if let Some(el) = document.get_element_by_id("fps") {
                if self.settings.show_fps {
                    el.set_text_content(Some(&format!("{} FPS", self.fps)));
                }
                let _ = el
                    .class_list()
                    .toggle_with_force("hidden", !self.settings.show_fps);
            }
        }

        /// Preferences changed from the keyboard
        fn settings_changed(&mut self) {
            self.audio.apply_settings(&self.settings);
            self.settings.save();
        }
    }

    fn wall_clock_seconds() -> f64 {
        js_sys::Date::now() / 1000.0
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Best-effort error display when startup fails
    pub fn show_error(err: &InitError) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("status"))
        {
            el.set_text_content(Some(&format!("Unable to start: {}", err)));
        }
    }

    pub async fn run() -> Result<(), InitError> {
        log::info!("Claw Machine starting...");

        let window = web_sys::window().ok_or(InitError::NoWindow)?;
        let document = window.document().ok_or(InitError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
            .ok_or(InitError::NoCanvas)?;

        let (width, height) = fit_canvas(&window, &canvas);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| InitError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::NoAdapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = SdfRenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| InitError::Device(e.to_string()))?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Settings::load())));
        game.borrow_mut().render_state = Some(render_state);
        log::info!("Game initialized with seed: {}", seed);

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        setup_keyboard(game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(game.clone());
        setup_resize(canvas, game.clone());

        request_animation_frame(game);

        log::info!("Claw Machine running!");
        Ok(())
    }

    /// Size the backing store to the element's CSS size times the pixel ratio
    fn fit_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();

                let code = event.code();
                if let Some(direction) = Direction::from_key_code(&code) {
                    event.prevent_default();
                    g.input.set_direction(direction, true);
                    return;
                }

                match code.as_str() {
                    "Space" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.input.request_grab();
                        }
                    }
                    "Escape" | "KeyP" => g.input.request_pause_toggle(),
                    "KeyM" => {
                        g.settings.muted = !g.settings.muted;
                        log::info!("Muted: {}", g.settings.muted);
                        g.settings_changed();
                    }
                    "KeyQ" => {
                        g.settings.quality = g.settings.quality.cycle();
                        log::info!("Quality: {}", g.settings.quality.as_str());
                        g.settings_changed();
                    }
                    "KeyF" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings_changed();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(direction) = Direction::from_key_code(&event.code()) {
                    game.borrow_mut().input.set_direction(direction, false);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let nudges = [
            ("leftBtn", Direction::Left),
            ("rightBtn", Direction::Right),
            ("upBtn", Direction::Up),
            ("downBtn", Direction::Down),
        ];
        for (id, direction) in nudges {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{} button", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.input.nudge(direction);
                if g.state.claw.is_idle() && !g.state.paused {
                    g.audio.play(SoundEffect::Nudge);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("grabBtn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.request_grab();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("Missing #grabBtn button");
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if !g.state.paused {
                        g.input.request_pause_toggle();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            // Key-ups are lost while unfocused
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = fit_canvas(&window, &canvas);
            if let Some(render_state) = game.borrow_mut().render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {}", e);
        wasm_game::show_error(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Claw Machine (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    println!("\nRunning a headless grab...");
    headless_grab();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Let the bin settle, then drop the claw over the first toy and report
#[cfg(not(target_arch = "wasm32"))]
fn headless_grab() {
    use claw_machine::consts::INITIAL_TOY_COUNT;
    use claw_machine::sim::{GameEvent, InputState, RapierWorld, new_session, tick};

    const DT: f32 = 1.0 / 60.0;

    let mut physics = RapierWorld::new();
    let mut state = new_session(42, 0.0, &mut physics);
    let mut input = InputState::new();

    for _ in 0..180 {
        tick(&mut state, &mut physics, &mut input, DT);
    }

    if let Some(toy) = state.toys.first() {
        let target = glam::Vec2::new(toy.pos.x, toy.pos.z);
        println!("Claw over the {} at ({:.2}, {:.2})", toy.name(), target.x, target.y);
        let delta = target - state.claw.planar;
        state.claw.try_move(delta);
    }

    input.request_grab();
    for _ in 0..300 {
        tick(&mut state, &mut physics, &mut input, DT);
    }

    for event in state.drain_events() {
        if let Some(text) = event.status_text() {
            println!("  {}", text);
        }
        if let GameEvent::Deposited { points, pos, .. } = event {
            println!("  +{} points (dropped at {})", points, pos);
        }
    }
    println!(
        "Score {} with {} of {} toys left",
        state.score(),
        state.toy_count(),
        INITIAL_TOY_COUNT
    );
}
