//! Sky Racer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Asset root, relative to the page (web) or working directory (native)
const ASSET_ROOT: &str = "assets";

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use sky_racer::consts::*;
    use sky_racer::hud::{Dashboard, Overlay};
    use sky_racer::input::InputState;
    use sky_racer::platform;
    use sky_racer::renderer::RenderState;
    use sky_racer::sim::{GamePhase, GameState, tick};
    use sky_racer::{QualityPreset, Settings};

    use super::ASSET_ROOT;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        render_state: Option<RenderState>,
        input: InputState,
        accumulator: f32,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        /// Last dashboard written to the DOM
        shown: Option<Dashboard>,
    }

    impl Game {
        fn new(state: GameState, settings: Settings) -> Self {
            Self {
                state,
                settings,
                render_state: None,
                input: InputState::default(),
                accumulator: 0.0,
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                shown: None,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input.tick_input());
                self.accumulator -= SIM_DT;
                substeps += 1;

                self.input.clear_one_shots();
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.settings, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Pause when the page loses focus
        fn auto_pause(&mut self, reason: &str) {
            self.input.release_all();
            if self.state.phase == GamePhase::Playing {
                self.input.request_pause();
                log::info!("Auto-paused ({})", reason);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if self.settings.show_fps {
                set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            }

            let dash = Dashboard::from_state(&self.state);
            if self.shown.as_ref() == Some(&dash) {
                return;
            }

            if self.settings.show_dashboard {
                set_text(&document, "#hud-level .hud-value", &dash.level_number);
                set_text(&document, "#hud-level .hud-name", &dash.level_name);
                set_text(&document, "#hud-speed .hud-value", &format!("{}%", dash.speed_percent));
                set_text(
                    &document,
                    "#hud-progress .hud-value",
                    &format!("{}%", dash.progress_percent),
                );
                set_text(&document, "#hud-status .hud-value", dash.status);
            }

            for overlay in [Overlay::Paused, Overlay::GameOver, Overlay::LevelComplete] {
                let Some(id) = overlay.element_id() else {
                    continue;
                };
                if let Some(el) = document.get_element_by_id(id) {
                    if dash.overlay == overlay {
                        let _ = el.set_attribute("class", "overlay");
                        set_text(&document, &format!("#{} .overlay-message", id), &dash.message);
                    } else {
                        let _ = el.set_attribute("class", "overlay hidden");
                    }
                }
            }

            self.shown = Some(dash);
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Match the canvas backing store to its CSS size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Sky Racer starting...");

        if let Err(e) = start().await {
            log::error!("Startup failed: {}", e);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                set_text(&document, "#loading", &format!("Failed to start: {}", e));
            }
        }
    }

    async fn start() -> Result<(), Box<dyn Error>> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let mut config = platform::load_config(ASSET_ROOT).await;
        let search = platform::location_search();
        let preset = platform::query_param(&search, "quality").and_then(QualityPreset::from_str);
        if let Some(preset) = preset {
            log::info!("Quality preset from URL: {}", preset.as_str());
            config.display.apply_preset(preset);
        }
        let levels = platform::load_levels(ASSET_ROOT).await?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "element #canvas is not a canvas")?;
        let (width, height) = fit_canvas(&canvas);

        let state = GameState::new(levels, config.physics);
        let game = Rc::new(RefCell::new(Game::new(state, config.display)));

        let settings = game.borrow().settings.clone();
        let render_state =
            RenderState::from_canvas(canvas.clone(), width, height, &settings).await?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(game.clone());
        setup_resize(&canvas, game.clone());
        setup_auto_pause(game.clone());

        show(&document, "loading", false);
        {
            let g = game.borrow();
            show(&document, "hud", g.settings.show_dashboard);
            show(&document, "hud-fps", g.settings.show_fps);
        }

        request_animation_frame(game);

        log::info!("Sky Racer running!");
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.key(), event.repeat()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if game.borrow_mut().input.key_up(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            if let Some(ref mut render_state) = game.borrow_mut().render_state {
                render_state.resize(width, height);
                log::debug!("Resized to {}x{}", width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().auto_pause("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().auto_pause("window blur");
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
                SIM_DT
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
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use sky_racer::consts::SIM_DT;
    use sky_racer::platform;
    use sky_racer::sim::{GamePhase, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Sky Racer (native) starting...");
    log::info!("Native mode runs a headless check - serve the web build to play");

    let root = std::env::args().nth(1).unwrap_or_else(|| ASSET_ROOT.to_string());
    let config = platform::load_config(&root);
    let levels = platform::load_levels(&root)?;
    let level_count = levels.len();

    // Drive every level with no input and report how far the ship gets
    let max_ticks = (120.0 / SIM_DT) as u64;
    let mut state = GameState::new(levels, config.physics);
    let idle = TickInput::default();
    for _ in 0..level_count {
        while state.phase == GamePhase::Playing && state.frame < max_ticks {
            tick(&mut state, &idle);
        }
        println!(
            "{:>2}. {:<24} {:>4} rows  {:?} after {} ticks ({:.0}% covered)",
            state.level_index + 1,
            state.level().name,
            state.track.rows(),
            state.phase,
            state.frame,
            state.progress() * 100.0
        );
        state.advance_level();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
