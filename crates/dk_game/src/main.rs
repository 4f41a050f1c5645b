//! Dadkin -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. Keyboard
//! events only update `InputState`; pointer events go straight to the editor
//! in game-pixel coordinates. All simulation runs inside `RedrawRequested`
//! using a **fixed-timestep** model (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one scene tick per fixed-dt slice, then clear
//!      edge-triggered input so a press is seen by exactly one tick
//!   3. Paint the active scene (and the F3 debug panel) through egui
//!
//! The level store is a JSON file slot under `storage.dir`; it is handed from
//! scene to scene, never shared.

mod collision;
mod config;
mod editor;
mod entity;
mod gameplay;
mod physics;
mod player;
#[cfg(test)]
mod replay;
mod scenes;
mod view;

use std::path::Path;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use config::{load_config_or_default, GameConfig, CONFIG_PATH};
use dk_core::input::{InputState, Key};
use dk_core::time::TimeState;
use dk_level::JsonLevelStore;
use dk_platform::window::PlatformConfig;
use dk_render::{Canvas, GpuContext};
use scenes::SceneDirector;
use view::Viewport;

/// #2d2d44
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0x2d as f64 / 255.0,
    g: 0x2d as f64 / 255.0,
    b: 0x44 as f64 / 255.0,
    a: 1.0,
};

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    canvas: Canvas,
    time: TimeState,
    input: InputState,
    scenes: SceneDirector,
    /// Last pointer position in game pixels.
    cursor: Option<(f32, f32)>,
    show_debug: bool,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig) -> Self {
        let gpu = GpuContext::new(window.clone());
        let canvas = Canvas::new(&gpu.device, gpu.surface_format, &window);

        let store_dir = Path::new(&config.storage.dir);
        log::info!("Level storage: {}", store_dir.display());
        let store = Box::new(JsonLevelStore::in_dir(store_dir));
        let scenes = SceneDirector::new(store, config);

        Self {
            window,
            gpu,
            canvas,
            time: TimeState::new(),
            input: InputState::new(),
            scenes,
            cursor: None,
            show_debug: false,
        }
    }

    /// Converts a physical-pixel window position to game pixels.
    fn game_point(&self, physical_x: f64, physical_y: f64) -> (f32, f32) {
        let scale = self.window.scale_factor() as f32;
        let display = &self.scenes.config().display;
        let viewport = Viewport::fit(
            self.gpu.size.0 as f32 / scale,
            self.gpu.size.1 as f32 / scale,
            display.width as f32,
            display.height as f32,
        );
        viewport.to_game(physical_x as f32 / scale, physical_y as f32 / scale)
    }
}

struct App {
    config: GameConfig,
    platform: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        let platform = PlatformConfig {
            title: "Dadkin".to_string(),
            logical_width: config.display.width,
            logical_height: config.display.height,
            scale: config.display.scale,
        };
        Self {
            config,
            platform,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = dk_platform::window::create_window(event_loop, &self.platform);
        self.state = Some(EngineState::new(window, self.config.clone()));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.canvas.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => {
                state.input.release_all();
                state.scenes.pointer_up();
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = state.game_point(position.x, position.y);
                state.cursor = Some((x, y));
                if !egui_consumed {
                    state.scenes.pointer_move(x, y);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                state.scenes.pointer_left();
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed if !egui_consumed => {
                    if let Some((x, y)) = state.cursor {
                        state.scenes.pointer_down(x, y);
                    }
                }
                ElementState::Pressed => {}
                ElementState::Released => state.scenes.pointer_up(),
            },

            WindowEvent::RedrawRequested => {
                if state.gpu.is_minimized() {
                    return;
                }

                // Fixed-step simulation phase.
                state.time.begin_frame();
                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::Escape) {
                        event_loop.exit();
                        return;
                    }
                    if state.input.is_just_pressed(Key::F3) {
                        state.show_debug = !state.show_debug;
                        log::info!(
                            "Debug panel: {}",
                            if state.show_debug { "ON" } else { "OFF" }
                        );
                    }

                    state
                        .scenes
                        .fixed_update(Some(&state.input), state.time.fixed_dt_us);
                    state.input.end_frame();
                }

                // Render phase.
                let scenes = &state.scenes;
                let time = &state.time;
                let show_debug = state.show_debug;
                state
                    .canvas
                    .render(&state.gpu, &state.window, CLEAR_COLOR, |ctx| {
                        if let Some(scene) = scenes.active() {
                            view::draw_scene(ctx, scene, scenes.config());
                        }
                        if show_debug {
                            view::draw_debug_window(ctx, time, scenes.active());
                        }
                    });
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Digit1 => Some(Key::Num1),
        KeyCode::Digit2 => Some(Key::Num2),
        KeyCode::Digit3 => Some(Key::Num3),
        KeyCode::Digit4 => Some(Key::Num4),
        KeyCode::Digit5 => Some(Key::Num5),
        KeyCode::Digit6 => Some(Key::Num6),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Dadkin starting...");
    let config = load_config_or_default(Path::new(CONFIG_PATH));

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
