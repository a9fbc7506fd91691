use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use wavesphere::cli::Options;
use wavesphere::fps::FpsTracker;
use wavesphere::params::{RenderConfig, SceneParams};
use wavesphere::rendering::Renderer;
use wavesphere::scene::SceneState;

struct App {
    renderer: Renderer,
    scene: SceneState,
    fps: Option<FpsTracker>,
    size: PhysicalSize<u32>,
    window: Arc<Window>,
}

impl App {
    /// One frame: sample the instrument, advance every oscillator,
    /// submit the scene.
    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        if let Some(fps) = &mut self.fps {
            fps.record_frame();
        }
        self.scene.advance_frame();
        self.renderer.render(&self.scene)
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.scene.camera.set_aspect(new_size.width, new_size.height);
            self.renderer.resize(new_size.width, new_size.height);
        }
    }
}

struct AppState {
    options: Options,
    app: Option<App>,
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Wavesphere")
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let params = SceneParams::default();
        if let Err(e) = params.validate() {
            log::error!("invalid scene parameters: {e}");
            event_loop.exit();
            return;
        }

        let config = RenderConfig {
            width: self.options.width,
            height: self.options.height,
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let scene = SceneState::new(&params, &config, &mut rng);

        let renderer =
            match pollster::block_on(Renderer::new(window.clone(), &scene, params.background.color))
            {
                Ok(renderer) => renderer,
                Err(e) => {
                    log::error!("renderer initialization failed: {e}");
                    event_loop.exit();
                    return;
                }
            };

        let fps = (!self.options.no_fps).then(FpsTracker::new);

        self.app = Some(App {
            renderer,
            scene,
            fps,
            size: window.inner_size(),
            window,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                if let Some(app) = &mut self.app {
                    app.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(app) = &mut self.app {
                    match app.redraw() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => app.resize(app.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("frame error: {e:?}"),
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // reschedule only while shutdown has not been requested
        if event_loop.exiting() {
            return;
        }
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}

fn main() {
    env_logger::init();

    let options = Options::parse();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app_state = AppState { options, app: None };
    event_loop
        .run_app(&mut app_state)
        .expect("event loop error");
}
