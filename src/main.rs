//! grassfield - tile-scheduled GPU grass field viewer

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use grassfield::core::{
    camera::Camera,
    camera_controller::FpsCameraController,
    error::Error,
    input::InputState,
    logging,
    time::{FpsSample, FrameTimer},
    types::Result,
};
use grassfield::grass::{FrameStats, GrassField, TileIdAllocator};
use grassfield::lighting::SceneLighting;
use grassfield::render::{GpuContext, GrassPrograms, GrassRenderer};
use grassfield::scene::SceneConfig;

/// GPU-side state, created once the window exists
struct Viewer {
    gpu: GpuContext,
    renderer: GrassRenderer,
    field: GrassField,
    lighting: SceneLighting,
}

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    camera: Camera,
    controller: FpsCameraController,
    input: InputState,
    timer: FrameTimer,
    cursor_grabbed: bool,
    analytics: bool,
    last_stats: FrameStats,
    /// First fatal error; the loop exits once it is set
    error: Option<Error>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let controller = FpsCameraController::new(config.camera.move_speed, config.camera.sensitivity);
        Self {
            config,
            window: None,
            viewer: None,
            camera: Camera::default(),
            controller,
            input: InputState::new(),
            timer: FrameTimer::new(),
            cursor_grabbed: false,
            analytics: false,
            last_stats: FrameStats::default(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.as_str())
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::Window(e.to_string()))?,
        );

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let shaders = &self.config.shaders;
        let programs = GrassPrograms::load(&shaders.compute, &shaders.draw, &shaders.lighting)?;

        let field = GrassField::from_programs(
            &self.config.grass,
            &mut TileIdAllocator::new(),
            &programs.compute,
            &programs.draw,
            gpu.limits(),
        )?;
        let renderer = GrassRenderer::new(&gpu, &programs, &field)?;
        let lighting = SceneLighting::from_config(&self.config.lighting)?;

        let size = window.inner_size();
        self.camera = self.config.camera.build(field.center(), self.config.aspect())?;
        self.camera.set_aspect(size.width as f32, size.height as f32);
        self.controller.sync_with(&self.camera);

        log::info!("Window created: {}x{}", size.width, size.height);
        log::info!("Controls: WASD move, Up/Down rise/sink, Shift boost, J capture mouse, G analytics, Esc quit");

        self.window = Some(window);
        self.viewer = Some(Viewer {
            gpu,
            renderer,
            field,
            lighting,
        });
        Ok(())
    }

    fn toggle_cursor_grab(&mut self) {
        if let Some(window) = &self.window {
            self.cursor_grabbed = !self.cursor_grabbed;

            if self.cursor_grabbed {
                window
                    .set_cursor_grab(CursorGrabMode::Confined)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
                    .ok();
                window.set_cursor_visible(false);
            } else {
                window.set_cursor_grab(CursorGrabMode::None).ok();
                window.set_cursor_visible(true);
            }

            self.input.set_mouse_captured(self.cursor_grabbed);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(viewer) = &mut self.viewer {
            viewer.gpu.resize(size.width, size.height);
            viewer.renderer.resize(&viewer.gpu.device, size.width, size.height);
            self.camera.set_aspect(size.width as f32, size.height as f32);
        }
    }

    fn frame(&mut self) -> Result<()> {
        let sample = self.timer.tick();
        let dt = self.timer.delta_secs();

        let Some(viewer) = &mut self.viewer else {
            return Ok(());
        };

        self.controller.update(&mut self.camera, &self.input, dt);
        viewer.field.update(dt, self.camera.position);

        let uniforms = viewer.lighting.uniforms(self.camera.position);
        self.last_stats = viewer
            .renderer
            .render(&viewer.gpu, &mut viewer.field, &self.camera, &uniforms)?;

        if let Some(sample) = sample {
            self.report(sample);
        }
        self.input.end_frame();
        Ok(())
    }

    fn report(&self, sample: FpsSample) {
        let stats = &self.last_stats;
        let title = if self.analytics {
            log::debug!(
                "fps avg {:.1} min {:.1} max {:.1} over {} frames | {:?}",
                sample.avg, sample.min, sample.max, sample.frames, stats
            );
            format!(
                "{} | {:.1} fps (min {:.1}, max {:.1}) | {} tiles, {} draws, {} blades",
                self.config.window.title, sample.avg, sample.min, sample.max,
                stats.visible_tiles, stats.draws, stats.blades
            )
        } else {
            format!("{} | {:.1} fps", self.config.window.title, sample.avg)
        };

        if let Some(window) = &self.window {
            window.set_title(&title);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        PhysicalKey::Code(KeyCode::KeyJ) => self.toggle_cursor_grab(),
                        PhysicalKey::Code(KeyCode::KeyG) => {
                            self.analytics = !self.analytics;
                            log::info!("Frame analytics: {}", if self.analytics { "on" } else { "off" });
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Parse --config argument from command line
fn parse_config_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = match parse_config_arg(&args) {
        Some(path) => SceneConfig::load(&path)?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    logging::init();
    log::info!("grassfield starting...");

    if let Err(e) = run() {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
