//! morph - draws two textured, depth-tested quads until the window is closed
//!
//! Exits with status 0 on a normal close and 1 on any setup or frame error.

use morph_engine::morph::{Config, Engine, Error};
use morph_engine::morph::render::Extent2D;
use morph_engine::{engine_error, engine_info};
use morph_renderer_vulkan::VulkanRenderer;
use std::process::ExitCode;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

struct App {
    config: Config,
    // Declared before `window`: the renderer must be dropped first
    renderer: Option<VulkanRenderer>,
    window: Option<Window>,
    failure: Option<Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            renderer: None,
            window: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        engine_error!("morph", "{}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Error> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height))
            .with_resizable(self.config.window.resizable);
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::InitializationFailed(format!("Failed to create window: {}", e)))?;

        let size = window.inner_size();
        let renderer = VulkanRenderer::new(&window, Extent2D::new(size.width, size.height), &self.config)?;
        engine_info!("morph", "Initialization complete, entering main loop");

        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            if let Err(e) = renderer.finish() {
                engine_error!("morph", "Failed to drain the GPU: {}", e);
                self.failure.get_or_insert(e);
            }
            engine_info!("morph", "Presented {} frames", renderer.frames_presented());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!("morph", "Close requested, shutting down");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let result = match self.renderer.as_mut() {
                    Some(renderer) => renderer.draw_frame().map(|_| ()),
                    None => Ok(()),
                };
                if let Err(e) = result {
                    self.shutdown();
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
        self.window = None;
    }
}

fn main() -> ExitCode {
    let config = Config::default();
    // Loader variables must be set before the Vulkan library is loaded
    Engine::initialize(&config);
    engine_info!("morph", "Starting {}", config.app_name);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!("morph", "Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let validation = config.enable_validation;
    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!("morph", "Event loop error: {}", e);
        return ExitCode::FAILURE;
    }

    if validation {
        morph_renderer_vulkan::print_validation_stats_report();
    }

    match app.failure {
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::SUCCESS,
    }
}
