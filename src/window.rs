//! Native window host for the background.
//!
//! Opens a window, acquires a [`GpuSurface`] for it, mounts the scene and
//! forwards frame ticks until the window closes. Dragging with the left mouse
//! button nudges the orbiting camera.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{SceneConfig, WindowConfig};
use crate::error::BackdropError;
use crate::gpu::GpuSurface;
use crate::scene::BackgroundScene;
use crate::time::Time;
use crate::view::BackgroundView;

/// Radians of orbit per pixel dragged.
const DRAG_SENSITIVITY: f32 = 0.005;

struct App {
    window_config: WindowConfig,
    pending_scene: Option<BackgroundScene>,
    view: BackgroundView<GpuSurface>,
    window: Option<Arc<Window>>,
    time: Time,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<BackdropError>,
}

impl App {
    fn new(scene: BackgroundScene, window_config: WindowConfig) -> Self {
        Self {
            window_config,
            pending_scene: Some(scene),
            view: BackgroundView::new(),
            window: None,
            time: Time::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: BackdropError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.view.unmount();
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (t, _) = self.time.update();

        match self.view.on_frame(t) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.view.resize(size.width, size.height);
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                self.view.unmount();
                event_loop.exit();
                return;
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            if self.time.frame() % 60 == 0 {
                window.set_title(&format!(
                    "{} - {:.0} fps",
                    self.window_config.title,
                    self.time.fps()
                ));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.window_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        let surface = match pollster::block_on(GpuSurface::new(window.clone())) {
            Ok(surface) => surface,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        if let Some(scene) = self.pending_scene.take() {
            self.view.mount(scene, surface);
            self.time.reset();
        }
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.view.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.view.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(mounted) = self.view.mounted_mut() {
                            mounted.orbit_by(-dx * DRAG_SENSITIVITY, dy * DRAG_SENSITIVITY);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Build the configured scene and show it in a window until it is closed.
pub fn run(config: SceneConfig) -> Result<(), BackdropError> {
    let scene = config.build()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene, config.window);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
