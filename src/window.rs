//! Native window host.
//!
//! Runs one [`Engine`] in a winit window. The engine draws into a
//! [`Raster`], which the [`Presenter`] uploads and shows each frame. If the
//! GPU cannot be initialized the engine is mounted without a surface and the
//! window simply stays blank.

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineState};
use crate::error::HostError;
use crate::gpu::Presenter;
use crate::input::Input;
use crate::raster::Raster;
use crate::scheduler::{FrameHandle, Scheduler};
use crate::time::FrameClock;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// How often measured FPS is logged, in ticks.
const FPS_LOG_INTERVAL: u64 = 600;

/// Maps frame requests onto `Window::request_redraw`.
///
/// winit coalesces redraw requests, so at most one frame is pending at a
/// time; scheduling again replaces it.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    window: Option<Arc<Window>>,
    next: u64,
    pending: Option<FrameHandle>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the window redraws are requested on.
    pub fn set_window(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    /// The frame waiting for the next redraw, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl Scheduler for RedrawScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        self.request_redraw();
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

struct App {
    title: String,
    engine: Engine<Raster, RedrawScheduler>,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    input: Input,
    clock: FrameClock,
    error: Option<HostError>,
}

impl App {
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.clock.is_due() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(
                Instant::now() + self.clock.until_due(),
            ));
            return;
        }
        let Some(frame) = self.engine.scheduler().pending() else {
            return;
        };

        self.clock.tick();
        if self.clock.ticks() % FPS_LOG_INTERVAL == 0 {
            log::debug!("{:.1} fps", self.clock.fps());
        }

        if !self.engine.on_frame(frame) {
            return;
        }

        let (Some(presenter), Some(raster)) = (&mut self.presenter, self.engine.surface()) else {
            return;
        };
        match presenter.present(raster) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    presenter.resize(size.width, size.height);
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::warn!("GPU out of memory; closing");
                self.engine.stop();
                event_loop.exit();
            }
            Err(e) => log::warn!("Present failed: {e}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        self.presenter = match Presenter::new(window.clone()) {
            Ok(presenter) => Some(presenter),
            Err(e) => {
                log::warn!("GPU unavailable, background stays blank: {e}");
                None
            }
        };

        let size = window.inner_size();
        self.engine.scheduler_mut().set_window(window.clone());
        let surface = self
            .presenter
            .as_ref()
            .map(|_| Raster::new(size.width, size.height));
        self.engine.mount(size.width, size.height, surface);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                self.engine.stop();
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            _ => {}
        }

        if let Some(host_event) = self.input.translate(&event) {
            self.engine.handle_event(host_event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.state() != EngineState::Running {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        if self.engine.scheduler().pending().is_some() && self.clock.is_due() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

/// Open a window and animate `config` until it is closed.
pub fn run(config: EngineConfig, seed: Option<u64>) -> Result<(), HostError> {
    let title = format!("backdrop - {}", config.name);
    let engine = match seed {
        Some(seed) => Engine::with_seed(config, RedrawScheduler::new(), seed)?,
        None => Engine::new(config, RedrawScheduler::new())?,
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        title,
        engine,
        window: None,
        presenter: None,
        input: Input::new(),
        clock: FrameClock::new(),
        error: None,
    };
    event_loop.run_app(&mut app)?;

    app.engine.stop();
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redraw_scheduler_without_window() {
        let mut scheduler = RedrawScheduler::new();
        let a = scheduler.schedule();
        let b = scheduler.schedule();
        assert_eq!(scheduler.pending(), Some(b));
        scheduler.cancel(a);
        assert_eq!(scheduler.pending(), Some(b));
        scheduler.cancel(b);
        assert_eq!(scheduler.pending(), None);
    }
}
