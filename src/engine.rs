//! Engine lifecycle: mount, animate, resize, stop.
//!
//! An [`Engine`] owns one scene, one drawing surface, one scheduler and its
//! listener registrations. Nothing is shared between engines, so any number
//! can run side by side.
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::preset("network")?, ManualScheduler::new())?;
//! engine.mount(800, 600, Some(Raster::new(800, 600)));
//!
//! // Each frame schedules the next, so a headless host steps a fixed count.
//! for _ in 0..120 {
//!     if let Some(frame) = engine.scheduler_mut().take_due() {
//!         engine.on_frame(frame);
//!     }
//! }
//!
//! engine.stop();
//! ```

use crate::compositor::compose;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::input::{HostEvent, Listeners};
use crate::scene::Scene;
use crate::scheduler::{FrameHandle, Scheduler};
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Where an engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created, not mounted yet.
    Idle,
    /// Mounted on a surface and scheduling frames.
    Running,
    /// Mounted without a usable surface. Every operation is a no-op.
    Blank,
    /// Torn down. Frames and events are ignored.
    Stopped,
}

/// One animated background instance.
pub struct Engine<D: Surface, S: Scheduler> {
    config: EngineConfig,
    scheduler: S,
    surface: Option<D>,
    scene: Option<Scene>,
    listeners: Listeners,
    pending: Option<FrameHandle>,
    state: EngineState,
    seed: u64,
    /// Bumped on every reseed so a resized scene is not a copy of the last.
    generation: u64,
}

impl<D: Surface, S: Scheduler> Engine<D, S> {
    /// Create an engine, seeding its randomness from the OS.
    pub fn new(config: EngineConfig, scheduler: S) -> Result<Self, ConfigError> {
        Self::with_seed(config, scheduler, rand::random())
    }

    /// Create an engine with a fixed seed, for reproducible scenes.
    pub fn with_seed(config: EngineConfig, scheduler: S, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            scheduler,
            surface: None,
            scene: None,
            listeners: Listeners::new(),
            pending: None,
            state: EngineState::Idle,
            seed,
            generation: 0,
        })
    }

    /// Mount on a surface and start animating.
    ///
    /// `None` means the host could not provide a drawing context; the engine
    /// goes [`Blank`](EngineState::Blank) and stays inert. Mounting anything
    /// but an idle engine does nothing.
    pub fn mount(&mut self, width: u32, height: u32, surface: Option<D>) {
        if self.state != EngineState::Idle {
            return;
        }

        let Some(mut surface) = surface else {
            log::warn!(
                "No drawing surface for '{}'; background stays blank",
                self.config.name
            );
            self.state = EngineState::Blank;
            return;
        };

        surface.resize(width, height);
        self.surface = Some(surface);
        self.listeners.attach_all();
        self.reseed(width, height);
        self.state = EngineState::Running;
        self.pending = Some(self.scheduler.schedule());

        log::info!("Started '{}' at {}x{}", self.config.name, width, height);
    }

    /// Feed one input event. Events without an attached listener are dropped.
    pub fn handle_event(&mut self, event: HostEvent) {
        if self.state != EngineState::Running || !self.listeners.is_attached(event.listener()) {
            return;
        }

        match event {
            HostEvent::PointerMoved(pos) => {
                if let Some(scene) = &mut self.scene {
                    scene.pointer_mut().move_to(pos);
                }
            }
            HostEvent::PointerLeft => {
                if let Some(scene) = &mut self.scene {
                    scene.pointer_mut().leave();
                }
            }
            HostEvent::Click(pos) => {
                if let Some(scene) = &mut self.scene {
                    scene.pointer_mut().click(pos);
                }
            }
            HostEvent::Resized { width, height } => self.resize(width, height),
        }
    }

    /// Resize the surface and discard the scene for a freshly seeded one.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state != EngineState::Running {
            return;
        }
        if let Some(surface) = &mut self.surface {
            surface.resize(width, height);
        }
        self.reseed(width, height);
    }

    /// Run one scheduled frame: update, draw, schedule the next.
    ///
    /// Returns `false` and does nothing when `handle` is not the frame this
    /// engine is waiting for, which covers frames delivered after `stop`.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.state != EngineState::Running || self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        self.step();
        self.pending = Some(self.scheduler.schedule());
        true
    }

    /// Update and draw once without touching the scheduler.
    pub fn step(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        if let (Some(scene), Some(surface)) = (&mut self.scene, &mut self.surface) {
            scene.tick(&self.config);
            compose(surface, scene, &self.config);
        }
    }

    /// Stop animating: cancel the pending frame and detach every listener.
    ///
    /// Safe to call any number of times, in any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        let detached = self.listeners.detach_all();
        if self.state != EngineState::Stopped {
            log::info!(
                "Stopped '{}' ({} listeners detached)",
                self.config.name,
                detached
            );
        }
        self.state = EngineState::Stopped;
    }

    fn reseed(&mut self, width: u32, height: u32) {
        let seed = self.seed.wrapping_add(self.generation);
        self.generation += 1;
        log::debug!(
            "Reseeding '{}' at {}x{} (seed {})",
            self.config.name,
            width,
            height,
            seed
        );
        self.scene = Some(Scene::new(
            &self.config,
            width,
            height,
            StdRng::seed_from_u64(seed),
        ));
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn surface(&self) -> Option<&D> {
        self.surface.as_ref()
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// The frame this engine is waiting for.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Listener;
    use crate::scheduler::ManualScheduler;
    use crate::surface::Recorder;
    use glam::Vec2;

    fn engine(name: &str) -> Engine<Recorder, ManualScheduler> {
        let config = EngineConfig::preset(name).unwrap();
        Engine::with_seed(config, ManualScheduler::new(), 7).unwrap()
    }

    #[test]
    fn test_mount_schedules_first_frame() {
        let mut engine = engine("network");
        assert_eq!(engine.state(), EngineState::Idle);
        engine.mount(640, 480, Some(Recorder::new(1, 1)));
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.scheduler().pending(), 1);
        assert_eq!(engine.listeners().len(), Listener::ALL.len());
        assert_eq!(engine.surface().map(|s| s.size()), Some(Vec2::new(640.0, 480.0)));
    }

    #[test]
    fn test_frames_chain() {
        let mut engine = engine("network");
        engine.mount(640, 480, Some(Recorder::new(640, 480)));
        for _ in 0..3 {
            let frame = engine.scheduler_mut().take_due().unwrap();
            assert!(engine.on_frame(frame));
        }
        assert_eq!(engine.scene().map(|s| s.t()), Some(3));
        assert_eq!(engine.surface().map(|s| s.frames()), Some(3));
        assert_eq!(engine.scheduler().pending(), 1);
    }

    #[test]
    fn test_stale_frame_ignored() {
        let mut engine = engine("network");
        engine.mount(640, 480, Some(Recorder::new(640, 480)));
        assert!(!engine.on_frame(FrameHandle(999)));
        assert_eq!(engine.scene().map(|s| s.t()), Some(0));
    }

    #[test]
    fn test_blank_mount_is_inert() {
        let mut engine = engine("session");
        engine.mount(640, 480, None);
        assert_eq!(engine.state(), EngineState::Blank);
        engine.handle_event(HostEvent::Click(Vec2::ZERO));
        engine.step();
        assert!(engine.scene().is_none());
        assert_eq!(engine.scheduler().scheduled_count(), 0);
        engine.stop();
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::preset("network").unwrap();
        config.palette.clear();
        let result: Result<Engine<Recorder, _>, _> =
            Engine::with_seed(config, ManualScheduler::new(), 0);
        assert!(result.is_err());
    }
}
