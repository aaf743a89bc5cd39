//! # backdrop - procedural animated backgrounds
//!
//! Real-time animated backgrounds: particle networks, data rain, glowing
//! orbs, starfields, rotating wireframe globes and circuit traces. Every
//! background is the same engine driven by a different [`EngineConfig`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use backdrop::prelude::*;
//!
//! let config = EngineConfig::preset("session")?;
//! let mut engine = Engine::new(config, ManualScheduler::new())?;
//! engine.mount(1280, 720, Some(Raster::new(1280, 720)));
//!
//! engine.handle_event(HostEvent::PointerMoved(Vec2::new(640.0, 360.0)));
//! for _ in 0..60 {
//!     if let Some(frame) = engine.scheduler_mut().take_due() {
//!         engine.on_frame(frame);
//!     }
//! }
//! engine.stop();
//! ```
//!
//! ## Core Concepts
//!
//! ### Scene and entities
//!
//! A [`Scene`] holds the live state of one engine: a tick counter, a flat
//! list of [`Entity`] values grouped into populations, the pointer, transient
//! effects and an optional 3D model. It is rebuilt from scratch on resize.
//!
//! ### Populations
//!
//! A [`Population`] says what to spawn ([`Spawn`]), how many ([`Count`],
//! usually proportional to surface area), what happens at the edges
//! ([`Boundary`]) and how the pointer pushes or pulls ([`PointerForce`]).
//!
//! ### Layers
//!
//! Each frame is drawn back to front through fixed [`Layer`]s: background,
//! decor, streams, proximity edges, entities, effects, wireframe and pointer
//! glow. Drawing goes through the [`Surface`] trait; [`Raster`] renders
//! pixels and [`Recorder`] records draw calls.
//!
//! ### Scheduling
//!
//! The engine never runs its own loop. It asks a [`Scheduler`] for the next
//! frame and runs when the host delivers it. [`Engine::stop`] cancels the
//! pending frame and detaches input listeners.
//!
//! ## Presets
//!
//! | Name | Look |
//! |------|------|
//! | `network` | cyan nodes and proximity edges, pointer repels |
//! | `globe` | rotating sphere of depth-faded dots |
//! | `earth` | rotating wireframe globe |
//! | `tech` | circuit traces over a pulsing node mesh |
//! | `starfield` | twinkling stars, nebula and shooting stars |
//! | `session` | data rain, hex grid, attracting nodes, click rings |
//! | `lecture` | spotlights, orbs, floating shapes and light curtains |
//! | `balloons` | drifting balloons that flee the pointer |
//! | `blocks` | rotating wireframe cubes and light shards |

pub mod compositor;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod glyphs;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod proximity;
pub mod raster;
pub mod rules;
pub mod scene;
pub mod scheduler;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod visuals;
pub mod window;
pub mod wireframe;

pub use compositor::{compose, Decor, Layer, PointerGlow};
pub use config::EngineConfig;
pub use engine::{Engine, EngineState};
pub use entity::{Entity, EntityKind};
pub use error::{ConfigError, GpuError, HostError};
pub use input::{HostEvent, Listener};
pub use raster::Raster;
pub use rules::{linear_falloff, Boundary, PointerForce};
pub use scene::Scene;
pub use scheduler::{FrameHandle, ManualScheduler, Scheduler};
pub use spawn::{Count, Population, Spawn};
pub use surface::{Paint, Recorder, Surface};
pub use visuals::{Background, Color, Palette};
pub use wireframe::WireframeModel;

pub use glam::{Vec2, Vec3};

/// Everything needed to configure and run a background.
pub mod prelude {
    pub use crate::compositor::{Decor, Layer, PointerGlow};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, EngineState};
    pub use crate::input::HostEvent;
    pub use crate::lifecycle::{RingConfig, ShootingStarConfig};
    pub use crate::proximity::{EdgeColor, PointerLinks, ProximityConfig};
    pub use crate::raster::Raster;
    pub use crate::rules::{linear_falloff, Boundary, PointerForce};
    pub use crate::scheduler::{FrameHandle, ManualScheduler, Scheduler};
    pub use crate::spawn::{Count, Population, Spawn};
    pub use crate::surface::{Recorder, Surface};
    pub use crate::visuals::{Background, Color, Palette};
    pub use crate::wireframe::WireframeModel;
    pub use glam::{Vec2, Vec3};
}
