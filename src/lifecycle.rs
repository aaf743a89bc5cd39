//! Transient effect lifecycle.
//!
//! Transient effects are short-lived visuals spawned by discrete events: a
//! pulse ring per click, and the occasional shooting star. Each has a
//! monotonic progress variable; once it reaches its end the effect is
//! terminal and is pruned in the same tick, before the next draw.
//!
//! # Ring lifecycle
//!
//! ```text
//! spawn (radius = start) --advance--> Growing --radius >= max--> Terminal (removed)
//! ```
//!
//! Opacity is derived from the radius, never animated on its own:
//! `opacity = 1 - radius / max_radius`.
//!
//! # Quick Start
//!
//! ```ignore
//! let mut effects = Effects::new();
//! effects.spawn_ring(click_pos, &RingConfig::default(), Color::WHITE);
//! effects.update(); // once per tick
//! ```

use crate::visuals::{clamp_unit, Color};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Settings for click pulse rings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    pub start_radius: f32,
    pub max_radius: f32,
    /// Radius increase per tick.
    pub growth: f32,
    /// Fixed ring color. `None` picks a palette color for every click.
    #[serde(default)]
    pub color: Option<Color>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            start_radius: 10.0,
            max_radius: 200.0,
            growth: 4.0,
            color: None,
        }
    }
}

/// Settings for randomly spawned shooting stars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShootingStarConfig {
    /// Spawn probability per tick.
    pub chance: f32,
    /// Streak length range in pixels.
    pub length: [f32; 2],
    /// Ticks a streak stays visible.
    pub lifetime: u32,
}

impl Default for ShootingStarConfig {
    fn default() -> Self {
        Self {
            chance: 0.002,
            length: [50.0, 150.0],
            lifetime: 24,
        }
    }
}

/// An expanding ring left by a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseRing {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub color: Color,
}

impl PulseRing {
    pub fn new(center: Vec2, config: &RingConfig, color: Color) -> Self {
        Self {
            center,
            radius: config.start_radius,
            max_radius: config.max_radius,
            growth: config.growth,
            color,
        }
    }

    /// Grow by one tick. Returns `true` once the ring is terminal.
    pub fn advance(&mut self) -> bool {
        self.radius += self.growth;
        self.is_terminal()
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.radius >= self.max_radius
    }

    /// Derived opacity, in `[0, 1]`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        if self.max_radius <= 0.0 {
            return 0.0;
        }
        clamp_unit(1.0 - self.radius / self.max_radius)
    }
}

/// A streak that slides along its direction and fades out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShootingStar {
    pub start: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    pub length: f32,
    pub age: u32,
    pub lifetime: u32,
}

impl ShootingStar {
    /// A streak heading down and to the right at about 45 degrees.
    ///
    /// `angle_jitter` in `[0, 1]` tilts it by up to 0.2 radians.
    pub fn new(start: Vec2, length: f32, angle_jitter: f32, lifetime: u32) -> Self {
        let angle = FRAC_PI_4 + clamp_unit(angle_jitter) * 0.2;
        Self {
            start,
            direction: Vec2::new(angle.cos(), angle.sin()),
            length,
            age: 0,
            lifetime,
        }
    }

    /// Age by one tick. Returns `true` once the streak is terminal.
    pub fn advance(&mut self) -> bool {
        self.age += 1;
        self.start += self.direction * self.length * 0.1;
        self.age >= self.lifetime
    }

    /// Current streak segment.
    pub fn segment(&self) -> (Vec2, Vec2) {
        (self.start, self.start + self.direction * self.length)
    }

    /// Fades linearly over the lifetime.
    pub fn opacity(&self) -> f32 {
        if self.lifetime == 0 {
            return 0.0;
        }
        clamp_unit(1.0 - self.age as f32 / self.lifetime as f32)
    }
}

/// Any transient effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Ring(PulseRing),
    ShootingStar(ShootingStar),
}

impl Effect {
    fn advance(&mut self) -> bool {
        match self {
            Effect::Ring(ring) => ring.advance(),
            Effect::ShootingStar(star) => star.advance(),
        }
    }
}

/// The active transient effects of a scene.
///
/// No pooling and no cap: effects are created per event and dropped when
/// terminal.
#[derive(Debug, Default, Clone)]
pub struct Effects {
    active: Vec<Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn exactly one ring at `center`.
    pub fn spawn_ring(&mut self, center: Vec2, config: &RingConfig, color: Color) {
        self.active
            .push(Effect::Ring(PulseRing::new(center, config, color)));
    }

    pub fn spawn(&mut self, effect: Effect) {
        self.active.push(effect);
    }

    /// Advance every effect one tick and drop the terminal ones.
    ///
    /// Returns how many effects were removed.
    pub fn update(&mut self) -> usize {
        let before = self.active.len();
        self.active.retain_mut(|effect| !effect.advance());
        before - self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.active.iter()
    }

    /// Active pulse rings.
    pub fn rings(&self) -> impl Iterator<Item = &PulseRing> {
        self.active.iter().filter_map(|e| match e {
            Effect::Ring(ring) => Some(ring),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_terminates_after_48_ticks() {
        let mut ring = PulseRing::new(Vec2::ZERO, &RingConfig::default(), Color::WHITE);
        for tick in 1..=47 {
            assert!(!ring.advance(), "terminal too early at tick {tick}");
        }
        assert!(ring.radius < 200.0);
        assert!(ring.advance());
        assert!(ring.radius >= 200.0);
    }

    #[test]
    fn test_ring_opacity_derived_and_bounded() {
        let mut ring = PulseRing::new(Vec2::ZERO, &RingConfig::default(), Color::WHITE);
        assert!((ring.opacity() - 0.95).abs() < 1e-6);
        while !ring.advance() {
            assert!((0.0..=1.0).contains(&ring.opacity()));
        }
        assert_eq!(ring.opacity(), 0.0);
    }

    #[test]
    fn test_effects_prune_terminal() {
        let mut effects = Effects::new();
        effects.spawn_ring(Vec2::ZERO, &RingConfig::default(), Color::WHITE);
        for _ in 0..47 {
            assert_eq!(effects.update(), 0);
        }
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.update(), 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_rings_are_independent() {
        let mut effects = Effects::new();
        let config = RingConfig::default();
        effects.spawn_ring(Vec2::ZERO, &config, Color::WHITE);
        for _ in 0..10 {
            effects.update();
        }
        effects.spawn_ring(Vec2::ONE, &config, Color::WHITE);
        let radii: Vec<f32> = effects.rings().map(|r| r.radius).collect();
        assert_eq!(radii, vec![50.0, 10.0]);
    }

    #[test]
    fn test_shooting_star_fades_out() {
        let mut star = ShootingStar::new(Vec2::ZERO, 100.0, 0.0, 4);
        assert_eq!(star.opacity(), 1.0);
        let (a, b) = star.segment();
        assert!((a.distance(b) - 100.0).abs() < 1e-4);
        assert!(!star.advance());
        assert!(!star.advance());
        assert!(!star.advance());
        assert!(star.advance());
        assert_eq!(star.opacity(), 0.0);
    }
}
