//! Motion rules: boundary handling and pointer forces.
//!
//! Each population in a scene picks one [`Boundary`] and one
//! [`PointerForce`]. Rules run once per tick in a fixed order:
//!
//! 1. pointer force (repulsion displaces, attraction accelerates)
//! 2. integration, `position += velocity`
//! 3. damping (attraction only)
//! 4. boundary, so positions always end the tick in bounds
//!
//! # Example
//!
//! ```ignore
//! let force = PointerForce::Repel { radius: 200.0, strength: 5.0 };
//! let boundary = Boundary::Bounce;
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Weight in `[0, 1]` for distance `dist` against `radius`: `1 - d/r`,
/// zero at or beyond the radius.
pub fn linear_falloff(dist: f32, radius: f32) -> f32 {
    if !(radius > 0.0) || !(dist < radius) || dist.is_nan() {
        return 0.0;
    }
    1.0 - (dist.max(0.0) / radius).clamp(0.0, 1.0)
}

/// What happens when an entity reaches the edge of the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Leave through one edge, re-enter through the opposite one.
    ///
    /// Crossing `-margin` teleports to `dim + margin` and vice versa, so the
    /// entity slides fully out of view before reappearing. Velocity is kept.
    Wrap,

    /// Reflect off the surface edges.
    ///
    /// The velocity component normal to the crossed edge is flipped to point
    /// back inside and the position is clamped into `[0, dim]`.
    #[default]
    Bounce,
}

impl Boundary {
    /// Apply the boundary to a position and, for bounce, its velocity.
    ///
    /// `margin` is the entity's own extent. Entities without velocity (for
    /// example spotlights) pass `None` and are only clamped or wrapped.
    pub fn apply(&self, pos: &mut Vec2, vel: Option<&mut Vec2>, margin: f32, bounds: Vec2) {
        match self {
            Boundary::Wrap => {
                wrap_axis(&mut pos.x, margin, bounds.x);
                wrap_axis(&mut pos.y, margin, bounds.y);
            }
            Boundary::Bounce => {
                let mut scratch = Vec2::ZERO;
                let vel = vel.unwrap_or(&mut scratch);
                bounce_axis(&mut pos.x, &mut vel.x, bounds.x);
                bounce_axis(&mut pos.y, &mut vel.y, bounds.y);
            }
        }
    }
}

fn wrap_axis(p: &mut f32, margin: f32, dim: f32) {
    if p.is_nan() {
        *p = -margin;
    } else if *p < -margin {
        *p = dim + margin;
    } else if *p > dim + margin {
        *p = -margin;
    }
}

fn bounce_axis(p: &mut f32, v: &mut f32, dim: f32) {
    if p.is_nan() {
        *p = 0.0;
    }
    if *p < 0.0 {
        *p = 0.0;
        *v = v.abs();
    } else if *p > dim {
        *p = dim;
        *v = -v.abs();
    }
}

/// How a population reacts to the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PointerForce {
    /// Ignore the pointer.
    #[default]
    None,

    /// Push entities directly away from the pointer.
    ///
    /// An entity at distance `d < radius` is displaced (not accelerated) by
    /// `(radius - d) / radius * strength` pixels this tick.
    Repel { radius: f32, strength: f32 },

    /// Pull entities toward the pointer, with global damping.
    ///
    /// Inside the radius velocity grows by `(radius - d) / radius * strength`
    /// toward the pointer. Every tick, near or not, velocity is multiplied by
    /// `damping`.
    Attract {
        radius: f32,
        strength: f32,
        damping: f32,
    },
}

impl PointerForce {
    /// Velocity damping factor applied every tick, if any.
    pub fn damping(&self) -> Option<f32> {
        match self {
            PointerForce::Attract { damping, .. } => Some(*damping),
            _ => None,
        }
    }
}

/// Displacement that repels an entity at `pos` from `pointer`.
///
/// Zero when the entity is on the pointer (no direction) or outside `radius`.
pub fn repel_displacement(pos: Vec2, pointer: Vec2, radius: f32, strength: f32) -> Vec2 {
    let offset = pos - pointer;
    let dist = offset.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }
    offset / dist * linear_falloff(dist, radius) * strength
}

/// Velocity increment that pulls an entity at `pos` toward `pointer`.
///
/// Zero when the entity is on the pointer or outside `radius`.
pub fn attract_impulse(pos: Vec2, pointer: Vec2, radius: f32, strength: f32) -> Vec2 {
    let offset = pointer - pos;
    let dist = offset.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }
    offset / dist * linear_falloff(dist, radius) * strength
}
