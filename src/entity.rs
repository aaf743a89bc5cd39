//! Entities: the simulated visual objects of a scene.
//!
//! Every entity shares a small core (position and size) and carries one
//! variant-specific record in [`EntityKind`]. The set of variants is closed;
//! the compositor dispatches on it with a single `match`.
//!
//! The `size` of an entity doubles as its boundary margin: an entity may
//! drift up to `size` pixels past an edge before it wraps.

use crate::spawn::SpawnContext;
use crate::visuals::{clamp_unit, Color};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Shapes within this distance of the pointer brighten.
pub const SHAPE_REACT_RADIUS: f32 = 200.0;
/// Floor a shape's opacity decays back to.
pub const SHAPE_MIN_OPACITY: f32 = 0.1;
/// Spotlights within this distance of the pointer are pulled toward it.
pub const SPOTLIGHT_PULL_RADIUS: f32 = 400.0;
/// Fraction of the distance to the pointer a spotlight closes per tick.
pub const SPOTLIGHT_PULL: f32 = 0.01;
/// A spotlight closer than this on both axes picks a new target.
pub const SPOTLIGHT_ARRIVAL: f32 = 10.0;
/// Per-tick chance that a stream swaps one of its glyphs.
pub const STREAM_MUTATION_CHANCE: f32 = 0.02;
/// Horizontal drift of a star as a fraction of its fall speed.
pub const STAR_DRIFT: f32 = 0.2;

/// Sinusoidal pulse: `base + sin(t * speed + phase) * amplitude`.
#[inline]
pub fn pulse(t: u64, speed: f32, phase: f32, base: f32, amplitude: f32) -> f32 {
    base + (t as f32 * speed + phase).sin() * amplitude
}

/// Outline tag of a floating shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Circle,
    Square,
    Triangle,
    Hexagon,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
    ];

    /// Polygon vertices for this shape, or `None` for a circle.
    ///
    /// Squares use `size` as side length; triangles and hexagons use it as
    /// circumradius.
    pub fn outline(&self, center: Vec2, size: f32, rotation: f32) -> Option<Vec<Vec2>> {
        let regular = |n: usize, start: f32| -> Vec<Vec2> {
            (0..n)
                .map(|i| {
                    let angle = rotation + start + TAU / n as f32 * i as f32;
                    center + Vec2::new(angle.cos(), angle.sin()) * size
                })
                .collect()
        };
        match self {
            ShapeKind::Circle => None,
            ShapeKind::Square => {
                let half = size * 0.5;
                let (sin, cos) = rotation.sin_cos();
                let corners = [(-half, -half), (half, -half), (half, half), (-half, half)];
                Some(
                    corners
                        .iter()
                        .map(|&(x, y)| center + Vec2::new(x * cos - y * sin, x * sin + y * cos))
                        .collect(),
                )
            }
            ShapeKind::Triangle => Some(regular(3, -FRAC_PI_2)),
            ShapeKind::Hexagon => Some(regular(6, 0.0)),
        }
    }
}

/// A glowing network node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub vel: Vec2,
    pub color: Color,
    pub opacity: f32,
    pub phase: f32,
    pub pulse_speed: f32,
}

/// A drifting, twinkling star.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Downward speed in px/tick.
    pub speed: f32,
    pub opacity: f32,
    pub phase: f32,
    pub twinkle_speed: f32,
    /// Bright stars are drawn larger and at full opacity.
    pub bright: bool,
}

/// A column of falling glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub speed: f32,
    /// Head first; glyph `i` sits `i * pitch` below the entity position.
    pub glyphs: Vec<char>,
    pub opacity: f32,
    /// Vertical distance between glyphs.
    pub pitch: f32,
}

impl Stream {
    /// Opacity of glyph `i`, fading toward the tail.
    pub fn glyph_opacity(&self, i: usize) -> f32 {
        let len = self.glyphs.len().max(1) as f32;
        clamp_unit(self.opacity * (1.0 - i as f32 / len * 0.8))
    }
}

/// A slowly spinning outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub vel: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub shape: ShapeKind,
    pub color: Color,
    /// Responds to pointer proximity.
    pub opacity: f32,
}

impl Shape {
    /// Brighten near the pointer, otherwise decay toward the floor.
    pub fn react(&mut self, pos: Vec2, pointer: Option<Vec2>) {
        let near = pointer
            .map(|p| p.distance(pos))
            .filter(|d| *d < SHAPE_REACT_RADIUS);
        self.opacity = match near {
            Some(d) => 0.3 + (1.0 - d / SHAPE_REACT_RADIUS) * 0.3,
            None => (self.opacity - 0.01).max(SHAPE_MIN_OPACITY),
        };
    }
}

/// A large soft light easing toward a wandering target.
#[derive(Debug, Clone, PartialEq)]
pub struct Spotlight {
    pub target: Vec2,
    pub color: Color,
    /// Fraction of the remaining distance closed per tick.
    pub speed: f32,
}

/// A pulsing glow orb.
#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub vel: Vec2,
    pub phase: f32,
    pub pulse_speed: f32,
    pub color: Color,
}

/// A large blurred balloon.
#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    pub vel: Vec2,
    pub color: Color,
}

/// An orthogonal trace revealed progressively from its first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub points: Vec<Vec2>,
    /// Reveal progress in `[0, 1)`.
    pub progress: f32,
    pub speed: f32,
    pub color: Color,
    /// Length range used when the trace is regenerated.
    pub segment_length: [f32; 2],
}

impl Circuit {
    /// The revealed part of the trace and, while drawing, its moving head.
    pub fn revealed(&self) -> (Vec<Vec2>, Option<Vec2>) {
        if self.points.len() < 2 {
            return (self.points.clone(), None);
        }
        let segments = self.points.len() - 1;
        let along = clamp_unit(self.progress) * segments as f32;
        let index = (along.floor() as usize).min(segments);
        let mut path: Vec<Vec2> = self.points[..=index].to_vec();
        if index < segments {
            let head = self.points[index].lerp(self.points[index + 1], along.fract());
            path.push(head);
            (path, Some(head))
        } else {
            (path, None)
        }
    }

    /// Corner points already passed by the head.
    pub fn reached_corners(&self) -> &[Vec2] {
        if self.points.len() < 2 {
            return &self.points;
        }
        let segments = self.points.len() - 1;
        let index = ((clamp_unit(self.progress) * segments as f32).floor() as usize).min(segments);
        &self.points[..=index]
    }
}

/// Variant-specific state of an [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Node(Node),
    Star(Star),
    Stream(Stream),
    Shape(Shape),
    Spotlight(Spotlight),
    Orb(Orb),
    Balloon(Balloon),
    Circuit(Circuit),
}

/// One simulated visual object.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub pos: Vec2,
    /// Radius or extent in pixels; also the boundary margin.
    pub size: f32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec2, size: f32, kind: EntityKind) -> Self {
        Self { pos, size, kind }
    }

    /// Velocity, for kinds that integrate one.
    pub fn velocity(&self) -> Option<Vec2> {
        match &self.kind {
            EntityKind::Node(n) => Some(n.vel),
            EntityKind::Shape(s) => Some(s.vel),
            EntityKind::Orb(o) => Some(o.vel),
            EntityKind::Balloon(b) => Some(b.vel),
            _ => None,
        }
    }

    pub fn velocity_mut(&mut self) -> Option<&mut Vec2> {
        self.pos_and_velocity_mut().1
    }

    /// Position together with the velocity, for rules that touch both.
    pub fn pos_and_velocity_mut(&mut self) -> (&mut Vec2, Option<&mut Vec2>) {
        let vel = match &mut self.kind {
            EntityKind::Node(n) => Some(&mut n.vel),
            EntityKind::Shape(s) => Some(&mut s.vel),
            EntityKind::Orb(o) => Some(&mut o.vel),
            EntityKind::Balloon(b) => Some(&mut b.vel),
            _ => None,
        };
        (&mut self.pos, vel)
    }

    /// How far past an edge the entity may travel before wrapping.
    #[inline]
    pub fn margin(&self) -> f32 {
        self.size
    }

    /// Whether the generic boundary rule applies.
    ///
    /// Streams and circuits manage their own extent.
    pub fn is_bounded(&self) -> bool {
        !matches!(self.kind, EntityKind::Stream(_) | EntityKind::Circuit(_))
    }

    /// The node record, if this entity is a node.
    pub fn as_node(&self) -> Option<&Node> {
        match &self.kind {
            EntityKind::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Kind-specific motion that is not plain velocity integration.
    ///
    /// Runs after integration and before the boundary rule.
    pub fn advance(&mut self, ctx: &mut SpawnContext, pointer: Option<Vec2>) {
        let bounds = ctx.size;
        let pos = &mut self.pos;
        let size = self.size;
        match &mut self.kind {
            EntityKind::Star(star) => {
                pos.y += star.speed;
                pos.x += star.speed * STAR_DRIFT;
                if pos.y > bounds.y + size {
                    pos.y = -size;
                    pos.x = ctx.random() * bounds.x;
                }
            }
            EntityKind::Stream(stream) => {
                pos.y += stream.speed;
                if pos.y > bounds.y + size {
                    pos.y = -size;
                    for glyph in stream.glyphs.iter_mut() {
                        *glyph = ctx.glyph();
                    }
                }
                if !stream.glyphs.is_empty() && ctx.chance(STREAM_MUTATION_CHANCE) {
                    let i = ctx.index(stream.glyphs.len());
                    stream.glyphs[i] = ctx.glyph();
                }
            }
            EntityKind::Shape(shape) => {
                shape.rotation = (shape.rotation + shape.spin) % TAU;
                shape.react(*pos, pointer);
            }
            EntityKind::Spotlight(light) => {
                let delta = light.target - *pos;
                *pos += delta * light.speed;
                if delta.x.abs() < SPOTLIGHT_ARRIVAL && delta.y.abs() < SPOTLIGHT_ARRIVAL {
                    light.target = ctx.random_point();
                }
                if let Some(p) = pointer {
                    if p.distance(*pos) < SPOTLIGHT_PULL_RADIUS {
                        *pos += (p - *pos) * SPOTLIGHT_PULL;
                    }
                }
            }
            EntityKind::Circuit(circuit) => {
                circuit.progress += circuit.speed;
                if circuit.progress >= 1.0 {
                    circuit.points = ctx
                        .circuit_path(circuit.points.len().saturating_sub(1), circuit.segment_length);
                    circuit.progress = 0.0;
                    circuit.color = ctx.pick_color(circuit.color);
                    if let Some(first) = circuit.points.first() {
                        *pos = *first;
                    }
                }
            }
            EntityKind::Node(_) | EntityKind::Orb(_) | EntityKind::Balloon(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_has_phase() {
        let a = pulse(10, 0.05, 0.0, 1.0, 0.3);
        let b = pulse(10, 0.05, 1.0, 1.0, 0.3);
        assert_ne!(a, b);
        assert!((pulse(0, 0.05, 0.0, 1.0, 0.3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shape_outlines() {
        assert!(ShapeKind::Circle.outline(Vec2::ZERO, 10.0, 0.0).is_none());
        let sq = ShapeKind::Square.outline(Vec2::ZERO, 10.0, 0.0).unwrap();
        assert_eq!(sq.len(), 4);
        assert!((sq[0] - Vec2::new(-5.0, -5.0)).length() < 1e-5);
        let tri = ShapeKind::Triangle.outline(Vec2::ZERO, 10.0, 0.0).unwrap();
        // First vertex points straight up.
        assert!((tri[0] - Vec2::new(0.0, -10.0)).length() < 1e-4);
        assert_eq!(ShapeKind::Hexagon.outline(Vec2::ZERO, 10.0, 0.0).unwrap().len(), 6);
    }

    #[test]
    fn test_shape_reacts_to_pointer() {
        let mut shape = Shape {
            vel: Vec2::ZERO,
            rotation: 0.0,
            spin: 0.0,
            shape: ShapeKind::Square,
            color: Color::WHITE,
            opacity: 0.15,
        };
        shape.react(Vec2::ZERO, Some(Vec2::new(100.0, 0.0)));
        assert!((shape.opacity - 0.45).abs() < 1e-6);
        shape.react(Vec2::ZERO, None);
        assert!((shape.opacity - 0.44).abs() < 1e-6);
        for _ in 0..100 {
            shape.react(Vec2::ZERO, None);
        }
        assert_eq!(shape.opacity, SHAPE_MIN_OPACITY);
    }

    #[test]
    fn test_stream_glyph_fade() {
        let stream = Stream {
            speed: 1.0,
            glyphs: vec!['0'; 10],
            opacity: 0.4,
            pitch: 18.0,
        };
        assert!((stream.glyph_opacity(0) - 0.4).abs() < 1e-6);
        assert!(stream.glyph_opacity(9) < stream.glyph_opacity(1));
        assert!(stream.glyph_opacity(9) > 0.0);
    }

    #[test]
    fn test_circuit_reveal() {
        let circuit = Circuit {
            points: vec![Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)],
            progress: 0.75,
            speed: 0.01,
            color: Color::WHITE,
            segment_length: [50.0, 200.0],
        };
        let (path, head) = circuit.revealed();
        assert_eq!(path.len(), 3);
        assert!((head.unwrap() - Vec2::new(100.0, 50.0)).length() < 1e-4);
        assert_eq!(circuit.reached_corners().len(), 2);
    }

    #[test]
    fn test_velocity_access() {
        let mut e = Entity::new(
            Vec2::ZERO,
            2.0,
            EntityKind::Balloon(Balloon {
                vel: Vec2::X,
                color: Color::WHITE,
            }),
        );
        *e.velocity_mut().unwrap() *= 2.0;
        assert_eq!(e.velocity(), Some(Vec2::new(2.0, 0.0)));
        assert!(e.is_bounded());
    }
}
