//! Population templates and the spawn context.
//!
//! A [`Population`] says what to spawn ([`Spawn`]), how many ([`Count`]) and
//! how the spawned entities move ([`Boundary`], [`PointerForce`]). Random
//! choices go through [`SpawnContext`], which wraps the scene's RNG together
//! with the surface size and palette so templates stay declarative.
//!
//! ```toml
//! [[populations]]
//! count = { per_area = 8000.0 }
//! boundary = "wrap"
//!
//! [populations.spawn]
//! kind = "node"
//! size = [1.0, 4.0]
//! velocity = 0.4
//! opacity = [0.3, 0.8]
//! pulse_speed = [0.02, 0.07]
//! ```

use crate::entity::{
    Balloon, Circuit, Entity, EntityKind, Node, Orb, Shape, ShapeKind, Spotlight, Star, Stream,
};
use crate::rules::{Boundary, PointerForce};
use crate::visuals::Color;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Closed float range `[min, max]`.
pub type Range = [f32; 2];

/// Helpers for random spawn decisions.
///
/// Instead of threading an RNG and the surface size through every template,
/// templates ask the context:
///
/// ```ignore
/// let pos = ctx.random_point();
/// let vel = ctx.random_velocity(0.4);
/// let color = ctx.pick_color(Color::WHITE);
/// ```
pub struct SpawnContext<'a> {
    /// Surface size in pixels.
    pub size: Vec2,
    rng: &'a mut StdRng,
    palette: &'a [Color],
    glyphs: &'a [char],
}

impl<'a> SpawnContext<'a> {
    pub fn new(rng: &'a mut StdRng, size: Vec2, palette: &'a [Color], glyphs: &'a [char]) -> Self {
        Self {
            size,
            rng,
            palette,
            glyphs,
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max]`. A degenerate range yields `min`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random() * (max - min)
    }

    /// Random f32 in a [`Range`].
    #[inline]
    pub fn range(&mut self, range: Range) -> f32 {
        self.random_range(range[0], range[1])
    }

    /// Random integer in the inclusive range.
    pub fn range_usize(&mut self, range: [usize; 2]) -> usize {
        let (lo, hi) = (range[0].min(range[1]), range[0].max(range[1]));
        self.rng.gen_range(lo..=hi)
    }

    /// Random index below `len`. `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// `true` with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.random() < p
    }

    /// Random angle in `[0, TAU)`, used as a pulse phase.
    #[inline]
    pub fn phase(&mut self) -> f32 {
        self.random() * TAU
    }

    // ========== Position helpers ==========

    /// Uniform random point on the surface.
    pub fn random_point(&mut self) -> Vec2 {
        Vec2::new(self.random() * self.size.x, self.random() * self.size.y)
    }

    /// Velocity with each component uniform in `[-max, max]`.
    pub fn random_velocity(&mut self, max: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-max, max),
            self.random_range(-max, max),
        )
    }

    /// Uniform random point on a sphere of given radius, centered at origin.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        let theta = self.random() * TAU;
        let phi = (2.0 * self.random() - 1.0).clamp(-1.0, 1.0).acos();
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.cos(),
            radius * phi.sin() * theta.sin(),
        )
    }

    /// A random point on one of the four surface edges.
    pub fn random_edge_point(&mut self) -> Vec2 {
        let Vec2 { x: w, y: h } = self.size;
        match self.index(4) {
            0 => Vec2::new(self.random() * w, 0.0),
            1 => Vec2::new(w, self.random() * h),
            2 => Vec2::new(self.random() * w, h),
            _ => Vec2::new(0.0, self.random() * h),
        }
    }

    /// An orthogonal trace from a random edge point.
    ///
    /// Each segment is horizontal or vertical at random, `length` pixels
    /// long, in a random direction and clamped to the surface.
    pub fn circuit_path(&mut self, segments: usize, length: Range) -> Vec<Vec2> {
        let mut cursor = self.random_edge_point();
        let mut points = Vec::with_capacity(segments + 1);
        points.push(cursor);
        for _ in 0..segments {
            let horizontal = self.chance(0.5);
            let sign = if self.chance(0.5) { 1.0 } else { -1.0 };
            let step = self.range(length) * sign;
            if horizontal {
                cursor.x += step;
            } else {
                cursor.y += step;
            }
            cursor = cursor.clamp(Vec2::ZERO, self.size.max(Vec2::ZERO));
            points.push(cursor);
        }
        points
    }

    // ========== Color and glyph helpers ==========

    /// Random palette color, or `fallback` when the palette is empty.
    pub fn pick_color(&mut self, fallback: Color) -> Color {
        if self.palette.is_empty() {
            return fallback;
        }
        let i = self.index(self.palette.len());
        self.palette[i]
    }

    /// Random data glyph.
    pub fn glyph(&mut self) -> char {
        if self.glyphs.is_empty() {
            return '0';
        }
        let i = self.index(self.glyphs.len());
        self.glyphs[i]
    }
}

/// How many entities a population has for a given surface.
///
/// A zero-area surface always yields zero entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Count {
    /// `floor(width * height / k)`.
    PerArea(f64),
    /// `floor(width / k)`, for column populations.
    PerWidth(f64),
    /// A fixed number.
    Fixed(usize),
}

impl Count {
    /// Resolve the count for a surface.
    pub fn resolve(&self, width: u32, height: u32) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        match *self {
            Count::PerArea(k) if k > 0.0 => ((width as f64 * height as f64) / k).floor() as usize,
            Count::PerWidth(k) if k > 0.0 => (width as f64 / k).floor() as usize,
            Count::Fixed(n) => n,
            _ => 0,
        }
    }
}

/// Sinusoidal pulse parameters, `base + sin(t * speed + phase) * amplitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub base: f32,
    pub amplitude: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            base: 1.0,
            amplitude: 0.0,
        }
    }
}

/// Soft radial halo drawn around a node core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Halo {
    /// Halo radius as a multiple of the core radius.
    pub scale: f32,
    /// Alpha at the center, multiplied by the node's opacity.
    pub inner: f32,
    /// Optional alpha at the halfway stop.
    #[serde(default)]
    pub middle: Option<f32>,
}

/// How nodes of a population are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(default)]
    pub pulse: Pulse,
    /// Multiply opacity by the pulse as well as size.
    #[serde(default)]
    pub pulse_opacity: bool,
    #[serde(default)]
    pub halo: Option<Halo>,
    /// White highlight at half the core radius.
    #[serde(default)]
    pub highlight: bool,
}

/// What a population spawns.
///
/// Velocities are given as the maximum absolute value of each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Spawn {
    Node {
        size: Range,
        velocity: f32,
        #[serde(default = "full_opacity")]
        opacity: Range,
        #[serde(default)]
        pulse_speed: Range,
        #[serde(default)]
        style: NodeStyle,
    },
    Star {
        size: Range,
        speed: Range,
        opacity: Range,
        twinkle_speed: Range,
        #[serde(default)]
        bright: bool,
    },
    Stream {
        length: [usize; 2],
        speed: Range,
        opacity: Range,
        /// Vertical distance between glyphs.
        pitch: f32,
        /// Drawn glyph height.
        glyph_height: f32,
        color: Color,
        head_color: Color,
    },
    Shape {
        size: Range,
        spin: f32,
        velocity: f32,
        opacity: Range,
        stroke: f32,
    },
    Spotlight {
        radius: Range,
        speed: Range,
    },
    Orb {
        size: Range,
        velocity: f32,
        pulse_speed: Range,
    },
    Balloon {
        size: Range,
        velocity: f32,
    },
    Circuit {
        segments: [usize; 2],
        segment_length: Range,
        speed: Range,
    },
}

fn full_opacity() -> Range {
    [1.0, 1.0]
}

impl Spawn {
    /// Create one entity from this template.
    pub fn spawn(&self, ctx: &mut SpawnContext) -> Entity {
        match self {
            Spawn::Node {
                size,
                velocity,
                opacity,
                pulse_speed,
                ..
            } => {
                let pos = ctx.random_point();
                let size = ctx.range(*size);
                let node = Node {
                    vel: ctx.random_velocity(*velocity),
                    color: ctx.pick_color(Color::WHITE),
                    opacity: ctx.range(*opacity),
                    phase: ctx.phase(),
                    pulse_speed: ctx.range(*pulse_speed),
                };
                Entity::new(pos, size, EntityKind::Node(node))
            }
            Spawn::Star {
                size,
                speed,
                opacity,
                twinkle_speed,
                bright,
            } => {
                let pos = ctx.random_point();
                let size = ctx.range(*size);
                let star = Star {
                    speed: ctx.range(*speed),
                    opacity: ctx.range(*opacity),
                    phase: ctx.phase(),
                    twinkle_speed: ctx.range(*twinkle_speed),
                    bright: *bright,
                };
                Entity::new(pos, size, EntityKind::Star(star))
            }
            Spawn::Stream {
                length,
                speed,
                opacity,
                pitch,
                ..
            } => {
                let len = ctx.range_usize(*length);
                let extent = len as f32 * pitch;
                let x = ctx.random() * ctx.size.x;
                // Start above the surface so columns trickle in.
                let y = -ctx.random() * extent;
                let stream = Stream {
                    speed: ctx.range(*speed),
                    glyphs: (0..len).map(|_| ctx.glyph()).collect(),
                    opacity: ctx.range(*opacity),
                    pitch: *pitch,
                };
                Entity::new(Vec2::new(x, y), extent, EntityKind::Stream(stream))
            }
            Spawn::Shape {
                size,
                spin,
                velocity,
                opacity,
                ..
            } => {
                let pos = ctx.random_point();
                let size = ctx.range(*size);
                let kind = ShapeKind::ALL[ctx.index(ShapeKind::ALL.len())];
                let shape = Shape {
                    vel: ctx.random_velocity(*velocity),
                    rotation: ctx.phase(),
                    spin: ctx.random_range(-spin, *spin),
                    shape: kind,
                    color: ctx.pick_color(Color::WHITE),
                    opacity: ctx.range(*opacity),
                };
                Entity::new(pos, size, EntityKind::Shape(shape))
            }
            Spawn::Spotlight { radius, speed } => {
                let pos = ctx.random_point();
                let radius = ctx.range(*radius);
                let light = Spotlight {
                    target: ctx.random_point(),
                    color: ctx.pick_color(Color::WHITE),
                    speed: ctx.range(*speed),
                };
                Entity::new(pos, radius, EntityKind::Spotlight(light))
            }
            Spawn::Orb {
                size,
                velocity,
                pulse_speed,
            } => {
                let pos = ctx.random_point();
                let size = ctx.range(*size);
                let orb = Orb {
                    vel: ctx.random_velocity(*velocity),
                    phase: ctx.phase(),
                    pulse_speed: ctx.range(*pulse_speed),
                    color: ctx.pick_color(Color::WHITE),
                };
                Entity::new(pos, size, EntityKind::Orb(orb))
            }
            Spawn::Balloon { size, velocity } => {
                let pos = ctx.random_point();
                let size = ctx.range(*size);
                let balloon = Balloon {
                    vel: ctx.random_velocity(*velocity),
                    color: ctx.pick_color(Color::WHITE),
                };
                Entity::new(pos, size, EntityKind::Balloon(balloon))
            }
            Spawn::Circuit {
                segments,
                segment_length,
                speed,
            } => {
                let count = ctx.range_usize(*segments);
                let points = ctx.circuit_path(count, *segment_length);
                let pos = points.first().copied().unwrap_or(Vec2::ZERO);
                let circuit = Circuit {
                    points,
                    progress: 0.0,
                    speed: ctx.range(*speed),
                    color: ctx.pick_color(Color::WHITE),
                    segment_length: *segment_length,
                };
                Entity::new(pos, 0.0, EntityKind::Circuit(circuit))
            }
        }
    }

    /// Node draw style, for node templates.
    pub fn node_style(&self) -> Option<&NodeStyle> {
        match self {
            Spawn::Node { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// A group of entities spawned from one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub spawn: Spawn,
    pub count: Count,
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default)]
    pub pointer: PointerForce,
}

impl Population {
    pub fn new(spawn: Spawn, count: Count) -> Self {
        Self {
            spawn,
            count,
            boundary: Boundary::default(),
            pointer: PointerForce::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_pointer(mut self, pointer: PointerForce) -> Self {
        self.pointer = pointer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn with_ctx<R>(f: impl FnOnce(&mut SpawnContext) -> R) -> R {
        let mut rng = StdRng::seed_from_u64(7);
        let palette = [Color::WHITE, Color::BLACK];
        let glyphs = ['0', '1'];
        let mut ctx = SpawnContext::new(&mut rng, Vec2::new(800.0, 600.0), &palette, &glyphs);
        f(&mut ctx)
    }

    #[test]
    fn test_count_per_area() {
        let count = Count::PerArea(20_000.0);
        assert_eq!(count.resolve(1920, 1080), 103);
        assert_eq!(count.resolve(800, 600), 24);
        assert_eq!(count.resolve(0, 600), 0);
    }

    #[test]
    fn test_count_fixed_and_per_width() {
        assert_eq!(Count::Fixed(25).resolve(10, 10), 25);
        assert_eq!(Count::Fixed(25).resolve(10, 0), 0);
        assert_eq!(Count::PerWidth(40.0).resolve(1000, 1), 25);
        assert_eq!(Count::PerArea(0.0).resolve(100, 100), 0);
    }

    #[test]
    fn test_degenerate_range() {
        with_ctx(|ctx| {
            assert_eq!(ctx.range([2.0, 2.0]), 2.0);
            assert_eq!(ctx.range_usize([5, 5]), 5);
        });
    }

    #[test]
    fn test_random_on_sphere_radius() {
        with_ctx(|ctx| {
            for _ in 0..100 {
                let p = ctx.random_on_sphere(300.0);
                assert!((p.length() - 300.0).abs() < 0.05);
            }
        });
    }

    #[test]
    fn test_circuit_path_is_orthogonal_and_clamped() {
        with_ctx(|ctx| {
            let path = ctx.circuit_path(8, [50.0, 200.0]);
            assert_eq!(path.len(), 9);
            for pair in path.windows(2) {
                let d = pair[1] - pair[0];
                assert!(d.x == 0.0 || d.y == 0.0);
            }
            for p in &path {
                assert!(p.x >= 0.0 && p.x <= 800.0 && p.y >= 0.0 && p.y <= 600.0);
            }
        });
    }

    #[test]
    fn test_spawn_node_in_range() {
        let spawn = Spawn::Node {
            size: [2.0, 5.0],
            velocity: 0.75,
            opacity: [1.0, 1.0],
            pulse_speed: [0.0, 0.0],
            style: NodeStyle::default(),
        };
        with_ctx(|ctx| {
            for _ in 0..50 {
                let e = spawn.spawn(ctx);
                assert!(e.size >= 2.0 && e.size <= 5.0);
                let v = e.velocity().unwrap();
                assert!(v.x.abs() <= 0.75 && v.y.abs() <= 0.75);
                assert!(e.pos.x >= 0.0 && e.pos.x <= 800.0);
            }
        });
    }

    #[test]
    fn test_spawn_stream_extent() {
        let spawn = Spawn::Stream {
            length: [10, 29],
            speed: [1.0, 4.0],
            opacity: [0.1, 0.4],
            pitch: 18.0,
            glyph_height: 14.0,
            color: Color::WHITE,
            head_color: Color::WHITE,
        };
        with_ctx(|ctx| {
            let e = spawn.spawn(ctx);
            let EntityKind::Stream(stream) = &e.kind else {
                panic!("expected a stream");
            };
            assert_eq!(e.size, stream.glyphs.len() as f32 * 18.0);
            assert!(e.pos.y <= 0.0 && e.pos.y >= -e.size);
        });
    }

    #[test]
    fn test_population_toml() {
        let text = r#"
            count = { per_area = 8000.0 }
            boundary = "wrap"
            pointer = { mode = "repel", radius = 200.0, strength = 5.0 }

            [spawn]
            kind = "balloon"
            size = [200.0, 400.0]
            velocity = 0.5
        "#;
        let pop: Population = toml::from_str(text).unwrap();
        assert_eq!(pop.count, Count::PerArea(8000.0));
        assert_eq!(pop.boundary, Boundary::Wrap);
        assert!(matches!(pop.spawn, Spawn::Balloon { .. }));
    }
}
