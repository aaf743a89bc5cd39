//! Layered compositor.
//!
//! Each frame is painted back to front in a fixed order:
//!
//! | # | Layer | Contents |
//! |---|-------|----------|
//! | 1 | clear | every pixel reset |
//! | 2 | [`Layer::Background`] | solid, linear or radial gradient |
//! | 3 | [`Layer::Decor`] | grid / hex lattices, nebula, curtains, bokeh, shards |
//! | 4 | [`Layer::Streams`] | data glyph columns |
//! | 5 | [`Layer::Edges`] | proximity graph |
//! | 6 | [`Layer::Entities`] | glow-shaded entities |
//! | 7 | [`Layer::Effects`] | pulse rings, shooting stars |
//! | 8 | [`Layer::Wireframe`] | projected 3D model |
//! | 9 | [`Layer::PointerGlow`] | soft light under the pointer, always last |
//!
//! The compositor only reads the scene; all state changes happen in
//! [`Scene::tick`](crate::scene::Scene::tick) before drawing.

use crate::config::EngineConfig;
use crate::entity::{pulse, Entity, EntityKind};
use crate::lifecycle::Effect;
use crate::proximity::{pair_edges, pointer_edges, Edge};
use crate::scene::Scene;
use crate::spawn::{NodeStyle, Spawn};
use crate::surface::{Paint, Surface};
use crate::visuals::{Background, Color, GradientStop};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_3, FRAC_PI_6};

/// Vertical spacing of curtain line vertices.
const CURTAIN_STEP: f32 = 50.0;
/// Ticks per second assumed by time-based decor.
const TICKS_PER_SECOND: f32 = 60.0;

/// The layers of a frame, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Decor,
    Streams,
    Edges,
    Entities,
    Effects,
    Wireframe,
    PointerGlow,
}

impl Layer {
    /// Every layer, back to front.
    pub const ORDER: [Layer; 8] = [
        Layer::Background,
        Layer::Decor,
        Layer::Streams,
        Layer::Edges,
        Layer::Entities,
        Layer::Effects,
        Layer::Wireframe,
        Layer::PointerGlow,
    ];
}

/// Animated background ornaments drawn under the entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decor {
    /// Square grid drifting diagonally.
    Grid {
        size: f32,
        /// Drift in px per tick along x and y.
        drift: [f32; 2],
        color: Color,
    },
    /// Hexagon lattice whose cells pulse in a travelling wave.
    Hex {
        size: f32,
        color: Color,
        /// Color of cells near the crest of the wave; alpha is derived.
        pulse_color: Color,
    },
    /// Two slowly orbiting nebula clouds.
    Nebula,
    /// Wavy vertical lines like curtain strings.
    Curtains { count: usize, color: Color },
    /// Drifting out-of-focus light spots.
    Bokeh { count: usize, color: Color },
    /// Thin falling light shards.
    Shards { count: usize, color: Color },
}

/// Radial light that follows the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerGlow {
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl PointerGlow {
    /// Three-stop glow: `inner` at the center, `middle` halfway, then transparent.
    pub fn new(radius: f32, inner: Color, middle: Color) -> Self {
        Self {
            radius,
            stops: vec![
                GradientStop::new(0.0, inner),
                GradientStop::new(0.5, middle),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ],
        }
    }
}

/// Paint covering the whole surface for a background.
pub fn background_paint(background: &Background, size: Vec2) -> Paint {
    match background {
        Background::Solid { color } => Paint::Solid(*color),
        Background::Linear { stops } => Paint::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(0.0, size.y),
            stops: stops.clone(),
        },
        Background::Radial {
            stops,
            radius_factor,
        } => Paint::Radial {
            center: size * 0.5,
            radius: radius_factor * size.x,
            stops: stops.clone(),
        },
    }
}

/// Draw one full frame of `scene`.
pub fn compose<S: Surface + ?Sized>(surface: &mut S, scene: &Scene, config: &EngineConfig) {
    surface.clear();
    for layer in Layer::ORDER {
        draw_layer(surface, layer, scene, config);
    }
}

/// Draw a single layer.
pub fn draw_layer<S: Surface + ?Sized>(
    surface: &mut S,
    layer: Layer,
    scene: &Scene,
    config: &EngineConfig,
) {
    let size = scene.size();
    match layer {
        Layer::Background => {
            surface.fill_rect(Vec2::ZERO, size, &background_paint(&config.background, size));
        }
        Layer::Decor => {
            for decor in &config.decor {
                draw_decor(surface, decor, scene.t(), size);
            }
        }
        Layer::Streams => {
            for (population, entities) in scene.groups(config) {
                if let Spawn::Stream {
                    glyph_height,
                    color,
                    head_color,
                    ..
                } = &population.spawn
                {
                    for entity in entities {
                        draw_stream(surface, entity, *glyph_height, *color, *head_color, size);
                    }
                }
            }
        }
        Layer::Edges => {
            let Some(edges) = &config.edges else {
                return;
            };
            for edge in pair_edges(scene.entities(), edges) {
                draw_edge(surface, &edge);
            }
            if let (Some(links), Some(pointer)) = (&edges.pointer, scene.pointer().position()) {
                for edge in pointer_edges(scene.entities(), pointer, links) {
                    draw_edge(surface, &edge);
                }
            }
        }
        Layer::Entities => {
            for (population, entities) in scene.groups(config) {
                let style = population.spawn.node_style().copied().unwrap_or_default();
                let stroke = match population.spawn {
                    Spawn::Shape { stroke, .. } => stroke,
                    _ => 1.0,
                };
                for entity in entities {
                    draw_entity(surface, entity, &style, stroke, scene.t());
                }
            }
        }
        Layer::Effects => {
            for effect in scene.effects().iter() {
                draw_effect(surface, effect);
            }
        }
        Layer::Wireframe => {
            let Some(wireframe) = scene.wireframe() else {
                return;
            };
            for segment in wireframe.segments(size) {
                surface.stroke_line(segment.from, segment.to, segment.width, &segment.color.into());
            }
            for dot in wireframe.dots(size) {
                surface.fill_circle(dot.pos, dot.radius, &dot.color.into());
            }
        }
        Layer::PointerGlow => {
            if let (Some(glow), Some(pointer)) = (&config.pointer_glow, scene.pointer().position()) {
                let paint = Paint::Radial {
                    center: pointer,
                    radius: glow.radius,
                    stops: glow.stops.clone(),
                };
                surface.fill_rect(Vec2::ZERO, size, &paint);
            }
        }
    }
}

fn draw_decor<S: Surface + ?Sized>(surface: &mut S, decor: &Decor, t: u64, size: Vec2) {
    let time = t as f32;
    match decor {
        Decor::Grid {
            size: cell,
            drift,
            color,
        } => {
            let cell = *cell;
            if cell <= 0.0 {
                return;
            }
            let paint = Paint::Solid(*color);
            let offset = Vec2::new((time * drift[0]) % cell, (time * drift[1]) % cell);
            let mut x = -cell + offset.x;
            while x < size.x + cell {
                surface.stroke_line(Vec2::new(x, 0.0), Vec2::new(x, size.y), 1.0, &paint);
                x += cell;
            }
            let mut y = -cell + offset.y;
            while y < size.y + cell {
                surface.stroke_line(Vec2::new(0.0, y), Vec2::new(size.x, y), 1.0, &paint);
                y += cell;
            }
        }
        Decor::Hex {
            size: cell,
            color,
            pulse_color,
        } => {
            let cell = *cell;
            if cell <= 0.0 {
                return;
            }
            let sqrt3 = 3f32.sqrt();
            let rows = (size.y / (cell * 1.5)).ceil() as usize + 1;
            let cols = (size.x / (cell * sqrt3)).ceil() as usize + 1;
            for row in 0..rows {
                for col in 0..cols {
                    let center = Vec2::new(
                        col as f32 * cell * sqrt3 + (row % 2) as f32 * cell * sqrt3 / 2.0,
                        row as f32 * cell * 1.5,
                    );
                    let intensity =
                        (time * 0.02 + row as f32 * 0.3 + col as f32 * 0.2).sin() * 0.5 + 0.5;
                    let stroke = if intensity > 0.7 {
                        pulse_color.with_alpha(0.05 + intensity * 0.05)
                    } else {
                        *color
                    };
                    let points: Vec<Vec2> = (0..6)
                        .map(|i| {
                            let angle = FRAC_PI_3 * i as f32 - FRAC_PI_6;
                            center + Vec2::new(angle.cos(), angle.sin()) * cell * 0.8
                        })
                        .collect();
                    surface.stroke_polyline(&points, true, 1.0, &stroke.into());
                }
            }
        }
        Decor::Nebula => {
            let clouds = [
                (
                    Vec2::new(
                        size.x * 0.3 + (time * 0.001).sin() * 50.0,
                        size.y * 0.4 + (time * 0.001).cos() * 30.0,
                    ),
                    400.0,
                    Color::rgba8(0, 100, 150, 20),
                    Color::rgba8(50, 0, 100, 10),
                ),
                (
                    Vec2::new(
                        size.x * 0.7 + (time * 0.0015).cos() * 40.0,
                        size.y * 0.6 + (time * 0.0015).sin() * 25.0,
                    ),
                    350.0,
                    Color::rgba8(100, 0, 80, 15),
                    Color::rgba8(0, 50, 100, 8),
                ),
            ];
            for (center, radius, inner, middle) in clouds {
                let paint = Paint::Radial {
                    center,
                    radius,
                    stops: vec![
                        GradientStop::new(0.0, inner),
                        GradientStop::new(0.5, middle),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                };
                surface.fill_rect(Vec2::ZERO, size, &paint);
            }
        }
        Decor::Curtains { count, color } => {
            if *count == 0 {
                return;
            }
            let paint = Paint::Linear {
                from: Vec2::ZERO,
                to: Vec2::new(0.0, size.y),
                stops: vec![
                    GradientStop::new(0.0, color.with_alpha(0.05)),
                    GradientStop::new(0.5, color.with_alpha(0.02)),
                    GradientStop::new(1.0, color.with_alpha(0.0)),
                ],
            };
            for i in 0..*count {
                let i = i as f32;
                let x = size.x / *count as f32 * i;
                let wave = (time * 0.01 + i * 0.3).sin() * 20.0;
                let mut points = vec![Vec2::new(x + wave, 0.0)];
                let mut y = 0.0;
                while y < size.y {
                    let sway = (time * 0.005 + y * 0.01 + i * 0.5).sin() * 10.0 + wave;
                    points.push(Vec2::new(x + sway, y));
                    y += CURTAIN_STEP;
                }
                surface.stroke_polyline(&points, false, 1.0, &paint);
            }
        }
        Decor::Bokeh { count, color } => {
            if *count == 0 {
                return;
            }
            for i in 0..*count {
                let i = i as f32;
                let center = Vec2::new(
                    size.x / *count as f32 * i + (time * 0.003 + i).sin() * 50.0,
                    size.y * 0.3 + (time * 0.002 + i * 0.5).cos() * 100.0,
                );
                let radius = 30.0 + (time * 0.01 + i).sin() * 15.0;
                let opacity = 0.05 + (time * 0.008 + i * 0.7).sin() * 0.03;
                let paint = Paint::Radial {
                    center,
                    radius,
                    stops: vec![
                        GradientStop::new(0.0, color.with_alpha(opacity)),
                        GradientStop::new(0.7, Color::rgb8(255, 200, 0).with_alpha(opacity * 0.5)),
                        GradientStop::new(1.0, Color::TRANSPARENT),
                    ],
                };
                surface.fill_circle(center, radius, &paint);
            }
        }
        Decor::Shards { count, color } => {
            const LENGTH: f32 = 240.0;
            let seconds = time / TICKS_PER_SECOND;
            for i in 0..*count {
                let i = i as f32;
                let (duration, delay) = (15.0 + i * 2.0, i * 2.0);
                if seconds < delay {
                    continue;
                }
                let progress = ((seconds - delay) % duration) / duration;
                // Fade in over the first half, out over the second.
                let opacity = 0.6 * (1.0 - (progress * 2.0 - 1.0).abs());
                let top = -200.0 + progress * (size.y + 400.0);
                let x = size.x * 0.08 * i;
                let paint = Paint::Linear {
                    from: Vec2::new(x, top),
                    to: Vec2::new(x, top + LENGTH),
                    stops: vec![
                        GradientStop::new(0.0, color.with_alpha(0.0)),
                        GradientStop::new(0.5, color.fade(opacity)),
                        GradientStop::new(1.0, color.with_alpha(0.0)),
                    ],
                };
                surface.fill_rect(Vec2::new(x, top), Vec2::new(x + 2.0, top + LENGTH), &paint);
            }
        }
    }
}

fn draw_stream<S: Surface + ?Sized>(
    surface: &mut S,
    entity: &Entity,
    glyph_height: f32,
    color: Color,
    head_color: Color,
    size: Vec2,
) {
    let EntityKind::Stream(stream) = &entity.kind else {
        return;
    };
    for (i, &glyph) in stream.glyphs.iter().enumerate() {
        // Glyphs sit on their baseline, like canvas text.
        let baseline = entity.pos.y + i as f32 * stream.pitch;
        if baseline < 0.0 || baseline > size.y {
            continue;
        }
        let tint = if i == 0 { head_color } else { color };
        surface.fill_glyph(
            glyph,
            Vec2::new(entity.pos.x, baseline - glyph_height),
            glyph_height,
            tint.with_alpha(stream.glyph_opacity(i)),
        );
    }
}

fn draw_edge<S: Surface + ?Sized>(surface: &mut S, edge: &Edge) {
    let (a, b) = edge.colors;
    let paint = if a == b {
        Paint::Solid(a.with_alpha(edge.opacity))
    } else {
        Paint::Linear {
            from: edge.from,
            to: edge.to,
            stops: vec![
                GradientStop::new(0.0, a.with_alpha(edge.opacity)),
                GradientStop::new(1.0, b.with_alpha(edge.opacity)),
            ],
        }
    };
    surface.stroke_line(edge.from, edge.to, edge.width, &paint);
}

fn radial(center: Vec2, radius: f32, stops: &[(f32, Color)]) -> Paint {
    Paint::Radial {
        center,
        radius,
        stops: stops
            .iter()
            .map(|&(offset, color)| GradientStop::new(offset, color))
            .collect(),
    }
}

fn draw_entity<S: Surface + ?Sized>(
    surface: &mut S,
    entity: &Entity,
    style: &NodeStyle,
    stroke: f32,
    t: u64,
) {
    let pos = entity.pos;
    match &entity.kind {
        EntityKind::Node(node) => {
            let scale = pulse(t, node.pulse_speed, node.phase, style.pulse.base, style.pulse.amplitude);
            let radius = (entity.size * scale).max(0.0);
            let opacity = if style.pulse_opacity {
                node.opacity * scale
            } else {
                node.opacity
            };
            if let Some(halo) = style.halo {
                let mut stops = vec![(0.0, node.color.with_alpha(halo.inner * opacity))];
                if let Some(middle) = halo.middle {
                    stops.push((0.5, node.color.with_alpha(middle * opacity)));
                }
                stops.push((1.0, node.color.with_alpha(0.0)));
                let outer = radius * halo.scale;
                surface.fill_circle(pos, outer, &radial(pos, outer, &stops));
            }
            surface.fill_circle(pos, radius, &node.color.fade(opacity).into());
            if style.highlight {
                surface.fill_circle(pos, radius * 0.5, &Color::WHITE.fade(opacity).into());
            }
        }
        EntityKind::Star(star) => {
            let twinkle = pulse(t, star.twinkle_speed, star.phase, 0.7, 0.3);
            let opacity = star.opacity * twinkle;
            let outer = entity.size * 3.0;
            let halo = radial(
                pos,
                outer,
                &[
                    (0.0, Color::WHITE.with_alpha(opacity)),
                    (0.3, Color::rgb8(180, 220, 255).with_alpha(opacity * 0.4)),
                    (1.0, Color::TRANSPARENT),
                ],
            );
            surface.fill_circle(pos, outer, &halo);
            surface.fill_circle(pos, entity.size, &Color::WHITE.with_alpha(opacity).into());
        }
        EntityKind::Stream(_) => {}
        EntityKind::Shape(shape) => {
            let paint = Paint::Solid(shape.color.with_alpha(shape.opacity));
            match shape.shape.outline(pos, entity.size, shape.rotation) {
                Some(points) => surface.stroke_polyline(&points, true, stroke, &paint),
                None => surface.stroke_circle(pos, entity.size, stroke, &paint),
            }
        }
        EntityKind::Spotlight(light) => {
            let r = entity.size;
            let paint = radial(
                pos,
                r,
                &[
                    (0.0, light.color.with_alpha(0x20 as f32 / 255.0)),
                    (0.5, light.color.with_alpha(0x08 as f32 / 255.0)),
                    (1.0, Color::TRANSPARENT),
                ],
            );
            surface.fill_rect(pos - Vec2::splat(r), pos + Vec2::splat(r), &paint);
        }
        EntityKind::Orb(orb) => {
            let radius = entity.size * pulse(t, orb.pulse_speed, orb.phase, 0.7, 0.3);
            let paint = radial(
                pos,
                radius,
                &[
                    (0.0, orb.color.with_alpha(0x30 as f32 / 255.0)),
                    (0.4, orb.color.with_alpha(0x15 as f32 / 255.0)),
                    (1.0, Color::TRANSPARENT),
                ],
            );
            surface.fill_circle(pos, radius, &paint);
        }
        EntityKind::Balloon(balloon) => {
            let r = entity.size;
            surface.fill_circle(pos, r, &Paint::glow(pos, r, balloon.color));
            surface.fill_circle(
                pos - Vec2::splat(r * 0.3),
                r * 0.1,
                &Color::WHITE.with_alpha(0.1).into(),
            );
        }
        EntityKind::Circuit(circuit) => {
            let (path, head) = circuit.revealed();
            if let Some(head) = head {
                surface.fill_circle(head, 15.0, &Paint::glow(head, 15.0, circuit.color));
            }
            if path.len() >= 2 {
                for (alpha, width) in [(0x40 as f32 / 255.0, 4.0), (0x80 as f32 / 255.0, 2.0), (1.0, 1.0)] {
                    surface.stroke_polyline(&path, false, width, &circuit.color.fade(alpha).into());
                }
            }
            for &corner in circuit.reached_corners() {
                surface.fill_circle(corner, 3.0, &circuit.color.into());
            }
        }
    }
}

fn draw_effect<S: Surface + ?Sized>(surface: &mut S, effect: &Effect) {
    match effect {
        Effect::Ring(ring) => {
            let opacity = ring.opacity();
            surface.stroke_circle(ring.center, ring.radius, 3.0, &ring.color.with_alpha(opacity).into());
            surface.stroke_circle(
                ring.center,
                ring.radius * 0.7,
                1.0,
                &ring.color.with_alpha(opacity * 0.5).into(),
            );
        }
        Effect::ShootingStar(star) => {
            let (from, to) = star.segment();
            let opacity = star.opacity();
            let paint = Paint::Linear {
                from,
                to,
                stops: vec![
                    GradientStop::new(0.0, Color::WHITE.with_alpha(0.0)),
                    GradientStop::new(0.5, Color::WHITE.with_alpha(0.8 * opacity)),
                    GradientStop::new(1.0, Color::rgb8(180, 220, 255).with_alpha(0.0)),
                ],
            };
            surface.stroke_line(from, to, 2.0, &paint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Recorder};

    #[test]
    fn test_background_paint_radial_uses_width() {
        let bg = Background::Radial {
            stops: vec![GradientStop::new(0.0, Color::WHITE)],
            radius_factor: 0.8,
        };
        let Paint::Radial { center, radius, .. } = background_paint(&bg, Vec2::new(1000.0, 500.0))
        else {
            panic!("expected a radial paint");
        };
        assert_eq!(center, Vec2::new(500.0, 250.0));
        assert!((radius - 800.0).abs() < 1e-4);
    }

    #[test]
    fn test_hex_decor_covers_surface() {
        let mut rec = Recorder::new(400, 300);
        let decor = Decor::Hex {
            size: 50.0,
            color: Color::rgba8(0, 200, 255, 5),
            pulse_color: Color::rgb8(0, 255, 255),
        };
        let size = rec.size();
        draw_decor(&mut rec, &decor, 0, size);
        let rows = (300.0f32 / 75.0).ceil() as usize + 1;
        let cols = (400.0 / (50.0 * 3f32.sqrt())).ceil() as usize + 1;
        assert_eq!(rec.commands().len(), rows * cols);
        for cmd in rec.commands() {
            for a in cmd.alphas() {
                assert!(a <= 0.1 + 1e-6);
            }
        }
    }

    #[test]
    fn test_grid_decor_drifts() {
        let decor = Decor::Grid {
            size: 60.0,
            drift: [0.2, 0.15],
            color: Color::rgba8(0, 212, 255, 13),
        };
        let mut a = Recorder::new(200, 200);
        let mut b = Recorder::new(200, 200);
        let size = Vec2::new(200.0, 200.0);
        draw_decor(&mut a, &decor, 0, size);
        draw_decor(&mut b, &decor, 10, size);
        assert_ne!(a.commands(), b.commands());
    }

    #[test]
    fn test_ring_draws_two_strokes() {
        let mut rec = Recorder::new(100, 100);
        let ring = crate::lifecycle::PulseRing::new(
            Vec2::new(50.0, 50.0),
            &crate::lifecycle::RingConfig::default(),
            Color::WHITE,
        );
        draw_effect(&mut rec, &Effect::Ring(ring));
        let radii: Vec<f32> = rec
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeCircle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![10.0, 7.0]);
    }

    #[test]
    fn test_blended_edge_uses_gradient() {
        let mut rec = Recorder::new(100, 100);
        let edge = Edge {
            from: Vec2::ZERO,
            to: Vec2::new(10.0, 0.0),
            opacity: 0.5,
            colors: (Color::WHITE, Color::BLACK),
            width: 1.0,
        };
        draw_edge(&mut rec, &edge);
        assert!(matches!(
            rec.commands()[0].paint(),
            Some(Paint::Linear { .. })
        ));
        assert_eq!(rec.commands()[0].alphas(), vec![0.5, 0.5]);
    }
}
