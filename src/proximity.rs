//! Proximity graph.
//!
//! Every frame, each unordered pair of nodes closer than `max_distance` is
//! joined by an edge whose opacity fades with distance:
//!
//! ```text
//! opacity = (1 - d / max_distance) * falloff
//! ```
//!
//! Nodes near the pointer also get an edge to the pointer. The graph is
//! recomputed from scratch each frame by brute force over all pairs; node
//! counts are kept small by area-scaled populations, so O(n^2) is fine.

use crate::entity::Entity;
use crate::visuals::{clamp_unit, Color};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Edge opacity for two points `dist` apart.
///
/// Zero at or beyond `max_distance`, and always within `[0, 1]`.
pub fn edge_opacity(dist: f32, max_distance: f32, falloff: f32) -> f32 {
    if !(max_distance > 0.0) || !(dist < max_distance) {
        return 0.0;
    }
    clamp_unit((1.0 - dist.max(0.0) / max_distance) * falloff)
}

/// How edge strokes are colored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeColor {
    /// One color for every edge.
    Fixed(Color),
    /// Gradient between the two endpoint colors.
    Blend,
}

/// Edges from nodes to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerLinks {
    pub radius: f32,
    pub falloff: f32,
    pub width: f32,
    pub color: Color,
}

/// Proximity graph settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityConfig {
    pub max_distance: f32,
    pub falloff: f32,
    pub width: f32,
    pub color: EdgeColor,
    #[serde(default)]
    pub pointer: Option<PointerLinks>,
}

/// One stroked edge, recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Vec2,
    pub to: Vec2,
    pub opacity: f32,
    /// Endpoint colors, before opacity is applied.
    pub colors: (Color, Color),
    pub width: f32,
}

/// Positions and colors of the node entities in a slice.
fn nodes(entities: &[Entity]) -> Vec<(Vec2, Color)> {
    entities
        .iter()
        .filter_map(|e| e.as_node().map(|n| (e.pos, n.color)))
        .collect()
}

/// All node-to-node edges.
pub fn pair_edges(entities: &[Entity], config: &ProximityConfig) -> Vec<Edge> {
    let nodes = nodes(entities);
    let max2 = config.max_distance * config.max_distance;
    let mut edges = Vec::new();
    for (i, &(a, ca)) in nodes.iter().enumerate() {
        for &(b, cb) in &nodes[i + 1..] {
            // Cheap reject before the square root.
            if a.distance_squared(b) >= max2 {
                continue;
            }
            let opacity = edge_opacity(a.distance(b), config.max_distance, config.falloff);
            if opacity <= 0.0 {
                continue;
            }
            let colors = match config.color {
                EdgeColor::Fixed(c) => (c, c),
                EdgeColor::Blend => (ca, cb),
            };
            edges.push(Edge {
                from: a,
                to: b,
                opacity,
                colors,
                width: config.width,
            });
        }
    }
    edges
}

/// Node-to-pointer edges.
pub fn pointer_edges(entities: &[Entity], pointer: Vec2, links: &PointerLinks) -> Vec<Edge> {
    nodes(entities)
        .into_iter()
        .filter_map(|(pos, _)| {
            let opacity = edge_opacity(pos.distance(pointer), links.radius, links.falloff);
            (opacity > 0.0).then_some(Edge {
                from: pos,
                to: pointer,
                opacity,
                colors: (links.color, links.color),
                width: links.width,
            })
        })
        .collect()
}
