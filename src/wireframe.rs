//! 3D wireframe projection.
//!
//! Models are built once in model space, rotated every tick and projected to
//! the surface with a simple pinhole perspective:
//!
//! ```text
//! scale = perspective / (perspective + z + offset)
//! screen = center + (x, y) * scale
//! ```
//!
//! Negative `z` is toward the viewer, so nearer points project larger. Edges
//! on the far side of the model are culled and the rest fade with depth.
//!
//! Three models are available:
//! - [`WireframeModel::Globe`]: latitude rings and meridian chains
//! - [`WireframeModel::Dots`]: random points on a sphere, sized and faded by depth
//! - [`WireframeModel::Cubes`]: tumbling cubes placed across the surface

use crate::spawn::SpawnContext;
use crate::visuals::{clamp_unit, Color};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A wireframe made of line segments in model space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WireframeMesh {
    /// Line segments as pairs of endpoints (start, end).
    pub lines: Vec<(Vec3, Vec3)>,
}

impl WireframeMesh {
    /// Cube (6 faces, 12 edges) with the given side length, centered on the origin.
    pub fn cube(side: f32) -> Self {
        let s = side * 0.5;
        let v000 = Vec3::new(-s, -s, -s);
        let v001 = Vec3::new(-s, -s, s);
        let v010 = Vec3::new(-s, s, -s);
        let v011 = Vec3::new(-s, s, s);
        let v100 = Vec3::new(s, -s, -s);
        let v101 = Vec3::new(s, -s, s);
        let v110 = Vec3::new(s, s, -s);
        let v111 = Vec3::new(s, s, s);

        Self {
            lines: vec![
                // Bottom face
                (v000, v100),
                (v100, v101),
                (v101, v001),
                (v001, v000),
                // Top face
                (v010, v110),
                (v110, v111),
                (v111, v011),
                (v011, v010),
                // Vertical edges
                (v000, v010),
                (v100, v110),
                (v101, v111),
                (v001, v011),
            ],
        }
    }

    /// Latitude/longitude globe.
    ///
    /// Latitude rings run from `-90 + lat_step` to `90 - lat_step` and are
    /// closed, with a vertex every `lon_step` degrees. Meridians every
    /// `meridian_step` degrees run pole to pole in `lon_step` increments and
    /// are open chains.
    pub fn globe(radius: f32, lat_step: u32, lon_step: u32, meridian_step: u32) -> Self {
        let (lat_step, lon_step, meridian_step) =
            (lat_step.max(1) as i32, lon_step.max(1) as i32, meridian_step.max(1) as i32);
        let mut lines = Vec::new();

        let mut lat = -90 + lat_step;
        while lat < 90 {
            let ring: Vec<Vec3> = (0..360)
                .step_by(lon_step as usize)
                .map(|lon| spherical(lat as f32, lon as f32, radius))
                .collect();
            for (i, &p) in ring.iter().enumerate() {
                lines.push((p, ring[(i + 1) % ring.len()]));
            }
            lat += lat_step;
        }

        for lon in (0..360).step_by(meridian_step as usize) {
            let chain: Vec<Vec3> = (-90..=90)
                .step_by(lon_step as usize)
                .map(|lat| spherical(lat as f32, lon as f32, radius))
                .collect();
            lines.extend(chain.windows(2).map(|w| (w[0], w[1])));
        }

        Self { lines }
    }
}

/// Point on a sphere from latitude and longitude in degrees. `+y` is north.
pub fn spherical(lat: f32, lon: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    Vec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Rotate about the Y axis.
#[inline]
pub fn rotate_y(p: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x * cos - p.z * sin, p.y, p.x * sin + p.z * cos)
}

/// Rotate about the X axis.
#[inline]
pub fn rotate_x(p: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x, p.y * cos - p.z * sin, p.y * sin + p.z * cos)
}

/// Pinhole projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub perspective: f32,
    /// Added to `z` so the model sits in front of the camera.
    pub offset: f32,
}

impl Projection {
    /// Perspective scale at depth `z`. Zero behind the camera.
    #[inline]
    pub fn scale(&self, z: f32) -> f32 {
        let denom = self.perspective + z + self.offset;
        if denom <= f32::EPSILON {
            0.0
        } else {
            self.perspective / denom
        }
    }

    /// Screen position and scale of a point.
    #[inline]
    pub fn project(&self, p: Vec3, center: Vec2) -> (Vec2, f32) {
        let scale = self.scale(p.z);
        (center + Vec2::new(p.x, p.y) * scale, scale)
    }
}

/// Depth fade for a globe edge: full at the near pole of the sphere, low at
/// the far side.
///
/// `alpha = clamp((radius - z) / (2 * radius) * gain, min, 1)`.
pub fn depth_alpha(z: f32, radius: f32, gain: f32, min: f32) -> f32 {
    if radius <= 0.0 {
        return clamp_unit(min);
    }
    let nearness = (radius - z) / (2.0 * radius);
    clamp_unit((nearness * gain).max(min))
}

/// One tumbling cube of the cubes model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeSpec {
    /// Center as a fraction of the surface size.
    pub center: [f32; 2],
    /// Side length in pixels.
    pub size: f32,
    pub color: Color,
    /// Ticks per full revolution.
    pub period: u32,
    #[serde(default)]
    pub reverse: bool,
}

/// A 3D model and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum WireframeModel {
    Globe {
        radius: f32,
        perspective: f32,
        /// Radians per tick about Y.
        spin: f32,
        /// Edges with both endpoints beyond this depth are skipped.
        cull: f32,
        min_alpha: f32,
        gain: f32,
        width: f32,
        color: Color,
        #[serde(default = "default_lat_step")]
        lat_step: u32,
        #[serde(default = "default_lon_step")]
        lon_step: u32,
        #[serde(default = "default_meridian_step")]
        meridian_step: u32,
    },
    Dots {
        count: usize,
        radius: f32,
        perspective: f32,
        spin: f32,
        color: Color,
    },
    Cubes {
        perspective: f32,
        cubes: Vec<CubeSpec>,
    },
}

fn default_lat_step() -> u32 {
    15
}

fn default_lon_step() -> u32 {
    10
}

fn default_meridian_step() -> u32 {
    30
}

impl WireframeModel {
    /// The rotating line globe.
    pub fn globe() -> Self {
        WireframeModel::Globe {
            radius: 220.0,
            perspective: 800.0,
            spin: 0.002,
            cull: 50.0,
            min_alpha: 0.05,
            gain: 0.6,
            width: 1.5,
            color: Color::rgb8(6, 182, 212),
            lat_step: default_lat_step(),
            lon_step: default_lon_step(),
            meridian_step: default_meridian_step(),
        }
    }

    /// The rotating dot sphere.
    pub fn dots() -> Self {
        WireframeModel::Dots {
            count: 800,
            radius: 300.0,
            perspective: 800.0,
            spin: 0.002,
            color: Color::rgb8(6, 182, 212),
        }
    }
}

/// A projected, depth-shaded line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSegment {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color,
    pub width: f32,
}

/// A projected, depth-shaded dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedDot {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
}

/// Runtime state of a wireframe model.
#[derive(Debug, Clone)]
pub struct Wireframe {
    model: WireframeModel,
    angle: f32,
    ticks: u64,
    mesh: WireframeMesh,
    points: Vec<Vec3>,
}

impl Wireframe {
    /// Build the model geometry. Dot positions are drawn from `ctx`.
    pub fn new(model: WireframeModel, ctx: &mut SpawnContext) -> Self {
        let (mesh, points) = match &model {
            WireframeModel::Globe {
                radius,
                lat_step,
                lon_step,
                meridian_step,
                ..
            } => (
                WireframeMesh::globe(*radius, *lat_step, *lon_step, *meridian_step),
                Vec::new(),
            ),
            WireframeModel::Dots { count, radius, .. } => (
                WireframeMesh::default(),
                (0..*count).map(|_| ctx.random_on_sphere(*radius)).collect(),
            ),
            WireframeModel::Cubes { .. } => (WireframeMesh::cube(1.0), Vec::new()),
        };
        Self {
            model,
            angle: 0.0,
            ticks: 0,
            mesh,
            points,
        }
    }

    /// Current rotation about Y.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn mesh(&self) -> &WireframeMesh {
        &self.mesh
    }

    /// Advance the rotation one tick.
    pub fn advance(&mut self) {
        self.ticks += 1;
        match &self.model {
            WireframeModel::Globe { spin, .. } | WireframeModel::Dots { spin, .. } => {
                self.angle = (self.angle + spin) % TAU;
            }
            WireframeModel::Cubes { .. } => {}
        }
    }

    /// Visible edges for a surface of `size`, in draw order.
    pub fn segments(&self, size: Vec2) -> Vec<ProjectedSegment> {
        let center = size * 0.5;
        match &self.model {
            WireframeModel::Globe {
                radius,
                perspective,
                cull,
                min_alpha,
                gain,
                width,
                color,
                ..
            } => {
                let projection = Projection {
                    perspective: *perspective,
                    offset: *radius,
                };
                self.mesh
                    .lines
                    .iter()
                    .filter_map(|&(a, b)| {
                        let a = rotate_y(a, self.angle);
                        let b = rotate_y(b, self.angle);
                        if a.z > *cull && b.z > *cull {
                            return None;
                        }
                        let (from, sa) = projection.project(a, center);
                        let (to, sb) = projection.project(b, center);
                        if sa <= 0.0 || sb <= 0.0 {
                            return None;
                        }
                        let depth = (a.z + b.z) * 0.5;
                        Some(ProjectedSegment {
                            from,
                            to,
                            color: color.with_alpha(depth_alpha(depth, *radius, *gain, *min_alpha)),
                            width: *width,
                        })
                    })
                    .collect()
            }
            WireframeModel::Cubes { perspective, cubes } => {
                let projection = Projection {
                    perspective: *perspective,
                    offset: 0.0,
                };
                let mut out = Vec::with_capacity(cubes.len() * self.mesh.lines.len());
                for cube in cubes {
                    let turn = if cube.period == 0 {
                        0.0
                    } else {
                        (self.ticks % cube.period as u64) as f32 / cube.period as f32 * TAU
                    };
                    let (ax, ay) = if cube.reverse { (-turn, turn) } else { (turn, -turn) };
                    let origin = Vec2::new(cube.center[0], cube.center[1]) * size;
                    let transform = |p: Vec3| rotate_y(rotate_x(p * cube.size, ax), ay);
                    for &(a, b) in &self.mesh.lines {
                        let (from, _) = projection.project(transform(a), origin);
                        let (to, _) = projection.project(transform(b), origin);
                        out.push(ProjectedSegment {
                            from,
                            to,
                            color: cube.color,
                            width: 1.0,
                        });
                    }
                }
                out
            }
            WireframeModel::Dots { .. } => Vec::new(),
        }
    }

    /// Visible dots for a surface of `size`.
    pub fn dots(&self, size: Vec2) -> Vec<ProjectedDot> {
        let WireframeModel::Dots {
            radius,
            perspective,
            color,
            ..
        } = &self.model
        else {
            return Vec::new();
        };
        let projection = Projection {
            perspective: *perspective,
            offset: radius + 200.0,
        };
        let center = size * 0.5;
        self.points
            .iter()
            .filter_map(|&p| {
                let (pos, scale) = projection.project(rotate_y(p, self.angle), center);
                (scale > 0.0).then(|| ProjectedDot {
                    pos,
                    radius: (scale * 2.0).max(0.5),
                    color: color.with_alpha(((scale - 0.5) * 1.5).max(0.1)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(model: WireframeModel) -> Wireframe {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = SpawnContext::new(&mut rng, Vec2::new(800.0, 600.0), &[], &[]);
        Wireframe::new(model, &mut ctx)
    }

    #[test]
    fn test_globe_mesh_counts() {
        let mesh = WireframeMesh::globe(220.0, 15, 10, 30);
        // 11 closed rings of 36 edges, 12 meridians of 18 edges.
        assert_eq!(mesh.lines.len(), 11 * 36 + 12 * 18);
        for (a, b) in &mesh.lines {
            assert!((a.length() - 220.0).abs() < 1e-2);
            assert!((b.length() - 220.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_spherical_poles() {
        let north = spherical(90.0, 0.0, 10.0);
        assert!((north - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let p = rotate_y(Vec3::X, std::f32::consts::FRAC_PI_2);
        assert!((p - Vec3::Z).length() < 1e-6);
        let q = rotate_x(Vec3::Y, std::f32::consts::FRAC_PI_2);
        assert!((q - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_depth_ordering() {
        let r = 220.0;
        let projection = Projection {
            perspective: 800.0,
            offset: r,
        };
        assert!(projection.scale(-r) > projection.scale(r));
        assert!(depth_alpha(r, r, 0.6, 0.05) < depth_alpha(-r, r, 0.6, 0.05));
        assert_eq!(depth_alpha(r, r, 0.6, 0.05), 0.05);
        assert!((depth_alpha(-r, r, 0.6, 0.05) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_globe_culls_far_side() {
        let wireframe = build(WireframeModel::globe());
        let segments = wireframe.segments(Vec2::new(800.0, 600.0));
        assert!(!segments.is_empty());
        assert!(segments.len() < wireframe.mesh().lines.len());
        for s in &segments {
            assert!((0.0..=1.0).contains(&s.color.a));
        }
    }

    #[test]
    fn test_dots_fade_with_depth() {
        let wireframe = build(WireframeModel::dots());
        let dots = wireframe.dots(Vec2::new(800.0, 600.0));
        assert_eq!(dots.len(), 800);
        for d in &dots {
            assert!(d.radius >= 0.5);
            assert!((0.1..=1.0).contains(&d.color.a));
        }
    }

    #[test]
    fn test_cubes_rotate() {
        let mut wireframe = build(WireframeModel::Cubes {
            perspective: 2000.0,
            cubes: vec![CubeSpec {
                center: [0.5, 0.5],
                size: 100.0,
                color: Color::WHITE,
                period: 100,
                reverse: false,
            }],
        });
        let before = wireframe.segments(Vec2::new(800.0, 600.0));
        assert_eq!(before.len(), 12);
        wireframe.advance();
        let after = wireframe.segments(Vec2::new(800.0, 600.0));
        assert_ne!(before, after);
    }
}
