//! The drawing surface seam.
//!
//! The compositor never touches pixels directly; it issues primitive draw
//! calls against a [`Surface`]. The native host uses the software
//! [`Raster`](crate::raster::Raster); tests use [`Recorder`], which keeps the
//! ordered list of calls so layer order can be asserted on.

use crate::visuals::{clamp_unit, Color, GradientStop};
use glam::Vec2;

/// How a primitive is filled or stroked.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Flat color.
    Solid(Color),
    /// Gradient along the segment `from -> to`.
    Linear {
        from: Vec2,
        to: Vec2,
        stops: Vec<GradientStop>,
    },
    /// Gradient radiating from `center` out to `radius`.
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Radial glow: `inner` at the center fading to transparent at `radius`.
    pub fn glow(center: Vec2, radius: f32, inner: Color) -> Self {
        Paint::Radial {
            center,
            radius,
            stops: vec![
                GradientStop::new(0.0, inner),
                GradientStop::new(1.0, inner.with_alpha(0.0)),
            ],
        }
    }

    /// Largest alpha the paint can produce anywhere.
    pub fn max_alpha(&self) -> f32 {
        match self {
            Paint::Solid(color) => clamp_unit(color.a),
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => stops
                .iter()
                .map(|s| clamp_unit(s.color.a))
                .fold(0.0, f32::max),
        }
    }

    /// `true` when nothing drawn with this paint would be visible.
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.max_alpha() <= 0.0
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

/// A 2D target the compositor paints onto.
///
/// All coordinates are surface-local pixels with the origin at the top left.
/// Implementations blend with source-over and silently clip anything outside
/// the surface.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Resize the surface. Contents become unspecified.
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// Fill the axis-aligned rectangle `[min, max)`.
    fn fill_rect(&mut self, min: Vec2, max: Vec2, paint: &Paint);

    /// Fill a disc.
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    /// Stroke a circle outline of the given line width.
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint);

    /// Stroke connected line segments through `points`.
    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, paint: &Paint);

    /// Stroke a single segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint) {
        self.stroke_polyline(&[from, to], false, width, paint);
    }

    /// Draw one glyph with its top-left corner at `origin`, `height` pixels tall.
    fn fill_glyph(&mut self, glyph: char, origin: Vec2, height: f32, color: Color);

    /// Surface size as a vector.
    fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }
}

/// One recorded call on a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        min: Vec2,
        max: Vec2,
        paint: Paint,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        paint: Paint,
    },
    StrokePolyline {
        points: Vec<Vec2>,
        closed: bool,
        width: f32,
        paint: Paint,
    },
    Glyph {
        glyph: char,
        origin: Vec2,
        height: f32,
        color: Color,
    },
}

impl DrawCommand {
    /// The paint used by this command, if any.
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            DrawCommand::Clear | DrawCommand::Glyph { .. } => None,
            DrawCommand::FillRect { paint, .. }
            | DrawCommand::FillCircle { paint, .. }
            | DrawCommand::StrokeCircle { paint, .. }
            | DrawCommand::StrokePolyline { paint, .. } => Some(paint),
        }
    }

    /// Every alpha value the command could paint with.
    pub fn alphas(&self) -> Vec<f32> {
        match self {
            DrawCommand::Clear => Vec::new(),
            DrawCommand::Glyph { color, .. } => vec![color.a],
            _ => match self.paint() {
                Some(Paint::Solid(c)) => vec![c.a],
                Some(Paint::Linear { stops, .. }) | Some(Paint::Radial { stops, .. }) => {
                    stops.iter().map(|s| s.color.a).collect()
                }
                None => Vec::new(),
            },
        }
    }
}

/// A surface that records draw calls instead of rasterizing them.
///
/// The log is cleared by [`Surface::clear`], so after a frame it holds exactly
/// that frame's commands.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// How many times the surface was cleared, i.e. frames drawn.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Surface for Recorder {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            min,
            max,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            paint: paint.clone(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            closed,
            width,
            paint: paint.clone(),
        });
    }

    fn fill_glyph(&mut self, glyph: char, origin: Vec2, height: f32, color: Color) {
        self.commands.push(DrawCommand::Glyph {
            glyph,
            origin,
            height,
            color,
        });
    }
}
