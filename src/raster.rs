//! Software rasterizer implementing [`Surface`] on a `tiny_skia` pixmap.
//!
//! Shapes become `tiny_skia` paths and are filled or stroked with
//! antialiasing; gradients map onto its linear and radial shaders. The pixmap
//! stores premultiplied RGBA8, which is what the GPU presenter uploads.
//!
//! # Example
//!
//! ```ignore
//! let mut raster = Raster::new(640, 480);
//! raster.fill_circle(Vec2::new(320.0, 240.0), 40.0, &Paint::Solid(Color::WHITE));
//! raster.save("frame.png")?;
//! ```

use crate::glyphs;
use crate::surface::{Paint, Surface};
use crate::visuals::{clamp_unit, Color, GradientStop};
use glam::Vec2;
use std::path::Path;
use tiny_skia as sk;

/// An RGBA pixel buffer.
///
/// A zero-area raster has no pixmap; every draw on it is a no-op.
#[derive(Debug, Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixmap: Option<sk::Pixmap>,
}

impl Raster {
    /// Create a transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixmap: sk::Pixmap::new(width, height),
        }
    }

    /// Straight-alpha color of a pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some(Color::rgba8(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.as_ref().map(|p| p.data()).unwrap_or_default()
    }

    /// Convert to a straight-alpha `image` buffer.
    pub fn to_image(&self) -> Result<image::RgbaImage, image::ImageError> {
        let bytes: Vec<u8> = self.pixmap.as_ref().map_or_else(Vec::new, |p| {
            p.pixels()
                .iter()
                .flat_map(|px| {
                    let c = px.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .collect()
        });
        image::RgbaImage::from_raw(self.width, self.height, bytes).ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })
    }

    /// Write the raster to an image file; the format follows the extension.
    ///
    /// Formats without an alpha channel (JPEG) get the RGB channels only.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        let path = path.as_ref();
        let img = self.to_image()?;
        let wants_rgb = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);
        if wants_rgb {
            image::DynamicImage::ImageRgba8(img).to_rgb8().save(path)
        } else {
            img.save(path)
        }
    }

    fn fill_path(&mut self, path: Option<sk::Path>, paint: &Paint) {
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) {
            pixmap.fill_path(
                &path,
                &sk_paint(paint),
                sk::FillRule::Winding,
                sk::Transform::identity(),
                None,
            );
        }
    }

    fn stroke_path(&mut self, path: Option<sk::Path>, width: f32, paint: &Paint) {
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) {
            let stroke = sk::Stroke {
                width,
                line_cap: sk::LineCap::Round,
                line_join: sk::LineJoin::Round,
                ..Default::default()
            };
            pixmap.stroke_path(
                &path,
                &sk_paint(paint),
                &stroke,
                sk::Transform::identity(),
                None,
            );
        }
    }
}

fn sk_color(color: Color) -> sk::Color {
    sk::Color::from_rgba(
        clamp_unit(color.r),
        clamp_unit(color.g),
        clamp_unit(color.b),
        clamp_unit(color.a),
    )
    .unwrap_or(sk::Color::TRANSPARENT)
}

#[inline]
fn sk_point(p: Vec2) -> sk::Point {
    sk::Point::from_xy(p.x, p.y)
}

fn sk_stops(stops: &[GradientStop]) -> Vec<sk::GradientStop> {
    stops
        .iter()
        .map(|s| sk::GradientStop::new(clamp_unit(s.offset), sk_color(s.color)))
        .collect()
}

/// Gradient shaders reject degenerate geometry; those paint the stop the
/// gradient would have resolved to.
fn sk_shader(paint: &Paint) -> sk::Shader<'static> {
    let solid = |stop: Option<&GradientStop>| {
        sk::Shader::SolidColor(stop.map_or(sk::Color::TRANSPARENT, |s| sk_color(s.color)))
    };
    match paint {
        Paint::Solid(color) => sk::Shader::SolidColor(sk_color(*color)),
        Paint::Linear { from, to, stops } => sk::LinearGradient::new(
            sk_point(*from),
            sk_point(*to),
            sk_stops(stops),
            sk::SpreadMode::Pad,
            sk::Transform::identity(),
        )
        .unwrap_or_else(|| solid(stops.first())),
        Paint::Radial {
            center,
            radius,
            stops,
        } => sk::RadialGradient::new(
            sk_point(*center),
            sk_point(*center),
            *radius,
            sk_stops(stops),
            sk::SpreadMode::Pad,
            sk::Transform::identity(),
        )
        .unwrap_or_else(|| solid(stops.last())),
    }
}

fn sk_paint(paint: &Paint) -> sk::Paint<'static> {
    sk::Paint {
        shader: sk_shader(paint),
        anti_alias: true,
        ..Default::default()
    }
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixmap = sk::Pixmap::new(width, height);
    }

    fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(sk::Color::TRANSPARENT);
        }
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, paint: &Paint) {
        if paint.is_invisible() {
            return;
        }
        let (mut min, mut max) = (min, max);
        // A radial paint that fades out is empty beyond its radius.
        if let Paint::Radial {
            center,
            radius,
            stops,
        } = paint
        {
            if stops.last().is_some_and(|s| s.color.a <= 0.0) {
                min = min.max(*center - *radius);
                max = max.min(*center + *radius);
            }
        }
        let Some(rect) = sk::Rect::from_ltrb(min.x, min.y, max.x, max.y) else {
            return;
        };
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_rect(rect, &sk_paint(paint), sk::Transform::identity(), None);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 || paint.is_invisible() {
            return;
        }
        self.fill_path(sk::PathBuilder::from_circle(center.x, center.y, radius), paint);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint) {
        if radius <= 0.0 || width <= 0.0 || paint.is_invisible() {
            return;
        }
        let path = sk::PathBuilder::from_circle(center.x, center.y, radius);
        self.stroke_path(path, width, paint);
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, paint: &Paint) {
        if points.len() < 2 || width <= 0.0 || paint.is_invisible() {
            return;
        }
        let mut pb = sk::PathBuilder::new();
        pb.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            pb.line_to(p.x, p.y);
        }
        if closed && points.len() > 2 {
            pb.close();
        }
        self.stroke_path(pb.finish(), width, paint);
    }

    fn fill_glyph(&mut self, glyph: char, origin: Vec2, height: f32, color: Color) {
        if height <= 0.0 || color.a <= 0.0 {
            return;
        }
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let cell = height / glyphs::GLYPH_ROWS as f32;
        // Hard-edged cells keep small glyphs legible.
        let paint = sk::Paint {
            shader: sk::Shader::SolidColor(sk_color(color)),
            anti_alias: false,
            ..Default::default()
        };
        for (col, row) in glyphs::lit_cells(glyph) {
            let min = origin + Vec2::new(col as f32, row as f32) * cell;
            if let Some(rect) = sk::Rect::from_xywh(min.x, min.y, cell, cell) {
                pixmap.fill_rect(rect, &paint, sk::Transform::identity(), None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_covers_whole_surface() {
        let mut r = Raster::new(4, 3);
        r.fill_rect(Vec2::ZERO, Vec2::new(4.0, 3.0), &Paint::Solid(Color::BLACK));
        assert!(r.data().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_source_over_blend() {
        let mut r = Raster::new(1, 1);
        r.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::Solid(Color::BLACK));
        r.fill_rect(Vec2::ZERO, Vec2::ONE, &Paint::Solid(Color::WHITE.with_alpha(0.5)));
        let p = r.pixel(0, 0).unwrap();
        assert!((p.r - 0.5).abs() < 0.01);
        assert_eq!(p.a, 1.0);
    }

    #[test]
    fn test_circle_center_lit_outside_dark() {
        let mut r = Raster::new(20, 20);
        r.fill_circle(Vec2::new(10.0, 10.0), 4.0, &Paint::Solid(Color::WHITE));
        assert_eq!(r.pixel(10, 10).unwrap().a, 1.0);
        assert_eq!(r.pixel(0, 0).unwrap().a, 0.0);
    }

    #[test]
    fn test_line_is_drawn_between_endpoints_only() {
        let mut r = Raster::new(20, 20);
        r.stroke_line(
            Vec2::new(2.0, 10.5),
            Vec2::new(18.0, 10.5),
            1.0,
            &Paint::Solid(Color::WHITE),
        );
        assert!(r.pixel(10, 10).unwrap().a > 0.9);
        assert_eq!(r.pixel(10, 2).unwrap().a, 0.0);
        assert_eq!(r.pixel(0, 10).unwrap().a, 0.0);
    }

    #[test]
    fn test_ring_hollow_center() {
        let mut r = Raster::new(40, 40);
        r.stroke_circle(Vec2::new(20.0, 20.0), 10.0, 2.0, &Paint::Solid(Color::WHITE));
        assert_eq!(r.pixel(20, 20).unwrap().a, 0.0);
        assert!(r.pixel(30, 20).unwrap().a > 0.5);
    }

    #[test]
    fn test_radial_glow_fades_to_rim() {
        let mut r = Raster::new(40, 40);
        let center = Vec2::new(20.0, 20.0);
        r.fill_circle(center, 15.0, &Paint::glow(center, 15.0, Color::WHITE));
        let inner = r.pixel(20, 20).unwrap().a;
        let outer = r.pixel(32, 20).unwrap().a;
        assert!(inner > 0.9);
        assert!(outer < inner);
        assert_eq!(r.pixel(0, 0).unwrap().a, 0.0);
    }

    #[test]
    fn test_linear_gradient_runs_along_axis() {
        let mut r = Raster::new(10, 1);
        let paint = Paint::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(10.0, 0.0),
            stops: vec![
                GradientStop::new(0.0, Color::BLACK),
                GradientStop::new(1.0, Color::WHITE),
            ],
        };
        r.fill_rect(Vec2::ZERO, Vec2::new(10.0, 1.0), &paint);
        assert!(r.pixel(0, 0).unwrap().r < r.pixel(9, 0).unwrap().r);
    }

    #[test]
    fn test_offscreen_and_degenerate_draws_are_ignored() {
        let mut r = Raster::new(8, 8);
        let white = Paint::Solid(Color::WHITE);
        r.fill_circle(Vec2::new(-100.0, -100.0), 5.0, &white);
        r.stroke_line(Vec2::splat(f32::NAN), Vec2::ONE, 1.0, &white);
        r.stroke_polyline(&[Vec2::ONE], false, 1.0, &white);
        assert!(r.data().chunks(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_glyph_draws_lit_cells() {
        let mut r = Raster::new(10, 14);
        r.fill_glyph('-', Vec2::ZERO, 14.0, Color::WHITE);
        // Middle row is lit, top row is not.
        assert_eq!(r.pixel(1, 7).unwrap().a, 1.0);
        assert_eq!(r.pixel(1, 0).unwrap().a, 0.0);
    }

    #[test]
    fn test_zero_sized_raster() {
        let mut r = Raster::new(0, 0);
        r.fill_rect(Vec2::ZERO, Vec2::splat(10.0), &Paint::Solid(Color::WHITE));
        r.clear();
        assert!(r.data().is_empty());
        assert!(r.pixel(0, 0).is_none());
        assert_eq!(r.to_image().map(|img| img.len()).ok(), Some(0));
    }
}
