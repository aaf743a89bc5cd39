//! Colors, palettes and gradients.
//!
//! Everything the compositor paints is described with the types in this
//! module. Colors are straight (non-premultiplied) RGBA in `0.0..=1.0`, stored
//! in the same sRGB space the hex codes are written in. In config files a
//! color is a hex string:
//!
//! ```toml
//! color = "#00d4ff"      # opaque
//! glow  = "#00d4ff40"    # with alpha
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cyan = Color::hex("#00bcd4");
//! let faded = cyan.with_alpha(0.25);
//! let palette = Palette::Tech.colors();
//! ```

use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from float channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Create a color from 8-bit channels.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            3 => {
                let nib = |i: usize| {
                    let v = u8::from_str_radix(digits.get(i..i + 1)?, 16).ok()?;
                    Some(v * 17)
                };
                Some(Self::rgb8(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Some(Self::rgb8(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parse a hex literal known to be valid, falling back to magenta.
    ///
    /// Intended for built-in constants; user input goes through
    /// [`Color::parse_hex`].
    pub fn hex(text: &str) -> Self {
        Self::parse_hex(text).unwrap_or(Color::new(1.0, 0.0, 1.0, 1.0))
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same color with alpha replaced (clamped to `[0, 1]`).
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: clamp_unit(a),
            ..self
        }
    }

    /// Same color with alpha multiplied by `factor` (clamped to `[0, 1]`).
    #[inline]
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        Color::parse_hex(&value).ok_or_else(|| format!("invalid hex color '{value}'"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Clamp to the unit interval, mapping NaN to zero.
#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Built-in color palettes used by the presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Single cyan, used by the plain particle network.
    #[default]
    Cyan,
    /// Cyan, green, magenta, amber, aqua.
    Tech,
    /// Cyan, green, magenta, amber, violet.
    Neon,
    /// Gold, orange, sky blue, pink, violet.
    Stage,
    /// Translucent cyan, blue, purple and yellow.
    Party,
    /// Cyan, emerald, blue and purple cube outlines.
    Blocks,
}

impl Palette {
    /// Get the colors of this palette.
    pub fn colors(&self) -> Vec<Color> {
        let hexes: &[&str] = match self {
            Palette::Cyan => &["#00bcd4"],
            Palette::Tech => &["#00d4ff", "#00ff88", "#ff00ff", "#ffaa00", "#00ffff"],
            Palette::Neon => &["#00ffff", "#00ff88", "#ff00ff", "#ffaa00", "#8855ff"],
            Palette::Stage => &["#ffd700", "#ff8c00", "#00d4ff", "#ff6b9d", "#8b5cf6"],
            Palette::Party => &["#06b6d4cc", "#3b82f6cc", "#8b5cf6cc", "#facc15cc"],
            Palette::Blocks => &["#06b6d44d", "#10b98133", "#3b82f633", "#a855f733"],
        };
        hexes.iter().map(|h| Color::hex(h)).collect()
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, `0.0..=1.0`.
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// How the full-surface backdrop is filled each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// A single flat color.
    Solid { color: Color },
    /// Vertical gradient from top (offset 0) to bottom (offset 1).
    Linear { stops: Vec<GradientStop> },
    /// Radial gradient centered on the surface.
    ///
    /// The outer radius is `radius_factor * width`.
    Radial {
        stops: Vec<GradientStop>,
        radius_factor: f32,
    },
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: Color::hex("#020617"),
        }
    }
}
