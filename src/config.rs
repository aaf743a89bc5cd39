//! Engine configuration and the built-in presets.
//!
//! An [`EngineConfig`] fully describes one background: its backdrop, decor,
//! entity populations, proximity graph, click and pointer effects, and an
//! optional 3D model. Every concrete background is a preset value of this
//! one type rather than a separate engine.
//!
//! Configs round-trip through TOML, so a preset can be dumped, edited and
//! loaded back:
//!
//! ```ignore
//! let config = EngineConfig::preset("session")?;
//! std::fs::write("session.toml", config.to_toml()?)?;
//! let edited = EngineConfig::load("session.toml")?;
//! ```

use crate::compositor::{Decor, PointerGlow};
use crate::error::ConfigError;
use crate::lifecycle::{RingConfig, ShootingStarConfig};
use crate::proximity::{EdgeColor, PointerLinks, ProximityConfig};
use crate::rules::{Boundary, PointerForce};
use crate::spawn::{Count, Halo, NodeStyle, Population, Pulse, Spawn};
use crate::visuals::{Background, Color, GradientStop, Palette};
use crate::wireframe::{CubeSpec, WireframeModel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names and one-line descriptions of the built-in presets.
pub const PRESETS: &[(&str, &str)] = &[
    ("network", "cyan particle network that shies away from the pointer"),
    ("globe", "rotating sphere of depth-shaded dots"),
    ("earth", "rotating latitude/longitude wireframe globe"),
    ("tech", "pulsing particles, drifting grid and circuit traces"),
    ("starfield", "twinkling stars, nebulae and shooting stars"),
    ("session", "attracting nodes, data rain, hex lattice and click rings"),
    ("lecture", "stage lights, floating shapes, curtains and bokeh"),
    ("balloons", "large blurred balloons pushed by the pointer"),
    ("blocks", "tumbling wireframe cubes and falling light shards"),
];

/// Complete description of one animated background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    #[serde(default)]
    pub background: Background,
    /// Colors entities pick from when spawned.
    #[serde(default)]
    pub palette: Vec<Color>,
    #[serde(default)]
    pub decor: Vec<Decor>,
    #[serde(default)]
    pub populations: Vec<Population>,
    #[serde(default)]
    pub edges: Option<ProximityConfig>,
    /// Pulse ring spawned per click. Clicks are ignored when unset.
    #[serde(default)]
    pub click: Option<RingConfig>,
    #[serde(default)]
    pub pointer_glow: Option<PointerGlow>,
    #[serde(default)]
    pub shooting_stars: Option<ShootingStarConfig>,
    #[serde(default)]
    pub wireframe: Option<WireframeModel>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            background: Background::default(),
            palette: Palette::default().colors(),
            decor: Vec::new(),
            populations: Vec::new(),
            edges: None,
            click: None,
            pointer_glow: None,
            shooting_stars: None,
            wireframe: None,
        }
    }
}

fn radial_background(colors: [Color; 3], radius_factor: f32) -> Background {
    Background::Radial {
        stops: vec![
            GradientStop::new(0.0, colors[0]),
            GradientStop::new(0.5, colors[1]),
            GradientStop::new(1.0, colors[2]),
        ],
        radius_factor,
    }
}

impl EngineConfig {
    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "network" => Ok(Self::network()),
            "globe" => Ok(Self::globe()),
            "earth" => Ok(Self::earth()),
            "tech" => Ok(Self::tech()),
            "starfield" => Ok(Self::starfield()),
            "session" => Ok(Self::session()),
            "lecture" => Ok(Self::lecture()),
            "balloons" => Ok(Self::balloons()),
            "blocks" => Ok(Self::blocks()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Cyan particle network. Nodes bounce, the pointer pushes them away and
    /// links to nearby nodes.
    pub fn network() -> Self {
        let cyan = Color::hex("#00bcd4");
        Self {
            name: "network".to_string(),
            palette: Palette::Cyan.colors(),
            populations: vec![Population::new(
                Spawn::Node {
                    size: [2.0, 5.0],
                    velocity: 0.75,
                    opacity: [1.0, 1.0],
                    pulse_speed: [0.0, 0.0],
                    style: NodeStyle::default(),
                },
                Count::PerArea(20_000.0),
            )
            .with_boundary(Boundary::Bounce)
            .with_pointer(PointerForce::Repel {
                radius: 200.0,
                strength: 5.0,
            })],
            edges: Some(ProximityConfig {
                max_distance: 150.0,
                falloff: 1.0,
                width: 2.0,
                color: EdgeColor::Fixed(cyan),
                pointer: Some(PointerLinks {
                    radius: 200.0,
                    falloff: 1.0,
                    width: 2.5,
                    color: cyan,
                }),
            }),
            ..Self::default()
        }
    }

    /// Dot sphere.
    pub fn globe() -> Self {
        Self {
            name: "globe".to_string(),
            wireframe: Some(WireframeModel::dots()),
            ..Self::default()
        }
    }

    /// Line globe.
    pub fn earth() -> Self {
        Self {
            name: "earth".to_string(),
            wireframe: Some(WireframeModel::globe()),
            ..Self::default()
        }
    }

    pub fn tech() -> Self {
        Self {
            name: "tech".to_string(),
            background: radial_background(
                [
                    Color::hex("#0a1628"),
                    Color::hex("#050d18"),
                    Color::hex("#020408"),
                ],
                0.8,
            ),
            palette: Palette::Tech.colors(),
            decor: vec![Decor::Grid {
                size: 60.0,
                drift: [0.2, 0.15],
                color: Color::rgb8(0, 212, 255).with_alpha(0.05),
            }],
            populations: vec![
                Population::new(
                    Spawn::Circuit {
                        segments: [5, 12],
                        segment_length: [50.0, 200.0],
                        speed: [0.005, 0.015],
                    },
                    Count::Fixed(8),
                ),
                Population::new(
                    Spawn::Node {
                        size: [1.0, 4.0],
                        velocity: 0.4,
                        opacity: [0.3, 0.8],
                        pulse_speed: [0.02, 0.07],
                        style: NodeStyle {
                            pulse: Pulse {
                                base: 0.7,
                                amplitude: 0.3,
                            },
                            pulse_opacity: true,
                            halo: Some(Halo {
                                scale: 4.0,
                                inner: 1.0,
                                middle: None,
                            }),
                            highlight: false,
                        },
                    },
                    Count::PerArea(8000.0),
                )
                .with_boundary(Boundary::Wrap),
            ],
            edges: Some(ProximityConfig {
                max_distance: 120.0,
                falloff: 0.3,
                width: 1.0,
                color: EdgeColor::Fixed(Color::rgb8(0, 212, 255)),
                pointer: None,
            }),
            ..Self::default()
        }
    }

    pub fn starfield() -> Self {
        let star = |size, speed, opacity, twinkle_speed, bright| Spawn::Star {
            size,
            speed,
            opacity,
            twinkle_speed,
            bright,
        };
        Self {
            name: "starfield".to_string(),
            background: radial_background(
                [
                    Color::rgb8(5, 10, 30),
                    Color::rgb8(0, 5, 20),
                    Color::rgb8(0, 0, 5),
                ],
                1.0,
            ),
            palette: vec![Color::WHITE],
            decor: vec![Decor::Nebula],
            populations: vec![
                Population::new(
                    star([0.5, 2.5], [0.1, 0.6], [0.5, 1.0], [0.01, 0.03], false),
                    Count::PerArea(3000.0),
                )
                .with_boundary(Boundary::Wrap),
                Population::new(
                    star([2.0, 5.0], [0.05, 0.35], [1.0, 1.0], [0.02, 0.05], true),
                    Count::Fixed(20),
                )
                .with_boundary(Boundary::Wrap),
            ],
            shooting_stars: Some(ShootingStarConfig::default()),
            ..Self::default()
        }
    }

    /// The interactive session background: everything at once.
    pub fn session() -> Self {
        Self {
            name: "session".to_string(),
            background: radial_background(
                [
                    Color::hex("#0a0a1a"),
                    Color::hex("#050510"),
                    Color::hex("#000005"),
                ],
                0.8,
            ),
            palette: Palette::Neon.colors(),
            decor: vec![Decor::Hex {
                size: 50.0,
                color: Color::rgb8(0, 200, 255).with_alpha(0.02),
                pulse_color: Color::hex("#00ffff"),
            }],
            populations: vec![
                Population::new(
                    Spawn::Stream {
                        length: [10, 29],
                        speed: [1.0, 4.0],
                        opacity: [0.1, 0.4],
                        pitch: 18.0,
                        glyph_height: 14.0,
                        color: Color::rgb8(0, 255, 150),
                        head_color: Color::WHITE,
                    },
                    Count::PerWidth(40.0),
                ),
                Population::new(
                    Spawn::Node {
                        size: [3.0, 7.0],
                        velocity: 0.25,
                        opacity: [1.0, 1.0],
                        pulse_speed: [0.02, 0.05],
                        style: NodeStyle {
                            pulse: Pulse {
                                base: 1.0,
                                amplitude: 0.3,
                            },
                            pulse_opacity: false,
                            halo: Some(Halo {
                                scale: 4.0,
                                inner: 0x60 as f32 / 255.0,
                                middle: Some(0x20 as f32 / 255.0),
                            }),
                            highlight: true,
                        },
                    },
                    Count::PerArea(25_000.0),
                )
                .with_boundary(Boundary::Bounce)
                .with_pointer(PointerForce::Attract {
                    radius: 300.0,
                    strength: 0.02,
                    damping: 0.98,
                }),
            ],
            edges: Some(ProximityConfig {
                max_distance: 180.0,
                falloff: 0.4,
                width: 1.0,
                color: EdgeColor::Blend,
                pointer: Some(PointerLinks {
                    radius: 200.0,
                    falloff: 0.5,
                    width: 1.0,
                    color: Color::hex("#00ffff"),
                }),
            }),
            click: Some(RingConfig::default()),
            pointer_glow: Some(PointerGlow::new(
                150.0,
                Color::rgb8(0, 255, 255).with_alpha(0.15),
                Color::rgb8(0, 200, 255).with_alpha(0.05),
            )),
            ..Self::default()
        }
    }

    pub fn lecture() -> Self {
        let gold = Color::hex("#ffd700");
        Self {
            name: "lecture".to_string(),
            background: Background::Linear {
                stops: vec![
                    GradientStop::new(0.0, Color::hex("#0a0a12")),
                    GradientStop::new(0.3, Color::hex("#0f0a18")),
                    GradientStop::new(0.6, Color::hex("#100a15")),
                    GradientStop::new(1.0, Color::hex("#050508")),
                ],
            },
            palette: Palette::Stage.colors(),
            decor: vec![
                Decor::Curtains {
                    count: 30,
                    color: gold,
                },
                Decor::Bokeh {
                    count: 20,
                    color: gold,
                },
            ],
            populations: vec![
                Population::new(
                    Spawn::Spotlight {
                        radius: [250.0, 300.0],
                        speed: [0.004, 0.007],
                    },
                    Count::Fixed(3),
                ),
                Population::new(
                    Spawn::Orb {
                        size: [40.0, 120.0],
                        velocity: 0.25,
                        pulse_speed: [0.02, 0.04],
                    },
                    Count::Fixed(8),
                )
                .with_boundary(Boundary::Bounce),
                Population::new(
                    Spawn::Shape {
                        size: [20.0, 80.0],
                        spin: 0.005,
                        velocity: 0.15,
                        opacity: [0.1, 0.3],
                        stroke: 2.0,
                    },
                    Count::Fixed(25),
                )
                .with_boundary(Boundary::Wrap),
            ],
            pointer_glow: Some(PointerGlow::new(
                200.0,
                Color::rgb8(255, 215, 0).with_alpha(0.1),
                Color::rgb8(255, 180, 0).with_alpha(0.03),
            )),
            ..Self::default()
        }
    }

    pub fn balloons() -> Self {
        Self {
            name: "balloons".to_string(),
            palette: Palette::Party.colors(),
            populations: vec![Population::new(
                Spawn::Balloon {
                    size: [200.0, 400.0],
                    velocity: 0.5,
                },
                Count::Fixed(50),
            )
            .with_boundary(Boundary::Wrap)
            .with_pointer(PointerForce::Repel {
                radius: 300.0,
                strength: 10.0,
            })],
            ..Self::default()
        }
    }

    pub fn blocks() -> Self {
        let palette = Palette::Blocks.colors();
        let pick = |i: usize| palette.get(i).copied().unwrap_or(Color::WHITE);
        let cube = |center: [f32; 2], size: f32, color: Color, seconds: u32, reverse: bool| CubeSpec {
            center,
            size,
            color,
            period: seconds * 60,
            reverse,
        };
        let cubes = vec![
            cube([0.08, 0.25], 384.0, pick(0), 45, false),
            cube([0.93, 0.70], 256.0, pick(1), 38, true),
            cube([0.20, 0.57], 160.0, pick(2), 30, false),
            cube([0.80, 0.30], 224.0, pick(3), 50, true),
            cube([0.45, 0.55], 128.0, Color::hex("#22d3ee33"), 20, false),
            cube([0.65, 0.80], 192.0, Color::hex("#34d3991a"), 60, false),
            cube([0.70, 0.85], 288.0, Color::hex("#60a5fa1a"), 40, true),
        ];
        Self {
            name: "blocks".to_string(),
            palette,
            decor: vec![Decor::Shards {
                count: 12,
                color: Color::hex("#22d3eecc"),
            }],
            wireframe: Some(WireframeModel::Cubes {
                perspective: 2000.0,
                cubes,
            }),
            ..Self::default()
        }
    }

    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make the engine misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, population) in self.populations.iter().enumerate() {
            match population.count {
                Count::PerArea(k) | Count::PerWidth(k) if !(k > 0.0) => {
                    return Err(ConfigError::invalid(
                        format!("populations[{i}].count"),
                        "density constant must be positive",
                    ));
                }
                _ => {}
            }
            let radius = match population.pointer {
                PointerForce::None => None,
                PointerForce::Repel { radius, .. } | PointerForce::Attract { radius, .. } => {
                    Some(radius)
                }
            };
            if radius.is_some_and(|r| !(r > 0.0)) {
                return Err(ConfigError::invalid(
                    format!("populations[{i}].pointer.radius"),
                    "must be positive",
                ));
            }
            let uses_palette = !matches!(
                population.spawn,
                Spawn::Star { .. } | Spawn::Stream { .. }
            );
            if uses_palette && self.palette.is_empty() {
                return Err(ConfigError::invalid("palette", "must not be empty"));
            }
        }

        if let Some(edges) = &self.edges {
            if !(edges.max_distance > 0.0) {
                return Err(ConfigError::invalid("edges.max_distance", "must be positive"));
            }
            if edges.pointer.as_ref().is_some_and(|links| !(links.radius > 0.0)) {
                return Err(ConfigError::invalid("edges.pointer.radius", "must be positive"));
            }
        }

        if let Some(ring) = &self.click {
            if !(ring.growth > 0.0) {
                return Err(ConfigError::invalid("click.growth", "must be positive"));
            }
            if !(ring.max_radius > ring.start_radius) {
                return Err(ConfigError::invalid(
                    "click.max_radius",
                    "must be larger than start_radius",
                ));
            }
        }

        if let Some(glow) = &self.pointer_glow {
            if !(glow.radius > 0.0) {
                return Err(ConfigError::invalid("pointer_glow.radius", "must be positive"));
            }
        }

        match &self.wireframe {
            Some(WireframeModel::Globe {
                radius, perspective, ..
            })
            | Some(WireframeModel::Dots {
                radius, perspective, ..
            }) => {
                if !(*radius > 0.0) || !(*perspective > 0.0) {
                    return Err(ConfigError::invalid(
                        "wireframe",
                        "radius and perspective must be positive",
                    ));
                }
            }
            Some(WireframeModel::Cubes { perspective, .. }) if !(*perspective > 0.0) => {
                return Err(ConfigError::invalid("wireframe.perspective", "must be positive"));
            }
            _ => {}
        }

        Ok(())
    }
}
