//! Error types for backdrop.
//!
//! Library code only fails at its edges: loading configuration, bringing up
//! the GPU presenter and running the native window host. The animation core
//! itself never returns errors; an unavailable drawing surface leaves the
//! engine blank instead.

use thiserror::Error;

/// Errors raised while loading or validating an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML text did not describe a valid config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Serializing the config back to TOML failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// No built-in preset has the requested name.
    #[error("unknown preset '{0}' (try --list)")]
    UnknownPreset(String),
    /// A value was parsed but is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors that can occur when running the native host or writing snapshots.
#[derive(Debug, Error)]
pub enum HostError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Writing a snapshot image failed.
    #[error("failed to write snapshot: {0}")]
    Snapshot(#[from] image::ImageError),
}
