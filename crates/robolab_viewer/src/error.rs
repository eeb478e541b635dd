//! Viewer error types

use robolab_3d::RenderError;
use robolab_platform::PlatformError;
use thiserror::Error;

/// Errors surfaced to the embedder
///
/// Simulation never fails; these cover configuration and the render surface.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Configuration file is not valid TOML for the schema
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Render surface could not be acquired or used
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Host surface or viewport problem
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;
