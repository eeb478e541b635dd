//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Render surface could not be obtained from the host
    #[error("Render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Viewport has a zero or non-finite dimension
    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    /// Gamepad backend failed to initialize or poll
    #[error("Gamepad backend error: {0}")]
    Gamepad(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
