use thiserror::Error;

/// Rejected settings. Raised before any surface is touched.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("minimum radius must be positive, got {0}")]
    NonPositiveRadius(i32),

    #[error("minimum radius {min} exceeds maximum radius {max}")]
    InvertedRadii { min: i32, max: i32 },

    #[error("bubble padding must be positive, got {0}")]
    NonPositivePadding(i32),

    #[error("palette has no (outline, fill) pairs")]
    EmptyPalette,

    #[error("frame rate must be at least 1")]
    ZeroFrameRate,

    #[error("invalid size {0:?}, expected WIDTHxHEIGHT")]
    BadSize(String),
}

/// Failures reported by the host surface while acquiring or presenting a frame.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface has zero area")]
    ZeroSized,

    #[error("unable to acquire a frame: {0}")]
    Acquire(String),

    #[error("unable to present a frame: {0}")]
    Present(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Fatal failures of a host mode.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("window system: {0}")]
    Window(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
