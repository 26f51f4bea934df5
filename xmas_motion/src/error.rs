//! Error type for the application layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The window could not be opened or presented to.
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// The particle field rejected its construction parameters.
    #[error(transparent)]
    Simulation(#[from] snow_field::Error),

    /// Encoding or writing a screenshot failed.
    #[error("screenshot failed: {0}")]
    Screenshot(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A replay recording is not valid JSON for the expected layout.
    #[error("invalid replay file: {0}")]
    Replay(#[from] serde_json::Error),

    #[error("replay file has no frames")]
    EmptyReplay,
}

pub type Result<T> = std::result::Result<T, AppError>;
