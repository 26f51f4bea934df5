//! Error types for the particle field.

use thiserror::Error;

/// Errors raised when building a [`ParticleSystem`](crate::ParticleSystem).
///
/// Per-frame `update` and `draw` never fail; only construction is checked.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Canvas width or height is zero, negative or not finite.
    #[error("invalid canvas dimensions {width}x{height}: both must be positive and finite")]
    InvalidDimensions { width: f32, height: f32 },

    /// A physics constant is out of range.
    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
