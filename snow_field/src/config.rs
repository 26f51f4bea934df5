//! Physics tuning, fixed for the lifetime of a system.

use crate::error::{Error, Result};
use crate::surface::Color;

// ════════════════════════════════════════════════════════════════════════════
// Defaults
// ════════════════════════════════════════════════════════════════════════════

pub const DEFAULT_GRAVITY:            f32 = 0.05;
pub const DEFAULT_FRICTION:           f32 = 0.98;
pub const DEFAULT_INTERACTION_RADIUS: f32 = 150.0;

pub const XMAS_RED:   Color = Color::rgb(0xFF, 0x00, 0x00);
pub const XMAS_GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
pub const XMAS_GOLD:  Color = Color::rgb(0xFF, 0xD7, 0x00);
pub const XMAS_WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

pub const XMAS_PALETTE: [Color; 4] = [XMAS_RED, XMAS_GREEN, XMAS_GOLD, XMAS_WHITE];

// ════════════════════════════════════════════════════════════════════════════
// SimConfig
// ════════════════════════════════════════════════════════════════════════════

/// Constants shared by every particle in one system.
///
/// Passed by value into [`ParticleSystem::new`](crate::ParticleSystem::new)
/// and never changed afterwards, so two systems never share tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Added to `vy` every frame, before friction.
    pub gravity:            f32,
    /// Multiplies both velocity components every frame. Must be in `(0, 1]`.
    pub friction:           f32,
    /// Hand distance (pixels) inside which a particle feels a force.
    pub interaction_radius: f32,
    pub palette:            [Color; 4],
    /// Seed for the system's random source. `None` draws from the OS.
    pub seed:               Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            gravity:            DEFAULT_GRAVITY,
            friction:           DEFAULT_FRICTION,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            palette:            XMAS_PALETTE,
            seed:               None,
        }
    }
}

impl SimConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_interaction_radius(mut self, radius: f32) -> Self {
        self.interaction_radius = radius;
        self
    }

    /// Limit of `vy` under gravity and friction alone.
    ///
    /// Friction is applied after gravity, so the fixed point of
    /// `v = (v + g)·f` is `g·f / (1 − f)`.
    pub fn terminal_velocity(&self) -> f32 {
        self.gravity * self.friction / (1.0 - self.friction)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(Error::InvalidConfig(format!("gravity {} is not finite", self.gravity)));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "friction {} must be in (0, 1]", self.friction
            )));
        }
        if !(self.interaction_radius.is_finite() && self.interaction_radius > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "interaction radius {} must be positive", self.interaction_radius
            )));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
