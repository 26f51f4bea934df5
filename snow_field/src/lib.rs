//! # snow_field
//!
//! A fixed population of falling particles (snowflakes, stars and bokeh
//! discs) that a single hand can pull, push or stir.
//!
//! The crate knows nothing about cameras, windows or gesture recognition.
//! Each frame the caller hands over one optional [`HandState`] and a
//! [`Surface`] to draw into:
//!
//! ```rust
//! use snow_field::{Gesture, HandState, ParticleSystem, SimConfig, Vec2};
//!
//! let mut field = ParticleSystem::new(1200, 1280.0, 720.0, SimConfig::default()).unwrap();
//!
//! let hand = HandState::new(Vec2::new(640.0, 360.0), Gesture::Fist);
//! field.update_with(Some(&hand));
//! field.update(None, Gesture::None);
//! assert_eq!(field.len(), 1200);
//! ```
//!
//! ## Gesture → force mapping
//!
//! | Gesture | Effect inside the interaction radius |
//! |---|---|
//! | `Fist` | Attract toward the hand, strongest at the centre |
//! | `OpenPalm` | Repel away from the hand |
//! | `Wave` | Random turbulence, no directional bias |
//! | `None` | Nothing |

pub mod config;
pub mod error;
pub mod hand;
pub mod particle;
pub mod surface;
pub mod system;

pub use config::SimConfig;
pub use error::{Error, Result};
pub use hand::{Gesture, HandState};
pub use particle::{Particle, ParticleShape, RESPAWN_Y};
pub use surface::{Color, Surface};
pub use system::ParticleSystem;

pub use glam::Vec2;
