//! # xmas_motion
//!
//! Interactive holiday particle field steered by a hand. Snowflakes, stars
//! and bokeh dots from [`snow_field`] fall across a software-rendered window;
//! the hand pulls, pushes or stirs them depending on its gesture.
//!
//! ## Gesture → Effect
//!
//! | Gesture | Indicator | Effect on nearby particles |
//! |---|---|---|
//! | Fist | red dot | Attracted toward the hand |
//! | Open palm | gold dot | Pushed away from the hand |
//! | Wave | white dot | Random turbulence |
//! | None | white dot | Drift under gravity only |
//!
//! ## Hand sources
//!
//! * (default) **Mouse simulation**: the pointer is the hand; buttons and
//!   keys pick the gesture (see [`visualizer`]).
//! * `--replay <file>`: a JSON recording of 21-point hand landmarks is
//!   classified frame by frame and played back in a loop.
//!
//! ## Other keys
//!
//! | Key | Action |
//! |---|---|
//! | `P` | Save a PNG screenshot |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod canvas;
pub mod error;
pub mod font;
pub mod gesture;
pub mod screenshot;
pub mod visualizer;

pub use error::AppError;
