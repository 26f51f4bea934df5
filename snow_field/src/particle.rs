//! One falling particle: kinematics, hand forces and its three looks.
//!
//! Everything visual (shape, color, size, opacity, spin rate) is rolled once
//! at construction and never changes. Position, velocity and rotation move
//! every frame; crossing the bottom edge recycles the particle at the top.

use std::f32::consts::{FRAC_PI_3, PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::config::SimConfig;
use crate::hand::Gesture;
use crate::surface::{Color, Surface};

/// `y` a particle is reset to after falling past the bottom edge.
pub const RESPAWN_Y: f32 = -10.0;

/// Peak velocity change per frame from an attracting/repelling hand.
const PUSH_SCALE: f32 = 2.0;
/// Half-width of the per-axis jitter a waving hand adds.
const TURBULENCE: f32 = 5.0;

const STAR_SPIKES: usize = 5;
const SNOWFLAKE_ARMS: usize = 6;

// ════════════════════════════════════════════════════════════════════════════
// ParticleShape
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    Snowflake,
    Star,
    Bokeh,
}

impl ParticleShape {
    /// 60% snowflakes, 20% stars, 20% bokeh.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let r: f32 = rng.random();
        if r < 0.6 {
            ParticleShape::Snowflake
        } else if r < 0.8 {
            ParticleShape::Star
        } else {
            ParticleShape::Bokeh
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    position:       Vec2,
    velocity:       Vec2,
    rotation:       f32,

    size:           f32,
    color:          Color,
    shape:          ParticleShape,
    opacity:        f32,
    rotation_speed: f32,
}

fn fresh_fall_speed<R: Rng>(rng: &mut R) -> f32 {
    rng.random_range(1.0..3.0)
}

impl Particle {
    /// Roll a new particle somewhere inside a `width × height` canvas.
    pub fn new<R: Rng>(width: f32, height: f32, config: &SimConfig, rng: &mut R) -> Self {
        let position = Vec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
        let velocity = Vec2::new(rng.random_range(-0.5..=0.5), fresh_fall_speed(rng));
        let color    = config.palette[rng.random_range(0..config.palette.len())];

        Particle {
            position,
            velocity,
            size:           rng.random_range(2.0..6.0),
            color,
            shape:          ParticleShape::random(rng),
            opacity:        rng.random_range(0.5..=1.0),
            rotation:       rng.random_range(0.0..TAU),
            rotation_speed: rng.random_range(-0.025..=0.025),
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn position(&self)       -> Vec2          { self.position }
    pub fn velocity(&self)       -> Vec2          { self.velocity }
    pub fn rotation(&self)       -> f32           { self.rotation }
    pub fn size(&self)           -> f32           { self.size }
    pub fn color(&self)          -> Color         { self.color }
    pub fn shape(&self)          -> ParticleShape { self.shape }
    pub fn opacity(&self)        -> f32           { self.opacity }
    pub fn rotation_speed(&self) -> f32           { self.rotation_speed }

    /// Force the kinematic state, e.g. to replay a scenario.
    pub fn set_position(&mut self, position: Vec2) { self.position = position; }
    pub fn set_velocity(&mut self, velocity: Vec2) { self.velocity = velocity; }

    // ── per-frame step ───────────────────────────────────────────────────

    /// Advance one frame.
    ///
    /// Order matters: gravity, then friction, then integration, then the
    /// hand force (measured from the *new* position), then boundaries.
    /// The hand force lands in the velocity, so it moves the particle on
    /// the following frame.
    pub fn update<R: Rng>(
        &mut self,
        width: f32,
        height: f32,
        hand_pos: Option<Vec2>,
        gesture: Gesture,
        config: &SimConfig,
        rng: &mut R,
    ) {
        self.velocity.y += config.gravity;
        self.velocity *= config.friction;

        self.position += self.velocity;
        self.rotation += self.rotation_speed;

        if let Some(hand) = hand_pos {
            self.apply_hand(hand, gesture, config.interaction_radius, rng);
        }

        if self.position.y > height {
            self.position.y = RESPAWN_Y;
            self.position.x = rng.random_range(0.0..width);
            self.velocity.y = fresh_fall_speed(rng);
        }
        if self.position.x < 0.0 {
            self.position.x = width;
        } else if self.position.x > width {
            self.position.x = 0.0;
        }
    }

    fn apply_hand<R: Rng>(&mut self, hand: Vec2, gesture: Gesture, radius: f32, rng: &mut R) {
        let offset   = self.position - hand;
        let distance = offset.length();
        if distance >= radius {
            return;
        }

        let strength = (radius - distance) / radius;
        // atan2(0, 0) is 0, so a hand dead on the particle still pushes along +x.
        let push = Vec2::from_angle(offset.y.atan2(offset.x)) * strength * PUSH_SCALE;

        match gesture {
            Gesture::Fist     => self.velocity -= push,
            Gesture::OpenPalm => self.velocity += push,
            Gesture::Wave     => {
                self.velocity.x += rng.random_range(-TURBULENCE..TURBULENCE) * strength;
                self.velocity.y += rng.random_range(-TURBULENCE..TURBULENCE) * strength;
            }
            Gesture::None => {}
        }
    }

    // ── rendering ────────────────────────────────────────────────────────

    /// Draw at the particle's position and rotation. Leaves the surface's
    /// transform and style exactly as it found them.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.save();
        surface.translate(self.position.x, self.position.y);
        surface.rotate(self.rotation);
        surface.set_global_alpha(self.opacity);
        surface.set_fill_color(self.color);

        match self.shape {
            ParticleShape::Snowflake => self.draw_snowflake(surface),
            ParticleShape::Star      => self.draw_star(surface),
            ParticleShape::Bokeh     => {
                surface.begin_path();
                surface.arc(0.0, 0.0, self.size, 0.0, TAU);
                surface.fill();
            }
        }

        surface.restore();
    }

    fn draw_snowflake<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_line_width(1.0);
        surface.set_stroke_color(self.color);
        for _ in 0..SNOWFLAKE_ARMS {
            surface.begin_path();
            surface.move_to(0.0, 0.0);
            surface.line_to(0.0, self.size);
            surface.stroke();
            surface.rotate(FRAC_PI_3);
        }
    }

    fn draw_star<S: Surface + ?Sized>(&self, surface: &mut S) {
        let outer = self.size;
        let inner = self.size / 2.0;
        let step  = PI / STAR_SPIKES as f32;
        let mut angle = PI / 2.0 * 3.0;

        surface.begin_path();
        surface.move_to(0.0, -outer);
        for _ in 0..STAR_SPIKES {
            surface.line_to(angle.cos() * outer, angle.sin() * outer);
            angle += step;
            surface.line_to(angle.cos() * inner, angle.sin() * inner);
            angle += step;
        }
        surface.line_to(0.0, -outer);
        surface.close_path();
        surface.fill();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
