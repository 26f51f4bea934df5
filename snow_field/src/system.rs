//! The particle field as a whole.
//!
//! `ParticleSystem` owns every particle, the canvas bounds, the physics
//! constants and the random source. Particles never look at each other, so
//! update order has no observable effect; both passes run in insertion order
//! so draws are reproducible for a given seed.

use glam::Vec2;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimConfig;
use crate::error::{Error, Result};
use crate::hand::{Gesture, HandState};
use crate::particle::Particle;
use crate::surface::Surface;

fn valid_extent(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleSystem
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    width:     f32,
    height:    f32,
    config:    SimConfig,
    rng:       StdRng,
}

impl ParticleSystem {
    /// Build `count` particles scattered over a `width × height` canvas.
    ///
    /// Fails if either dimension is not a positive finite number, or if the
    /// config does not validate.
    pub fn new(count: usize, width: f32, height: f32, config: SimConfig) -> Result<Self> {
        if !valid_extent(width, height) {
            return Err(Error::InvalidDimensions { width, height });
        }
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_os_rng(),
        };
        let particles = (0..count)
            .map(|_| Particle::new(width, height, &config, &mut rng))
            .collect();

        info!(
            "particle field: {} particles on {}x{} (radius {}, seed {:?})",
            count, width, height, config.interaction_radius, config.seed
        );

        Ok(ParticleSystem { particles, width, height, config, rng })
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Step every particle one frame under the given hand input.
    pub fn update(&mut self, hand_pos: Option<Vec2>, gesture: Gesture) {
        let (width, height) = (self.width, self.height);
        for p in &mut self.particles {
            p.update(width, height, hand_pos, gesture, &self.config, &mut self.rng);
        }
    }

    /// Same as [`update`](Self::update), taking the hand as one value.
    pub fn update_with(&mut self, hand: Option<&HandState>) {
        let (pos, gesture) = HandState::split(hand);
        self.update(pos, gesture);
    }

    /// Paint every particle, later ones over earlier ones.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        for p in &self.particles {
            p.draw(surface);
        }
    }

    /// Adopt new canvas bounds. Particles are left where they are; any that
    /// now sit outside are corrected by their next boundary check.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !valid_extent(width, height) {
            warn!("ignoring resize to {}x{}", width, height);
            return;
        }
        if (width, height) != (self.width, self.height) {
            debug!("particle field resized {}x{} -> {}x{}", self.width, self.height, width, height);
        }
        self.width  = width;
        self.height = height;
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn len(&self)        -> usize      { self.particles.len() }
    pub fn is_empty(&self)   -> bool       { self.particles.is_empty() }
    pub fn width(&self)      -> f32        { self.width }
    pub fn height(&self)     -> f32        { self.height }
    pub fn config(&self)     -> &SimConfig { &self.config }
    pub fn particles(&self)  -> &[Particle] { &self.particles }

    /// Mutable access for forcing kinematic state. The slice cannot grow or
    /// shrink, so the population stays fixed.
    pub fn particles_mut(&mut self) -> &mut [Particle] { &mut self.particles }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::RESPAWN_Y;
    use crate::surface::recording::{Op, Recorder};
    use proptest::prelude::*;

    fn seeded(count: usize, w: f32, h: f32, seed: u64) -> ParticleSystem {
        ParticleSystem::new(count, w, h, SimConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn rejects_bad_dimensions() {
        for (w, h) in [(0.0, 100.0), (100.0, 0.0), (-1.0, 5.0), (f32::NAN, 5.0), (5.0, f32::INFINITY)] {
            let err = ParticleSystem::new(10, w, h, SimConfig::default()).unwrap_err();
            assert!(matches!(err, Error::InvalidDimensions { .. }), "{}x{}", w, h);
        }
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = SimConfig { friction: 1.5, ..SimConfig::default() };
        assert!(matches!(ParticleSystem::new(10, 100.0, 100.0, cfg), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn count_is_fixed() {
        let mut sys = seeded(1200, 640.0, 480.0, 1);
        assert_eq!(sys.len(), 1200);
        let hand = HandState::new(Vec2::new(320.0, 240.0), Gesture::Wave);
        for _ in 0..50 { sys.update_with(Some(&hand)); }
        sys.resize(200.0, 200.0);
        for _ in 0..50 { sys.update(None, Gesture::None); }
        assert_eq!(sys.len(), 1200);
        assert!(!sys.is_empty());
    }

    #[test]
    fn empty_system_is_fine() {
        let mut sys = seeded(0, 10.0, 10.0, 1);
        sys.update(None, Gesture::Fist);
        let mut rec = Recorder::default();
        sys.draw(&mut rec);
        assert!(sys.is_empty());
        assert!(rec.ops.is_empty());
    }

    #[test]
    fn same_seed_same_field() {
        let a = seeded(100, 300.0, 300.0, 99);
        let b = seeded(100, 300.0, 300.0, 99);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn respawn_exactly_at_threshold() {
        let mut sys = seeded(1, 100.0, 100.0, 3);
        sys.particles_mut()[0].set_position(Vec2::new(50.0, 99.0));
        sys.particles_mut()[0].set_velocity(Vec2::new(0.0, 5.0));
        sys.update(None, Gesture::None);

        let p = &sys.particles()[0];
        assert_eq!(p.position().y, RESPAWN_Y);
        assert!(p.position().y <= RESPAWN_Y + p.velocity().y);
        assert!((1.0..3.0).contains(&p.velocity().y));
    }

    #[test]
    fn wraps_left_edge_to_width() {
        let mut sys = seeded(1, 100.0, 100.0, 3);
        sys.particles_mut()[0].set_position(Vec2::new(-5.0, 20.0));
        sys.update(None, Gesture::None);
        assert_eq!(sys.particles()[0].position().x, 100.0);
    }

    #[test]
    fn vy_converges_without_hand() {
        let mut sys = seeded(1, 1000.0, 1.0e9, 5);
        sys.particles_mut()[0].set_position(Vec2::new(500.0, 0.0));
        sys.particles_mut()[0].set_velocity(Vec2::new(0.0, 40.0));
        for _ in 0..1000 { sys.update(None, Gesture::None); }
        let terminal = sys.config().terminal_velocity();
        let vy = sys.particles()[0].velocity().y;
        assert!((vy - terminal).abs() < 1e-3, "vy {} terminal {}", vy, terminal);
    }

    #[test]
    fn absent_hand_matches_neutral_gesture() {
        let mut a = seeded(200, 400.0, 300.0, 11);
        let mut b = seeded(200, 400.0, 300.0, 11);
        let neutral = HandState::new(Vec2::new(200.0, 150.0), Gesture::None);
        for _ in 0..500 {
            a.update_with(None);
            b.update_with(Some(&neutral));
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn resize_is_idempotent() {
        let mut once  = seeded(300, 400.0, 300.0, 21);
        let mut twice = seeded(300, 400.0, 300.0, 21);
        once.resize(250.0, 180.0);
        twice.resize(250.0, 180.0);
        twice.resize(250.0, 180.0);
        for _ in 0..200 {
            once.update(None, Gesture::None);
            twice.update(None, Gesture::None);
        }
        assert_eq!(once.particles(), twice.particles());
        assert_eq!((twice.width(), twice.height()), (250.0, 180.0));
    }

    #[test]
    fn resize_does_not_move_particles() {
        let mut sys = seeded(50, 400.0, 300.0, 8);
        let before: Vec<_> = sys.particles().iter().map(|p| p.position()).collect();
        sys.resize(50.0, 50.0);
        let after: Vec<_> = sys.particles().iter().map(|p| p.position()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn resize_ignores_non_positive() {
        let mut sys = seeded(1, 400.0, 300.0, 8);
        sys.resize(0.0, -3.0);
        assert_eq!((sys.width(), sys.height()), (400.0, 300.0));
    }

    #[test]
    fn draw_visits_in_insertion_order() {
        let sys = seeded(25, 400.0, 300.0, 4);
        let mut rec = Recorder::default();
        sys.draw(&mut rec);
        let translated: Vec<Vec2> = rec.ops.iter().filter_map(|op| match op {
            Op::Translate(x, y) => Some(Vec2::new(*x, *y)),
            _ => None,
        }).collect();
        let expected: Vec<Vec2> = sys.particles().iter().map(|p| p.position()).collect();
        assert_eq!(translated, expected);
        assert!(rec.balanced());
    }

    proptest! {
        #[test]
        fn stays_inside_bounds(
            seed   in any::<u64>(),
            frames in 1usize..300,
            w      in 20.0f32..800.0,
            h      in 20.0f32..800.0,
            hx     in -100.0f32..900.0,
            hy     in -100.0f32..900.0,
            g      in 0usize..4,
        ) {
            let mut sys = seeded(40, w, h, seed);
            let hand = HandState::new(Vec2::new(hx, hy), Gesture::ALL[g]);
            for _ in 0..frames {
                sys.update_with(Some(&hand));
                for p in sys.particles() {
                    let pos = p.position();
                    prop_assert!(pos.x >= 0.0 && pos.x <= w, "x {} outside 0..={}", pos.x, w);
                    prop_assert!(pos.y <= h, "y {} below {}", pos.y, h);
                }
            }
        }

        #[test]
        fn velocity_stays_bounded(seed in any::<u64>(), vy0 in -50.0f32..50.0) {
            let mut sys = seeded(1, 500.0, 1.0e9, seed);
            sys.particles_mut()[0].set_position(Vec2::new(250.0, 0.0));
            sys.particles_mut()[0].set_velocity(Vec2::new(0.0, vy0));
            let terminal = sys.config().terminal_velocity();
            for _ in 0..400 {
                sys.update(None, Gesture::None);
                let vy = sys.particles()[0].velocity().y;
                prop_assert!(vy.abs() <= vy0.abs().max(terminal) + 0.1);
            }
        }
    }
}
