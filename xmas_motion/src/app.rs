//! Top-level application: the scene each frame and the loop that drives it.
//!
//! `Scene` owns the particle field and the latest hand snapshot, steps the
//! physics and paints a frame (background, particles, hand overlay, HUD)
//! onto a [`Canvas`]. `run` wires it to a window and a hand source.

use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use log::{info, warn};
use snow_field::config::{XMAS_GOLD, XMAS_RED, XMAS_WHITE};
use snow_field::{Color, Gesture, HandState, ParticleSystem, SimConfig, Surface};

use crate::canvas::Canvas;
use crate::error::Result;
use crate::font::{draw_label, text_width};
use crate::gesture::{
    drain_latest, spawn_hand_source, HandUpdate, Recording, ReplayHandSource, SimHandSource,
    Viewport,
};
use crate::screenshot::save_screenshot;
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Look
// ════════════════════════════════════════════════════════════════════════════

pub const BACKGROUND: Color = Color::rgb(0x05, 0x1B, 0x11);

const INDICATOR_RADIUS: f32   = 10.0;
const RING_ALPHA:       f32   = 0.2;
const RING_DASH:        [f32; 2] = [5.0, 5.0];

const HUD_SCALE:        usize = 2;
const HUD_MARGIN:       usize = 12;
const HUD_TITLE:        Color = XMAS_RED;
const HUD_TEXT:         Color = Color::rgb(0xEE, 0xEE, 0xEE);
const HUD_DIM:          Color = Color::rgb(0x88, 0x88, 0x88);
const HUD_LIVE:         Color = Color::rgb(0x22, 0xC5, 0x5E);
const HUD_IDLE:         Color = Color::rgb(0xEF, 0x44, 0x44);

/// Frames a one-off notice (e.g. "saved screenshot") stays up.
const NOTICE_FRAMES:    u32   = 120;

/// Dot color under the hand.
pub fn indicator_color(gesture: Gesture) -> Color {
    match gesture {
        Gesture::Fist     => XMAS_RED,
        Gesture::OpenPalm => XMAS_GOLD,
        _                 => XMAS_WHITE,
    }
}

/// Dot at the hand plus a dashed ring at the interaction radius.
pub fn draw_hand_overlay<S: Surface + ?Sized>(surface: &mut S, hand: &HandState, ring_radius: f32) {
    let (x, y) = (hand.position.x, hand.position.y);
    surface.save();

    surface.begin_path();
    surface.arc(x, y, INDICATOR_RADIUS, 0.0, TAU);
    surface.set_fill_color(indicator_color(hand.gesture));
    surface.fill();

    surface.begin_path();
    surface.arc(x, y, ring_radius, 0.0, TAU);
    surface.set_stroke_color(XMAS_GOLD.with_alpha(RING_ALPHA));
    surface.set_line_width(1.0);
    surface.set_line_dash(&RING_DASH);
    surface.stroke();
    surface.set_line_dash(&[]);

    surface.restore();
}

/// Prompt shown at the bottom of the screen while no hand is in view.
pub fn hint_lines(hand: Option<&HandState>) -> &'static [&'static str] {
    match hand {
        Some(_) => &[],
        None    => &["RAISE YOUR HAND TO START!", "TRY FIST TO PULL, PALM TO PUSH"],
    }
}

/// Hand status line and, when a hand is present, what it is doing.
pub fn status_lines(hand: Option<&HandState>) -> (&'static str, Option<String>) {
    match hand {
        Some(h) => ("HAND DETECTED", Some(h.gesture.describe().to_uppercase())),
        None    => ("DETECTING HANDS...", None),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub particle_count: usize,
    pub width:          usize,
    pub height:         usize,
    pub sim:            SimConfig,
    /// Drive the hand from a landmark recording instead of the mouse.
    pub replay:         Option<PathBuf>,
    pub screenshot_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            particle_count: 1200,
            width:          1280,
            height:         720,
            sim:            SimConfig::default(),
            replay:         None,
            screenshot_dir: PathBuf::from("."),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FpsCounter
// ════════════════════════════════════════════════════════════════════════════

/// Frames per second, recomputed about once a second.
pub struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation:     Instant,
    fps:                      f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation:     Instant::now(),
            fps:                      0.0,
        }
    }

    /// Count one frame and return the latest estimate.
    pub fn tick(&mut self) -> f64 {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_calculation).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / elapsed;
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self { Self::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    field:  ParticleSystem,
    hand:   HandUpdate,
    fps:    f64,
    notice: Option<(String, u32)>,
}

impl Scene {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let field = ParticleSystem::new(
            cfg.particle_count,
            cfg.width as f32,
            cfg.height as f32,
            cfg.sim.clone(),
        )?;
        Ok(Scene { field, hand: None, fps: 0.0, notice: None })
    }

    pub fn field(&self) -> &ParticleSystem { &self.field }
    pub fn hand(&self)  -> HandUpdate      { self.hand }

    pub fn set_hand(&mut self, hand: HandUpdate) { self.hand = hand; }
    pub fn set_fps(&mut self, fps: f64)          { self.fps = fps; }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.field.resize(width as f32, height as f32);
    }

    /// Show a short message under the HUD for a couple of seconds.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some((message.into(), NOTICE_FRAMES));
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(m, _)| m.as_str())
    }

    // ── per-frame ────────────────────────────────────────────────────────

    pub fn step(&mut self) {
        self.field.update_with(self.hand.as_ref());

        self.notice = self.notice.take().and_then(|(message, frames)| {
            (frames > 1).then(|| (message, frames - 1))
        });
    }

    pub fn render(&self, canvas: &mut Canvas) {
        canvas.clear(BACKGROUND);
        self.field.draw(canvas);
        if let Some(hand) = &self.hand {
            draw_hand_overlay(canvas, hand, self.field.config().interaction_radius);
        }
        self.draw_hud(canvas);
    }

    fn draw_hud(&self, canvas: &mut Canvas) {
        let line_h = (crate::font::GLYPH_H + 3) * HUD_SCALE;
        let (x, mut y) = (HUD_MARGIN, HUD_MARGIN);

        draw_label(canvas, "XMAS MOTION", x, y, HUD_SCALE + 1, HUD_TITLE);
        y += line_h + HUD_SCALE * 3;

        let (status, action) = status_lines(self.hand.as_ref());
        let dot = if self.hand.is_some() { HUD_LIVE } else { HUD_IDLE };
        canvas.fill_rect(x, y, 3 * HUD_SCALE, 3 * HUD_SCALE, dot);
        draw_label(canvas, status, x + 5 * HUD_SCALE, y, HUD_SCALE, HUD_TEXT);
        y += line_h;

        if let Some(action) = action {
            draw_label(canvas, &action, x + 5 * HUD_SCALE, y, HUD_SCALE, XMAS_GOLD);
            y += line_h;
        }
        if let Some(notice) = self.notice() {
            draw_label(canvas, notice, x, y, HUD_SCALE, HUD_TEXT);
        }

        let fps = format!("FPS {:.1}", self.fps);
        let fx = canvas.width().saturating_sub(text_width(&fps, HUD_SCALE) + HUD_MARGIN);
        draw_label(canvas, &fps, fx, HUD_MARGIN, HUD_SCALE, HUD_DIM);

        let legend = "LMB/F=ATTRACT  RMB/O=REPEL  W=WAVE  P=SCREENSHOT  Q=QUIT";
        let ly = canvas.height().saturating_sub(HUD_MARGIN + crate::font::GLYPH_H * HUD_SCALE);
        draw_label(canvas, legend, HUD_MARGIN, ly, HUD_SCALE, HUD_DIM);

        // Centered hint block, above the legend.
        let hints = hint_lines(self.hand.as_ref());
        let mut hy = ly.saturating_sub(HUD_MARGIN + hints.len() * line_h);
        for (i, hint) in hints.iter().enumerate() {
            let (scale, color) = if i == 0 { (HUD_SCALE, HUD_TEXT) } else { (1, HUD_DIM) };
            let hx = canvas.width().saturating_sub(text_width(hint, scale)) / 2;
            draw_label(canvas, hint, hx, hy, scale, color);
            hy += line_h;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the window, starts the hand source (mouse simulation, or a replay
/// when `cfg.replay` is set) and drives update → draw → present at ~60 fps
/// until the window closes. Nothing is updated or drawn after that.
pub fn run(cfg: AppConfig) -> Result<()> {
    // Bad dimensions or tuning fail here, before any window exists.
    let mut scene = Scene::new(&cfg)?;
    let viewport  = Viewport::new(cfg.width as f32, cfg.height as f32);

    // ── Hand source ───────────────────────────────────────────────────────
    let (sim_tx, hand_rx) = match &cfg.replay {
        Some(path) => {
            let recording = Recording::load(path)?;
            let rx = spawn_hand_source(ReplayHandSource { recording, viewport: viewport.clone() });
            (None, rx)
        }
        None => {
            let (tx, rx) = mpsc::channel();
            (Some(tx), spawn_hand_source(SimHandSource { rx }))
        }
    };

    // ── Window, canvas ───────────────────────────────────────────────────
    let mut vis    = Visualizer::new(cfg.width, cfg.height, sim_tx)?;
    let mut canvas = Canvas::new(cfg.width, cfg.height);
    let mut fps    = FpsCounter::new();
    let mut source_alive = true;

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Keyboard + pointer
        let input = vis.poll_input();
        if input.quit { break; }

        // 2. Follow window resizes
        let (w, h) = vis.size();
        if w > 0 && h > 0 && (w, h) != (canvas.width(), canvas.height()) {
            canvas.resize(w, h);
            scene.resize(w, h);
            viewport.set(w as f32, h as f32);
        }

        // 3. Latest hand snapshot (stale is fine)
        let mut hand = scene.hand();
        if !drain_latest(&hand_rx, &mut hand) && source_alive {
            warn!("hand source stopped; keeping last hand state");
            source_alive = false;
        }
        scene.set_hand(hand);

        // 4. Physics, then paint
        scene.step();
        scene.set_fps(fps.tick());
        scene.render(&mut canvas);

        if input.screenshot {
            match save_screenshot(&canvas, &cfg.screenshot_dir) {
                Ok(path) => {
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    scene.notify(format!("SAVED {}", name));
                }
                Err(e) => {
                    warn!("screenshot failed: {}", e);
                    scene.notify("SCREENSHOT FAILED");
                }
            }
        }

        // 5. Present
        vis.present(&canvas)?;
    }

    info!("window closed; render loop stopped");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use snow_field::Vec2;

    fn cfg(count: usize) -> AppConfig {
        AppConfig {
            particle_count: count,
            width:          320,
            height:         240,
            sim:            SimConfig::default().with_seed(42),
            ..AppConfig::default()
        }
    }

    fn render(scene: &Scene) -> Canvas {
        let mut canvas = Canvas::new(320, 240);
        scene.render(&mut canvas);
        canvas
    }

    #[test]
    fn bad_dimensions_surface_as_error() {
        let bad = AppConfig { width: 0, ..cfg(10) };
        assert!(matches!(Scene::new(&bad), Err(crate::AppError::Simulation(_))));
    }

    #[test]
    fn empty_scene_is_background() {
        let scene = Scene::new(&cfg(0)).unwrap();
        let canvas = render(&scene);
        assert_eq!(canvas.pixel(160, 120), Some(BACKGROUND));
        assert_eq!(canvas.pixel(319, 100), Some(BACKGROUND));
    }

    #[test]
    fn particles_paint_over_background() {
        let painted = |count| {
            let canvas = render(&Scene::new(&cfg(count)).unwrap());
            canvas.pixels().iter().filter(|&&p| p != BACKGROUND.0).count()
        };
        let (empty, full) = (painted(0), painted(400));
        assert!(full > empty + 400, "{} vs {}", full, empty);
    }

    #[test]
    fn hand_overlay_dot_and_ring() {
        let mut scene = Scene::new(&cfg(0)).unwrap();
        scene.set_hand(Some(HandState::new(Vec2::new(160.0, 120.0), Gesture::Fist)));
        let canvas = render(&scene);
        assert_eq!(canvas.pixel(160, 120), Some(XMAS_RED));

        // Ring at radius 150 clips the canvas; count faint gold pixels on
        // the visible arc at the top of the circle.
        let ring: usize = (0..320).filter(|&x| {
            let dx = x as f32 + 0.5 - 160.0;
            let dy2 = 150.0_f32 * 150.0 - dx * dx;
            if dy2 < 0.0 { return false; }
            let y = (120.0 + dy2.sqrt()).round() as usize;
            (y.saturating_sub(1)..=y + 1).any(|yy| {
                canvas.pixel(x, yy).is_some_and(|p| p != BACKGROUND)
            })
        }).count();
        assert!(ring > 20, "{}", ring);
    }

    #[test]
    fn huge_ring_renders_quickly() {
        let mut canvas = Canvas::new(320, 240);
        let hand = HandState::new(Vec2::new(160.0, 120.0), Gesture::OpenPalm);
        let started = Instant::now();
        draw_hand_overlay(&mut canvas, &hand, 1.0e7);
        assert!(started.elapsed() < std::time::Duration::from_millis(100), "{:?}", started.elapsed());
        assert_eq!(canvas.pixel(160, 120), Some(XMAS_GOLD));
    }

    #[test]
    fn bad_dimensions_fail_before_window() {
        let bad = AppConfig { width: 0, ..cfg(10) };
        assert!(matches!(run(bad), Err(crate::AppError::Simulation(_))));
    }

    #[test]
    fn hint_only_without_hand() {
        assert_eq!(hint_lines(None).len(), 2);
        assert_eq!(hint_lines(None)[0], "RAISE YOUR HAND TO START!");
        let h = HandState::new(Vec2::ZERO, Gesture::Fist);
        assert!(hint_lines(Some(&h)).is_empty());

        // The hint row sits centered just above the legend.
        let hint_row = |scene: &Scene| {
            let canvas = render(scene);
            let ly = 240 - HUD_MARGIN - crate::font::GLYPH_H * HUD_SCALE;
            let top = ly - HUD_MARGIN - 2 * (crate::font::GLYPH_H + 3) * HUD_SCALE;
            (top..top + crate::font::GLYPH_H * HUD_SCALE)
                .flat_map(|y| (0..320).map(move |x| (x, y)))
                .filter(|&(x, y)| canvas.pixel(x, y) != Some(BACKGROUND))
                .count()
        };
        let mut scene = Scene::new(&cfg(0)).unwrap();
        assert!(hint_row(&scene) > 0);
        scene.set_hand(Some(HandState::new(Vec2::new(-500.0, -500.0), Gesture::None)));
        assert_eq!(hint_row(&scene), 0);
    }

    #[test]
    fn indicator_colors_follow_gesture() {
        assert_eq!(indicator_color(Gesture::Fist), XMAS_RED);
        assert_eq!(indicator_color(Gesture::OpenPalm), XMAS_GOLD);
        assert_eq!(indicator_color(Gesture::Wave), XMAS_WHITE);
        assert_eq!(indicator_color(Gesture::None), XMAS_WHITE);
    }

    #[test]
    fn status_text() {
        assert_eq!(status_lines(None), ("DETECTING HANDS...", None));
        let h = HandState::new(Vec2::ZERO, Gesture::OpenPalm);
        assert_eq!(status_lines(Some(&h)), ("HAND DETECTED", Some("REPELLING (PALM)".to_string())));
    }

    #[test]
    fn step_applies_hand() {
        let mut with_hand = Scene::new(&cfg(200)).unwrap();
        let mut without   = Scene::new(&cfg(200)).unwrap();
        with_hand.set_hand(Some(HandState::new(Vec2::new(160.0, 120.0), Gesture::OpenPalm)));
        for _ in 0..5 {
            with_hand.step();
            without.step();
        }
        assert_ne!(with_hand.field().particles(), without.field().particles());
        assert_eq!(with_hand.field().len(), 200);
    }

    #[test]
    fn resize_reaches_field() {
        let mut scene = Scene::new(&cfg(10)).unwrap();
        scene.resize(640, 480);
        assert_eq!((scene.field().width(), scene.field().height()), (640.0, 480.0));
    }

    #[test]
    fn notice_expires() {
        let mut scene = Scene::new(&cfg(0)).unwrap();
        scene.notify("SAVED X.PNG");
        assert_eq!(scene.notice(), Some("SAVED X.PNG"));
        for _ in 0..NOTICE_FRAMES { scene.step(); }
        assert_eq!(scene.notice(), None);
    }

    #[test]
    fn fps_counter_starts_at_zero() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.tick(), 0.0);
    }
}
