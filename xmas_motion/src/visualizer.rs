//! The window: `minifb` framebuffer, pointer/keyboard polling, presentation.
//!
//! Drawing happens on a [`Canvas`]; this type only moves pixels to the
//! screen and turns raw input into [`SimInput`] for the simulated hand.
//!
//! | Input | Meaning |
//! |---|---|
//! | Mouse position | Hand position |
//! | Left button / `F` | Fist (attract) |
//! | Right button / `O` | Open palm (repel) |
//! | `W` held | Wave (turbulence) |
//! | `P` | Screenshot |
//! | `Q` / `Escape` | Quit |

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::Vec2;
use log::info;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

use crate::canvas::Canvas;
use crate::error::Result;
use crate::gesture::SimInput;

pub const TITLE: &str = "XmasMotion";

/// Frame-level requests from the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub quit:       bool,
    pub screenshot: bool,
}

pub struct Visualizer {
    window:     Window,
    /// `None` when hand input comes from somewhere other than the mouse.
    sim_tx:     Option<Sender<SimInput>>,
    last_input: Option<SimInput>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            width, height,
            WindowOptions {
                resize:     true,
                scale_mode: ScaleMode::UpperLeft,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_micros(16_600))); // ~60fps
        info!("opened {}x{} window", width, height);

        Ok(Visualizer { window, sim_tx, last_input: None })
    }

    /// Returns false once the window has been closed.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Current client-area size in pixels.
    pub fn size(&self) -> (usize, usize) { self.window.get_size() }

    /// Read pointer and keys. Pointer state goes to the simulated hand
    /// (only when it changed); quit/screenshot requests are returned.
    pub fn poll_input(&mut self) -> FrameInput {
        if !self.window.is_open() {
            return FrameInput { quit: true, screenshot: false };
        }

        let quit = self.window.is_key_pressed(Key::Q, KeyRepeat::No)
                || self.window.is_key_pressed(Key::Escape, KeyRepeat::No);
        let screenshot = self.window.is_key_pressed(Key::P, KeyRepeat::No);

        if let Some(tx) = &self.sim_tx {
            let input = SimInput {
                pointer: self.window
                    .get_mouse_pos(MouseMode::Discard)
                    .map(|(x, y)| Vec2::new(x, y)),
                attract: self.window.get_mouse_down(MouseButton::Left)
                      || self.window.is_key_down(Key::F),
                repel:   self.window.get_mouse_down(MouseButton::Right)
                      || self.window.is_key_down(Key::O),
                wave:    self.window.is_key_down(Key::W),
            };
            if self.last_input != Some(input) {
                let _ = tx.send(input);
                self.last_input = Some(input);
            }
        }

        FrameInput { quit, screenshot }
    }

    /// Push a finished frame to the screen.
    pub fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.window.update_with_buffer(canvas.pixels(), canvas.width(), canvas.height())?;
        Ok(())
    }
}
