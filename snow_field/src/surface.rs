//! The 2D drawing surface particles render into.
//!
//! Modeled on an immediate-mode canvas: a transform/style stack, a current
//! path, and `fill`/`stroke` to commit it. The field only ever draws through
//! this trait, so a software frame buffer, a GPU backend or a test recorder
//! can sit behind it.

// ════════════════════════════════════════════════════════════════════════════
// Color
// ════════════════════════════════════════════════════════════════════════════

/// Packed `0xAARRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF000000);
    pub const WHITE: Color = Color(0xFFFFFFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF000000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Same color with alpha set from a `0.0..=1.0` fraction.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        Color((self.0 & 0x00FFFFFF) | a << 24)
    }

    pub const fn a(self) -> u8 { (self.0 >> 24) as u8 }
    pub const fn r(self) -> u8 { (self.0 >> 16) as u8 }
    pub const fn g(self) -> u8 { (self.0 >>  8) as u8 }
    pub const fn b(self) -> u8 {  self.0        as u8 }
}

// ════════════════════════════════════════════════════════════════════════════
// Surface
// ════════════════════════════════════════════════════════════════════════════

/// Canvas-style drawing target.
///
/// `save`/`restore` bracket every change a caller makes to the transform,
/// alpha, colors, line width and dash pattern. Path commands are in the
/// current user space; implementations apply the transform.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);
    /// Rotate user space clockwise (y down) by `angle` radians.
    fn rotate(&mut self, angle: f32);

    fn set_global_alpha(&mut self, alpha: f32);
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    /// Alternating on/off lengths. An empty slice means a solid line.
    fn set_line_dash(&mut self, segments: &[f32]);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Circular arc around `(cx, cy)` from `start` to `end` radians.
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);

    fn fill(&mut self);
    fn stroke(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Recorder: test double
// ════════════════════════════════════════════════════════════════════════════


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_packs_opaque() {
        let c = Color::rgb(0xFF, 0xD7, 0x00);
        assert_eq!(c.0, 0xFFFFD700);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0xFF, 0xFF, 0xD7, 0x00));
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color::rgb(0xFF, 0xD7, 0x00).with_alpha(0.2);
        assert_eq!(c.0 & 0x00FFFFFF, 0x00FFD700);
        assert_eq!(c.a(), 51);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(3.0).a(), 255);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a(), 0);
    }
}
