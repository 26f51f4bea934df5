//! Software canvas: an ARGB frame buffer behind the [`Surface`] trait.
//!
//! Paths are flattened to device-space polylines as they are built (arcs
//! are subdivided according to their on-screen radius), so `fill` and
//! `stroke` only ever see straight edges.
//!
//! * `fill`: scanline fill at pixel centres, non-zero winding, every open
//!   subpath implicitly closed.
//! * `stroke`: Bresenham per segment, square pen for widths above one
//!   pixel, dash pattern carried across the segments of a subpath.
//!
//! Everything is composited source-over with `fill/stroke alpha × global
//! alpha`. No anti-aliasing.

use std::f32::consts::TAU;

use glam::{Affine2, Vec2};
use snow_field::{Color, Surface};

// ════════════════════════════════════════════════════════════════════════════
// Drawing state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
struct DrawState {
    transform:    Affine2,
    global_alpha: f32,
    fill:         Color,
    stroke:       Color,
    line_width:   f32,
    dash:         Vec<f32>,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            transform:    Affine2::IDENTITY,
            global_alpha: 1.0,
            fill:         Color::BLACK,
            stroke:       Color::BLACK,
            line_width:   1.0,
            dash:         Vec::new(),
        }
    }
}

impl DrawState {
    /// Rough device-pixels-per-unit of the current transform.
    fn scale(&self) -> f32 {
        let m = self.transform.matrix2;
        m.x_axis.length().max(m.y_axis.length())
    }
}

#[derive(Clone, Debug, Default)]
struct SubPath {
    points: Vec<Vec2>,
    closed: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,

    state:  DrawState,
    stack:  Vec<DrawState>,
    path:   Vec<SubPath>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            buf:   vec![Color::BLACK.0; width * height],
            state: DrawState::default(),
            stack: Vec::new(),
            path:  Vec::new(),
        }
    }

    /// Reallocate for new dimensions. Contents and drawing state are reset.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width  = width;
        self.height = height;
        self.buf    = vec![Color::BLACK.0; width * height];
        self.state  = DrawState::default();
        self.stack.clear();
        self.path.clear();
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// Raw `0xAARRGGBB` pixels, row-major, as `minifb` expects them.
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color(self.buf[y * self.width + x]))
        } else {
            None
        }
    }

    /// Pixels as tightly packed RGBA bytes, for image export.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buf.len() * 4);
        for &px in &self.buf {
            let c = Color(px);
            out.extend_from_slice(&[c.r(), c.g(), c.b(), c.a()]);
        }
        out
    }

    /// Overwrite every pixel. Ignores transform and alpha.
    pub fn clear(&mut self, color: Color) {
        self.buf.fill(color.0);
    }

    /// Opaque axis-aligned rectangle in device pixels, clipped.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Color) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color.0;
            }
        }
    }

    /// Composite `color` (its own alpha times `alpha`) over one pixel.
    fn blend_pixel(&mut self, x: isize, y: isize, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let t = (color.a() as f32 / 255.0) * alpha;
        if t <= 0.0 {
            return;
        }
        let i = y as usize * self.width + x as usize;
        self.buf[i] = blend(self.buf[i], color.0, t);
    }

    // ── path bookkeeping ─────────────────────────────────────────────────

    fn current(&mut self) -> Option<&mut SubPath> {
        self.path.last_mut().filter(|sp| !sp.closed)
    }

    fn push_point(&mut self, p: Vec2) {
        match self.current() {
            Some(sp) => sp.points.push(p),
            None     => self.path.push(SubPath { points: vec![p], closed: false }),
        }
    }

    // ── fill ─────────────────────────────────────────────────────────────

    fn fill_path(&mut self) {
        let mut edges: Vec<(Vec2, Vec2)> = Vec::new();
        for sp in &self.path {
            if sp.points.len() < 3 { continue; }
            for w in sp.points.windows(2) {
                edges.push((w[0], w[1]));
            }
            let (first, last) = (sp.points[0], sp.points[sp.points.len() - 1]);
            if first != last {
                edges.push((last, first));
            }
        }
        if edges.is_empty() {
            return;
        }

        let (mut y_min, mut y_max) = (f32::INFINITY, f32::NEG_INFINITY);
        for &(a, b) in &edges {
            y_min = y_min.min(a.y).min(b.y);
            y_max = y_max.max(a.y).max(b.y);
        }
        let row_start = (y_min - 0.5).ceil().max(0.0) as isize;
        let row_end   = ((y_max - 0.5).floor() as isize).min(self.height as isize - 1);

        let color = self.state.fill;
        let alpha = self.state.global_alpha;
        let mut crossings: Vec<(f32, i32)> = Vec::new();

        for row in row_start..=row_end {
            let sy = row as f32 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                if a.y == b.y { continue; }
                let (dir, lo, hi) = if a.y < b.y { (1, a, b) } else { (-1, b, a) };
                if sy < lo.y || sy >= hi.y { continue; }
                let x = lo.x + (sy - lo.y) / (hi.y - lo.y) * (hi.x - lo.x);
                crossings.push((x, dir));
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 { continue; }
                let x0 = (pair[0].0 - 0.5).ceil() as isize;
                let x1 = (pair[1].0 - 0.5).ceil() as isize;
                for col in x0.max(0)..x1.min(self.width as isize) {
                    self.blend_pixel(col, row, color, alpha);
                }
            }
        }
    }

    // ── stroke ───────────────────────────────────────────────────────────

    fn stroke_path(&mut self) {
        let scale = self.state.scale();
        let pen   = (self.state.line_width * scale).round().max(1.0) as isize;
        let dash: Vec<f32> = self.state.dash.iter().map(|d| d * scale).collect();
        let color = self.state.stroke;
        let alpha = self.state.global_alpha;

        // Only the part of a segment that can touch a pixel is rasterised.
        let margin = pen as f32 + 1.0;
        let lo = Vec2::splat(-margin);
        let hi = Vec2::new(self.width as f32 + margin, self.height as f32 + margin);

        let path = std::mem::take(&mut self.path);
        for sp in &path {
            let mut segments: Vec<(Vec2, Vec2)> =
                sp.points.windows(2).map(|w| (w[0], w[1])).collect();
            if sp.closed && sp.points.len() > 2 {
                segments.push((sp.points[sp.points.len() - 1], sp.points[0]));
            }

            let mut travelled = 0.0;
            for (a, b) in segments {
                let len = a.distance(b);
                if let Some((t0, t1)) = clip_segment(a, b, lo, hi) {
                    let start = travelled + t0 * len;
                    let span  = (t1 - t0) * len;
                    line(a.lerp(b, t0), a.lerp(b, t1), |x, y, t| {
                        if dash_on(&dash, start + t * span) {
                            self.stamp(x, y, pen, color, alpha);
                        }
                    });
                }
                travelled += len;
            }
        }
        self.path = path;
    }

    fn stamp(&mut self, x: isize, y: isize, pen: isize, color: Color, alpha: f32) {
        let lo = -(pen - 1) / 2;
        for dy in lo..lo + pen {
            for dx in lo..lo + pen {
                self.blend_pixel(x + dx, y + dy, color, alpha);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Surface
// ════════════════════════════════════════════════════════════════════════════

impl Surface for Canvas {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill_color(&mut self, color: Color)   { self.state.fill = color; }
    fn set_stroke_color(&mut self, color: Color) { self.state.stroke = color; }
    fn set_line_width(&mut self, width: f32)     { self.state.line_width = width.max(0.0); }

    fn set_line_dash(&mut self, segments: &[f32]) {
        // An odd-length pattern is repeated to make it even.
        let mut dash = segments.to_vec();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(segments);
        }
        self.state.dash = dash;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.state.transform.transform_point2(Vec2::new(x, y));
        self.path.push(SubPath { points: vec![p], closed: false });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.state.transform.transform_point2(Vec2::new(x, y));
        self.push_point(p);
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        let sweep = (end - start).clamp(-TAU, TAU);
        let device_r = radius * self.state.scale();
        let steps = ((device_r * sweep.abs()).ceil() as usize).clamp(8, 512);
        for i in 0..=steps {
            let a = start + sweep * i as f32 / steps as f32;
            let p = Vec2::new(cx, cy) + Vec2::from_angle(a) * radius;
            let p = self.state.transform.transform_point2(p);
            self.push_point(p);
        }
    }

    fn close_path(&mut self) {
        if let Some(sp) = self.current() {
            sp.closed = true;
            let start = sp.points[0];
            self.path.push(SubPath { points: vec![start], closed: false });
        }
    }

    fn fill(&mut self)   { self.fill_path(); }
    fn stroke(&mut self) { self.stroke_path(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Raster helpers
// ════════════════════════════════════════════════════════════════════════════

/// Bresenham from `a` to `b`. `plot` gets each pixel and how far along the
/// segment it is, `0.0..=1.0`.
fn line(a: Vec2, b: Vec2, mut plot: impl FnMut(isize, isize, f32)) {
    let (mut x0, mut y0) = (a.x.round() as isize, a.y.round() as isize);
    let (x1, y1)         = (b.x.round() as isize, b.y.round() as isize);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let total = dx.max(-dy).max(1) as f32;
    let mut err = dx + dy;
    let mut step = 0;

    loop {
        plot(x0, y0, step as f32 / total);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1;
    }
}

/// Liang–Barsky: the stretch of `a → b` inside the box `lo..=hi`, as
/// parameters `(t0, t1)` along the segment. `None` when it misses the box.
fn clip_segment(a: Vec2, b: Vec2, lo: Vec2, hi: Vec2) -> Option<(f32, f32)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    for (p, q) in [
        (-d.x, a.x - lo.x),
        ( d.x, hi.x - a.x),
        (-d.y, a.y - lo.y),
        ( d.y, hi.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 { return None; }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 { return None; }
                t0 = t0.max(r);
            } else {
                if r < t0 { return None; }
                t1 = t1.min(r);
            }
        }
    }
    Some((t0, t1))
}

/// Whether the pen is down `distance` pixels into a dash pattern.
fn dash_on(pattern: &[f32], distance: f32) -> bool {
    let period: f32 = pattern.iter().sum();
    if pattern.is_empty() || period <= 0.0 {
        return true;
    }
    let mut d = distance.rem_euclid(period);
    for (i, len) in pattern.iter().enumerate() {
        if d < *len {
            return i % 2 == 0;
        }
        d -= len;
    }
    true
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `dst`, `t` = 1.0 → all `src`.
/// The result is always opaque.
fn blend(dst: u32, src: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let d = ((dst >> shift) & 0xFF) as f32;
        let s = ((src >> shift) & 0xFF) as f32;
        ((d * (1.0 - t) + s * t).round() as u32).min(255)
    };
    0xFF000000 | mix(16) << 16 | mix(8) << 8 | mix(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
