//! Minimal 3×5 bitmap font for the HUD.
//!
//! Each glyph is five octal digits, one per row, top first; within a digit
//! the high bit is the leftmost pixel. Lower-case input renders upper-case.

use crate::canvas::Canvas;
use snow_field::Color;

pub const GLYPH_W: usize = 3;
pub const GLYPH_H: usize = 5;

fn glyph(c: char) -> u16 {
    match c.to_ascii_uppercase() {
        'A' => 0o75755,
        'B' => 0o65656,
        'C' => 0o74447,
        'D' => 0o65556,
        'E' => 0o74747,
        'F' => 0o74744,
        'G' => 0o74557,
        'H' => 0o55755,
        'I' => 0o72227,
        'J' => 0o11157,
        'K' => 0o55655,
        'L' => 0o44447,
        'M' => 0o57555,
        'N' => 0o75555,
        'O' => 0o75557,
        'P' => 0o75744,
        'Q' => 0o75571,
        'R' => 0o65655,
        'S' => 0o74717,
        'T' => 0o72222,
        'U' => 0o55557,
        'V' => 0o55522,
        'W' => 0o55575,
        'X' => 0o55255,
        'Y' => 0o55722,
        'Z' => 0o71247,
        '0' => 0o75557,
        '1' => 0o26227,
        '2' => 0o71747,
        '3' => 0o71717,
        '4' => 0o55711,
        '5' => 0o74717,
        '6' => 0o74757,
        '7' => 0o71111,
        '8' => 0o75757,
        '9' => 0o75717,
        ' ' => 0o00000,
        '!' => 0o22202,
        '(' => 0o24442,
        ')' => 0o21112,
        '+' => 0o02720,
        ',' => 0o00024,
        '-' => 0o00700,
        '.' => 0o00002,
        '/' => 0o11244,
        ':' => 0o02020,
        '=' => 0o07070,
        '_' => 0o00007,
        _   => 0o00200, // unknown: centre dot
    }
}

fn lit(bits: u16, row: usize, col: usize) -> bool {
    let shift = (GLYPH_H - 1 - row) * GLYPH_W + (GLYPH_W - 1 - col);
    bits & (1 << shift) != 0
}

/// Pixel width of `text` at `scale`, including the one-column gaps.
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { (n * (GLYPH_W + 1) - 1) * scale }
}

/// Draw `text` with its top-left corner at `(x, y)`, each font pixel a
/// `scale × scale` block. Clipped to the canvas.
pub fn draw_label(canvas: &mut Canvas, text: &str, x: usize, y: usize, scale: usize, color: Color) {
    let scale = scale.max(1);
    let mut cx = x;
    for ch in text.chars() {
        if cx >= canvas.width() { break; }
        let bits = glyph(ch);
        for row in 0..GLYPH_H {
            for col in 0..GLYPH_W {
                if lit(bits, row, col) {
                    canvas.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                }
            }
        }
        cx += (GLYPH_W + 1) * scale;
    }
}
