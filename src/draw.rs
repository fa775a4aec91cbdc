// Window + software drawing utilities.
// Provided here:
// 1) A window that shows the annotated camera image.
// 2) Raster primitives for strokes, buttons and fingertip markers.
// 3) A tiny 5x7 bitmap font for labels, status line and HUD.

use crate::error::Error;
use crate::hands::PointerSample;
use crate::palette::{self, BLACK};
use crate::types::FrameBuffer;
use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Keep the window responsive on ticks where there is no new frame to show.
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Escape is the terminal key.
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Pointer position and buttons, for the pointer-driven hand.
    pub fn pointer(&self) -> PointerSample {
        PointerSample {
            position: self.window.get_mouse_pos(MouseMode::Discard),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
        }
    }
}

/* ---------- Software drawing: pixels, segments, circles ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Clipped bounding box `[x0, x1] x [y0, y1]`, or None if it misses the buffer.
fn clip_box(fb: &FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32, i32, i32)> {
    let (x0, y0) = (x0.max(0), y0.max(0));
    let (x1, y1) = (x1.min(fb.width as i32 - 1), y1.min(fb.height as i32 - 1));
    (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
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
    }
}

/// Draw a thick segment with round caps: every pixel whose center lies within
/// `thickness / 2` of the segment. Equal endpoints give a round dot.
/// Thicknesses under 2 fall back to a connected 1-pixel line.
pub fn draw_thick_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, thickness: u32, color: u32) {
    let r = (thickness / 2) as i32;
    if r == 0 {
        if thickness > 0 {
            draw_line(fb, x0, y0, x1, y1, color);
        }
        return;
    }
    let Some((bx0, by0, bx1, by1)) = clip_box(fb, x0.min(x1) - r, y0.min(y1) - r, x0.max(x1) + r, y0.max(y1) + r)
    else {
        return;
    };

    let (dx, dy) = ((x1 - x0) as f32, (y1 - y0) as f32);
    let len2 = dx * dx + dy * dy;
    let r2 = (r * r) as f32;

    for y in by0..=by1 {
        for x in bx0..=bx1 {
            let (px, py) = ((x - x0) as f32, (y - y0) as f32);
            // projection of the pixel onto the segment, clamped to the endpoints
            let t = if len2 > 0.0 { ((px * dx + py * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
            let (ex, ey) = (px - t * dx, py - t * dy);
            if ex * ex + ey * ey <= r2 {
                fb.pixels[y as usize * fb.width + x as usize] = color;
            }
        }
    }
}

/// Filled disc: pixels with `dx^2 + dy^2 <= radius^2`.
pub fn fill_circle(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    blend_circle(fb, cx, cy, radius, color, 1.0);
}

/// Filled disc mixed over the existing pixels at `opacity` (1.0 = opaque).
pub fn blend_circle(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32, opacity: f32) {
    if radius < 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip_box(fb, cx - radius, cy - radius, cx + radius, cy + radius) else {
        return;
    };
    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let idx = y as usize * fb.width + x as usize;
            fb.pixels[idx] = if opacity >= 1.0 {
                color
            } else {
                palette::weighted_sum(color, opacity, fb.pixels[idx], 1.0 - opacity, 0.0)
            };
        }
    }
}

/// Circle outline of the given stroke width, centered on the radius.
pub fn ring(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, width: i32, color: u32) {
    let outer = radius + width / 2 + width % 2;
    let inner = (radius - width / 2).max(0);
    let Some((x0, y0, x1, y1)) = clip_box(fb, cx - outer, cy - outer, cx + outer, cy + outer) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
            if d2 < outer * outer && d2 >= inner * inner {
                fb.pixels[y as usize * fb.width + x as usize] = color;
            }
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII, digits, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters share the uppercase glyphs.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        // Punctuation: space, vertical bar, colon, dot, hash
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '#' => g!(0b01010,0b01010,0b11111,0b01010,0b11111,0b01010,0b01010),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), each font pixel a `scale x scale` block,
/// with a black shadow offset by one block for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, c) in [(scale, BLACK), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = x + rx * scale + sx + offset;
                        let py = y + ry as i32 * scale + sy + offset;
                        put_pixel(fb, px, py, c);
                    }
                }
            }
        }
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * 6 * scale - scale
}

/// Height in pixels of one text line at `scale`.
pub fn text_height(scale: i32) -> i32 {
    7 * scale
}

/// Draw a text string using 5x7 glyphs; each glyph is 5 wide with 1 spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    draw_text_scaled(fb, x, y, text, color, 1);
}

pub fn draw_text_scaled(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32, scale: i32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color, scale);
        x += 6 * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: u32 = 0x00_11_11_11;
    const INK: u32 = 0x00_FF_00_00;

    #[test]
    fn thick_line_covers_segment_and_caps() {
        let mut fb = FrameBuffer::filled(80, 40, BG);
        draw_thick_line(&mut fb, 10, 20, 50, 20, 10, INK);
        assert_eq!(fb.get(30, 20), Some(INK));
        assert_eq!(fb.get(30, 25), Some(INK)); // r = 5 below the axis
        assert_eq!(fb.get(30, 26), Some(BG));
        assert_eq!(fb.get(5, 20), Some(INK)); // round cap
        assert_eq!(fb.get(4, 20), Some(BG));
        assert_eq!(fb.get(56, 20), Some(BG));
    }

    #[test]
    fn zero_length_line_is_a_dot() {
        let mut fb = FrameBuffer::filled(20, 20, BG);
        draw_thick_line(&mut fb, 10, 10, 10, 10, 4, INK);
        assert_eq!(fb.get(10, 10), Some(INK));
        assert_eq!(fb.get(12, 10), Some(INK));
        assert_eq!(fb.get(13, 10), Some(BG));
    }

    #[test]
    fn one_pixel_diagonal_has_no_gaps() {
        let mut fb = FrameBuffer::filled(20, 20, BG);
        draw_thick_line(&mut fb, 2, 3, 15, 9, 1, INK);
        // every column between the endpoints gets at least one pixel
        for x in 2..=15 {
            assert!((0..20).any(|y| fb.get(x, y) == Some(INK)), "gap at x = {x}");
        }
        assert_eq!(fb.get(2, 3), Some(INK));
        assert_eq!(fb.get(15, 9), Some(INK));

        let mut steep = FrameBuffer::filled(20, 20, BG);
        draw_thick_line(&mut steep, 4, 1, 7, 18, 1, INK);
        for y in 1..=18 {
            assert!((0..20).any(|x| steep.get(x, y) == Some(INK)), "gap at y = {y}");
        }
    }

    #[test]
    fn zero_thickness_draws_nothing() {
        let mut fb = FrameBuffer::filled(10, 10, BG);
        draw_thick_line(&mut fb, 1, 1, 8, 8, 0, INK);
        assert!(fb.pixels.iter().all(|&p| p == BG));
    }

    #[test]
    fn shapes_clip_at_edges() {
        let mut fb = FrameBuffer::filled(10, 10, BG);
        fill_circle(&mut fb, -3, -3, 5, INK);
        draw_thick_line(&mut fb, -20, 5, 30, 5, 3, INK);
        ring(&mut fb, 9, 9, 6, 2, INK);
        assert_eq!(fb.get(0, 0), Some(INK));
        assert_eq!(fb.get(9, 5), Some(INK));
        assert_eq!(fb.pixels.len(), 100);
    }

    #[test]
    fn blended_disc_mixes_colors() {
        let mut fb = FrameBuffer::filled(5, 5, 0);
        blend_circle(&mut fb, 2, 2, 1, 0x00_C8_00_00, 0.5);
        assert_eq!(fb.get(2, 2), Some(0x00_64_00_00));
        assert_eq!(fb.get(0, 0), Some(0));
    }

    #[test]
    fn text_metrics() {
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
        assert!(glyph5x7('e').is_some());
        assert!(glyph5x7('~').is_none());
    }
}
