// The persistent drawing board.
// Strokes land in `surface`, which lives for the whole session; every frame the
// surface is blended over the live image at `origin`. Blending never writes back
// into the surface, so strokes stay until Clear.

use crate::draw::{draw_thick_line, fill_circle};
use crate::palette::{self, BACKGROUND, RED};
use crate::types::{FrameBuffer, Point};

/// Color, pen size and eraser flag currently in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolState {
    pub color: u32,
    pub brush_size: u32,
    pub eraser: bool,
    /// Eraser radius = brush_size * eraser_multiplier.
    pub eraser_multiplier: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self { color: RED, brush_size: 10, eraser: false, eraser_multiplier: 2 }
    }
}

/// Weights for `frame*frame_weight + canvas*canvas_weight + brightness`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendWeights {
    pub frame_weight: f32,
    pub canvas_weight: f32,
    pub brightness: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self { frame_weight: 0.5, canvas_weight: 0.5, brightness: 0.5 }
    }
}

pub struct Canvas {
    surface: FrameBuffer,
    origin: Point, // top-left of the board in frame pixels
    weights: BlendWeights,
    prev: Option<Point>, // stroke continuity, canvas space
}

impl Canvas {
    pub fn new(width: usize, height: usize, origin: Point, weights: BlendWeights) -> Self {
        Self { surface: FrameBuffer::filled(width, height, BACKGROUND), origin, weights, prev: None }
    }

    /// Board sized and placed as fractions of the camera frame.
    pub fn for_frame(
        frame_width: usize,
        frame_height: usize,
        size_fraction: f32,
        offset_x: f32,
        offset_y: f32,
        weights: BlendWeights,
    ) -> Self {
        let width = (frame_width as f32 * size_fraction) as usize;
        let height = (frame_height as f32 * size_fraction) as usize;
        let origin = Point::new((frame_width as f32 * offset_x) as i32, (frame_height as f32 * offset_y) as i32);
        Self::new(width, height, origin, weights)
    }

    #[cfg(test)]
    pub fn surface(&self) -> &FrameBuffer {
        &self.surface
    }

    #[cfg(test)]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[cfg(test)]
    pub fn previous_point(&self) -> Option<Point> {
        self.prev
    }

    /// Frame pixels -> canvas pixels, None when outside `[0,w) x [0,h)`.
    pub fn to_canvas(&self, frame_point: Point) -> Option<Point> {
        let p = frame_point - self.origin;
        let inside = p.x >= 0 && p.y >= 0 && (p.x as usize) < self.surface.width && (p.y as usize) < self.surface.height;
        inside.then_some(p)
    }

    /// Extend (or start) the stroke at `frame_point`. No fingertip, pen up, or a point
    /// outside the board ends the stroke so nothing bridges the gap later.
    pub fn draw_at(&mut self, frame_point: Option<Point>, draw_mode: bool, tool: &ToolState) {
        let target = frame_point.filter(|_| draw_mode).and_then(|p| self.to_canvas(p));
        let Some(p) = target else {
            self.interrupt();
            return;
        };
        self.stroke_to(p, tool);
    }

    /// Canvas-space stroke step.
    pub fn stroke_to(&mut self, p: Point, tool: &ToolState) {
        let prev = self.prev.unwrap_or(p);
        if tool.eraser {
            let radius = (tool.brush_size * tool.eraser_multiplier) as i32;
            fill_circle(&mut self.surface, p.x, p.y, radius, BACKGROUND);
        } else {
            draw_thick_line(&mut self.surface, prev.x, prev.y, p.x, p.y, tool.brush_size, tool.color);
        }
        self.prev = Some(p);
    }

    /// Forget the previous point; the next stroke starts fresh.
    pub fn interrupt(&mut self) {
        self.prev = None;
    }

    /// Back to an empty board.
    pub fn clear(&mut self) {
        self.surface.fill(BACKGROUND);
        self.prev = None;
    }

    /// Blend the board into `frame` at `origin`, clipped to the frame.
    pub fn composite_onto(&self, frame: &mut FrameBuffer) {
        let BlendWeights { frame_weight, canvas_weight, brightness } = self.weights;
        for cy in 0..self.surface.height {
            let fy = self.origin.y + cy as i32;
            if fy < 0 || fy as usize >= frame.height {
                continue;
            }
            let canvas_row = &self.surface.pixels[cy * self.surface.width..(cy + 1) * self.surface.width];
            let frame_row = &mut frame.pixels[fy as usize * frame.width..(fy as usize + 1) * frame.width];
            for (cx, &c) in canvas_row.iter().enumerate() {
                let fx = self.origin.x + cx as i32;
                if fx < 0 || fx as usize >= frame.width {
                    continue;
                }
                let f = &mut frame_row[fx as usize];
                *f = palette::weighted_sum(*f, frame_weight, c, canvas_weight, brightness);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{pack, unpack, BLACK, BLUE};

    fn board() -> Canvas {
        Canvas::new(120, 80, Point::new(20, 30), BlendWeights::default())
    }

    fn pen(color: u32, size: u32) -> ToolState {
        ToolState { color, brush_size: size, ..ToolState::default() }
    }

    fn painted(c: &Canvas) -> usize {
        c.surface().pixels.iter().filter(|&&p| p != BACKGROUND).count()
    }

    #[test]
    fn geometry_from_frame_fractions() {
        let c = Canvas::for_frame(640, 480, 0.79, 0.05, 0.20, BlendWeights::default());
        assert_eq!((c.surface().width, c.surface().height), (505, 379));
        assert_eq!(c.origin(), Point::new(32, 96));
    }

    #[test]
    fn transform_and_bounds() {
        let c = board();
        assert_eq!(c.to_canvas(Point::new(20, 30)), Some(Point::new(0, 0)));
        assert_eq!(c.to_canvas(Point::new(139, 109)), Some(Point::new(119, 79)));
        assert_eq!(c.to_canvas(Point::new(140, 50)), None);
        assert_eq!(c.to_canvas(Point::new(19, 50)), None);
    }

    #[test]
    fn out_of_bounds_never_paints() {
        let mut c = board();
        c.draw_at(Some(Point::new(5, 5)), true, &pen(BLUE, 10));
        assert_eq!(painted(&c), 0);
        assert_eq!(c.previous_point(), None);
    }

    #[test]
    fn gap_breaks_the_stroke() {
        let mut c = board();
        let tool = pen(BLUE, 4);
        c.draw_at(Some(Point::new(30, 40)), true, &tool); // canvas (10,10)
        c.draw_at(Some(Point::new(500, 40)), true, &tool); // off the board
        c.draw_at(Some(Point::new(90, 40)), true, &tool); // canvas (70,10)

        assert_eq!(c.surface().get(40, 10), Some(BACKGROUND));
        assert_eq!(c.surface().get(10, 10), Some(BLUE));
        assert_eq!(c.surface().get(70, 10), Some(BLUE));
    }

    #[test]
    fn pen_up_and_lost_finger_reset_continuity() {
        let mut c = board();
        let tool = pen(BLUE, 2);
        c.draw_at(Some(Point::new(30, 40)), true, &tool);
        c.draw_at(Some(Point::new(40, 40)), false, &tool);
        assert_eq!(c.previous_point(), None);
        c.draw_at(Some(Point::new(30, 40)), true, &tool);
        c.draw_at(None, true, &tool);
        assert_eq!(c.previous_point(), None);
    }

    #[test]
    fn connected_points_draw_a_segment() {
        let mut c = board();
        let tool = pen(BLUE, 2);
        c.draw_at(Some(Point::new(30, 40)), true, &tool);
        c.draw_at(Some(Point::new(90, 40)), true, &tool);
        assert_eq!(c.surface().get(40, 10), Some(BLUE));
        assert_eq!(c.previous_point(), Some(Point::new(70, 10)));
    }

    #[test]
    fn eraser_paints_background_around_current_point_only() {
        let mut c = board();
        c.stroke_to(Point::new(0, 40), &pen(BLUE, 2));
        c.stroke_to(Point::new(119, 40), &pen(BLUE, 2));
        let eraser = ToolState { eraser: true, brush_size: 5, ..ToolState::default() };
        c.interrupt();
        c.stroke_to(Point::new(60, 40), &eraser);
        assert_eq!(c.surface().get(60, 40), Some(BACKGROUND));
        assert_eq!(c.surface().get(51, 40), Some(BACKGROUND)); // radius 10
        assert_eq!(c.surface().get(49, 40), Some(BLUE));
        assert_eq!(c.surface().get(71, 40), Some(BLUE));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut c = board();
        c.stroke_to(Point::new(10, 10), &pen(BLUE, 8));
        c.stroke_to(Point::new(100, 60), &pen(BLUE, 8));
        c.clear();
        let once = c.surface().clone();
        assert!(once.pixels.iter().all(|&p| p == BACKGROUND));
        c.clear();
        assert_eq!(c.surface(), &once);
        assert_eq!(c.previous_point(), None);
    }

    #[test]
    fn composite_matches_weighted_formula_and_keeps_surface() {
        let ink = pack([0, 100, 250]);
        let mut c = Canvas::new(2, 1, Point::new(1, 0), BlendWeights::default());
        c.stroke_to(Point::new(1, 0), &pen(ink, 1));
        let before = c.surface().clone();

        let frame_px = pack([200, 30, 255]);
        let mut frame = FrameBuffer::filled(4, 1, frame_px);
        c.composite_onto(&mut frame);

        let expect = |f: u8, k: u8| (0.5 * f as f32 + 0.5 * k as f32 + 0.5).round_ties_even().clamp(0.0, 255.0) as u8;
        let (fc, cc) = (unpack(frame_px), unpack(ink));
        let blended = pack([expect(fc[0], cc[0]), expect(fc[1], cc[1]), expect(fc[2], cc[2])]);

        assert_eq!(frame.pixels[0], frame_px); // left of the board
        assert_eq!(frame.pixels[2], blended);
        // 100.5 -> 100, 65.5 -> 66: halves go to the even neighbour
        assert_eq!(unpack(frame.pixels[2]), [100, 66, 253]);
        assert_eq!(frame.pixels[3], frame_px); // right of the board
        assert_eq!(unpack(frame.pixels[1]), [228, 143, 255]); // untouched board pixel is white; blue saturates
        assert_eq!(c.surface(), &before);
    }

    #[test]
    fn black_on_black_stays_black() {
        let mut c = Canvas::new(3, 3, Point::new(0, 0), BlendWeights::default());
        for y in 0..3 {
            c.interrupt();
            c.stroke_to(Point::new(0, y), &pen(BLACK, 1));
            c.stroke_to(Point::new(2, y), &pen(BLACK, 1));
        }
        let mut frame = FrameBuffer::filled(3, 3, BLACK);
        c.composite_onto(&mut frame);
        assert!(frame.pixels.iter().all(|&p| p == BLACK));
    }

    #[test]
    fn composite_clips_to_frame() {
        let c = Canvas::new(50, 50, Point::new(-10, 30), BlendWeights::default());
        let mut frame = FrameBuffer::filled(20, 40, 0);
        c.composite_onto(&mut frame);
        assert_ne!(frame.get(0, 39), Some(0));
        assert_eq!(frame.get(0, 29), Some(0));
    }
}
