// Gesture interpreter: turns one frame's hand landmarks into
// raised fingers, draw mode, fingertip pixel and a debounced click.
//
// Gestures (selected hand only):
// • index up, middle down  -> draw mode (pen down)
// • index + middle up      -> "armed"
// • armed, then next frame index only -> one click

use crate::hands::{Finger, HandLandmarks, Landmark};
use crate::types::Point;

/// Only the first detected hand drives drawing and clicks.
pub const SELECTED_HAND: usize = 0;

/// Raised/lowered state of the two tracked fingers on one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerState {
    pub index: bool,
    pub middle: bool,
}

impl FingerState {
    pub fn of(hand: &HandLandmarks) -> Self {
        Self {
            index: is_finger_raised(&hand.points, Finger::Index),
            middle: is_finger_raised(&hand.points, Finger::Middle),
        }
    }

    pub fn is_raised(&self, finger: Finger) -> bool {
        match finger {
            Finger::Index => self.index,
            Finger::Middle => self.middle,
        }
    }

    /// Index alone is up.
    pub fn draw_mode(&self) -> bool {
        self.index && !self.middle
    }

    /// Index and middle both up.
    pub fn armed(&self) -> bool {
        self.index && self.middle
    }
}

/// Debounce memory carried from one frame to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandState {
    pub prev_index_up: bool,
    pub prev_middle_up: bool,
    pub prev_click_fired: bool,
}

impl HandState {
    /// Advance one frame. Returns true when a click fires on this frame.
    pub fn step(&mut self, now: FingerState) -> bool {
        let was_armed = FingerState { index: self.prev_index_up, middle: self.prev_middle_up }.armed();
        let click = was_armed && now.draw_mode() && !self.prev_click_fired;

        self.prev_index_up = now.index;
        self.prev_middle_up = now.middle;
        self.prev_click_fired = click;
        click
    }
}

/// What the rest of the frame needs from the interpreter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureFrame {
    /// Index fingertip of the selected hand, in frame pixels.
    pub fingertip: Option<Point>,
    pub draw: bool,
    pub click: bool,
    /// Finger state of every detected hand, for on-screen markers.
    pub hands: Vec<FingerState>,
}

#[derive(Debug, Default)]
pub struct LandmarkInterpreter {
    state: HandState,
}

impl LandmarkInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> HandState {
        self.state
    }

    /// Interpret one frame. Call exactly once per frame, also when no hand was found,
    /// so the debounce sees "nothing raised".
    pub fn update(&mut self, hands: &[HandLandmarks], frame_width: usize, frame_height: usize) -> GestureFrame {
        let states: Vec<FingerState> = hands.iter().map(FingerState::of).collect();

        let Some(selected) = hands.get(SELECTED_HAND) else {
            self.state.step(FingerState::default());
            return GestureFrame { hands: states, ..GestureFrame::default() };
        };

        let fingers = states[SELECTED_HAND];
        let click = self.state.step(fingers);
        if click {
            log::debug!("click gesture");
        }

        GestureFrame {
            fingertip: Some(to_pixels(selected.points[Finger::Index.tip()], frame_width, frame_height)),
            draw: fingers.draw_mode(),
            click,
            hands: states,
        }
    }
}

/// Strict chain `tip < distal < proximal < metacarpal` on y (y grows downward).
pub fn raised(tip_y: f32, dip_y: f32, pip_y: f32, mcp_y: f32) -> bool {
    tip_y < dip_y && dip_y < pip_y && pip_y < mcp_y
}

pub fn is_finger_raised(points: &[Landmark], finger: Finger) -> bool {
    let [tip, dip, pip, mcp] = finger.joints().map(|i| points[i].y);
    raised(tip, dip, pip, mcp)
}

/// Normalized landmark -> integer frame pixels (truncating).
pub fn to_pixels(lm: Landmark, frame_width: usize, frame_height: usize) -> Point {
    Point::new((lm.x * frame_width as f32) as i32, (lm.y * frame_height as f32) as i32)
}
