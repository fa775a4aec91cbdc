// Hand landmark model shared by every detector.
// Landmarks follow the MediaPipe Hands topology: 21 points per hand, in
// normalized frame-fraction coordinates (x to the right, y downward).

use crate::error::Error;
use crate::types::FrameBuffer;

pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices, MediaPipe hand landmark model convention.
pub mod landmarks {
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
}

/// A single landmark, x and y in 0..1. Depth is not used.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The two fingers the gesture engine cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
}

impl Finger {
    pub const TRACKED: [Finger; 2] = [Finger::Index, Finger::Middle];

    /// Joint indices ordered tip, distal, proximal, metacarpal.
    pub const fn joints(self) -> [usize; 4] {
        use landmarks::*;
        match self {
            Finger::Index => [INDEX_FINGER_TIP, INDEX_FINGER_DIP, INDEX_FINGER_PIP, INDEX_FINGER_MCP],
            Finger::Middle => [MIDDLE_FINGER_TIP, MIDDLE_FINGER_DIP, MIDDLE_FINGER_PIP, MIDDLE_FINGER_MCP],
        }
    }

    pub const fn tip(self) -> usize {
        self.joints()[0]
    }
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    pub points: [Landmark; LANDMARK_COUNT],
    /// "Left" or "Right" as reported by the detector.
    pub handedness: String,
}

/// Pointer state sampled from the window each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub position: Option<(f32, f32)>, // window pixels
    pub left: bool,
    pub right: bool,
}

/// Anything that turns an image into zero or more hands.
pub trait HandDetector {
    fn name(&self) -> String;

    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<HandLandmarks>, Error>;

    /// Detectors driven by the window pointer override this; camera-based ones ignore it.
    fn feed_pointer(&mut self, _sample: PointerSample) {}
}
