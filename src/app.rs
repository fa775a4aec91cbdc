// One frame of the interaction loop, without the camera or the window:
// landmarks in, annotated frame out.
//
// Order per frame: interpret -> menu dispatch -> stroke -> blend board ->
// menu UI -> fingertip markers on top.

use crate::canvas::{Canvas, ToolState};
use crate::config::AppConfig;
use crate::draw::{fill_circle, ring};
use crate::gesture::{FingerState, GestureFrame, LandmarkInterpreter, to_pixels};
use crate::hands::{Finger, HandLandmarks};
use crate::menu::{ButtonRole, Menu, ToggleKind, UiState};
use crate::palette::{DARKER_GRAY, LIGHT_GRAY};
use crate::types::FrameBuffer;

const TIP_RADIUS: i32 = 5;
const TIP_RING_WIDTH: i32 = 2;

pub struct AirCanvas {
    interpreter: LandmarkInterpreter,
    menu: Menu,
    canvas: Canvas,
    ui: UiState,
    tool: ToolState,
}

impl AirCanvas {
    /// Menu and board laid out for frames of `width x height`.
    pub fn new(width: usize, height: usize, config: &AppConfig) -> Self {
        let c = &config.canvas;
        Self {
            interpreter: LandmarkInterpreter::new(),
            menu: Menu::new(width, height),
            canvas: Canvas::for_frame(width, height, c.size_fraction, c.offset_x, c.offset_y, c.weights()),
            ui: UiState::default(),
            tool: config.brush.initial_tool(),
        }
    }

    /// Run the gesture engine on one frame and draw the result into it.
    pub fn process_frame(&mut self, frame: &mut FrameBuffer, hands: &[HandLandmarks]) -> GestureFrame {
        let gesture = self.interpreter.update(hands, frame.width, frame.height);

        if let Some(button) = self.menu.handle_interaction(gesture.fingertip, gesture.click) {
            self.apply(button.role);
        }

        if self.ui.board_visible {
            self.canvas.draw_at(gesture.fingertip, gesture.draw, &self.tool);
            self.canvas.composite_onto(frame);
        } else {
            self.canvas.interrupt();
        }

        self.menu.draw_ui(frame, &self.ui);
        draw_fingertips(frame, hands, &gesture.hands);
        gesture
    }

    /// Side effect of a pressed button.
    pub fn apply(&mut self, role: ButtonRole) {
        match role {
            ButtonRole::Toggle(ToggleKind::Board) => self.ui.board_visible = !self.ui.board_visible,
            ButtonRole::Toggle(ToggleKind::Colors) => self.ui.show_colors = !self.ui.show_colors,
            ButtonRole::Toggle(ToggleKind::PenSizes) => self.ui.show_pen_sizes = !self.ui.show_pen_sizes,
            ButtonRole::Toggle(ToggleKind::Eraser) => self.tool.eraser = !self.tool.eraser,
            ButtonRole::ColorSelect(color) => {
                self.tool.color = color;
                self.tool.eraser = false;
            }
            ButtonRole::PenSize(size) => self.tool.brush_size = size,
            ButtonRole::Clear => self.canvas.clear(),
        }
    }
}

#[cfg(test)]
impl AirCanvas {
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn tool(&self) -> &ToolState {
        &self.tool
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }
}

/// Mark raised fingertips on every hand. A hollow ring on the index means pen down.
fn draw_fingertips(frame: &mut FrameBuffer, hands: &[HandLandmarks], states: &[FingerState]) {
    for (hand, state) in hands.iter().zip(states) {
        for finger in Finger::TRACKED {
            if !state.is_raised(finger) {
                continue;
            }
            let tip = to_pixels(hand.points[finger.tip()], frame.width, frame.height);
            ring(frame, tip.x, tip.y, TIP_RADIUS, TIP_RING_WIDTH, DARKER_GRAY);
            if !(state.draw_mode() && finger == Finger::Index) {
                fill_circle(frame, tip.x, tip.y, TIP_RADIUS, LIGHT_GRAY);
            }
        }
    }
}
