// On-screen button menu: layout, hit testing, click dispatch and rendering.
//
// Layout along the top of the frame (640 wide shown):
//
//   (Board)   ...colors...  (Colors) (Eraser) (Clear) (Pen Size)
//                                                        (5)
//                                                        (10) ...
//
// Buttons are created once from the frame size and never move.

use crate::draw::{blend_circle, draw_text_scaled, fill_circle, ring, text_height, text_width};
use crate::palette::{self, BACKGROUND, COLORS, LIGHT_GRAY, MID_GRAY, WHITE};
use crate::types::{FrameBuffer, Point};

pub const BUTTON_RADIUS: i32 = 25;
pub const TOGGLE_RADIUS: i32 = 30;
pub const BUTTON_SPACING: i32 = 75;
pub const PEN_SIZE_OFFSET_Y: i32 = 65;
pub const MAX_COLORS: usize = 8;
pub const PEN_SIZE_MIN: u32 = 5;
pub const PEN_SIZE_MAX: u32 = 30;
pub const PEN_SIZE_STEP: u32 = 5;
/// Horizontal gap between the clear, eraser and color toggles.
pub const TOGGLE_GAP_X: i32 = 80;

const BOARD_TOGGLE_X: f32 = 0.1;
const PEN_TOGGLE_X: f32 = 0.9;
const TOGGLE_Y: f32 = 0.1;

const OVERLAY_ALPHA: f32 = 0.8;
const LABEL_MARGIN: i32 = 10;
const LABEL_OUTLINE_WIDTH: i32 = 4;
const STATUS_MARGIN: i32 = 20;
const TEXT_SCALE: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleKind {
    Board,
    PenSizes,
    Colors,
    Eraser,
}

impl ToggleKind {
    pub fn label(self) -> &'static str {
        match self {
            ToggleKind::Board => "Board",
            ToggleKind::PenSizes => "Pen Size",
            ToggleKind::Colors => "Colors",
            ToggleKind::Eraser => "Eraser",
        }
    }
}

/// What pressing a button means, with its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonRole {
    Toggle(ToggleKind),
    ColorSelect(u32),
    PenSize(u32),
    Clear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub center: Point,
    pub radius: i32,
    pub fill: u32,
    pub label: String,
    pub role: ButtonRole,
}

impl Button {
    fn new(center: Point, radius: i32, fill: u32, label: impl Into<String>, role: ButtonRole) -> Self {
        Self { center, radius, fill, label: label.into(), role }
    }

    /// Strictly inside the circle; the rim itself does not count.
    pub fn contains(&self, p: Point) -> bool {
        let (dx, dy) = ((p.x - self.center.x) as i64, (p.y - self.center.y) as i64);
        let r = self.radius as i64;
        dx * dx + dy * dy < r * r
    }

    /// Status line shown after this button is clicked.
    pub fn status_message(&self) -> String {
        match self.role {
            ButtonRole::ColorSelect(c) => format!("Selected Color: {}", palette::color_name(c)),
            ButtonRole::PenSize(v) => format!("Pen Thickness: {v}"),
            ButtonRole::Toggle(ToggleKind::Eraser) => "Eraser Selected".to_string(),
            ButtonRole::Toggle(kind) => format!("{} Toggled", kind.label()),
            ButtonRole::Clear => "Canvas Cleared".to_string(),
        }
    }

    /// Translucent disc with the label underneath.
    fn draw(&self, frame: &mut FrameBuffer) {
        blend_circle(frame, self.center.x, self.center.y, self.radius, self.fill, OVERLAY_ALPHA);
        if self.label.is_empty() {
            return;
        }
        let x = self.center.x - text_width(&self.label, TEXT_SCALE) / 2;
        let y = self.center.y + self.radius + LABEL_MARGIN;
        draw_text_scaled(frame, x, y, &self.label, WHITE, TEXT_SCALE);
    }

    /// White-rimmed disc with the label centered on it.
    fn draw_pen_size(&self, frame: &mut FrameBuffer) {
        fill_circle(frame, self.center.x, self.center.y, self.radius + LABEL_OUTLINE_WIDTH, WHITE);
        fill_circle(frame, self.center.x, self.center.y, self.radius, self.fill);
        let x = self.center.x - text_width(&self.label, TEXT_SCALE) / 2;
        let y = self.center.y - text_height(TEXT_SCALE) / 2;
        draw_text_scaled(frame, x, y, &self.label, WHITE, TEXT_SCALE);
    }
}

/// Which panels are open; read by the renderer, flipped by the toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub board_visible: bool,
    pub show_colors: bool,
    pub show_pen_sizes: bool,
}

pub struct Menu {
    buttons: Vec<Button>,
    hovered: Option<usize>,
    last_message: String,
}

impl Menu {
    /// Build every button for a frame of the given size.
    pub fn new(frame_width: usize, frame_height: usize) -> Self {
        let board_pos = Point::new(
            (frame_width as f32 * BOARD_TOGGLE_X) as i32,
            (frame_height as f32 * TOGGLE_Y) as i32,
        );
        let pen_pos = Point::new((frame_width as f32 * PEN_TOGGLE_X) as i32, board_pos.y);
        let clear_pos = Point::new(pen_pos.x - TOGGLE_GAP_X, pen_pos.y);
        let eraser_pos = Point::new(clear_pos.x - TOGGLE_GAP_X, pen_pos.y);
        let colors_pos = Point::new(eraser_pos.x - TOGGLE_GAP_X, pen_pos.y);

        let mut buttons = vec![Button::new(clear_pos, TOGGLE_RADIUS, LIGHT_GRAY, "Clear", ButtonRole::Clear)];

        let swatches = COLORS.iter().filter(|(c, _)| *c != BACKGROUND).take(MAX_COLORS);
        for (i, &(color, _)) in swatches.enumerate() {
            let x = colors_pos.x - BUTTON_SPACING - i as i32 * BUTTON_SPACING;
            buttons.push(Button::new(Point::new(x, colors_pos.y), BUTTON_RADIUS, color, "", ButtonRole::ColorSelect(color)));
        }

        let sizes = (PEN_SIZE_MIN..=PEN_SIZE_MAX).step_by(PEN_SIZE_STEP as usize);
        for (i, size) in sizes.enumerate() {
            let y = pen_pos.y + PEN_SIZE_OFFSET_Y + i as i32 * BUTTON_SPACING;
            buttons.push(Button::new(Point::new(pen_pos.x, y), BUTTON_RADIUS, MID_GRAY, size.to_string(), ButtonRole::PenSize(size)));
        }

        for (pos, kind) in [
            (board_pos, ToggleKind::Board),
            (pen_pos, ToggleKind::PenSizes),
            (colors_pos, ToggleKind::Colors),
            (eraser_pos, ToggleKind::Eraser),
        ] {
            buttons.push(Button::new(pos, TOGGLE_RADIUS, LIGHT_GRAY, kind.label(), ButtonRole::Toggle(kind)));
        }

        Self { buttons, hovered: None, last_message: String::new() }
    }

    /// Every button in hit-test order.
    #[cfg(test)]
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn hovered(&self) -> Option<&Button> {
        self.hovered.map(|i| &self.buttons[i])
    }

    #[cfg(test)]
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Hover the first button under `position`; when `clicking`, return it as pressed.
    pub fn handle_interaction(&mut self, position: Option<Point>, clicking: bool) -> Option<Button> {
        let Some(p) = position else {
            self.hovered = None;
            return None;
        };

        self.hovered = self.buttons.iter().position(|b| b.contains(p));
        let button = &self.buttons[self.hovered?];
        if !clicking {
            return None;
        }

        self.last_message = button.status_message();
        log::info!("pressed {:?}: {}", button.role, self.last_message);
        Some(button.clone())
    }

    /// Draw whatever is visible for the current panel state.
    pub fn draw_ui(&self, frame: &mut FrameBuffer, ui: &UiState) {
        let visible = |role: ButtonRole| match role {
            ButtonRole::Toggle(ToggleKind::Board) => true,
            ButtonRole::Toggle(_) | ButtonRole::Clear => ui.board_visible,
            ButtonRole::ColorSelect(_) => ui.board_visible && ui.show_colors,
            ButtonRole::PenSize(_) => ui.board_visible && ui.show_pen_sizes,
        };

        for b in self.buttons.iter().filter(|b| visible(b.role)) {
            match b.role {
                ButtonRole::PenSize(_) => b.draw_pen_size(frame),
                _ => b.draw(frame),
            }
        }

        if let Some(b) = self.hovered().filter(|b| visible(b.role)) {
            ring(frame, b.center.x, b.center.y, b.radius + 3, 2, WHITE);
        }

        if ui.board_visible && !self.last_message.is_empty() {
            let x = frame.width as i32 - text_width(&self.last_message, TEXT_SCALE) - STATUS_MARGIN;
            let y = frame.height as i32 - STATUS_MARGIN - text_height(TEXT_SCALE);
            draw_text_scaled(frame, x, y, &self.last_message, WHITE, TEXT_SCALE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BLACK, GREEN, RED};

    fn menu() -> Menu {
        Menu::new(640, 480)
    }

    fn find(menu: &Menu, role: ButtonRole) -> Button {
        menu.buttons().iter().find(|b| b.role == role).cloned().expect("button exists")
    }

    #[test]
    fn registry_composition_and_order() {
        let m = menu();
        let roles: Vec<ButtonRole> = m.buttons().iter().map(|b| b.role).collect();
        assert_eq!(roles.len(), 1 + 8 + 6 + 4);
        assert_eq!(roles[0], ButtonRole::Clear);
        assert!(roles[1..9].iter().all(|r| matches!(r, ButtonRole::ColorSelect(_))));
        assert_eq!(roles[9..15], [5, 10, 15, 20, 25, 30].map(ButtonRole::PenSize));
        assert_eq!(
            roles[15..],
            [ToggleKind::Board, ToggleKind::PenSizes, ToggleKind::Colors, ToggleKind::Eraser].map(ButtonRole::Toggle)
        );
        assert!(!roles.contains(&ButtonRole::ColorSelect(WHITE)));
        assert!(roles.contains(&ButtonRole::ColorSelect(BLACK)));
    }

    #[test]
    fn layout_from_frame_size() {
        let m = menu();
        assert_eq!(find(&m, ButtonRole::Toggle(ToggleKind::Board)).center, Point::new(64, 48));
        assert_eq!(find(&m, ButtonRole::Toggle(ToggleKind::PenSizes)).center, Point::new(576, 48));
        assert_eq!(find(&m, ButtonRole::Clear).center, Point::new(496, 48));
        assert_eq!(find(&m, ButtonRole::Toggle(ToggleKind::Eraser)).center, Point::new(416, 48));
        assert_eq!(find(&m, ButtonRole::Toggle(ToggleKind::Colors)).center, Point::new(336, 48));
        assert_eq!(find(&m, ButtonRole::ColorSelect(RED)).center, Point::new(261, 48));
        assert_eq!(find(&m, ButtonRole::ColorSelect(GREEN)).center, Point::new(186, 48));
        assert_eq!(find(&m, ButtonRole::PenSize(5)).center, Point::new(576, 113));
        assert_eq!(find(&m, ButtonRole::PenSize(10)).center, Point::new(576, 188));
    }

    #[test]
    fn rim_is_outside() {
        let b = Button::new(Point::new(100, 100), 25, 0, "", ButtonRole::Clear);
        assert!(!b.contains(Point::new(125, 100)));
        assert!(!b.contains(Point::new(100, 75)));
        assert!(b.contains(Point::new(124, 100)));
        assert!(b.contains(Point::new(100, 100)));
    }

    #[test]
    fn hover_without_click_returns_nothing() {
        let mut m = menu();
        assert_eq!(m.handle_interaction(Some(Point::new(496, 48)), false), None);
        assert_eq!(m.hovered().map(|b| b.role), Some(ButtonRole::Clear));
        assert_eq!(m.last_message(), "");
    }

    #[test]
    fn absent_position_clears_hover() {
        let mut m = menu();
        m.handle_interaction(Some(Point::new(496, 48)), false);
        assert_eq!(m.handle_interaction(None, true), None);
        assert!(m.hovered().is_none());
    }

    #[test]
    fn click_returns_button_and_sets_message() {
        let mut m = menu();
        let b = m.handle_interaction(Some(Point::new(261, 50)), true).expect("red swatch");
        assert_eq!(b.role, ButtonRole::ColorSelect(RED));
        assert_eq!(m.last_message(), "Selected Color: Red");

        m.handle_interaction(Some(Point::new(576, 190)), true);
        assert_eq!(m.last_message(), "Pen Thickness: 10");

        m.handle_interaction(Some(Point::new(416, 48)), true);
        assert_eq!(m.last_message(), "Eraser Selected");
    }

    #[test]
    fn click_on_empty_space_hits_nothing() {
        let mut m = menu();
        assert_eq!(m.handle_interaction(Some(Point::new(320, 400)), true), None);
        assert!(m.hovered().is_none());
    }

    #[test]
    fn first_match_wins() {
        // on 640 px the fourth swatch (Yellow, x 36) overlaps the board toggle (x 64);
        // swatches come first in the registry
        let mut m = menu();
        let p = Point::new(50, 48);
        assert!(find(&m, ButtonRole::Toggle(ToggleKind::Board)).contains(p));
        let hit = m.handle_interaction(Some(p), true).map(|b| b.role);
        assert_eq!(hit, Some(ButtonRole::ColorSelect(palette::YELLOW)));
    }

    #[test]
    fn draw_ui_respects_panels() {
        let m = menu();
        let mut hidden = FrameBuffer::filled(640, 480, 0);
        m.draw_ui(&mut hidden, &UiState::default());
        assert_ne!(hidden.get(64, 48), Some(0)); // board toggle always shown
        assert_eq!(hidden.get(496, 48), Some(0)); // clear hidden with the board

        let mut open = FrameBuffer::filled(640, 480, 0);
        m.draw_ui(&mut open, &UiState { board_visible: true, show_colors: true, show_pen_sizes: false });
        assert_ne!(open.get(496, 48), Some(0));
        assert_ne!(open.get(261, 48), Some(0));
        assert_eq!(open.get(576, 113), Some(0));
    }
}
