//! Pixel geometry shared by input handling and drawing.

use crate::board::BOARD_SIZE;
use crate::types::Position;

pub const CELL_SIZE: u32 = 80;
pub const BOARD_PIXELS: u32 = CELL_SIZE * BOARD_SIZE as u32;
pub const PANEL_HEIGHT: u32 = 80;
pub const CANVAS_WIDTH: u32 = BOARD_PIXELS;
pub const CANVAS_HEIGHT: u32 = BOARD_PIXELS + PANEL_HEIGHT;

const DIALOG_WIDTH: f64 = 400.0;
const DIALOG_HEIGHT: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Maps a pointer position to the board cell under it.
pub fn cell_at(px: f64, py: f64) -> Option<Position> {
    if px < 0.0 || py < 0.0 {
        return None;
    }
    let x = (px as u32) / CELL_SIZE;
    let y = (py as u32) / CELL_SIZE;
    if x < BOARD_SIZE as u32 && y < BOARD_SIZE as u32 {
        Some(Position::new(x as u8, y as u8))
    } else {
        None
    }
}

/// Pixel centre of a board cell.
pub fn cell_center(pos: Position) -> (f64, f64) {
    let half = CELL_SIZE as f64 / 2.0;
    (
        pos.x as f64 * CELL_SIZE as f64 + half,
        pos.y as f64 * CELL_SIZE as f64 + half,
    )
}

/// The fix confirmation dialog. Only exists while a choice is pending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixDialog {
    pub frame: Rect,
    pub yes: Rect,
    pub no: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Yes,
    No,
}

impl FixDialog {
    /// Dialog centred on the board.
    pub fn centered() -> Self {
        let half = BOARD_PIXELS as f64 / 2.0;
        let frame = Rect::new(
            half - DIALOG_WIDTH / 2.0,
            half - DIALOG_HEIGHT / 2.0,
            DIALOG_WIDTH,
            DIALOG_HEIGHT,
        );
        Self {
            frame,
            yes: Rect::new(frame.x + 50.0, frame.y + 110.0, 120.0, 50.0),
            no: Rect::new(frame.x + 230.0, frame.y + 110.0, 150.0, 50.0),
        }
    }

    pub fn hit(&self, px: f64, py: f64) -> Option<DialogButton> {
        if self.yes.contains(px, py) {
            Some(DialogButton::Yes)
        } else if self.no.contains(px, py) {
            Some(DialogButton::No)
        } else {
            None
        }
    }
}
