use std::f64::consts::TAU;

use log::warn;
use once_cell::unsync::OnceCell;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::board::{BOARD_SIZE, all_positions};
use crate::config::Fonts;
use crate::game::{GameInstance, fix_charges_line, score_line};
use crate::layout::{
    BOARD_PIXELS, CANVAS_HEIGHT, CANVAS_WIDTH, CELL_SIZE, FixDialog, PANEL_HEIGHT, Rect,
    cell_center,
};
use crate::types::Player;

const BOARD_GREEN: &str = "rgb(0, 150, 0)";
const STONE_BLACK: &str = "rgb(0, 0, 0)";
const STONE_WHITE: &str = "rgb(240, 240, 240)";
const PANEL_GRAY: &str = "rgb(80, 80, 80)";
const TEXT_YELLOW: &str = "rgb(255, 255, 0)";
const DIALOG_BG: &str = "rgb(50, 50, 70)";
const BUTTON_BG: &str = "rgb(100, 100, 150)";
const OVERLAY: &str = "rgba(0, 0, 0, 0.5)";

const FIX_MARKER_RADIUS: f64 = 8.0;
const DIALOG_PROMPT: &str = "この石を固定しますか？";
const YES_LABEL: &str = "はい(Y)";
const NO_LABEL: &str = "いいえ(N)";
const FONT_PROBE_TEXT: &str = "mmmmmmmmmmlli固定権";
const GENERIC_FAMILIES: [&str; 3] = ["monospace", "serif", "sans-serif"];

/// Owns the canvas 2D context and draws the whole game each frame.
pub struct Renderer {
    ctx: CanvasRenderingContext2d,
    fonts: Fonts,
    family: OnceCell<String>,
}

impl Renderer {
    pub fn new(
        canvas: &HtmlCanvasElement,
        fonts: Fonts,
    ) -> Result<Self, JsValue> {
        canvas.set_width(CANVAS_WIDTH);
        canvas.set_height(CANVAS_HEIGHT);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            ctx,
            fonts,
            family: OnceCell::new(),
        })
    }

    pub fn draw(&self, game: &GameInstance) -> Result<(), JsValue> {
        self.draw_board(game)?;
        self.draw_panel(game)?;
        if let Some(dialog) = game.phase().dialog() {
            self.draw_dialog(dialog)?;
        }
        Ok(())
    }

    fn draw_board(&self, game: &GameInstance) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let size = BOARD_PIXELS as f64;
        ctx.set_fill_style_str(BOARD_GREEN);
        ctx.fill_rect(0.0, 0.0, size, size);

        ctx.set_stroke_style_str(STONE_BLACK);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        for i in 0..=BOARD_SIZE {
            let offset = (i as u32 * CELL_SIZE) as f64;
            ctx.move_to(offset, 0.0);
            ctx.line_to(offset, size);
            ctx.move_to(0.0, offset);
            ctx.line_to(size, offset);
        }
        ctx.stroke();

        let board = game.board();
        for pos in all_positions() {
            let cell = board.cell(pos);
            let Some(owner) = cell.owner() else {
                continue;
            };
            let (cx, cy) = cell_center(pos);
            let color = match owner {
                Player::Black => STONE_BLACK,
                Player::White => STONE_WHITE,
            };
            self.fill_circle(cx, cy, CELL_SIZE as f64 / 2.0 - 4.0, color)?;
            if cell.is_fixed() {
                self.fill_circle(cx, cy, FIX_MARKER_RADIUS, TEXT_YELLOW)?;
            }
        }
        Ok(())
    }

    fn draw_panel(&self, game: &GameInstance) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let top = BOARD_PIXELS as f64;
        let panel = Rect::new(0.0, top, CANVAS_WIDTH as f64, PANEL_HEIGHT as f64);
        ctx.set_fill_style_str(PANEL_GRAY);
        ctx.fill_rect(panel.x, panel.y, panel.width, panel.height);

        ctx.set_font(&self.font(self.fonts.status_px));
        ctx.set_fill_style_str(TEXT_YELLOW);
        ctx.set_text_baseline("top");
        ctx.set_text_align("left");
        ctx.fill_text(game.message(), 20.0, top + 10.0)?;
        ctx.fill_text(&fix_charges_line(game.board()), 20.0, top + 45.0)?;

        let (_, center_y) = panel.center();
        ctx.set_text_baseline("middle");
        ctx.set_text_align("right");
        ctx.fill_text(&score_line(game.board()), panel.width - 20.0, center_y)?;
        Ok(())
    }

    fn draw_dialog(&self, dialog: &FixDialog) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let size = BOARD_PIXELS as f64;
        ctx.set_fill_style_str(OVERLAY);
        ctx.fill_rect(0.0, 0.0, size, size);

        self.fill_rounded(&dialog.frame, 15.0, DIALOG_BG)?;
        ctx.set_font(&self.font(self.fonts.dialog_px));
        ctx.set_fill_style_str(STONE_WHITE);
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        let (center_x, _) = dialog.frame.center();
        ctx.fill_text(DIALOG_PROMPT, center_x, dialog.frame.y + 30.0)?;

        for (button, label) in [(&dialog.yes, YES_LABEL), (&dialog.no, NO_LABEL)] {
            self.fill_rounded(button, 10.0, BUTTON_BG)?;
            let (bx, by) = button.center();
            ctx.set_fill_style_str(STONE_WHITE);
            ctx.set_text_baseline("middle");
            ctx.fill_text(label, bx, by)?;
        }
        Ok(())
    }

    fn fill_circle(&self, cx: f64, cy: f64, radius: f64, color: &str) -> Result<(), JsValue> {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx.arc(cx, cy, radius, 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }

    fn fill_rounded(&self, rect: &Rect, radius: f64, color: &str) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.x + rect.width, rect.y + rect.height);
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        ctx.move_to(left + radius, top);
        ctx.arc_to(right, top, right, bottom, radius)?;
        ctx.arc_to(right, bottom, left, bottom, radius)?;
        ctx.arc_to(left, bottom, left, top, radius)?;
        ctx.arc_to(left, top, right, top, radius)?;
        ctx.close_path();
        ctx.fill();
        Ok(())
    }

    fn font(&self, px: u32) -> String {
        format!("{px}px {}", self.family())
    }

    /// CSS font family, resolved once: the preferred face when the browser
    /// can render it, the fallback otherwise.
    fn family(&self) -> &str {
        self.family.get_or_init(|| match self.preferred_font_widths() {
            Ok(widths) if font_detected(&widths) => {
                format!("\"{}\", {}", self.fonts.preferred, self.fonts.fallback)
            }
            Ok(_) | Err(_) => {
                warn!(
                    "font {:?} unavailable, falling back to {}",
                    self.fonts.preferred, self.fonts.fallback
                );
                self.fonts.fallback.to_string()
            }
        })
    }

    /// Probe text widths per generic family: alone, then behind the
    /// preferred face. A missing face renders in the generic one.
    fn preferred_font_widths(&self) -> Result<Vec<(f64, f64)>, JsValue> {
        let px = self.fonts.status_px;
        let mut widths = Vec::with_capacity(GENERIC_FAMILIES.len());
        for generic in GENERIC_FAMILIES {
            self.ctx.set_font(&format!("{px}px {generic}"));
            let base = self.ctx.measure_text(FONT_PROBE_TEXT)?.width();
            self.ctx
                .set_font(&format!("{px}px \"{}\", {generic}", self.fonts.preferred));
            let probed = self.ctx.measure_text(FONT_PROBE_TEXT)?.width();
            widths.push((base, probed));
        }
        Ok(widths)
    }
}

/// The face exists when it changes the width against any generic family.
fn font_detected(widths: &[(f64, f64)]) -> bool {
    widths
        .iter()
        .any(|(base, probed)| (base - probed).abs() > 0.5)
}
