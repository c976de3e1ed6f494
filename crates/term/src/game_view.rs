//! GameView: maps the engine's pushed state into a terminal framebuffer.
//!
//! The engine does not expose its internals to the view. Everything drawn here
//! arrives through the render sink and observer callbacks and is collected in a
//! [`HudState`] (see [`crate::sink`]).
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::fb::{FrameBuffer, Style};
use crate::types::{Color, GamePhase, EMPTY};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Next piece preview as last pushed by the engine. Empty when 0x0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextPreview {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
    pub color: Color,
}

impl NextPreview {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Everything the view draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudState {
    pub board_width: usize,
    pub board_height: usize,
    /// Row-major packed colors, `board_width * board_height`
    pub cells: Vec<Color>,
    pub next: NextPreview,
    /// Preview box size, large enough for any shape
    pub preview_size: (usize, usize),
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub phase: GamePhase,
}

impl HudState {
    pub fn new(board_width: usize, board_height: usize, preview_size: (usize, usize)) -> Self {
        Self {
            board_width,
            board_height,
            cells: vec![EMPTY; board_width * board_height],
            next: NextPreview::default(),
            preview_size,
            score: 0,
            level: 0,
            lines: 0,
            phase: GamePhase::Idle,
        }
    }

    fn cell(&self, x: usize, y: usize) -> Color {
        self.cells
            .get(y * self.board_width + x)
            .copied()
            .unwrap_or(EMPTY)
    }
}

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

const PLAY_BG: Color = 0x1e1e28;
const FIELD: Style = Style::new(0x50505a, PLAY_BG);
const GRID_DOT: Style = Style::new(0x5a5a64, PLAY_BG).dim();
const BORDER: Style = Style::new(0xc8c8c8, 0x000000);
const PREVIEW_FRAME: Style = Style::new(0x787882, 0x000000);
const LABEL: Style = Style::new(0xdcdcdc, 0x000000).bold();
const VALUE: Style = Style::new(0xc8c8c8, 0x000000);
const OVERLAY: Style = Style::new(0xffffff, 0x000000).bold();

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w,
            cell_h,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render the HUD into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(&self, hud: &HudState, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Style::default());

        let board_px_w = (hud.board_width as u16).saturating_mul(self.cell_w);
        let board_px_h = (hud.board_height as u16).saturating_mul(self.cell_h);
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };


        // Background for play area.
        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', FIELD);

        // Border.
        draw_border(fb, start_x, start_y, frame_w, frame_h, BORDER);

        // Board cells, falling piece already composited in.
        for y in 0..hud.board_height {
            for x in 0..hud.board_width {
                let color = hud.cell(x, y);
                let (px, py) = self.cell_origin(start_x + 1, start_y + 1, x as u16, y as u16);
                if color == EMPTY {
                    self.draw_empty_cell(fb, px, py);
                } else {
                    self.draw_block(fb, px, py, color);
                }
            }
        }

        self.draw_side_panel(fb, hud, viewport, start_x, start_y, frame_w);

        // Overlays.
        match hud.phase {
            GamePhase::Idle => {
                draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "PRESS ENTER")
            }
            GamePhase::Paused => draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "PAUSED"),
            GamePhase::GameOver => {
                draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER")
            }
            GamePhase::Running => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, hud: &HudState, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(hud, viewport, &mut fb);
        fb
    }

    fn cell_origin(&self, origin_x: u16, origin_y: u16, x: u16, y: u16) -> (u16, u16) {
        (
            origin_x.saturating_add(x.saturating_mul(self.cell_w)),
            origin_y.saturating_add(y.saturating_mul(self.cell_h)),
        )
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, px: u16, py: u16) {
        fb.fill_rect(px, py, self.cell_w, self.cell_h, '·', GRID_DOT);
    }

    fn draw_block(&self, fb: &mut FrameBuffer, px: u16, py: u16, color: Color) {
        let style = Style::new(color, PLAY_BG).bold();
        fb.fill_rect(px, py, self.cell_w, self.cell_h, '█', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        hud: &HudState,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 10 {
            return;
        }


        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", LABEL);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, hud.score, VALUE);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LEVEL", LABEL);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, hud.level, VALUE);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "LINES", LABEL);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, hud.lines, VALUE);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "NEXT", LABEL);
        y = y.saturating_add(1);
        self.draw_preview(fb, hud, panel_x, y);
    }

    /// Next piece centered in a box sized for the largest shape.
    fn draw_preview(&self, fb: &mut FrameBuffer, hud: &HudState, x: u16, y: u16) {
        let (box_w, box_h) = hud.preview_size;
        let box_px_w = (box_w as u16).saturating_mul(self.cell_w);
        let box_px_h = (box_h as u16).saturating_mul(self.cell_h);
        draw_border(fb, x, y, box_px_w + 2, box_px_h + 2, PREVIEW_FRAME);

        let next = &hud.next;
        if next.is_empty() {
            return;
        }
        let off_x = box_w.saturating_sub(next.width) / 2;
        let off_y = box_h.saturating_sub(next.height) / 2;
        for ny in 0..next.height {
            for nx in 0..next.width {
                if !next.cells.get(ny * next.width + nx).copied().unwrap_or(false) {
                    continue;
                }
                let (px, py) =
                    self.cell_origin(x + 1, y + 1, (off_x + nx) as u16, (off_y + ny) as u16);
                self.draw_block(fb, px, py, next.color);
            }
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: Style) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(
    fb: &mut FrameBuffer,
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
    text: &str,
) {
    let mid_y = start_y.saturating_add(frame_h / 2);
    let text_w = text.chars().count() as u16;
    let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
    fb.put_str(x, mid_y, text, OVERLAY);
}
