//! Piece module - a live, positioned tetromino
//!
//! A piece owns its shape and a floating-point center. Keeping the center as a
//! float means rotating an odd-sized shape into an even-sized one (and back)
//! leaves the piece visually anchored where it was.

use crate::shape::Shape;

/// Falling tetromino: owned shape copy plus center position
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    shape: Shape,
    cx: f64,
    cy: f64,
    board_width: usize,
    board_height: usize,
}

impl Piece {
    /// Spawn a piece horizontally centered on the top edge of the board.
    pub fn new(board_width: usize, board_height: usize, shape: &Shape) -> Self {
        Self {
            shape: shape.clone(),
            cx: board_width as f64 / 2.0,
            cy: 0.0,
            board_width,
            board_height,
        }
    }

    /// Same piece, re-centered at (cx, cy).
    pub fn with_center(mut self, cx: f64, cy: f64) -> Self {
        self.cx = cx;
        self.cy = cy;
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn center(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    pub fn move_left(&mut self) {
        self.cx -= 1.0;
    }

    pub fn move_right(&mut self) {
        self.cx += 1.0;
    }

    pub fn advance(&mut self) {
        self.cy += 1.0;
    }

    pub fn rotate_left(&mut self) {
        self.shape = self.shape.rotated_left();
    }

    pub fn rotate_right(&mut self) {
        self.shape = self.shape.rotated_right();
    }

    /// Top-left cell of the shape on the board. May lie outside the board.
    pub fn position(&self) -> (i32, i32) {
        let x = (self.cx - self.shape.width() as f64 / 2.0).floor() as i32;
        let y = (self.cy - self.shape.height() as f64 / 2.0).floor() as i32;
        (x, y)
    }

    /// [`Piece::position`] clamped inside the board. Display only.
    pub fn visual_position(&self) -> (i32, i32) {
        let (x, y) = self.position();
        let max_x = self.board_width as i32 - self.shape.width() as i32;
        let max_y = self.board_height as i32 - self.shape.height() as i32;
        (x.max(0).min(max_x), y.max(0).min(max_y))
    }

    /// Board coordinates of every filled cell at the current position.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (px, py) = self.position();
        self.shape
            .occupied()
            .map(move |(x, y)| (px + x as i32, py + y as i32))
    }
}
