//! Board module - manages the game grid
//!
//! The board is a width x height grid of packed colors (0 = empty). Uses a flat
//! row-major array for cache locality. Coordinates: (x, y) with x growing to the
//! right and y growing downwards, row 0 at the top.
//!
//! The falling piece is never stored here: it is composited on top for viewing
//! and written in only when it locks.

use crate::piece::Piece;
use crate::types::{Color, EMPTY};

/// The static grid of locked cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Color>,
}

impl Board {
    /// Create a new empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = color;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(c) if c != EMPTY)
    }

    /// Whether `piece` may sit at its current position.
    ///
    /// Horizontal bounds and the bottom edge are enforced; there is no upper bound,
    /// so rows above the board count as empty. That lets spawn and rotation be
    /// evaluated partially above row 0.
    pub fn can_place(&self, piece: &Piece) -> bool {
        let (x, y) = piece.position();
        let shape = piece.shape();

        if x < 0
            || x > self.width as i32 - shape.width() as i32
            || y > self.height as i32 - shape.height() as i32
        {
            return false;
        }

        piece.cells().all(|(cx, cy)| cy < 0 || !self.is_occupied(cx, cy))
    }

    /// Write the piece's cells into the grid. Cells above the board are dropped.
    pub fn lock_piece(&mut self, piece: &Piece) {
        let color = piece.shape().color();
        for (x, y) in piece.cells() {
            self.set(x, y, color);
        }
    }

    /// Copy of the grid with `piece` drawn on top.
    pub fn composite(&self, piece: Option<&Piece>) -> Vec<Color> {
        let mut view = self.cells.clone();
        if let Some(piece) = piece {
            let color = piece.shape().color();
            for (x, y) in piece.cells() {
                if let Some(idx) = self.index(x, y) {
                    view[idx] = color;
                }
            }
        }
        view
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height {
            return false;
        }
        let start = y * self.width;
        self.cells[start..start + self.width]
            .iter()
            .all(|&c| c != EMPTY)
    }

    /// Clear a row and shift all rows above down by one, emptying row 0.
    pub fn clear_row(&mut self, y: usize) {
        if y >= self.height {
            return;
        }

        let width = self.width;
        for row in (1..=y).rev() {
            let src = (row - 1) * width;
            self.cells.copy_within(src..src + width, row * width);
        }
        self.cells[..width].fill(EMPTY);
    }

    /// Remove every filled row, bottom to top, and return how many were removed.
    ///
    /// After a row is cleared the same index is examined again, since the row
    /// above has just moved into it. Stacked clears are therefore all resolved
    /// in one pass.
    pub fn clear_lines(&mut self) -> u32 {
        let mut lines = 0;
        let mut y = self.height;

        while y > 0 {
            if self.is_row_full(y - 1) {
                self.clear_row(y - 1);
                lines += 1;
            } else {
                y -= 1;
            }
        }

        lines
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }
}
