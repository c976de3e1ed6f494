//! Shapes module - tetromino templates
//!
//! A shape is a row-major occupancy bitmap plus a fill color. Shapes are plain
//! values: every piece owns its own copy, so rotating a piece never touches the
//! template it was sampled from.

use anyhow::{ensure, Result};

use crate::types::{Color, EMPTY};

/// Occupancy bitmap and color of one tetromino variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    width: usize,
    height: usize,
    /// Row-major cells (y * width + x)
    cells: Vec<bool>,
    color: Color,
}

impl Shape {
    /// Create a shape, checking that the bitmap matches the dimensions.
    pub fn new(width: usize, height: usize, cells: Vec<bool>, color: Color) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "shape dimensions must be positive, got {}x{}",
            width,
            height
        );
        ensure!(
            cells.len() == width * height,
            "shape bitmap has {} cells, expected {}x{} = {}",
            cells.len(),
            width,
            height,
            width * height
        );
        ensure!(cells.iter().any(|&c| c), "shape has no occupied cells");
        ensure!(color != EMPTY, "shape color must be nonzero");
        Ok(Self {
            width,
            height,
            cells,
            color,
        })
    }

    /// Build a shape from text rows, `#` marking occupied cells.
    ///
    /// ```
    /// use tetromino_core::Shape;
    ///
    /// let s = Shape::from_rows(&[".##", "##."], 0x00ff00).unwrap();
    /// assert_eq!((s.width(), s.height()), (3, 2));
    /// assert!(s.is_occupied(1, 0));
    /// assert!(!s.is_occupied(0, 0));
    /// ```
    pub fn from_rows(rows: &[&str], color: Color) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        ensure!(
            rows.iter().all(|r| r.chars().count() == width),
            "shape rows must all have the same length"
        );
        let cells = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Self::new(width, height, cells, color)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Whether local cell (x, y) is filled; false outside the shape.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Local coordinates of every filled cell, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &filled)| filled)
            .map(move |(i, _)| (i % w, i / w))
    }

    /// Rotate 90° counter-clockwise: (x, y) moves to (y, width - 1 - x).
    pub fn rotated_left(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let mut cells = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                let (rx, ry) = (y, w - 1 - x);
                cells[ry * h + rx] = self.cells[y * w + x];
            }
        }
        Self {
            width: h,
            height: w,
            cells,
            color: self.color,
        }
    }

    /// Rotate 90° clockwise: (x, y) moves to (height - 1 - y, x).
    pub fn rotated_right(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let mut cells = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                let (rx, ry) = (h - 1 - y, x);
                cells[ry * h + rx] = self.cells[y * w + x];
            }
        }
        Self {
            width: h,
            height: w,
            cells,
            color: self.color,
        }
    }
}

/// Spawn orientations of the seven shipped tetrominoes
const STANDARD_TEMPLATES: [(&[&str], Color); 7] = [
    (&["####"], 0xff0000),
    (&["##", "##"], 0x0000ff),
    (&[".##", "##."], 0x00ff00),
    (&["##.", ".##"], 0x00ffff),
    (&["###", "#.."], 0xff00ff),
    (&["###", "..#"], 0xff7f00),
    (&["###", ".#."], 0xffff00),
];

/// The seven shipped tetrominoes, in spawn orientation.
pub fn standard_shapes() -> Vec<Shape> {
    STANDARD_TEMPLATES
        .iter()
        .filter_map(|(rows, color)| Shape::from_rows(rows, *color).ok())
        .collect()
}

/// Largest width and height across a shape set (next-piece preview layout).
pub fn max_extent(shapes: &[Shape]) -> (usize, usize) {
    shapes.iter().fold((0, 0), |(w, h), s| {
        (w.max(s.width()), h.max(s.height()))
    })
}
