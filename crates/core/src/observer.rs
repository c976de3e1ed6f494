//! Outbound notifications: render sink and lifecycle/scoring observers
//!
//! Both traits have no-op defaults so an implementor only overrides what it
//! consumes. The engine holds them as optional boxed trait objects and skips the
//! call entirely when none is registered.

use crate::types::Color;

/// Consumer of board frames and next-piece previews
pub trait RenderSink {
    /// Full board, row-major, `width * height` packed colors (0 = empty).
    fn render(&mut self, _width: usize, _height: usize, _cells: &[Color]) {}

    /// Next piece preview. A `0x0` payload with no cells means "no preview"
    /// (idle or paused).
    fn next_piece_changed(&mut self, _width: usize, _height: usize, _cells: &[bool], _color: Color) {
    }
}

/// Lifecycle and scoring notifications
pub trait GameObserver {
    fn started(&mut self) {}

    fn paused_changed(&mut self, _paused: bool) {}

    fn game_over(&mut self) {}

    fn lines_changed(&mut self, _lines: u32) {}

    fn level_changed(&mut self, _level: u32) {}

    fn score_changed(&mut self, _score: u32) {}
}

/// Default: discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl RenderSink for NoopSink {}

impl GameObserver for NoopSink {}
