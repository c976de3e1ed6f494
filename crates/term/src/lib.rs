//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It intentionally avoids widget/layout libraries and instead renders into a
//! simple framebuffer that can be flushed to a terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Draw only what the engine pushes through its sinks
//! - Allow precise control over aspect ratio (e.g. 2 chars wide per cell)

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod sink;

pub use tetromino_core as core;
pub use tetromino_types as types;

pub use fb::{Cell, FrameBuffer, Style, Weight};
pub use game_view::{AnchorY, GameView, HudState, NextPreview, Viewport};
pub use renderer::{encode_frame, TerminalRenderer};
pub use sink::{HudSink, SharedHud};
