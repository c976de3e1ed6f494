//! Input module (engine-facing).
//!
//! Turns device input into the engine's [`InputEvent`](crate::types::InputEvent)
//! bitmask. Independent of any UI framework: keys come in as `crossterm` events,
//! touches as plain coordinates.
//!
//! - [`keys`]: key to bit mapping and control keys (start/pause, quit)
//! - [`held`]: held-key mask with auto-release for terminals without key-release events
//! - [`touch`]: tap-to-rotate and swipe-to-move gestures

pub mod held;
pub mod keys;
pub mod touch;

pub use tetromino_types as types;

pub use held::KeyState;
pub use keys::{control_key, key_event_bit, should_quit, ControlKey};
pub use touch::{TouchEvent, TouchGestures, TouchPhase, DEFAULT_MOVE_THRESHOLD};
