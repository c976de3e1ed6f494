//! Tetromino (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so the binaries, tests and
//! benches can use `tetromino::{core,adapter,term,input,types}`.

pub mod logging;

pub use tetromino_adapter as adapter;
pub use tetromino_core as core;
pub use tetromino_input as input;
pub use tetromino_term as term;
pub use tetromino_types as types;
