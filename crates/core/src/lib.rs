//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the game rules and the board engine. It has no
//! dependencies on terminals, sockets, or async runtimes:
//!
//! - **Deterministic**: Same seed and same tick sequence produce identical games
//! - **Testable**: The tick timer is a trait, so tests drive `tick` by hand
//! - **Portable**: Rendering and notifications go through sink traits
//!
//! # Module Structure
//!
//! - [`board`]: Grid of packed colors with placement checks and line clearing
//! - [`shape`]: Shape templates and pure rotations
//! - [`piece`]: A positioned piece with a floating-point center
//! - [`queue`]: Bounded input FIFO (capacity 1 in the shipped game)
//! - [`scoring`]: Line clear points, levels, and the speed curve
//! - [`game_state`]: The engine: lifecycle, tick loop, locking, notifications
//! - [`observer`]: Render sink and lifecycle observer traits
//! - [`timer`]: Cancellable tick scheduling
//! - [`rng`]: Seeded uniform piece selection
//!
//! # Game Rules
//!
//! - **Spawn**: New pieces are centered on the top edge; part of a piece may sit
//!   above the board
//! - **Rotation**: Pure 90 degree rotations about the piece center, no wall kicks
//! - **Lock**: A piece locks the moment a forced advance fails
//! - **Scoring**: 0/100/300/500/800 points for 0..4+ lines, times (level + 1)
//! - **Speed**: Each level removes 15% of the initial one-second interval
//!
//! # Example
//!
//! ```
//! use tetromino_core::{GameConfig, GameState, TickOutcome};
//! use tetromino_core::types::{GamePhase, InputEvent};
//!
//! let mut game = GameState::new(GameConfig::default(), 12345).unwrap();
//! game.start();
//! assert_eq!(game.phase(), GamePhase::Running);
//!
//! game.set_input_event(InputEvent::MOVE_LEFT);
//! assert_eq!(game.tick(10), TickOutcome::Continued);
//!
//! // A full second of ticks forces one advance.
//! assert_eq!(game.tick(1000), TickOutcome::Advanced);
//! ```
//!
//! # Timing
//!
//! - **Tick Rate**: 10ms (100 frames per second)
//! - **Gravity**: 1000ms at level 0, shrinking per level, never below one tick
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every tick with the elapsed time.

pub mod board;
pub mod config;
pub mod game_state;
pub mod observer;
pub mod piece;
pub mod queue;
pub mod rng;
pub mod scoring;
pub mod shape;
pub mod timer;

pub use tetromino_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{seed_from_env, GameConfig};
pub use game_state::{GameState, TickOutcome};
pub use observer::{GameObserver, NoopSink, RenderSink};
pub use piece::Piece;
pub use queue::{EventQueue, InputQueue};
pub use rng::SimpleRng;
pub use scoring::{level_for_lines, line_clear_score, move_interval_ms};
pub use shape::{max_extent, standard_shapes, Shape};
pub use timer::{ManualScheduler, TickHandle, TickScheduler};
