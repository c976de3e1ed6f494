//! Core types module - shared data structures and constants
//!
//! Plain data used by every layer of the game: the engine, the terminal front-end
//! and the host bridge. Nothing here depends on I/O.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn**: pieces spawn with their center at (width / 2, 0)
//!
//! # Game Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FRAME_RATE` | 100 | Game loop ticks per second |
//! | `TICK_MS` | 10 | Fixed tick interval |
//! | `INITIAL_MOVE_TIME_MS` | 1000 | Forced advance interval at level 0 |
//! | `INCREMENT_PER_LEVEL` | 0.15 | Move interval shrink per level |
//! | `LINES_PER_LEVEL` | 30 | Lines needed for each level-up |
//!
//! # Examples
//!
//! ```
//! use tetromino_types::{InputEvent, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! // Simultaneous key holds combine into one event.
//! let event = InputEvent::MOVE_LEFT | InputEvent::ROTATE_RIGHT;
//! assert!(event.contains(InputEvent::MOVE_LEFT));
//! assert!(!event.contains(InputEvent::ADVANCE));
//! assert_eq!(event.bits(), 0x12);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use bitflags::bitflags;

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Game loop ticks per second
pub const FRAME_RATE: u32 = 100;

/// Fixed tick interval in milliseconds (1000 / 100 fps)
pub const TICK_MS: u32 = 1000 / FRAME_RATE;

/// Forced advance interval at level 0 (one row per second)
pub const INITIAL_MOVE_TIME_MS: u32 = 1000;

/// Fraction of the initial move time removed per level
pub const INCREMENT_PER_LEVEL: f64 = 0.15;

/// Cleared lines needed for each level-up
pub const LINES_PER_LEVEL: u32 = 30;

/// Capacity of the input event queue between ticks
pub const EVENT_QUEUE_CAPACITY: usize = 1;

/// Line clear scoring table, indexed by cleared lines (4 or more use the last entry).
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Packed `0xRRGGBB` cell color. `0` is an empty cell.
pub type Color = u32;

/// Empty cell value
pub const EMPTY: Color = 0;

/// Split a packed color into its (r, g, b) channels.
///
/// ```
/// assert_eq!(tetromino_types::unpack_rgb(0xff7f00), (0xff, 0x7f, 0x00));
/// ```
pub fn unpack_rgb(color: Color) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xff) as u8,
        ((color >> 8) & 0xff) as u8,
        (color & 0xff) as u8,
    )
}

bitflags! {
    /// Combinable set of input requests consumed by one game tick.
    ///
    /// This is a flag set rather than an enum: an input source ORs together every
    /// key that is currently held, and the engine applies each present bit in a
    /// fixed order.
    ///
    /// ```
    /// use tetromino_types::InputEvent;
    ///
    /// assert_eq!(InputEvent::from_bits_truncate(0x3), InputEvent::ADVANCE | InputEvent::MOVE_LEFT);
    /// assert_eq!(InputEvent::from_bits_truncate(0xe0), InputEvent::NONE);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputEvent: u8 {
        const ADVANCE = 0x1;
        const MOVE_LEFT = 0x2;
        const MOVE_RIGHT = 0x4;
        const ROTATE_LEFT = 0x8;
        const ROTATE_RIGHT = 0x10;
    }
}

const EVENT_NAMES: [(InputEvent, &str); 6] = [
    (InputEvent::NONE, "none"),
    (InputEvent::ADVANCE, "advance"),
    (InputEvent::MOVE_LEFT, "moveLeft"),
    (InputEvent::MOVE_RIGHT, "moveRight"),
    (InputEvent::ROTATE_LEFT, "rotateLeft"),
    (InputEvent::ROTATE_RIGHT, "rotateRight"),
];

impl InputEvent {
    pub const NONE: Self = Self::empty();

    /// Every defined bit, in the order the engine applies them.
    ///
    /// Each entry is a single bit, so `contains` against it never matches an
    /// empty set.
    pub const ORDERED: [Self; 5] = [
        Self::ADVANCE,
        Self::MOVE_LEFT,
        Self::MOVE_RIGHT,
        Self::ROTATE_LEFT,
        Self::ROTATE_RIGHT,
    ];

    /// Parse a single event name (case-insensitive).
    ///
    /// ```
    /// use tetromino_types::InputEvent;
    ///
    /// assert_eq!(InputEvent::from_name("rotateLeft"), Some(InputEvent::ROTATE_LEFT));
    /// assert_eq!(InputEvent::from_name("none"), Some(InputEvent::NONE));
    /// assert_eq!(InputEvent::from_name("hardDrop"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        EVENT_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|&(event, _)| event)
    }

    /// camelCase name of a single-bit event
    pub fn name(self) -> Option<&'static str> {
        EVENT_NAMES
            .iter()
            .find(|&&(event, _)| event == self)
            .map(|&(_, name)| name)
    }
}

/// Lifecycle of one game engine.
///
/// Idle → Running ⇄ Paused, Running → GameOver. A new start returns to Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Created but never started
    Idle,
    /// Tick timer active, pieces falling
    Running,
    /// Tick timer active, game frozen
    Paused,
    /// Spawn blocked (or stopped); terminal until the next start
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game_over",
        }
    }

    /// Whether a run is in progress (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::Paused)
    }
}
