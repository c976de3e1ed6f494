//! Adapter module - host bridge over a TCP socket with a JSON protocol
//!
//! This module lets an embedding host (a WebView page, a test harness, a
//! script) drive the engine remotely and receive its frames. The host plays the
//! role of the input layer and the renderer; the engine runs here on a tokio
//! interval timer.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Host connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Greeting**: Server sends `welcome` with board and preview sizes
//! 3. **Commanding**: Host sends lifecycle commands and input
//! 4. **Streaming**: Server pushes frames and notifications as they happen
//!
//! Only one host is served at a time; each connection gets a fresh engine.
//!
//! # Message Types
//!
//! ## Host → Engine
//!
//! - **start** / **stop**: begin a new game, end the current one
//! - **set_paused** / **toggle**: pause control; toggle starts a game when none is running
//! - **input**: held input bitmask (`events`) and/or names (`names`)
//! - **touch**: raw touch events, recognized as taps and swipes
//! - **trigger_render**: resend the board and next piece now
//!
//! ## Engine → Host
//!
//! - **welcome**: protocol version, board size, preview box size
//! - **render**: full board of `0xRRGGBB` cells
//! - **next_piece**: next piece occupancy and color (0x0 when hidden)
//! - **started**, **paused_changed**, **game_over**
//! - **lines_changed**, **level_changed**, **score_changed**
//! - **error**: malformed input, or `busy` when another host is attached
//!
//! # Environment Variables
//!
//! - `TETROMINO_BRIDGE_HOST`: Bind address (default: "127.0.0.1")
//! - `TETROMINO_BRIDGE_PORT`: Port number (default: 7878)
//! - `TETROMINO_BRIDGE_MAX_PENDING`: Host command backlog (default: 16)
//! - `TETROMINO_SEED`: Fixed RNG seed for every game
//!
//! # Example Protocol Flow
//!
//! ```text
//! Server -> Host: {"type":"welcome","protocol_version":"1.0.0","board":{"width":10,"height":20},"preview":{"width":4,"height":2}}
//! Host -> Server: {"type":"start"}
//! Server -> Host: {"type":"lines_changed","lines":0}
//! Server -> Host: {"type":"next_piece","width":3,"height":2,"cells":[1,1,1,0,1,0],"color":16776960}
//! Server -> Host: {"type":"started"}
//! Host -> Server: {"type":"input","events":2}
//! Server -> Host: {"type":"render","width":10,"height":20,"cells":[0,0,...]}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"toggle"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod scheduler;
pub mod server;

pub use tetromino_core as core;
pub use tetromino_input as input;
pub use tetromino_types as types;

pub use protocol::*;
pub use runtime::{GameRuntime, HostCommand, MessageSink};
pub use scheduler::{IntervalScheduler, TickReceiver, TickSignal};
pub use server::{run_server, ServerConfig};
