//! Logging setup shared by the binaries.
//!
//! `TETROMINO_LOG` picks the level (error, warn, info, debug, trace).
//! `TETROMINO_LOG_FILE` sends output to a file instead of stderr; the terminal
//! game only logs when it is set, since the screen belongs to the game.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub target: LogTarget,
}

impl LogConfig {
    /// Read `TETROMINO_LOG` and `TETROMINO_LOG_FILE`. Without a file, logs go to
    /// `fallback`.
    pub fn from_env(default_level: Level, fallback: LogTarget) -> Self {
        let level = std::env::var("TETROMINO_LOG")
            .ok()
            .and_then(|s| Level::from_str(s.trim()).ok())
            .unwrap_or(default_level);
        let target = std::env::var("TETROMINO_LOG_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|s| LogTarget::File(PathBuf::from(s)))
            .unwrap_or(fallback);
        Self { level, target }
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = LevelFilter::from_level(config.level);
    match &config.target {
        LogTarget::Off => {}
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
                .context("failed to install log subscriber")?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init()
                .context("failed to install log subscriber")?;
        }
    }
    Ok(())
}
