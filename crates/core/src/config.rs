//! Engine configuration
//!
//! Defaults match the shipped game: a 10x20 board, 30 lines per level, a 100 fps
//! loop, one forced advance per second at level 0 and a 15% speed-up per level.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{ensure, Result};

use crate::types::{
    BOARD_HEIGHT, BOARD_WIDTH, FRAME_RATE, INCREMENT_PER_LEVEL, INITIAL_MOVE_TIME_MS,
    LINES_PER_LEVEL,
};

/// Board geometry and speed curve parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub lines_per_level: u32,
    /// Game loop ticks per second
    pub frame_rate: u32,
    /// Forced advance interval at level 0
    pub initial_move_time_ms: u32,
    /// Fraction of `initial_move_time_ms` removed per level
    pub increment_per_level: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            lines_per_level: LINES_PER_LEVEL,
            frame_rate: FRAME_RATE,
            initial_move_time_ms: INITIAL_MOVE_TIME_MS,
            increment_per_level: INCREMENT_PER_LEVEL,
        }
    }
}

impl GameConfig {
    /// Create from environment variables, keeping the default for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        use std::env;

        fn var<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            width: var("TETROMINO_WIDTH").unwrap_or(defaults.width),
            height: var("TETROMINO_HEIGHT").unwrap_or(defaults.height),
            lines_per_level: var("TETROMINO_LINES_PER_LEVEL").unwrap_or(defaults.lines_per_level),
            frame_rate: var("TETROMINO_FRAME_RATE").unwrap_or(defaults.frame_rate),
            initial_move_time_ms: var("TETROMINO_INITIAL_MOVE_MS")
                .unwrap_or(defaults.initial_move_time_ms),
            increment_per_level: var("TETROMINO_INCREMENT_PER_LEVEL")
                .unwrap_or(defaults.increment_per_level),
        }
    }

    /// Reject configurations that would corrupt the grid or stall the loop.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "board dimensions must be positive, got {}x{}",
            self.width,
            self.height
        );
        ensure!(self.lines_per_level > 0, "lines_per_level must be positive");
        ensure!(
            self.frame_rate > 0 && self.frame_rate <= 1000,
            "frame_rate must be within 1..=1000, got {}",
            self.frame_rate
        );
        ensure!(
            self.increment_per_level.is_finite() && self.increment_per_level >= 0.0,
            "increment_per_level must be a non-negative number, got {}",
            self.increment_per_level
        );
        Ok(())
    }

    /// Tick interval in milliseconds, fractional for rates that don't divide 1000
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.frame_rate.max(1) as f64
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }
}

/// RNG seed from `TETROMINO_SEED`, falling back to the wall clock.
pub fn seed_from_env() -> u32 {
    std::env::var("TETROMINO_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(clock_seed)
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_ms(), 10.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn tick_keeps_fractional_milliseconds() {
        let config = GameConfig {
            frame_rate: 60,
            ..GameConfig::default()
        };
        assert!((config.tick_ms() - 1000.0 / 60.0).abs() < 1e-9);
        let nanos = config.tick_interval().as_nanos();
        assert!((16_666_666..=16_666_667).contains(&nanos), "{nanos}");
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = GameConfig {
            width: 0,
            ..GameConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("board dimensions"));
    }

    #[test]
    fn zero_lines_per_level_is_rejected() {
        let config = GameConfig {
            lines_per_level: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        let config = GameConfig {
            frame_rate: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_increment_is_rejected() {
        let config = GameConfig {
            increment_per_level: -0.1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
