//! Scoring module - line clear points, levels and the speed curve

use crate::types::LINE_SCORES;

/// Points for one lock event.
/// lines: rows cleared by the lock (4 or more score as 4)
/// level: current level (0-based), after the lock's lines were counted
pub fn line_clear_score(lines: u32, level: u32) -> u32 {
    let index = (lines as usize).min(LINE_SCORES.len() - 1);
    LINE_SCORES[index].saturating_mul(level.saturating_add(1))
}

/// Level for a running line total
pub fn level_for_lines(total_lines: u32, lines_per_level: u32) -> u32 {
    total_lines / lines_per_level.max(1)
}

/// Milliseconds between forced advances at `level`.
///
/// Shrinks by `increment_per_level` of the initial time per level and never drops
/// below one tick, so the loop is never asked to advance faster than it runs.
pub fn move_interval_ms(
    initial_move_time_ms: u32,
    increment_per_level: f64,
    level: u32,
    tick_ms: f64,
) -> f64 {
    let scaled = initial_move_time_ms as f64 * (1.0 - increment_per_level * level as f64);
    scaled.max(tick_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scores() {
        // Level 0
        assert_eq!(line_clear_score(0, 0), 0);
        assert_eq!(line_clear_score(1, 0), 100);
        assert_eq!(line_clear_score(2, 0), 300);
        assert_eq!(line_clear_score(3, 0), 500);
        assert_eq!(line_clear_score(4, 0), 800);

        // Level 2
        assert_eq!(line_clear_score(1, 2), 100 * 3);
        assert_eq!(line_clear_score(3, 2), 500 * 3);
    }

    #[test]
    fn test_more_than_four_lines_scores_as_four() {
        assert_eq!(line_clear_score(5, 1), 800 * 2);
        assert_eq!(line_clear_score(20, 0), 800);
    }

    #[test]
    fn test_zero_lines_scores_nothing_at_any_level() {
        assert_eq!(line_clear_score(0, 9), 0);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(level_for_lines(0, 30), 0);
        assert_eq!(level_for_lines(29, 30), 0);
        assert_eq!(level_for_lines(30, 30), 1);
        assert_eq!(level_for_lines(95, 30), 3);
        assert_eq!(level_for_lines(25, 10), 2);
    }

    #[test]
    fn test_move_interval_curve() {
        assert_eq!(move_interval_ms(1000, 0.15, 0, 10.0), 1000.0);
        assert!((move_interval_ms(1000, 0.15, 1, 10.0) - 850.0).abs() < 1e-9);
        assert!((move_interval_ms(1000, 0.15, 4, 10.0) - 400.0).abs() < 1e-9);
        assert!((move_interval_ms(1000, 0.15, 6, 10.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_interval_is_floored_at_one_tick() {
        // 1 - 0.15 * 7 is negative.
        assert_eq!(move_interval_ms(1000, 0.15, 7, 10.0), 10.0);
        assert_eq!(move_interval_ms(1000, 0.15, 100, 10.0), 10.0);

        // 60 fps floors at 16.67ms, not a truncated 16.
        let tick = 1000.0 / 60.0;
        assert_eq!(move_interval_ms(1000, 0.15, 7, tick), tick);
    }
}
