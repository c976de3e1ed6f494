//! Engine sinks that feed the terminal view.
//!
//! [`HudSink`] implements both [`RenderSink`] and [`GameObserver`] and writes
//! into a shared [`HudState`]. Register one clone as the render sink and one as
//! an observer; the draw loop locks the state and renders it each frame.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{GameObserver, RenderSink};
use crate::game_view::{HudState, NextPreview};
use crate::types::{Color, GamePhase};

/// HUD state shared between the engine sinks and the draw loop
pub type SharedHud = Arc<Mutex<HudState>>;

#[derive(Debug, Clone)]
pub struct HudSink {
    hud: SharedHud,
}

impl HudSink {
    pub fn new(hud: SharedHud) -> Self {
        Self { hud }
    }

    pub fn hud(&self) -> &SharedHud {
        &self.hud
    }

    /// Lock the state. A poisoned lock still yields the data: the HUD is plain
    /// values and stays drawable.
    fn state(&self) -> MutexGuard<'_, HudState> {
        self.hud.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderSink for HudSink {
    fn render(&mut self, width: usize, height: usize, cells: &[Color]) {
        let mut hud = self.state();
        hud.board_width = width;
        hud.board_height = height;
        hud.cells.clear();
        hud.cells.extend_from_slice(cells);
    }

    fn next_piece_changed(&mut self, width: usize, height: usize, cells: &[bool], color: Color) {
        let mut hud = self.state();
        hud.next = NextPreview {
            width,
            height,
            cells: cells.to_vec(),
            color,
        };
    }
}

impl GameObserver for HudSink {
    fn started(&mut self) {
        self.state().phase = GamePhase::Running;
    }

    fn paused_changed(&mut self, paused: bool) {
        let mut hud = self.state();
        if hud.phase.is_active() {
            hud.phase = if paused {
                GamePhase::Paused
            } else {
                GamePhase::Running
            };
        }
    }

    fn game_over(&mut self) {
        self.state().phase = GamePhase::GameOver;
    }

    fn lines_changed(&mut self, lines: u32) {
        self.state().lines = lines;
    }

    fn level_changed(&mut self, level: u32) {
        self.state().level = level;
    }

    fn score_changed(&mut self, score: u32) {
        self.state().score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_phase_transitions() {
        let hud: SharedHud = Arc::new(Mutex::new(HudState::new(10, 20, (4, 2))));
        let mut sink = HudSink::new(Arc::clone(&hud));

        // Pausing before the first start is not shown.
        sink.paused_changed(true);
        assert_eq!(hud.lock().unwrap().phase, GamePhase::Idle);

        sink.started();
        sink.paused_changed(true);
        assert_eq!(hud.lock().unwrap().phase, GamePhase::Paused);
        sink.paused_changed(false);
        sink.score_changed(300);
        sink.game_over();

        let state = hud.lock().unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 300);
    }

    #[test]
    fn render_replaces_cells() {
        let hud: SharedHud = Arc::new(Mutex::new(HudState::new(2, 1, (1, 1))));
        let mut sink = HudSink::new(Arc::clone(&hud));
        sink.render(2, 1, &[0xff0000, 0]);
        sink.next_piece_changed(1, 1, &[true], 0x00ff00);

        let state = hud.lock().unwrap();
        assert_eq!(state.cells, vec![0xff0000, 0]);
        assert_eq!(state.next.color, 0x00ff00);
    }
}
