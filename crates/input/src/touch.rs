//! Touch gestures mapped to input bits.
//!
//! A tap rotates (one finger left, two fingers right) and fires on release, so a
//! tap that turns into a swipe never rotates. A swipe past the threshold emits a
//! single move along its dominant axis: left, right, or down (advance). Swiping up
//! does nothing.

use crate::types::InputEvent;

/// Distance a touch has to travel before it counts as a swipe
pub const DEFAULT_MOVE_THRESHOLD: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One touch event, positioned at the first finger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Fingers down
    pub touches: usize,
    pub x: f32,
    pub y: f32,
}

/// Touch gesture recognizer
#[derive(Debug, Clone)]
pub struct TouchGestures {
    threshold: f32,
    last_x: f32,
    last_y: f32,
    events: InputEvent,
}

impl Default for TouchGestures {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchGestures {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_MOVE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            last_x: 0.0,
            last_y: 0.0,
            events: InputEvent::NONE,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Feed one touch event. Returns the mask to send, if any.
    pub fn handle(&mut self, event: TouchEvent) -> Option<InputEvent> {
        if event.touches == 0 && matches!(event.phase, TouchPhase::Start | TouchPhase::Move) {
            return None;
        }
        match event.phase {
            TouchPhase::Start => {
                self.touch_start(event.touches, event.x, event.y);
                None
            }
            TouchPhase::Move => self.touch_move(event.x, event.y),
            TouchPhase::End | TouchPhase::Cancel => self.touch_end(),
        }
    }

    /// Remember the anchor and arm a rotation for release.
    pub fn touch_start(&mut self, touches: usize, x: f32, y: f32) {
        self.last_x = x;
        self.last_y = y;
        match touches {
            1 => self.events = InputEvent::ROTATE_LEFT,
            2 => self.events = InputEvent::ROTATE_RIGHT,
            _ => {}
        }
    }

    pub fn touch_move(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        let mut dx = x - self.last_x;
        let mut dy = y - self.last_y;
        if dx.abs() < self.threshold && dy.abs() < self.threshold {
            return None;
        }

        self.last_x = x;
        self.last_y = y;

        // Dominant axis only
        if dx.abs() >= dy.abs() {
            dy = 0.0;
        } else {
            dx = 0.0;
        }

        let event = if dx < 0.0 {
            InputEvent::MOVE_LEFT
        } else if dx > 0.0 {
            InputEvent::MOVE_RIGHT
        } else if dy > 0.0 {
            InputEvent::ADVANCE
        } else {
            return None;
        };
        self.events = event;
        Some(event)
    }

    /// Fire the armed rotation, if the touch never became a swipe.
    pub fn touch_end(&mut self) -> Option<InputEvent> {
        let rotations = InputEvent::ROTATE_LEFT | InputEvent::ROTATE_RIGHT;
        if (self.events & rotations).is_empty() {
            return None;
        }
        let event = self.events;
        self.events = InputEvent::NONE;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_rotate_on_release() {
        let mut touch = TouchGestures::new();
        touch.touch_start(1, 100.0, 100.0);
        assert_eq!(touch.touch_end(), Some(InputEvent::ROTATE_LEFT));
        assert_eq!(touch.touch_end(), None);

        touch.touch_start(2, 100.0, 100.0);
        assert_eq!(touch.touch_end(), Some(InputEvent::ROTATE_RIGHT));
    }

    #[test]
    fn small_moves_are_ignored() {
        let mut touch = TouchGestures::new();
        touch.touch_start(1, 100.0, 100.0);
        assert_eq!(touch.touch_move(120.0, 90.0), None);
        assert_eq!(touch.touch_end(), Some(InputEvent::ROTATE_LEFT));
    }

    #[test]
    fn swipes_emit_dominant_axis_and_cancel_rotation() {
        let mut touch = TouchGestures::new();
        touch.touch_start(1, 100.0, 100.0);
        assert_eq!(touch.touch_move(60.0, 110.0), Some(InputEvent::MOVE_LEFT));
        // Anchor moved to the last emitted position.
        assert_eq!(touch.touch_move(90.0, 110.0), Some(InputEvent::MOVE_RIGHT));
        assert_eq!(touch.touch_move(95.0, 150.0), Some(InputEvent::ADVANCE));
        assert_eq!(touch.touch_end(), None);
    }

    #[test]
    fn swiping_up_emits_nothing() {
        let mut touch = TouchGestures::new();
        touch.touch_start(1, 100.0, 100.0);
        assert_eq!(touch.touch_move(100.0, 40.0), None);
        // The armed rotation survives an upward swipe.
        assert_eq!(
            touch.handle(TouchEvent {
                phase: TouchPhase::Cancel,
                touches: 0,
                x: 0.0,
                y: 0.0,
            }),
            Some(InputEvent::ROTATE_LEFT)
        );
    }
}
