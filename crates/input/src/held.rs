//! Held-key tracking for terminal environments.
//!
//! Every press ORs a bit into the held mask and every release clears it; each
//! change yields the whole mask, which is what the engine consumes. Terminals that
//! never report key releases are handled with a timeout: a bit not pressed again
//! within the timeout is released by [`KeyState::expire`].

use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::keys::key_event_bit;
use crate::types::InputEvent;

// In terminals without key-release events, a short timeout keeps a single tap
// from staying held forever.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

/// Tracks which input bits are currently held.
#[derive(Debug, Clone)]
pub struct KeyState {
    held: InputEvent,
    /// Last press time per bit, indexed like [`InputEvent::ORDERED`]
    pressed_at: [Option<Instant>; 5],
    release_timeout: Duration,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyState {
    pub fn new() -> Self {
        Self {
            held: InputEvent::NONE,
            pressed_at: [None; 5],
            release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    /// Currently held mask
    pub fn held(&self) -> InputEvent {
        self.held
    }

    /// Hold `bit` and return the full mask. Repeats refresh the timeout.
    pub fn press(&mut self, bit: InputEvent, now: Instant) -> InputEvent {
        self.held.insert(bit);
        for (slot, ordered) in self.pressed_at.iter_mut().zip(InputEvent::ORDERED) {
            if bit.contains(ordered) {
                *slot = Some(now);
            }
        }
        self.held
    }

    /// Release `bit`. Returns the new mask if anything changed.
    pub fn release(&mut self, bit: InputEvent) -> Option<InputEvent> {
        if (self.held & bit).is_empty() {
            return None;
        }
        self.held.remove(bit);
        for (slot, ordered) in self.pressed_at.iter_mut().zip(InputEvent::ORDERED) {
            if bit.contains(ordered) {
                *slot = None;
            }
        }
        Some(self.held)
    }

    /// Feed a terminal key event. Returns the mask to send, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Option<InputEvent> {
        let bit = key_event_bit(key.code)?;
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => Some(self.press(bit, now)),
            KeyEventKind::Release => self.release(bit),
        }
    }

    /// Release every bit not pressed within the timeout.
    pub fn expire(&mut self, now: Instant) -> Option<InputEvent> {
        let mut stale = InputEvent::NONE;
        for (slot, ordered) in self.pressed_at.iter().zip(InputEvent::ORDERED) {
            if let Some(at) = slot {
                if now.saturating_duration_since(*at) > self.release_timeout {
                    stale.insert(ordered);
                }
            }
        }
        if stale.is_empty() {
            return None;
        }
        self.release(stale)
    }

    pub fn clear(&mut self) {
        self.held = InputEvent::NONE;
        self.pressed_at = [None; 5];
    }
}
