//! Input queue - bounded FIFO between the input source and the game tick
//!
//! Stack-only storage (`ArrayVec`). On overflow the oldest event is evicted, so
//! with the shipped capacity of one the queue simply holds the latest input state.

use arrayvec::ArrayVec;

use crate::types::{InputEvent, EVENT_QUEUE_CAPACITY};

/// Bounded event FIFO that drops the oldest entry when full
#[derive(Debug, Clone, Default)]
pub struct EventQueue<const N: usize> {
    events: ArrayVec<InputEvent, N>,
}

/// Queue with the shipped capacity
pub type InputQueue = EventQueue<EVENT_QUEUE_CAPACITY>;

impl<const N: usize> EventQueue<N> {
    pub fn new() -> Self {
        Self {
            events: ArrayVec::new(),
        }
    }

    /// Append an event, evicting the oldest one if the queue is full.
    pub fn enqueue(&mut self, event: InputEvent) {
        if N == 0 {
            return;
        }
        if self.events.is_full() {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Pop the oldest event, or [`InputEvent::NONE`] when empty.
    pub fn dequeue(&mut self) -> InputEvent {
        if self.events.is_empty() {
            return InputEvent::NONE;
        }
        self.events.remove(0)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queue_yields_no_event() {
        let mut q = InputQueue::new();
        assert_eq!(q.dequeue(), InputEvent::NONE);
        assert!(q.is_empty());
    }

    #[test]
    fn capacity_one_keeps_last_write() {
        let mut q = InputQueue::new();
        q.enqueue(InputEvent::MOVE_LEFT);
        q.enqueue(InputEvent::MOVE_RIGHT | InputEvent::ADVANCE);
        assert_eq!(q.len(), 1);
        assert_eq!(q.dequeue(), InputEvent::MOVE_RIGHT | InputEvent::ADVANCE);
        assert_eq!(q.dequeue(), InputEvent::NONE);
    }

    #[test]
    fn larger_queue_is_fifo_and_drops_oldest() {
        let mut q = EventQueue::<2>::new();
        q.enqueue(InputEvent::ADVANCE);
        q.enqueue(InputEvent::MOVE_LEFT);
        q.enqueue(InputEvent::ROTATE_LEFT);
        assert_eq!(q.len(), 2);
        assert_eq!(q.dequeue(), InputEvent::MOVE_LEFT);
        assert_eq!(q.dequeue(), InputEvent::ROTATE_LEFT);
    }

    #[test]
    fn clear_discards_pending_input() {
        let mut q = InputQueue::new();
        q.enqueue(InputEvent::ROTATE_RIGHT);
        q.clear();
        assert_eq!(q.dequeue(), InputEvent::NONE);
    }

    #[test]
    fn zero_capacity_drops_everything() {
        let mut q = EventQueue::<0>::new();
        q.enqueue(InputEvent::ADVANCE);
        assert_eq!(q.capacity(), 0);
        assert_eq!(q.dequeue(), InputEvent::NONE);
    }
}
