//=========================================================================
// Input Buffer
//
// FIFO of converted input events waiting for the shell's input phase.
//
// Responsibilities:
// - Store events as Winit delivers them, in arrival order
// - Hand out exactly one event per poll
// - Warn once when the backlog grows past a threshold
//
// Notes:
// The shell consumes at most one event per frame, so bursts (mouse
// motion in particular) can queue up faster than they drain. Past
// `MAX_PENDING` the oldest queued cursor motion is dropped to make room.
// Keys, buttons, touches and Quit are never dropped.
//=========================================================================

//=== Standard Library Imports ============================================
use std::collections::VecDeque;

//=== External Crates =====================================================
use log::{debug, warn};

//=== Internal Modules ====================================================
use super::input_processor::InputProcessor;
use crate::core::input::event::InputEvent;

//=== Constants ===========================================================

/// Backlog size that triggers a warning.
const BACKLOG_WARN_THRESHOLD: usize = 256;

/// Backlog size past which stale cursor motion is discarded.
const MAX_PENDING: usize = 1024;

//=== InputBuffer Struct ==================================================

pub(crate) struct InputBuffer {
    processor: InputProcessor,
    events: VecDeque<InputEvent>,
    backlog_warned: bool,
    dropped_motion: u64,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------
    pub(crate) fn new() -> Self {
        const BASE_CAPACITY: usize = 64;

        Self {
            processor: InputProcessor::new(),
            events: VecDeque::with_capacity(BASE_CAPACITY),
            backlog_warned: false,
            dropped_motion: 0,
        }
    }

    //--- Recording --------------------------------------------------------
    //
    // Converts a Winit window event and queues it if the shell routes it.
    //
    pub(crate) fn record(&mut self, event: &winit::event::WindowEvent) {
        if let Some(event) = self.processor.process_window_event(event) {
            self.push(event);
        }
    }

    pub(crate) fn push(&mut self, event: InputEvent) {
        if self.events.len() >= MAX_PENDING {
            self.drop_oldest_motion();
        }
        self.events.push_back(event);

        if self.events.len() >= BACKLOG_WARN_THRESHOLD && !self.backlog_warned {
            warn!(
                target: "platform::input",
                "Input backlog reached {} events (one is consumed per frame)",
                self.events.len()
            );
            self.backlog_warned = true;
        }
    }

    fn drop_oldest_motion(&mut self) {
        let oldest = self
            .events
            .iter()
            .position(|event| matches!(event, InputEvent::MouseMove(_)));

        if let Some(index) = oldest {
            self.events.remove(index);
            self.dropped_motion += 1;
            debug!(
                target: "platform::input",
                "Input queue full, dropped stale cursor motion ({} so far)",
                self.dropped_motion
            );
        }
    }

    //--- Draining ---------------------------------------------------------
    pub(crate) fn pop(&mut self) -> Option<InputEvent> {
        let event = self.events.pop_front();

        if self.backlog_warned && self.events.len() < BACKLOG_WARN_THRESHOLD / 2 {
            debug!(target: "platform::input", "Input backlog recovered");
            self.backlog_warned = false;
        }

        event
    }

    //--- Utilities --------------------------------------------------------
    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.backlog_warned = false;
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{ButtonMask, KeyCode, KeyEvent, MouseMotion};
    use winit::event::WindowEvent;

    fn motion(x: i32) -> InputEvent {
        InputEvent::MouseMove(MouseMotion {
            x,
            y: 0,
            rel_x: 1,
            rel_y: 0,
            buttons: ButtonMask::NONE,
        })
    }

    fn key_down(code: KeyCode) -> InputEvent {
        InputEvent::KeyDown(KeyEvent::plain(code))
    }

    #[test]
    fn pops_in_arrival_order() {
        let mut buffer = InputBuffer::new();
        buffer.push(key_down(KeyCode::KeyA));
        buffer.push(key_down(KeyCode::KeyB));

        assert_eq!(buffer.pop(), Some(key_down(KeyCode::KeyA)));
        assert_eq!(buffer.pop(), Some(key_down(KeyCode::KeyB)));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn repeated_events_are_kept() {
        let mut buffer = InputBuffer::new();
        for _ in 0..3 {
            buffer.push(key_down(KeyCode::Space));
        }
        assert_eq!(buffer.len(), 3, "Nothing is deduplicated");
    }

    #[test]
    fn record_converts_window_events() {
        let mut buffer = InputBuffer::new();

        buffer.record(&WindowEvent::CloseRequested);
        buffer.record(&WindowEvent::Focused(false));

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.pop(), Some(InputEvent::Quit));
    }

    #[test]
    fn backlog_warning_resets_after_drain() {
        let mut buffer = InputBuffer::new();
        for _ in 0..BACKLOG_WARN_THRESHOLD {
            buffer.push(key_down(KeyCode::KeyA));
        }
        assert!(buffer.backlog_warned);

        while buffer.pop().is_some() {}
        assert!(!buffer.backlog_warned);
        assert!(buffer.is_empty());
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = InputBuffer::new();
        buffer.push(key_down(KeyCode::KeyA));
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn full_queue_drops_oldest_motion() {
        let mut buffer = InputBuffer::new();
        buffer.push(key_down(KeyCode::KeyA));
        for x in 0..(MAX_PENDING as i32 - 1) {
            buffer.push(motion(x));
        }

        buffer.push(key_down(KeyCode::KeyB));

        assert_eq!(buffer.len(), MAX_PENDING);
        assert_eq!(buffer.dropped_motion, 1);
        assert_eq!(buffer.pop(), Some(key_down(KeyCode::KeyA)), "Keys survive the cap");
        assert_eq!(buffer.pop(), Some(motion(1)), "Motion 0 was the one dropped");
    }

    #[test]
    fn full_queue_never_drops_discrete_events() {
        let mut buffer = InputBuffer::new();
        for _ in 0..MAX_PENDING {
            buffer.push(key_down(KeyCode::Space));
        }

        buffer.push(InputEvent::Quit);

        assert_eq!(buffer.len(), MAX_PENDING + 1);
        assert_eq!(buffer.dropped_motion, 0);
    }
}
