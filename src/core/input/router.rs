//=========================================================================
// Event Router
//=========================================================================
//
// Pulls at most one event per frame and routes it to its handler.
//
// Architecture:
//   EventSource → poll_and_dispatch() → category switch → Handlers
//                                            │
//                                            └─ button switch (L/R/M)
//
// Quit requests exit *and* falls through to the category switch, whose
// Quit arm is empty. Unknown mouse buttons are dropped silently.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::event::{EventCategory, InputEvent, MouseButton};
use super::handlers::{Handlers, HeldButtons};
use crate::core::frame_loop::Control;
use crate::core::platform_bridge::EventSource;

//=== EventRouter =========================================================

/// Routes one platform event per call to the matching [`Handlers`] method.
///
/// The router is stateless apart from a running count of consumed events.
#[derive(Debug, Default)]
pub struct EventRouter {
    consumed: u64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events pulled from sources so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    //--- Dispatch ---------------------------------------------------------

    /// Pulls zero or one event from `source` and dispatches it.
    ///
    /// Never blocks: an empty queue returns `None` immediately. Otherwise
    /// returns the category of the consumed event, whether or not a
    /// handler ran for it.
    pub fn poll_and_dispatch<H>(
        &mut self,
        source: &mut dyn EventSource,
        handlers: &mut H,
        control: &mut Control<'_>,
    ) -> Option<EventCategory>
    where
        H: Handlers + ?Sized,
    {
        let event = source.poll_event()?;
        self.consumed += 1;

        let category = event.category();
        trace!(target: "router", "Dispatching {} event", category);

        if category == EventCategory::Quit {
            control.request_exit();
        }

        match event {
            InputEvent::Quit => {}

            InputEvent::KeyDown(key) => handlers.on_key_down(&key, control),
            InputEvent::KeyUp(key) => handlers.on_key_up(&key, control),

            InputEvent::MouseMove(motion) => {
                let held = HeldButtons {
                    left: motion.buttons.is_held(MouseButton::Left),
                    right: motion.buttons.is_held(MouseButton::Right),
                    middle: motion.buttons.is_held(MouseButton::Middle),
                };
                handlers.on_mouse_move(&motion, held, control);
            }

            InputEvent::MouseButtonDown { button, x, y } => {
                Self::dispatch_button_down(handlers, button, x, y, control)
            }
            InputEvent::MouseButtonUp { button, x, y } => {
                Self::dispatch_button_up(handlers, button, x, y, control)
            }

            #[cfg(any(feature = "touch", target_arch = "wasm32"))]
            InputEvent::TouchBegin(touch) => handlers.on_touch_begin(&touch, control),
            #[cfg(any(feature = "touch", target_arch = "wasm32"))]
            InputEvent::TouchMove(touch) => handlers.on_touch_move(&touch, control),
            #[cfg(any(feature = "touch", target_arch = "wasm32"))]
            InputEvent::TouchEnd(touch) => handlers.on_touch_end(&touch, control),

            #[cfg(not(any(feature = "touch", target_arch = "wasm32")))]
            InputEvent::TouchBegin(_) | InputEvent::TouchMove(_) | InputEvent::TouchEnd(_) => {
                trace!(target: "router", "Touch support disabled, dropping {}", category);
            }
        }

        Some(category)
    }

    //--- Button Dispatch --------------------------------------------------

    fn dispatch_button_down<H>(
        handlers: &mut H,
        button: MouseButton,
        x: i32,
        y: i32,
        control: &mut Control<'_>,
    ) where
        H: Handlers + ?Sized,
    {
        match button {
            MouseButton::Left => handlers.on_left_button_down(x, y, control),
            MouseButton::Right => handlers.on_right_button_down(x, y, control),
            MouseButton::Middle => handlers.on_middle_button_down(x, y, control),
            MouseButton::Other(index) => {
                trace!(target: "router", "Ignoring press of mouse button {}", index);
            }
        }
    }

    fn dispatch_button_up<H>(
        handlers: &mut H,
        button: MouseButton,
        x: i32,
        y: i32,
        control: &mut Control<'_>,
    ) where
        H: Handlers + ?Sized,
    {
        match button {
            MouseButton::Left => handlers.on_left_button_up(x, y, control),
            MouseButton::Right => handlers.on_right_button_up(x, y, control),
            MouseButton::Middle => handlers.on_middle_button_up(x, y, control),
            MouseButton::Other(index) => {
                trace!(target: "router", "Ignoring release of mouse button {}", index);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
