//=========================================================================
// Input Processor
//=========================================================================
//
// Converts platform-specific Winit events into shell InputEvents.
//
// Architecture:
//   WindowEvent → InputProcessor → InputEvent (shell type) → InputBuffer
//
// Stateful tracking: Winit reports absolute cursor positions and button
// transitions separately, so the processor keeps the last cursor
// position (for relative motion and button coordinates), the held-button
// mask, and the modifier state.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;
use winit::{
    event::{ElementState, MouseButton as WinitMouseButton, TouchPhase, WindowEvent},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{
    ButtonMask, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, MouseMotion, TouchEvent,
};

//=== InputProcessor ======================================================

/// Winit → shell event conversion with cursor, button and modifier state.
#[derive(Debug, Default)]
pub(crate) struct InputProcessor {
    modifiers: Modifiers,
    cursor: Option<(i32, i32)>,
    held: ButtonMask,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    //--- Window Events ----------------------------------------------------

    /// Converts a window event, or returns `None` for events the shell
    /// does not route (resize, focus, unmapped keys, ...).
    pub(crate) fn process_window_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(InputEvent::Quit),

            WindowEvent::ModifiersChanged(state) => {
                self.update_modifiers(state.state());
                None
            }

            WindowEvent::KeyboardInput { event, .. } => {
                self.process_key(event.physical_key, event.state, event.repeat)
            }

            WindowEvent::CursorMoved { position, .. } => {
                Some(self.process_cursor(position.x, position.y))
            }

            WindowEvent::MouseInput { state, button, .. } => {
                Some(self.process_button(*button, *state))
            }

            WindowEvent::Touch(touch) => Some(self.process_touch(
                touch.phase,
                touch.id,
                touch.location.x,
                touch.location.y,
            )),

            _ => None,
        }
    }

    //--- Modifier State Management ----------------------------------------

    pub(crate) fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    //--- Keyboard ---------------------------------------------------------

    /// Converts a key transition (filters unmapped keys).
    pub(crate) fn process_key(
        &self,
        physical_key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    ) -> Option<InputEvent> {
        let key = match physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            PhysicalKey::Unidentified(_) => KeyCode::Unidentified,
        };

        if key == KeyCode::Unidentified {
            trace!(target: "platform::input", "Unmapped key ignored");
            return None;
        }

        let event = KeyEvent {
            key,
            modifiers: self.modifiers,
            repeat,
        };

        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown(event),
            ElementState::Released => InputEvent::KeyUp(event),
        })
    }

    //--- Mouse ------------------------------------------------------------

    /// Converts an absolute cursor position into a motion event.
    ///
    /// The first motion after startup reports zero relative movement.
    pub(crate) fn process_cursor(&mut self, x: f64, y: f64) -> InputEvent {
        let position = (x.floor() as i32, y.floor() as i32);
        let (rel_x, rel_y) = match self.cursor {
            Some((last_x, last_y)) => (position.0 - last_x, position.1 - last_y),
            None => (0, 0),
        };
        self.cursor = Some(position);

        InputEvent::MouseMove(MouseMotion {
            x: position.0,
            y: position.1,
            rel_x,
            rel_y,
            buttons: self.held,
        })
    }

    /// Converts a button transition at the last known cursor position.
    pub(crate) fn process_button(
        &mut self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> InputEvent {
        let button = MouseButton::from(button);
        let (x, y) = self.cursor.unwrap_or((0, 0));

        match state {
            ElementState::Pressed => {
                self.held.press(button);
                InputEvent::MouseButtonDown { button, x, y }
            }
            ElementState::Released => {
                self.held.release(button);
                InputEvent::MouseButtonUp { button, x, y }
            }
        }
    }

    //--- Touch ------------------------------------------------------------

    /// Cancelled contacts are reported as ended.
    pub(crate) fn process_touch(&self, phase: TouchPhase, id: u64, x: f64, y: f64) -> InputEvent {
        let touch = TouchEvent {
            id,
            x: x as f32,
            y: y as f32,
        };

        match phase {
            TouchPhase::Started => InputEvent::TouchBegin(touch),
            TouchPhase::Moved => InputEvent::TouchMove(touch),
            TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::TouchEnd(touch),
        }
    }

    //--- State Queries ----------------------------------------------------

    #[cfg(test)]
    pub(crate) fn held_buttons(&self) -> ButtonMask {
        self.held
    }

    #[cfg(test)]
    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Back/Forward map to the extra-button indices 4 and 5.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back => MouseButton::Other(4),
            WinitMouseButton::Forward => MouseButton::Other(5),
            WinitMouseButton::Other(index) => MouseButton::Other(index),
        }
    }
}

/// Maps A-Z, 0-9, arrows and common special keys; everything else is
/// `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------
            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------
            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Arrows -------------------------------------------------------
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,
            ArrowUp => KeyCode::ArrowUp,

            //--- Special ------------------------------------------------------
            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            _ => KeyCode::Unidentified,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
