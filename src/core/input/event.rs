//=========================================================================
// Input Event Types
//
// Defines the shell's representation of low-level input events.
//
// This module abstracts platform-specific input (e.g. Winit) into one
// tagged event type that the router consumes exactly once per frame.
//
// Responsibilities:
// - Represent keyboard, mouse and touch input in a portable way
// - Carry the per-category payload the handlers expect
// - Expose the held-button mask with the classic desktop bit layout
//
// Event Flow:
// ```text
// Platform Layer (Winit / Headless)
//         ↓
//    InputEvent (this module)
//         ↓
//    EventRouter (one event per frame)
//         ↓
//    Handlers (per-category override points)
// ```
//
//=========================================================================

use std::fmt;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// Only `Left`, `Right` and `Middle` reach a handler. `Other` keeps the
/// platform's raw index for side and thumb buttons, which the router
/// ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button, by platform index.
    Other(u16),
}

impl MouseButton {
    /// Bit this button occupies in a [`ButtonMask`], if it has one.
    ///
    /// Layout is `1 << (index - 1)` with Left = 1, Middle = 2, Right = 3.
    pub const fn mask_bit(self) -> Option<u32> {
        match self {
            Self::Left => Some(1 << 0),
            Self::Middle => Some(1 << 1),
            Self::Right => Some(1 << 2),
            Self::Other(_) => None,
        }
    }
}

//=== ButtonMask ==========================================================

/// Set of mouse buttons held while the cursor moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonMask(u32);

impl ButtonMask {
    /// No buttons held.
    pub const NONE: Self = Self(0);

    /// Wraps a raw platform bit mask.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if `button`'s bit is set.
    ///
    /// Buttons without a mask bit are never reported as held.
    pub fn is_held(self, button: MouseButton) -> bool {
        match button.mask_bit() {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    pub fn press(&mut self, button: MouseButton) {
        if let Some(bit) = button.mask_bit() {
            self.0 |= bit;
        }
    }

    pub fn release(&mut self, button: MouseButton) {
        if let Some(bit) = button.mask_bit() {
            self.0 &= !bit;
        }
    }

    /// Builds a mask from a list of held buttons.
    pub fn with(buttons: &[MouseButton]) -> Self {
        let mut mask = Self::NONE;
        for button in buttons {
            mask.press(*button);
        }
        mask
    }
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// `KeyA` is the same physical key on QWERTY and AZERTY layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Keys the platform layer does not map explicitly.
    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier key state at the time of a key event.
///
/// Left and right variants are not distinguished. On macOS, Command is
/// reported as `ctrl` and Option as `alt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Ctrl only.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    /// Alt only.
    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

//=== Payloads ============================================================

/// Keyboard payload shared by `KeyDown` and `KeyUp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,

    /// Auto-repeat from holding the key down.
    pub repeat: bool,
}

impl KeyEvent {
    /// A non-repeating key event without modifiers.
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            repeat: false,
        }
    }
}

/// Cursor motion payload.
///
/// Coordinates are window pixels, top-left origin. `rel_x`/`rel_y` are the
/// motion since the previous cursor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseMotion {
    pub x: i32,
    pub y: i32,
    pub rel_x: i32,
    pub rel_y: i32,
    pub buttons: ButtonMask,
}

/// Touch contact payload.
///
/// Positions are window pixels; `id` stays stable for the lifetime of one
/// contact (begin → move* → end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

//=== InputEvent ==========================================================

/// One input event pulled from the platform queue.
///
/// Ephemeral: produced by the platform, consumed once by the router,
/// then discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The window was closed or the OS asked the application to quit.
    Quit,

    KeyDown(KeyEvent),
    KeyUp(KeyEvent),

    MouseMove(MouseMotion),

    MouseButtonDown { button: MouseButton, x: i32, y: i32 },
    MouseButtonUp { button: MouseButton, x: i32, y: i32 },

    TouchBegin(TouchEvent),
    TouchMove(TouchEvent),
    TouchEnd(TouchEvent),
}

impl InputEvent {
    /// Category of this event, without its payload.
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Quit => EventCategory::Quit,
            Self::KeyDown(_) => EventCategory::KeyDown,
            Self::KeyUp(_) => EventCategory::KeyUp,
            Self::MouseMove(_) => EventCategory::MouseMove,
            Self::MouseButtonDown { .. } => EventCategory::MouseButtonDown,
            Self::MouseButtonUp { .. } => EventCategory::MouseButtonUp,
            Self::TouchBegin(_) => EventCategory::TouchBegin,
            Self::TouchMove(_) => EventCategory::TouchMove,
            Self::TouchEnd(_) => EventCategory::TouchEnd,
        }
    }
}

//=== EventCategory =======================================================

/// Fieldless mirror of [`InputEvent`]'s variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Quit,
    KeyDown,
    KeyUp,
    MouseMove,
    MouseButtonDown,
    MouseButtonUp,
    TouchBegin,
    TouchMove,
    TouchEnd,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quit => "quit",
            Self::KeyDown => "key_down",
            Self::KeyUp => "key_up",
            Self::MouseMove => "mouse_move",
            Self::MouseButtonDown => "mouse_button_down",
            Self::MouseButtonUp => "mouse_button_up",
            Self::TouchBegin => "touch_begin",
            Self::TouchMove => "touch_move",
            Self::TouchEnd => "touch_end",
        };
        f.write_str(name)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
