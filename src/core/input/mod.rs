//=========================================================================
// Input Dispatch
//
// Portable input events and the per-frame routing of those events to
// application handlers.
//
// Responsibilities:
// - Define the event vocabulary shared by every platform backend
// - Define the handler capability trait and its default policy
// - Route one event per frame to exactly one handler
//
// Notes:
// The router is owned by the shell and driven from the frame loop's
// input phase. Handlers are supplied by the application.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
pub mod handlers;
pub mod router;

//=== Public API ==========================================================

pub use event::{
    ButtonMask, EventCategory, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton,
    MouseMotion, TouchEvent,
};
pub use handlers::{exit_on_escape, DefaultHandlers, Handlers, HeldButtons};
pub use router::EventRouter;
