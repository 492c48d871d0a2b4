//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use flappy_shell::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Shell and drivers
pub use crate::driver::{launch, run_hosted, run_native, DriverKind, Host, HostControl};
pub use crate::shell::{Shell, ShellBuilder};

// Frame loop
pub use crate::core::frame_loop::{Control, FrameInfo, Pacing};

// Input
pub use crate::core::input::{
    DefaultHandlers, Handlers, HeldButtons, InputEvent, KeyCode, KeyEvent, Modifiers,
    MouseButton, MouseMotion,
};

// Platform contract
pub use crate::core::platform_bridge::{ClearColor, Platform, SurfaceError};
