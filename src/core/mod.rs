//=========================================================================
// Core Systems
//
// Platform-independent building blocks of the shell.
//
// Responsibilities:
// - Measure elapsed time against a monotonic source (`clock`)
// - Sequence input, update and render at a fixed rate (`frame_loop`)
// - Route platform events to application handlers (`input`)
// - Own the window/context lifecycle (`surface`)
// - Define the contract backends implement (`platform_bridge`)
//
// Notes:
// Nothing here talks to the OS directly. Everything OS-specific sits
// behind `platform_bridge::Platform`.
//
//=========================================================================

pub mod clock;
pub mod frame_loop;
pub mod input;
pub mod platform_bridge;
pub mod surface;

//=== Public API ==========================================================

pub use clock::{Clock, Monotonic, TimeSource};
pub use frame_loop::{Control, FrameInfo, FrameLoop, FramePhases, FrameTiming, Pacing};
pub use surface::{Surface, SurfaceConfig};
