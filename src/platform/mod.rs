//=========================================================================
// Platform Backends
//
// Concrete implementations of the platform bridge contract.
//
// Architecture:
// ```text
//  Native driver (process owns the loop):
//  ┌──────────────────────────────────────────────┐
//  │  Shell::step()                               │
//  │   └─ poll_event()                            │
//  │        ├─ pump_app_events(timeout = 0)       │
//  │        │    └─ WindowEvent → InputBuffer     │
//  │        └─ InputBuffer::pop() → one event     │
//  └──────────────────────────────────────────────┘
//
//  Hosted driver (winit owns the loop):
//  ┌──────────────────────────────────────────────┐
//  │  run_app_on_demand                           │
//  │   ├─ window_event → InputBuffer              │
//  │   └─ about_to_wait (when a frame is due)     │
//  │        ├─ tick() → Shell::step()             │
//  │        │    └─ InputBuffer::pop()            │
//  │        └─ ControlFlow::WaitUntil(next frame) │
//  └──────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **One buffer, two feeders**: the buffer is shared (`Rc<RefCell>`)
//   between the platform and the hosted app, so `poll_event` behaves the
//   same under both drivers
// - **Window created inside the loop**: winit 0.30 only creates windows
//   from an active event loop, so window creation pumps until the
//   request is served
// - **Software presentation**: softbuffer fills and presents the frame;
//   there is no versioned graphics API underneath it
//
// Responsibilities:
// - Create and manage the OS window and softbuffer surface
// - Convert Winit events → shell InputEvents
// - Clear and present each frame
//
//=========================================================================

//=== Submodules ==========================================================

pub mod headless;

#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod input_buffer;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod input_processor;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod winit_backend;

//=== Public API ==========================================================

pub use headless::{FailAt, HeadlessLog, HeadlessPlatform, HeadlessHandle};

#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use winit_backend::{SoftContext, WinitHost, WinitPlatform};
