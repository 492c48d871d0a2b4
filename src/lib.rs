//=========================================================================
// Flappy Shell — Library Root
//
// Runtime shell for a small real-time game: one window, a fixed-rate
// frame loop and one-event-per-frame input dispatch.
//
// Responsibilities:
// - Expose the shell facade (`ShellBuilder`, `Shell`)
// - Expose the drivers that decide who steps the shell
// - Provide the platform contract plus a winit and a headless backend
//
// Typical usage:
// ```no_run
// use flappy_shell::core::input::DefaultHandlers;
// use flappy_shell::driver::{launch, run_native};
// use flappy_shell::platform::WinitPlatform;
// use flappy_shell::ShellBuilder;
//
// let mut shell = ShellBuilder::new().build(WinitPlatform::new(), DefaultHandlers);
// let outcome = launch(&mut shell, |shell| Ok(run_native(shell)));
// std::process::exit(outcome.exit_code() as i32);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the platform-independent pieces: clock, frame loop,
// input routing, surface lifecycle and the platform contract.
//
pub mod core;

//--- Backends and Runtime ------------------------------------------------
//
// `platform` implements the contract (winit + softbuffer, headless).
// `shell` ties core pieces together; `driver` runs it natively or hosted.
//
pub mod driver;
pub mod logging;
pub mod platform;
pub mod prelude;
pub mod shell;

//--- Public Exports ------------------------------------------------------

pub use driver::{launch, DriverKind, LaunchOutcome};
pub use shell::{Shell, ShellBuilder};
