//=========================================================================
// Drivers
//=========================================================================
//
// Who calls `Shell::step()`, and until when.
//
// Architecture:
// ```text
//   launch(shell, drive)
//     ├─ shell.initialize()   ── Err ──► InitFailed   (exit status 1, no frames)
//     ├─ drive(shell)
//     │    ├─ run_native : while running { step() }        (Pacing as built)
//     │    └─ run_hosted : host.run(cadence, || step() → Continue/Exit)  (Pacing::Hosted)
//     └─ shell.shutdown()
// ```
//
// Native mode owns the loop and blocks in the frame loop's wait. Hosted
// mode never blocks inside a step; instead the host is handed a
// `TickCadence` at the shell's frame rate and sleeps between ticks.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::clock::TimeSource;
use crate::core::frame_loop::Pacing;
use crate::core::input::Handlers;
use crate::core::platform_bridge::{Platform, SurfaceError};
use crate::shell::Shell;

//=== Constants ===========================================================

/// Environment variable selecting the driver: `native` or `hosted`.
pub const DRIVER_ENV_VAR: &str = "FLAPPY_DRIVER";

//=== Host ================================================================

/// Answer from a hosted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostControl {
    Continue,
    Exit,
}

/// An external loop that repeatedly calls back into the shell.
///
/// `run` must call `tick` until it returns [`HostControl::Exit`] (or the
/// host itself shuts down) and then return. The host owns pacing: it
/// should call `tick` no more often than `cadence` allows.
pub trait Host {
    type Error: StdError + 'static;

    fn run(
        self,
        cadence: TickCadence,
        tick: &mut dyn FnMut() -> HostControl,
    ) -> Result<(), Self::Error>;
}

//=== TickCadence =========================================================

/// Fixed-interval tick schedule for hosts.
///
/// The first tick is due immediately. After that a tick is due once per
/// `budget`; deadlines missed by more than one budget are dropped rather
/// than caught up, matching the native loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCadence {
    budget: Duration,
    next: Option<Instant>,
}

impl TickCadence {
    pub fn new(budget: Duration) -> Self {
        Self { budget, next: None }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next.map_or(true, |next| now >= next)
    }

    /// Records a tick taken at `now` and schedules the next one.
    pub fn advance(&mut self, now: Instant) {
        let next = match self.next {
            Some(previous) if previous + self.budget > now => previous + self.budget,
            _ => now + self.budget,
        };
        self.next = Some(next);
    }

    /// When the next tick is due, or `None` before the first tick.
    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }
}

//=== DriverKind ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// The process loops and paces frames itself.
    Native,

    /// A host loop schedules one step per iteration.
    Hosted,
}

impl DriverKind {
    /// Default for the compilation target: hosted on the web, native elsewhere.
    pub fn for_target() -> Self {
        if cfg!(target_arch = "wasm32") {
            DriverKind::Hosted
        } else {
            DriverKind::Native
        }
    }

    /// Reads [`DRIVER_ENV_VAR`], falling back to [`DriverKind::for_target`].
    pub fn from_env() -> Self {
        match env::var(DRIVER_ENV_VAR) {
            Ok(value) => Self::from_setting(&value),
            Err(env::VarError::NotPresent) => Self::for_target(),
            Err(e) => {
                warn!(
                    target: "driver",
                    "Unable to read {}: {}; using default driver",
                    DRIVER_ENV_VAR,
                    e
                );
                Self::for_target()
            }
        }
    }

    fn from_setting(value: &str) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(target: "driver", "{}; using default driver", e);
                Self::for_target()
            }
        }
    }
}

impl FromStr for DriverKind {
    type Err = UnknownDriver;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(DriverKind::Native),
            "hosted" => Ok(DriverKind::Hosted),
            _ => Err(UnknownDriver(s.to_string())),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Native => f.write_str("native"),
            DriverKind::Hosted => f.write_str("hosted"),
        }
    }
}

//=== Errors ==============================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown driver {0:?} (expected \"native\" or \"hosted\")")]
pub struct UnknownDriver(pub String);

/// Failures after initialization succeeded.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("no host loop available on this platform")]
    HostUnavailable,

    #[error("host loop failed: {0}")]
    Host(#[source] Box<dyn StdError + 'static>),
}

//=== Drivers =============================================================

/// Steps the shell until it stops running. Returns the frame count.
pub fn run_native<P, H, T>(shell: &mut Shell<P, H, T>) -> u64
where
    P: Platform,
    H: Handlers,
    T: TimeSource,
{
    info!(target: "driver", "Native driver started ({:?})", shell.frame_loop().pacing());

    while shell.is_running() {
        shell.step();
    }

    shell.frame_count()
}

/// Lets `host` schedule steps until the shell stops running.
///
/// Switches the frame loop to [`Pacing::Hosted`] first, so a step never
/// blocks the host, and hands the host a [`TickCadence`] at the shell's
/// frame rate.
pub fn run_hosted<P, H, T, O>(shell: &mut Shell<P, H, T>, host: O) -> Result<u64, DriveError>
where
    P: Platform,
    H: Handlers,
    T: TimeSource,
    O: Host,
{
    shell.frame_loop_mut().set_pacing(Pacing::Hosted);
    let cadence = TickCadence::new(Duration::from_secs_f64(shell.frame_loop().frame_budget()));
    info!(target: "driver", "Hosted driver started (tick every {:?})", cadence.budget());

    let mut tick = || {
        if !shell.is_running() {
            return HostControl::Exit;
        }
        shell.step();
        if shell.is_running() {
            HostControl::Continue
        } else {
            HostControl::Exit
        }
    };

    host.run(cadence, &mut tick)
        .map_err(|e| DriveError::Host(Box::new(e)))?;

    Ok(shell.frame_count())
}

//=== Launch ==============================================================

/// How a launch ended.
#[derive(Debug)]
pub enum LaunchOutcome {
    Finished { frames: u64 },
    InitFailed(SurfaceError),
    DriveFailed(DriveError),
}

impl LaunchOutcome {
    /// Process exit status: 0 for a clean finish, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchOutcome::Finished { .. } => 0,
            LaunchOutcome::InitFailed(_) | LaunchOutcome::DriveFailed(_) => 1,
        }
    }
}

/// Initializes the shell, drives it with `drive`, then shuts it down.
///
/// On initialization failure no frame is stepped.
pub fn launch<P, H, T, F>(shell: &mut Shell<P, H, T>, drive: F) -> LaunchOutcome
where
    P: Platform,
    H: Handlers,
    T: TimeSource,
    F: FnOnce(&mut Shell<P, H, T>) -> Result<u64, DriveError>,
{
    if let Err(e) = shell.initialize() {
        error!(target: "driver", "Error initializing game: {}", e);
        shell.shutdown();
        return LaunchOutcome::InitFailed(e);
    }

    let result = drive(shell);
    shell.shutdown();

    match result {
        Ok(frames) => {
            info!(target: "driver", "Finished after {} frames", frames);
            LaunchOutcome::Finished { frames }
        }
        Err(e) => {
            error!(target: "driver", "Driver failed: {}", e);
            LaunchOutcome::DriveFailed(e)
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{DefaultHandlers, InputEvent, KeyCode, KeyEvent};
    use crate::core::platform_bridge::GraphicsVersion;
    use crate::platform::headless::HeadlessPlatform;
    use crate::shell::ShellBuilder;
    use std::cell::Cell;
    use std::rc::Rc;

    //--- Test Hosts -------------------------------------------------------

    /// Calls the tick until told to exit or the iteration limit is hit.
    struct ManualHost {
        limit: usize,
        budget_seen: Rc<Cell<Option<Duration>>>,
    }

    impl ManualHost {
        fn new(limit: usize) -> Self {
            Self {
                limit,
                budget_seen: Rc::default(),
            }
        }
    }

    impl Host for ManualHost {
        type Error = std::io::Error;

        fn run(
            self,
            cadence: TickCadence,
            tick: &mut dyn FnMut() -> HostControl,
        ) -> Result<(), Self::Error> {
            self.budget_seen.set(Some(cadence.budget()));
            for _ in 0..self.limit {
                if tick() == HostControl::Exit {
                    return Ok(());
                }
            }
            Ok(())
        }
    }

    struct BrokenHost;

    impl Host for BrokenHost {
        type Error = std::io::Error;

        fn run(
            self,
            _cadence: TickCadence,
            _tick: &mut dyn FnMut() -> HostControl,
        ) -> Result<(), Self::Error> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no display"))
        }
    }

    //=====================================================================
    // Launch Tests
    //=====================================================================

    #[test]
    fn missing_graphics_exits_with_status_one_and_no_frames() {
        let platform = HeadlessPlatform::new().with_graphics_version(GraphicsVersion::new(1, 4));
        let handle = platform.handle();
        let mut shell = ShellBuilder::new().build(platform, DefaultHandlers);

        let outcome = launch(&mut shell, |shell| Ok(run_native(shell)));

        assert!(matches!(
            outcome,
            LaunchOutcome::InitFailed(SurfaceError::MissingGraphicsSupport(_))
        ));
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(shell.frame_count(), 0);
        assert_eq!(handle.log().presents, 0);
        assert_eq!(handle.log().shutdowns, 1, "Partial init is released");
    }

    #[test]
    fn native_run_ends_on_quit_event() {
        let platform = HeadlessPlatform::new().with_events([
            InputEvent::KeyDown(KeyEvent::plain(KeyCode::Space)),
            InputEvent::Quit,
        ]);
        let handle = platform.handle();
        let mut shell = ShellBuilder::new()
            .with_pacing(Pacing::Hosted)
            .build(platform, DefaultHandlers);

        let outcome = launch(&mut shell, |shell| Ok(run_native(shell)));

        assert!(matches!(outcome, LaunchOutcome::Finished { frames: 2 }));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(handle.log().presents, 2);
        assert_eq!(handle.log().teardown_order.last(), Some(&"shutdown"));
    }

    #[test]
    fn hosted_run_switches_pacing_and_stops_on_escape() {
        let platform =
            HeadlessPlatform::new().with_events([InputEvent::KeyUp(KeyEvent::plain(KeyCode::Escape))]);
        let mut shell = ShellBuilder::new().build(platform, DefaultHandlers);
        assert_eq!(shell.frame_loop().pacing(), Pacing::Spin);

        let outcome = launch(&mut shell, |shell| run_hosted(shell, ManualHost::new(100)));

        assert!(matches!(outcome, LaunchOutcome::Finished { frames: 1 }));
        assert_eq!(shell.frame_loop().pacing(), Pacing::Hosted);
    }

    #[test]
    fn hosted_run_returns_when_host_stops_early() {
        let mut shell = ShellBuilder::new().build(HeadlessPlatform::new(), DefaultHandlers);
        shell.initialize().unwrap();

        let frames = run_hosted(&mut shell, ManualHost::new(5)).unwrap();

        assert_eq!(frames, 5);
        assert!(shell.is_running());
    }

    #[test]
    fn host_failure_is_reported() {
        let mut shell = ShellBuilder::new().build(HeadlessPlatform::new(), DefaultHandlers);

        let outcome = launch(&mut shell, |shell| run_hosted(shell, BrokenHost));

        assert!(matches!(outcome, LaunchOutcome::DriveFailed(DriveError::Host(_))));
        assert_eq!(outcome.exit_code(), 1);
    }

    //=====================================================================
    // DriverKind Tests
    //=====================================================================

    #[test]
    fn driver_kind_parses_case_insensitively() {
        assert_eq!("native".parse::<DriverKind>(), Ok(DriverKind::Native));
        assert_eq!(" Hosted ".parse::<DriverKind>(), Ok(DriverKind::Hosted));
        assert_eq!(
            "threaded".parse::<DriverKind>(),
            Err(UnknownDriver("threaded".into()))
        );
    }

    #[test]
    fn unknown_setting_falls_back_to_target_default() {
        assert_eq!(DriverKind::from_setting("bogus"), DriverKind::for_target());
        assert_eq!(DriverKind::from_setting("hosted"), DriverKind::Hosted);
    }

    #[test]
    fn driver_kind_displays_setting_name() {
        assert_eq!(DriverKind::Native.to_string(), "native");
        assert_eq!(DriverKind::Hosted.to_string(), "hosted");
    }

    //=====================================================================
    // Cadence Tests
    //=====================================================================

    #[test]
    fn host_receives_shell_frame_budget() {
        let mut shell = ShellBuilder::new()
            .with_frame_rate(30.0)
            .build(HeadlessPlatform::new(), DefaultHandlers);
        shell.initialize().unwrap();
        let host = ManualHost::new(1);
        let budget_seen = Rc::clone(&host.budget_seen);

        run_hosted(&mut shell, host).unwrap();

        let budget = budget_seen.get().expect("host should have run");
        assert!((budget.as_secs_f64() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn first_tick_is_due_immediately() {
        let cadence = TickCadence::new(Duration::from_millis(16));
        assert!(cadence.is_due(Instant::now()));
        assert_eq!(cadence.deadline(), None);
    }

    #[test]
    fn ticks_are_spaced_by_budget() {
        let budget = Duration::from_millis(16);
        let start = Instant::now();
        let mut cadence = TickCadence::new(budget);

        cadence.advance(start);

        assert!(!cadence.is_due(start + Duration::from_millis(5)));
        assert!(cadence.is_due(start + budget));
        assert_eq!(cadence.deadline(), Some(start + budget));

        cadence.advance(start + budget + Duration::from_millis(2));
        assert_eq!(cadence.deadline(), Some(start + budget * 2), "Small lateness keeps the grid");
    }

    #[test]
    fn long_stall_does_not_catch_up() {
        let budget = Duration::from_millis(16);
        let start = Instant::now();
        let mut cadence = TickCadence::new(budget);
        cadence.advance(start);

        let late = start + Duration::from_millis(200);
        cadence.advance(late);

        assert_eq!(cadence.deadline(), Some(late + budget));
        assert!(!cadence.is_due(late + Duration::from_millis(1)));
    }
}
