//=========================================================================
// Shell
//
// Top-level runtime object: one surface, one router, one frame loop and
// the application's handlers.
//
// Architecture:
// ```text
//     ShellBuilder  ──build()──>  Shell  ──initialize()──>  step()*  ──>  shutdown()
//         │                         │
//         ├─ with_title()           └─ step()
//         ├─ with_size()                 ├─ input  : router.poll_and_dispatch(surface)
//         ├─ with_frame_rate()           ├─ update : handlers.on_update(frame)
//         └─ with_pacing()               └─ render : surface.present()
// ```
//
// The shell never loops on its own; a driver (see `driver`) decides who
// calls `step()` and when to stop.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::clock::{Clock, Monotonic, TimeSource};
use crate::core::frame_loop::{
    Control, FrameInfo, FrameLoop, FramePhases, FrameTiming, Pacing, DEFAULT_FRAME_RATE,
};
use crate::core::input::{DefaultHandlers, EventRouter, Handlers};
use crate::core::platform_bridge::{
    ClearColor, ContextConfig, GraphicsRequirements, Platform, SurfaceError,
};
use crate::core::surface::{Surface, SurfaceConfig};

//=== ShellBuilder ========================================================

/// Builder for configuring and constructing a [`Shell`].
///
/// # Default Values
///
/// - **Title**: "Flappy Bird Clone"
/// - **Size**: 1136x640
/// - **Frame rate**: 60.0
/// - **Pacing**: [`Pacing::Spin`]
///
/// # Examples
///
/// ```
/// use flappy_shell::platform::HeadlessPlatform;
/// use flappy_shell::shell::ShellBuilder;
/// use flappy_shell::core::input::DefaultHandlers;
///
/// let mut shell = ShellBuilder::new()
///     .with_title("Demo")
///     .with_size(320, 240)
///     .build(HeadlessPlatform::new(), DefaultHandlers);
///
/// assert!(shell.initialize().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ShellBuilder {
    surface: SurfaceConfig,
    frame_rate: f64,
    pacing: Pacing,
}

impl ShellBuilder {
    pub const DEFAULT_TITLE: &'static str = "Flappy Bird Clone";
    pub const DEFAULT_WIDTH: u32 = 1136;
    pub const DEFAULT_HEIGHT: u32 = 640;

    pub fn new() -> Self {
        Self {
            surface: SurfaceConfig::new(
                Self::DEFAULT_TITLE,
                Self::DEFAULT_WIDTH,
                Self::DEFAULT_HEIGHT,
            ),
            frame_rate: DEFAULT_FRAME_RATE,
            pacing: Pacing::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.surface.window.title = title.into();
        self
    }

    /// Sets the logical window size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "Window size must be non-zero, got {}x{}",
            width,
            height
        );
        self.surface.window.width = width;
        self.surface.window.height = height;
        self
    }

    /// Sets the target frames per second.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate` is not strictly positive and finite.
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        assert!(
            frame_rate.is_finite() && frame_rate > 0.0,
            "Frame rate must be positive, got {}",
            frame_rate
        );
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_clear_color(mut self, color: ClearColor) -> Self {
        self.surface.clear_color = color;
        self
    }

    /// Overrides the requested context attributes.
    pub fn with_context(mut self, context: ContextConfig) -> Self {
        self.surface.context = context;
        self
    }

    /// Overrides the minimum capabilities checked by `initialize()`.
    pub fn with_requirements(mut self, requirements: GraphicsRequirements) -> Self {
        self.surface.requirements = requirements;
        self
    }

    /// Window is created hidden; useful for tests on a real display.
    pub fn hidden(mut self) -> Self {
        self.surface.window.visible = false;
        self
    }

    //--- Building ---------------------------------------------------------

    /// Builds a shell on the system monotonic clock.
    pub fn build<P: Platform, H: Handlers>(self, platform: P, handlers: H) -> Shell<P, H> {
        self.build_with_clock(platform, handlers, Monotonic::new())
    }

    /// Builds a shell timed by `source`.
    pub fn build_with_clock<P, H, T>(self, platform: P, handlers: H, source: T) -> Shell<P, H, T>
    where
        P: Platform,
        H: Handlers,
        T: TimeSource,
    {
        info!(
            target: "shell",
            "Building shell \"{}\" ({}x{}, {} fps)",
            self.surface.window.title,
            self.surface.window.width,
            self.surface.window.height,
            self.frame_rate
        );

        Shell {
            surface: Surface::new(platform, self.surface),
            router: EventRouter::new(),
            frame_loop: FrameLoop::with_clock(
                Clock::with_source(source),
                self.frame_rate,
                self.pacing,
            ),
            handlers,
        }
    }
}

impl Default for ShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Shell ===============================================================

/// Window, input dispatch and frame pacing for one application.
///
/// Create via [`ShellBuilder`]. Drive with [`crate::driver::launch`] or
/// call [`Shell::step`] directly.
///
/// # Examples
///
/// ```
/// use flappy_shell::core::input::{DefaultHandlers, InputEvent, KeyCode, KeyEvent};
/// use flappy_shell::core::frame_loop::Pacing;
/// use flappy_shell::platform::HeadlessPlatform;
/// use flappy_shell::shell::ShellBuilder;
///
/// let platform = HeadlessPlatform::new()
///     .with_events([InputEvent::KeyUp(KeyEvent::plain(KeyCode::Escape))]);
/// let mut shell = ShellBuilder::new()
///     .with_pacing(Pacing::Hosted)
///     .build(platform, DefaultHandlers);
///
/// shell.initialize().unwrap();
/// while shell.is_running() {
///     shell.step();
/// }
/// assert_eq!(shell.frame_count(), 1);
/// ```
pub struct Shell<P: Platform, H: Handlers = DefaultHandlers, T: TimeSource = Monotonic> {
    surface: Surface<P>,
    router: EventRouter,
    frame_loop: FrameLoop<T>,
    handlers: H,
}

impl<P: Platform, H: Handlers, T: TimeSource> Shell<P, H, T> {
    //--- Lifecycle --------------------------------------------------------

    /// Creates the window and context. Must succeed before stepping.
    pub fn initialize(&mut self) -> Result<(), SurfaceError> {
        self.surface.initialize()
    }

    /// Runs one frame: at most one event, one update, one present, then
    /// waits out the frame budget.
    pub fn step(&mut self) -> FrameTiming {
        let mut phases = ShellPhases {
            surface: &mut self.surface,
            router: &mut self.router,
            handlers: &mut self.handlers,
        };
        self.frame_loop.step(&mut phases)
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn request_exit(&mut self) {
        self.frame_loop.request_exit();
    }

    /// Releases the surface. Also happens on drop.
    pub fn shutdown(&mut self) {
        info!(
            target: "shell",
            "Shutting down after {} frames ({} late)",
            self.frame_loop.frame_count(),
            self.frame_loop.late_frames()
        );
        self.surface.teardown();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
    }

    //--- Accessors --------------------------------------------------------

    pub fn frame_count(&self) -> u64 {
        self.frame_loop.frame_count()
    }

    pub fn simulation_time(&self) -> f64 {
        self.frame_loop.simulation_time()
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut H {
        &mut self.handlers
    }

    pub fn surface(&self) -> &Surface<P> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<P> {
        &mut self.surface
    }

    pub fn platform_mut(&mut self) -> &mut P {
        self.surface.platform_mut()
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn frame_loop(&self) -> &FrameLoop<T> {
        &self.frame_loop
    }

    pub fn frame_loop_mut(&mut self) -> &mut FrameLoop<T> {
        &mut self.frame_loop
    }
}

//=== ShellPhases =========================================================

struct ShellPhases<'a, P: Platform, H: Handlers> {
    surface: &'a mut Surface<P>,
    router: &'a mut EventRouter,
    handlers: &'a mut H,
}

impl<P: Platform, H: Handlers> FramePhases for ShellPhases<'_, P, H> {
    fn input(&mut self, control: &mut Control<'_>) {
        self.router
            .poll_and_dispatch(&mut *self.surface, &mut *self.handlers, control);
    }

    fn update(&mut self, frame: &FrameInfo, control: &mut Control<'_>) {
        self.handlers.on_update(frame, control);
    }

    fn render(&mut self) {
        self.surface.present();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SteppingSource;
    use crate::core::input::{InputEvent, KeyCode, KeyEvent};
    use crate::platform::headless::HeadlessPlatform;
    use std::time::Duration;

    #[derive(Default)]
    struct Counting {
        key_downs: u32,
        updates: u32,
        quit_at_update: Option<u32>,
    }

    impl Handlers for Counting {
        fn on_key_down(&mut self, _event: &KeyEvent, _control: &mut Control<'_>) {
            self.key_downs += 1;
        }

        fn on_update(&mut self, _frame: &FrameInfo, control: &mut Control<'_>) {
            self.updates += 1;
            if self.quit_at_update == Some(self.updates) {
                control.request_exit();
            }
        }
    }

    fn hosted() -> ShellBuilder {
        ShellBuilder::new().with_pacing(Pacing::Hosted)
    }

    #[test]
    fn builder_defaults() {
        let builder = ShellBuilder::new();
        assert_eq!(builder.surface.window.title, "Flappy Bird Clone");
        assert_eq!(builder.surface.window.width, 1136);
        assert_eq!(builder.surface.window.height, 640);
        assert_eq!(builder.frame_rate, 60.0);
        assert_eq!(builder.pacing, Pacing::Spin);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn builder_rejects_zero_rate() {
        let _ = ShellBuilder::new().with_frame_rate(0.0);
    }

    #[test]
    #[should_panic(expected = "Window size must be non-zero")]
    fn builder_rejects_empty_window() {
        let _ = ShellBuilder::new().with_size(0, 480);
    }

    #[test]
    fn escape_release_quits_after_full_frame() {
        let platform =
            HeadlessPlatform::new().with_events([InputEvent::KeyUp(KeyEvent::plain(KeyCode::Escape))]);
        let handle = platform.handle();
        let mut shell = hosted().build(platform, Counting::default());
        shell.initialize().unwrap();

        shell.step();

        assert!(!shell.is_running());
        assert_eq!(shell.handlers().updates, 1, "Update still runs in the quitting frame");
        assert_eq!(handle.log().presents, 1, "Render still runs in the quitting frame");
    }

    #[test]
    fn one_event_consumed_per_step() {
        let events = (0..3).map(|_| InputEvent::KeyDown(KeyEvent::plain(KeyCode::Space)));
        let platform = HeadlessPlatform::new().with_events(events);
        let handle = platform.handle();
        let mut shell = hosted().build(platform, Counting::default());
        shell.initialize().unwrap();

        shell.step();
        assert_eq!(shell.handlers().key_downs, 1);
        assert_eq!(handle.pending_events(), 2);

        shell.step();
        shell.step();
        assert_eq!(shell.handlers().key_downs, 3);
        assert_eq!(shell.router().consumed(), 3);
    }

    #[test]
    fn quit_event_stops_shell() {
        let platform = HeadlessPlatform::new().with_events([InputEvent::Quit]);
        let mut shell = hosted().build(platform, DefaultHandlers);
        shell.initialize().unwrap();

        shell.step();

        assert!(!shell.is_running());
        assert_eq!(shell.frame_count(), 1);
    }

    #[test]
    fn update_can_request_exit() {
        let handlers = Counting {
            quit_at_update: Some(3),
            ..Counting::default()
        };
        let mut shell = hosted().build(HeadlessPlatform::new(), handlers);
        shell.initialize().unwrap();

        while shell.is_running() {
            shell.step();
        }

        assert_eq!(shell.frame_count(), 3);
        assert!((shell.simulation_time() - 3.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn spin_pacing_holds_frame_budget() {
        let source = SteppingSource::new(Duration::from_millis(1));
        let mut shell = ShellBuilder::new()
            .with_frame_rate(100.0)
            .build_with_clock(HeadlessPlatform::new(), DefaultHandlers, source);
        shell.initialize().unwrap();

        let timing = shell.step();

        assert!(timing.finished_at - timing.started_at >= 0.010 - 1e-9);
        assert!(!timing.overran);
    }

    #[test]
    fn shutdown_releases_surface() {
        let platform = HeadlessPlatform::new();
        let handle = platform.handle();
        let mut shell = hosted().build(platform, DefaultHandlers);
        shell.initialize().unwrap();

        shell.shutdown();

        assert!(!shell.surface().is_initialized());
        assert_eq!(handle.log().shutdowns, 1);
    }

    #[test]
    fn resize_reaches_surface() {
        let mut shell = hosted().build(HeadlessPlatform::new(), DefaultHandlers);
        shell.resize(800, 600);
        assert_eq!(shell.surface().size(), (800, 600));
    }
}
