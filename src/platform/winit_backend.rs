//=========================================================================
// Winit Backend
//=========================================================================
//
// Desktop platform: winit window + softbuffer presentation.
//
// Lifecycle:
// 1. `init()`            creates the event loop
// 2. `create_window()`   pumps the loop until the window request is served
// 3. `create_context()`  binds a softbuffer context/surface to the window
// 4. `poll_event()`      pumps with a zero timeout, then pops one event
// 5. teardown            drops surface, window, then the event loop
//
// `detach_host()` lends the event loop to a [`WinitHost`] for the hosted
// driver; polling then only drains the shared buffer. The loop returns to
// the platform when the host finishes, so teardown still releases the
// context and window before the loop.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{RefCell, RefMut};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};
use softbuffer::SoftBufferError;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    error::{EventLoopError, OsError},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    platform::run_on_demand::EventLoopExtRunOnDemand,
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::input_buffer::InputBuffer;
use crate::core::input::event::InputEvent;
use crate::core::platform_bridge::{
    ClearColor, ContextConfig, EventSource, GraphicsRequirements, Platform, SurfaceError,
    WindowConfig,
};
use crate::driver::{Host, HostControl, TickCadence};

//=== Constants ===========================================================

/// Pump iterations allowed for the event loop to serve a window request.
const WINDOW_CREATION_PUMPS: usize = 64;

/// Per-pump wait while creating the window.
const WINDOW_CREATION_WAIT: Duration = Duration::from_millis(16);

//=== SoftContext =========================================================

/// softbuffer context and surface bound to one window.
pub struct SoftContext {
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
    // Must outlive `surface`; field order keeps it dropped last.
    _context: softbuffer::Context<Rc<Window>>,
    config: ContextConfig,
}

impl SoftContext {
    /// Attributes the context was requested with.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Resizes the backing buffer to the window's current drawable size.
    ///
    /// Returns `Ok(false)` when the window has no drawable area.
    fn fit_to(&mut self, window: &Window) -> Result<bool, SoftBufferError> {
        let size = window.inner_size();
        match (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            (Some(width), Some(height)) => {
                self.surface.resize(width, height)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

//=== WinitPlatform =======================================================

/// Winit + softbuffer implementation of [`Platform`].
///
/// Must be used from the main thread (winit requirement on macOS).
pub struct WinitPlatform {
    event_loop: LoopSlot<EventLoop<()>>,
    input: Rc<RefCell<InputBuffer>>,
    loop_exited: bool,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self {
            event_loop: LoopSlot::new(),
            input: Rc::new(RefCell::new(InputBuffer::new())),
            loop_exited: false,
        }
    }

    /// Lends the event loop to a host for the hosted driver.
    ///
    /// Returns `None` before `init()` or while already lent out.
    pub fn detach_host(&mut self) -> Option<WinitHost> {
        let event_loop = self.event_loop.lend()?;
        info!(target: "platform", "Event loop handed to hosted driver");
        Some(WinitHost {
            event_loop,
            input: Rc::clone(&self.input),
        })
    }

    /// Events converted but not yet polled.
    pub fn pending_events(&self) -> usize {
        self.input.borrow().len()
    }

    fn window_attributes(config: &WindowConfig) -> WindowAttributes {
        Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_visible(config.visible)
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

//--- EventSource ---------------------------------------------------------

impl EventSource for WinitPlatform {
    fn poll_event(&mut self) -> Option<InputEvent> {
        if !self.loop_exited {
            let mut slot = self.event_loop.borrow_mut();
            if let Some(event_loop) = slot.as_mut() {
                let mut app = PumpApp::listening(&self.input);
                if let PumpStatus::Exit(code) =
                    event_loop.pump_app_events(Some(Duration::ZERO), &mut app)
                {
                    info!(target: "platform", "Event loop exited (code {})", code);
                    self.loop_exited = true;
                    self.input.borrow_mut().push(InputEvent::Quit);
                }
            }
        }

        self.input.borrow_mut().pop()
    }
}

//--- Platform ------------------------------------------------------------

impl Platform for WinitPlatform {
    type Window = Rc<Window>;
    type Context = SoftContext;

    fn init(&mut self) -> Result<(), SurfaceError> {
        if self.event_loop.is_present() {
            return Ok(());
        }

        let event_loop =
            EventLoop::new().map_err(|e| SurfaceError::PlatformInit(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        info!(target: "platform", "Winit event loop created");
        self.event_loop.put(event_loop);
        self.loop_exited = false;
        Ok(())
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, SurfaceError> {
        let mut slot = self.event_loop.borrow_mut();
        let event_loop = slot
            .as_mut()
            .ok_or_else(|| SurfaceError::WindowCreation("event loop not initialized".into()))?;

        let mut app = PumpApp::listening(&self.input);
        app.window_request = Some(WindowRequest {
            attributes: Self::window_attributes(config),
            centered: config.centered,
            size: (config.width, config.height),
        });

        for _ in 0..WINDOW_CREATION_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(WINDOW_CREATION_WAIT), &mut app)
            {
                return Err(SurfaceError::WindowCreation(format!(
                    "event loop exited with code {} before the window appeared",
                    code
                )));
            }

            if let Some(result) = app.created.take() {
                let window = result.map_err(|e| SurfaceError::WindowCreation(e.to_string()))?;
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                return Ok(Rc::new(window));
            }
        }

        Err(SurfaceError::WindowCreation(
            "event loop never served the window request".into(),
        ))
    }

    fn create_context(
        &mut self,
        window: &Self::Window,
        config: &ContextConfig,
    ) -> Result<Self::Context, SurfaceError> {
        debug!(
            target: "platform",
            "Context requested: {} {:?}, double_buffer={}, depth={}, color={}, vsync={}",
            config.version,
            config.profile,
            config.double_buffer,
            config.depth_bits,
            config.color_bits,
            config.vsync
        );

        let context = softbuffer::Context::new(Rc::clone(window)).map_err(context_error)?;
        let surface = softbuffer::Surface::new(&context, Rc::clone(window)).map_err(context_error)?;

        Ok(SoftContext {
            surface,
            _context: context,
            config: *config,
        })
    }

    fn verify_support(
        &mut self,
        window: &Self::Window,
        context: &mut Self::Context,
        requirements: &GraphicsRequirements,
    ) -> Result<(), SurfaceError> {
        trace!(
            target: "platform",
            "Software presentation: version {} requirement does not apply",
            requirements.min_version
        );

        let missing = |e: SoftBufferError| SurfaceError::MissingGraphicsSupport(e.to_string());

        // softbuffer always hands out a back buffer and presents it whole,
        // so a buffer we can map is double buffering.
        if context.fit_to(window).map_err(missing)? {
            context.surface.buffer_mut().map_err(missing)?;
        } else {
            debug!(target: "platform", "Window has no drawable area yet, skipping buffer check");
        }

        Ok(())
    }

    fn present(&mut self, window: &Self::Window, context: &mut Self::Context, color: ClearColor) {
        match context.fit_to(window) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                warn!(target: "platform", "Surface resize failed: {}", e);
                return;
            }
        }

        let mut buffer = match context.surface.buffer_mut() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(target: "platform", "Back buffer unavailable: {}", e);
                return;
            }
        };

        buffer.fill(color.to_rgb_u32());
        if let Err(e) = buffer.present() {
            warn!(target: "platform", "Present failed: {}", e);
        }
    }

    fn destroy_context(&mut self, context: Self::Context) {
        debug!(target: "platform", "Destroying softbuffer context");
        drop(context);
    }

    fn destroy_window(&mut self, window: Self::Window) {
        if Rc::strong_count(&window) > 1 {
            warn!(target: "platform", "Window still referenced at destroy time");
        }
        debug!(target: "platform", "Destroying window {:?}", window.id());
        drop(window);
    }

    fn shutdown(&mut self) {
        drop(self.event_loop.take());
        self.input.borrow_mut().clear();
        info!(target: "platform", "Winit platform shut down");
    }
}

fn context_error(e: SoftBufferError) -> SurfaceError {
    match e {
        SoftBufferError::UnsupportedDisplayPlatform { .. }
        | SoftBufferError::UnsupportedWindowPlatform { .. } => {
            SurfaceError::MissingGraphicsSupport(e.to_string())
        }
        other => SurfaceError::ContextCreation(other.to_string()),
    }
}

//=== PumpApp =============================================================

struct WindowRequest {
    attributes: WindowAttributes,
    centered: bool,
    size: (u32, u32),
}

/// Application handler used while the process drives the loop.
struct PumpApp<'a> {
    input: &'a RefCell<InputBuffer>,
    window_request: Option<WindowRequest>,
    created: Option<Result<Window, OsError>>,
}

impl<'a> PumpApp<'a> {
    fn listening(input: &'a RefCell<InputBuffer>) -> Self {
        Self {
            input,
            window_request: None,
            created: None,
        }
    }

    fn serve_window_request(&mut self, event_loop: &ActiveEventLoop) {
        let Some(request) = self.window_request.take() else {
            return;
        };

        let mut attributes = request.attributes;
        if request.centered {
            if let Some(monitor) = event_loop.primary_monitor() {
                let scale = monitor.scale_factor();
                let screen = monitor.size();
                let origin = monitor.position();
                let width = (request.size.0 as f64 * scale) as i32;
                let height = (request.size.1 as f64 * scale) as i32;
                attributes = attributes.with_position(PhysicalPosition::new(
                    origin.x + (screen.width as i32 - width) / 2,
                    origin.y + (screen.height as i32 - height) / 2,
                ));
            }
        }

        let result = event_loop.create_window(attributes);
        if let Err(e) = &result {
            error!(target: "platform", "Window creation failed: {}", e);
        }
        self.created = Some(result);
    }
}

impl ApplicationHandler for PumpApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.serve_window_request(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.input.borrow_mut().record(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Resumed only fires once; later requests are served here.
        self.serve_window_request(event_loop);
    }
}

//=== LoopSlot ============================================================

/// Shared home of the event loop.
///
/// A value lent out with [`LoopSlot::lend`] goes back into the slot when
/// its [`Lent`] guard drops, including on error paths.
struct LoopSlot<T> {
    home: Rc<RefCell<Option<T>>>,
}

impl<T> LoopSlot<T> {
    fn new() -> Self {
        Self {
            home: Rc::new(RefCell::new(None)),
        }
    }

    fn is_present(&self) -> bool {
        self.home.borrow().is_some()
    }

    fn put(&self, value: T) {
        *self.home.borrow_mut() = Some(value);
    }

    fn take(&self) -> Option<T> {
        self.home.borrow_mut().take()
    }

    fn borrow_mut(&self) -> RefMut<'_, Option<T>> {
        self.home.borrow_mut()
    }

    fn lend(&self) -> Option<Lent<T>> {
        let value = self.take()?;
        Some(Lent {
            value: Some(value),
            home: Rc::clone(&self.home),
        })
    }
}

struct Lent<T> {
    value: Option<T>,
    home: Rc<RefCell<Option<T>>>,
}

impl<T> Lent<T> {
    fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }
}

impl<T> Drop for Lent<T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            *self.home.borrow_mut() = Some(value);
        }
    }
}

//=== WinitHost ===========================================================

/// Hosted driver backed by winit's own loop.
///
/// winit calls back once per loop iteration (`about_to_wait`); the shell
/// is ticked whenever the cadence says a frame is due, and the loop then
/// sleeps with `ControlFlow::WaitUntil` until the next deadline.
pub struct WinitHost {
    event_loop: Lent<EventLoop<()>>,
    input: Rc<RefCell<InputBuffer>>,
}

impl Host for WinitHost {
    type Error = EventLoopError;

    fn run(
        mut self,
        cadence: TickCadence,
        tick: &mut dyn FnMut() -> HostControl,
    ) -> Result<(), Self::Error> {
        let Some(event_loop) = self.event_loop.get_mut() else {
            return Ok(());
        };

        let mut app = HostedApp {
            input: &self.input,
            tick,
            cadence,
        };
        let result = event_loop.run_app_on_demand(&mut app);
        debug!(target: "platform", "Hosted loop finished, returning event loop");
        result
    }
}

struct HostedApp<'a, 't> {
    input: &'a RefCell<InputBuffer>,
    tick: &'a mut (dyn FnMut() -> HostControl + 't),
    cadence: TickCadence,
}

impl ApplicationHandler for HostedApp<'_, '_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        debug!(target: "platform", "Hosted loop resumed");
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.input.borrow_mut().record(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.cadence.is_due(now) {
            self.cadence.advance(now);
            if (self.tick)() == HostControl::Exit {
                event_loop.exit();
                return;
            }
        }

        if let Some(deadline) = self.cadence.deadline() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
