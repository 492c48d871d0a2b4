//=========================================================================
// Headless Platform
//=========================================================================
//
// Scripted, display-less backend.
//
// Architecture:
//   HeadlessHandle ──push_event()──► shared queue ──poll_event()──► shell
//   HeadlessPlatform ──every call──► shared HeadlessLog ◄──log()── handle
//
// Stage failures can be injected to exercise every initialization error
// path, and the handle outlives the platform so teardown performed by
// `Drop` can still be inspected.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;
use crate::core::platform_bridge::{
    ClearColor, ContextConfig, EventSource, GraphicsRequirements, GraphicsVersion, Platform,
    SurfaceError, WindowConfig,
};

//=== FailAt ==============================================================

/// Initialization stage to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Init,
    Window,
    Context,
}

//=== Handles =============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub id: u32,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessContext {
    pub id: u32,
    pub version: GraphicsVersion,
    pub double_buffer: bool,
}

//=== HeadlessLog =========================================================

/// Counters for every platform call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessLog {
    pub inits: u32,
    pub windows_created: u32,
    pub contexts_created: u32,
    pub presents: u64,
    pub polls: u64,
    pub contexts_destroyed: u32,
    pub windows_destroyed: u32,
    pub shutdowns: u32,
    pub last_window_title: Option<String>,
    pub last_clear: Option<ClearColor>,
    pub teardown_order: Vec<&'static str>,
}

#[derive(Debug, Default)]
struct Shared {
    log: HeadlessLog,
    events: VecDeque<InputEvent>,
}

//=== HeadlessHandle =======================================================

/// Test-side handle onto a [`HeadlessPlatform`]'s queue and call log.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessHandle {
    /// Snapshot of the call log.
    pub fn log(&self) -> HeadlessLog {
        self.shared.borrow().log.clone()
    }

    pub fn push_event(&self, event: InputEvent) {
        self.shared.borrow_mut().events.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.shared.borrow().events.len()
    }
}

//=== HeadlessPlatform ====================================================

/// Platform backend with no display, driven entirely by its handle.
#[derive(Debug)]
pub struct HeadlessPlatform {
    shared: Rc<RefCell<Shared>>,
    fail_at: Option<FailAt>,
    version: GraphicsVersion,
    double_buffer: bool,
    next_id: u32,
}

impl HeadlessPlatform {
    /// A fully capable platform (version 3.2, double buffered).
    pub fn new() -> Self {
        Self {
            shared: Rc::default(),
            fail_at: None,
            version: GraphicsVersion::new(3, 2),
            double_buffer: true,
            next_id: 1,
        }
    }

    //--- Builder ----------------------------------------------------------

    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Highest graphics version the fake driver reports.
    pub fn with_graphics_version(mut self, version: GraphicsVersion) -> Self {
        self.version = version;
        self
    }

    pub fn without_double_buffer(mut self) -> Self {
        self.double_buffer = false;
        self
    }

    /// Pre-loads the event queue.
    pub fn with_events(self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.shared.borrow_mut().events.extend(events);
        self
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            shared: Rc::clone(&self.shared),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn fails(&self, stage: FailAt) -> bool {
        self.fail_at == Some(stage)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

//--- Trait Implementations -----------------------------------------------

impl EventSource for HeadlessPlatform {
    fn poll_event(&mut self) -> Option<InputEvent> {
        let mut shared = self.shared.borrow_mut();
        shared.log.polls += 1;
        shared.events.pop_front()
    }
}

impl Platform for HeadlessPlatform {
    type Window = HeadlessWindow;
    type Context = HeadlessContext;

    fn init(&mut self) -> Result<(), SurfaceError> {
        if self.fails(FailAt::Init) {
            return Err(SurfaceError::PlatformInit("headless init disabled".into()));
        }
        self.shared.borrow_mut().log.inits += 1;
        debug!(target: "platform", "Headless platform up");
        Ok(())
    }

    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, SurfaceError> {
        if self.fails(FailAt::Window) {
            return Err(SurfaceError::WindowCreation("headless window disabled".into()));
        }

        let window = HeadlessWindow {
            id: self.next_id(),
            title: config.title.clone(),
            width: config.width,
            height: config.height,
        };

        let mut shared = self.shared.borrow_mut();
        shared.log.windows_created += 1;
        shared.log.last_window_title = Some(config.title.clone());
        Ok(window)
    }

    fn create_context(
        &mut self,
        _window: &Self::Window,
        config: &ContextConfig,
    ) -> Result<Self::Context, SurfaceError> {
        if self.fails(FailAt::Context) {
            return Err(SurfaceError::ContextCreation("headless context disabled".into()));
        }

        let context = HeadlessContext {
            id: self.next_id(),
            version: config.version.min(self.version),
            double_buffer: config.double_buffer && self.double_buffer,
        };
        self.shared.borrow_mut().log.contexts_created += 1;
        Ok(context)
    }

    fn verify_support(
        &mut self,
        _window: &Self::Window,
        context: &mut Self::Context,
        requirements: &GraphicsRequirements,
    ) -> Result<(), SurfaceError> {
        if context.version < requirements.min_version {
            return Err(SurfaceError::MissingGraphicsSupport(format!(
                "version {} required, driver offers {}",
                requirements.min_version, context.version
            )));
        }
        if requirements.double_buffer && !context.double_buffer {
            return Err(SurfaceError::MissingGraphicsSupport(
                "double buffering unavailable".into(),
            ));
        }
        Ok(())
    }

    fn present(&mut self, window: &Self::Window, _context: &mut Self::Context, color: ClearColor) {
        trace!(target: "platform", "Headless present on window {}", window.id);
        let mut shared = self.shared.borrow_mut();
        shared.log.presents += 1;
        shared.log.last_clear = Some(color);
    }

    fn destroy_context(&mut self, _context: Self::Context) {
        let mut shared = self.shared.borrow_mut();
        shared.log.contexts_destroyed += 1;
        shared.log.teardown_order.push("destroy_context");
    }

    fn destroy_window(&mut self, _window: Self::Window) {
        let mut shared = self.shared.borrow_mut();
        shared.log.windows_destroyed += 1;
        shared.log.teardown_order.push("destroy_window");
    }

    fn shutdown(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.log.shutdowns += 1;
        shared.log.teardown_order.push("shutdown");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyCode, KeyEvent};

    #[test]
    fn events_pop_in_fifo_order() {
        let mut platform = HeadlessPlatform::new().with_events([
            InputEvent::KeyDown(KeyEvent::plain(KeyCode::KeyA)),
            InputEvent::Quit,
        ]);

        assert_eq!(
            platform.poll_event(),
            Some(InputEvent::KeyDown(KeyEvent::plain(KeyCode::KeyA)))
        );
        assert_eq!(platform.poll_event(), Some(InputEvent::Quit));
        assert_eq!(platform.poll_event(), None);
        assert_eq!(platform.handle().log().polls, 3);
    }

    #[test]
    fn handle_pushes_reach_platform() {
        let mut platform = HeadlessPlatform::new();
        let handle = platform.handle();

        handle.push_event(InputEvent::Quit);
        assert_eq!(handle.pending_events(), 1);

        assert_eq!(platform.poll_event(), Some(InputEvent::Quit));
        assert_eq!(handle.pending_events(), 0);
    }

    #[test]
    fn context_version_is_capped_by_driver() {
        let mut platform = HeadlessPlatform::new().with_graphics_version(GraphicsVersion::new(2, 1));
        let window = platform.create_window(&WindowConfig::new("w", 1, 1)).unwrap();

        let context = platform
            .create_context(&window, &ContextConfig::default())
            .unwrap();

        assert_eq!(context.version, GraphicsVersion::new(2, 1));
    }

    #[test]
    fn missing_double_buffer_fails_verification() {
        let mut platform = HeadlessPlatform::new().without_double_buffer();
        let window = platform.create_window(&WindowConfig::new("w", 1, 1)).unwrap();
        let mut context = platform
            .create_context(&window, &ContextConfig::default())
            .unwrap();

        let result =
            platform.verify_support(&window, &mut context, &GraphicsRequirements::default());

        assert!(matches!(result, Err(SurfaceError::MissingGraphicsSupport(_))));
    }

    #[test]
    fn handles_get_distinct_ids() {
        let mut platform = HeadlessPlatform::new();
        let window = platform.create_window(&WindowConfig::new("w", 1, 1)).unwrap();
        let context = platform
            .create_context(&window, &ContextConfig::default())
            .unwrap();
        assert_ne!(window.id, context.id);
    }
}
