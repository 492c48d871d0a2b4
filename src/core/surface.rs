//=========================================================================
// Surface
//=========================================================================
//
// Owns the window + presentation context pair and its lifecycle.
//
// Lifecycle:
// ```text
//   new() ──initialize()──► [subsystem, window, context] ──present()*──►
//                                                          teardown()
//                                                          (or Drop)
// ```
//
// Teardown releases whatever initialization managed to create, in
// reverse order, and is a no-op the second time.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use super::input::event::InputEvent;
use super::platform_bridge::{
    ClearColor, ContextConfig, EventSource, GraphicsRequirements, Platform, SurfaceError,
    WindowConfig,
};

//=== SurfaceConfig =======================================================

/// Everything the surface needs to create and present.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub window: WindowConfig,
    pub context: ContextConfig,
    pub requirements: GraphicsRequirements,
    pub clear_color: ClearColor,
}

impl SurfaceConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            window: WindowConfig::new(title, width, height),
            context: ContextConfig::default(),
            requirements: GraphicsRequirements::default(),
            clear_color: ClearColor::default(),
        }
    }
}

//=== Surface =============================================================

/// Window and context owner.
///
/// The surface exclusively owns the platform backend and both handles.
/// Dropping it runs [`Surface::teardown`].
pub struct Surface<P: Platform> {
    platform: P,
    config: SurfaceConfig,
    window: Option<P::Window>,
    context: Option<P::Context>,
    subsystem_up: bool,
    presented: u64,
}

impl<P: Platform> Surface<P> {
    pub fn new(platform: P, config: SurfaceConfig) -> Self {
        Self {
            platform,
            config,
            window: None,
            context: None,
            subsystem_up: false,
            presented: 0,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Creates the window and context and checks graphics support.
    ///
    /// On failure, anything created so far stays owned by the surface
    /// and is released by [`Surface::teardown`].
    pub fn initialize(&mut self) -> Result<(), SurfaceError> {
        let result = self.create_resources();
        match &result {
            Ok(()) => info!(
                target: "surface",
                "Surface ready: \"{}\" {}x{}",
                self.config.window.title,
                self.config.window.width,
                self.config.window.height
            ),
            Err(e) => error!(target: "surface", "Surface initialization failed: {}", e),
        }
        result
    }

    fn create_resources(&mut self) -> Result<(), SurfaceError> {
        if !self.subsystem_up {
            self.platform.init()?;
            self.subsystem_up = true;
        }

        if self.window.is_none() {
            self.window = Some(self.platform.create_window(&self.config.window)?);
        }
        let window = match &self.window {
            Some(window) => window,
            None => return Err(SurfaceError::WindowCreation("window missing after creation".into())),
        };

        if self.context.is_none() {
            self.context = Some(self.platform.create_context(window, &self.config.context)?);
        }
        let context = match &mut self.context {
            Some(context) => context,
            None => {
                return Err(SurfaceError::ContextCreation(
                    "context missing after creation".into(),
                ))
            }
        };

        self.platform
            .verify_support(window, context, &self.config.requirements)
    }

    /// Releases context, window and subsystem. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        let had_resources = self.context.is_some() || self.window.is_some() || self.subsystem_up;

        if let Some(context) = self.context.take() {
            self.platform.destroy_context(context);
        }
        if let Some(window) = self.window.take() {
            self.platform.destroy_window(window);
        }
        if self.subsystem_up {
            self.platform.shutdown();
            self.subsystem_up = false;
        }

        if had_resources {
            info!(target: "surface", "Surface torn down after {} presents", self.presented);
        }
    }

    //--- Per-Frame --------------------------------------------------------

    /// Clears to the background color and swaps buffers.
    ///
    /// Does nothing before a successful [`Surface::initialize`].
    pub fn present(&mut self) {
        if let (Some(window), Some(context)) = (&self.window, &mut self.context) {
            self.platform.present(window, context, self.config.clear_color);
            self.presented += 1;
        }
    }

    /// Records new window dimensions. The context is not recreated.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(
            target: "surface",
            "Resize {}x{} -> {}x{}",
            self.config.window.width,
            self.config.window.height,
            width,
            height
        );
        self.config.window.width = width;
        self.config.window.height = height;
    }

    //--- Accessors --------------------------------------------------------

    pub fn title(&self) -> &str {
        &self.config.window.title
    }

    /// Stored (width, height).
    pub fn size(&self) -> (u32, u32) {
        (self.config.window.width, self.config.window.height)
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.window.is_some() && self.context.is_some()
    }

    /// Number of completed presents.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

//--- Trait Implementations -----------------------------------------------

impl<P: Platform> EventSource for Surface<P> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.platform.poll_event()
    }
}

impl<P: Platform> Drop for Surface<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
