//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// The contract every windowing/graphics backend implements.
//
// The shell treats the backend as an opaque service offering exactly:
// create window, create context, present, poll next input event, and
// the matching teardown calls. Handle types are associated types so the
// surface can own them without knowing what they are.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== EventSource =========================================================

/// Non-blocking queue of platform input events.
pub trait EventSource {
    /// Pops the oldest pending event, or `None` if the queue is empty.
    fn poll_event(&mut self) -> Option<InputEvent>;
}

//=== Platform ============================================================

/// Opaque windowing and presentation service.
///
/// Calls arrive in this order over a surface's lifetime:
///
/// ```text
/// init → create_window → create_context → verify_support
///      → (present | poll_event)*
///      → destroy_context → destroy_window → shutdown
/// ```
///
/// Any prefix of the creation sequence may be followed directly by the
/// matching subset of teardown calls when a stage fails.
pub trait Platform: EventSource {
    /// Native window handle.
    type Window;

    /// Presentation context bound to a window.
    type Context;

    /// Brings up the platform subsystem.
    fn init(&mut self) -> Result<(), SurfaceError>;

    fn create_window(&mut self, config: &WindowConfig) -> Result<Self::Window, SurfaceError>;

    fn create_context(
        &mut self,
        window: &Self::Window,
        config: &ContextConfig,
    ) -> Result<Self::Context, SurfaceError>;

    /// Checks the created context meets `requirements`.
    fn verify_support(
        &mut self,
        window: &Self::Window,
        context: &mut Self::Context,
        requirements: &GraphicsRequirements,
    ) -> Result<(), SurfaceError>;

    /// Clears to `color` and swaps buffers. Failures are the backend's to log.
    fn present(&mut self, window: &Self::Window, context: &mut Self::Context, color: ClearColor);

    fn destroy_context(&mut self, context: Self::Context);
    fn destroy_window(&mut self, window: Self::Window);

    /// Releases the platform subsystem.
    fn shutdown(&mut self);
}

//=== SurfaceError ========================================================

/// Initialization failures. None of these are recoverable locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("platform initialization failed: {0}")]
    PlatformInit(String),

    #[error("window creation failed: {0}")]
    WindowCreation(String),

    #[error("graphics context creation failed: {0}")]
    ContextCreation(String),

    #[error("required graphics support missing: {0}")]
    MissingGraphicsSupport(String),
}

//=== Configuration =======================================================

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub centered: bool,
    pub visible: bool,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            centered: true,
            visible: true,
        }
    }
}

/// Graphics API version as (major, minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphicsVersion {
    pub major: u8,
    pub minor: u8,
}

impl GraphicsVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for GraphicsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextProfile {
    Core,
    Compatibility,
}

/// Requested context attributes.
///
/// Backends honour what they can; [`GraphicsRequirements`] decides what
/// is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    pub version: GraphicsVersion,
    pub profile: ContextProfile,
    pub double_buffer: bool,
    pub depth_bits: u8,
    pub color_bits: u8,

    /// Present in step with the display's vertical refresh.
    pub vsync: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            version: GraphicsVersion::new(3, 2),
            profile: ContextProfile::Core,
            double_buffer: true,
            depth_bits: 16,
            color_bits: 32,
            vsync: true,
        }
    }
}

/// Minimum capabilities the shell refuses to run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsRequirements {
    pub min_version: GraphicsVersion,
    pub double_buffer: bool,
}

impl Default for GraphicsRequirements {
    fn default() -> Self {
        Self {
            min_version: GraphicsVersion::new(2, 0),
            double_buffer: true,
        }
    }
}

//=== ClearColor ==========================================================

/// RGBA background color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Packs to `0x00RRGGBB` (alpha dropped), the software buffer layout.
    pub fn to_rgb_u32(self) -> u32 {
        fn channel(value: f32) -> u32 {
            (value.clamp(0.0, 1.0) * 255.0).round() as u32
        }
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

impl Default for ClearColor {
    /// Dark slate background.
    fn default() -> Self {
        Self::rgba(0.1, 0.1, 0.15, 1.0)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
