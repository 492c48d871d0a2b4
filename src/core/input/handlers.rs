//=========================================================================
// Input Handlers
//=========================================================================
//
// Capability interface with one override point per event category.
//
// Architecture:
//   EventRouter ──&mut dyn Handlers──> on_key_down / on_mouse_move / ...
//
// Every method has a default body, so an application overrides only the
// categories it cares about. The router never sees a concrete type.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::event::{KeyCode, KeyEvent, MouseMotion};
#[cfg(any(feature = "touch", target_arch = "wasm32"))]
use super::event::TouchEvent;
use crate::core::frame_loop::{Control, FrameInfo};

//=== Handlers ============================================================

/// Per-category input and update hooks.
///
/// # Defaults
///
/// All methods are no-ops except [`Handlers::on_key_up`], which requests
/// exit when Escape is released. Overriding `on_key_up` drops that policy
/// unless the override calls [`exit_on_escape`] itself.
///
/// # Examples
///
/// ```
/// use flappy_shell::core::frame_loop::Control;
/// use flappy_shell::core::input::Handlers;
///
/// #[derive(Default)]
/// struct Clicks {
///     count: u32,
/// }
///
/// impl Handlers for Clicks {
///     fn on_left_button_down(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {
///         self.count += 1;
///     }
/// }
/// ```
pub trait Handlers {
    //--- Keyboard ---------------------------------------------------------

    fn on_key_down(&mut self, _event: &KeyEvent, _control: &mut Control<'_>) {}

    /// Default policy: releasing Escape requests exit.
    fn on_key_up(&mut self, event: &KeyEvent, control: &mut Control<'_>) {
        exit_on_escape(event, control);
    }

    //--- Mouse ------------------------------------------------------------

    /// Cursor moved. Held-button flags are pre-decoded from the mask.
    fn on_mouse_move(
        &mut self,
        _motion: &MouseMotion,
        _held: HeldButtons,
        _control: &mut Control<'_>,
    ) {
    }

    fn on_left_button_down(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}
    fn on_right_button_down(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}
    fn on_middle_button_down(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}

    fn on_left_button_up(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}
    fn on_right_button_up(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}
    fn on_middle_button_up(&mut self, _x: i32, _y: i32, _control: &mut Control<'_>) {}

    //--- Touch ------------------------------------------------------------

    #[cfg(any(feature = "touch", target_arch = "wasm32"))]
    fn on_touch_begin(&mut self, _touch: &TouchEvent, _control: &mut Control<'_>) {}

    #[cfg(any(feature = "touch", target_arch = "wasm32"))]
    fn on_touch_move(&mut self, _touch: &TouchEvent, _control: &mut Control<'_>) {}

    #[cfg(any(feature = "touch", target_arch = "wasm32"))]
    fn on_touch_end(&mut self, _touch: &TouchEvent, _control: &mut Control<'_>) {}

    //--- Simulation -------------------------------------------------------

    /// Update phase hook, called once per frame after input.
    fn on_update(&mut self, _frame: &FrameInfo, _control: &mut Control<'_>) {}
}

/// Requests exit if `event` is the Escape key.
pub fn exit_on_escape(event: &KeyEvent, control: &mut Control<'_>) {
    if event.key == KeyCode::Escape {
        log::info!(target: "shell", "Escape released, requesting exit");
        control.request_exit();
    }
}

//=== HeldButtons =========================================================

/// Decoded held-button flags passed alongside a cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeldButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

//=== DefaultHandlers =====================================================

/// Handler set that keeps every default: no-ops plus Escape-to-exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHandlers;

impl Handlers for DefaultHandlers {}

//=========================================================================
// Unit Tests
//=========================================================================
