//! Pointer grabs.
//!
//! Every notification the seat receives is routed through the active grab.
//! The default grab forwards straight to the focused client; a custom grab
//! (interactive move, drag-and-drop, popups) can intercept, rewrite or swallow
//! events, and ends itself through [`PointerInnerHandle::unset_grab`].

use super::pointer::{AxisEvent, PointerInnerHandle};
use crate::protocol::{ButtonState, SurfaceHandle};

/// Intercepts pointer input before it reaches clients.
pub trait PointerGrab {
    fn enter(&mut self, handle: &mut PointerInnerHandle<'_>, surface: SurfaceHandle, sx: f64, sy: f64);

    fn clear_focus(&mut self, handle: &mut PointerInnerHandle<'_>);

    fn motion(&mut self, handle: &mut PointerInnerHandle<'_>, time: u32, sx: f64, sy: f64);

    /// Returns the serial of the button event sent to a client, or 0.
    fn button(&mut self, handle: &mut PointerInnerHandle<'_>, time: u32, button: u32, state: ButtonState) -> u32;

    fn axis(&mut self, handle: &mut PointerInnerHandle<'_>, event: AxisEvent);

    fn frame(&mut self, handle: &mut PointerInnerHandle<'_>);

    /// Called after the grab was replaced or ended.
    fn cancel(&mut self) {}
}

/// Pass-through grab active whenever no custom grab is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPointerGrab;

impl PointerGrab for DefaultPointerGrab {
    fn enter(&mut self, handle: &mut PointerInnerHandle<'_>, surface: SurfaceHandle, sx: f64, sy: f64) {
        handle.enter(surface, sx, sy);
    }

    fn clear_focus(&mut self, handle: &mut PointerInnerHandle<'_>) {
        handle.clear_focus();
    }

    fn motion(&mut self, handle: &mut PointerInnerHandle<'_>, time: u32, sx: f64, sy: f64) {
        handle.motion(time, sx, sy);
    }

    fn button(&mut self, handle: &mut PointerInnerHandle<'_>, time: u32, button: u32, state: ButtonState) -> u32 {
        handle.button(time, button, state)
    }

    fn axis(&mut self, handle: &mut PointerInnerHandle<'_>, event: AxisEvent) {
        handle.axis(event);
    }

    fn frame(&mut self, handle: &mut PointerInnerHandle<'_>) {
        handle.frame();
    }
}

pub(crate) enum ActiveGrab {
    Default(DefaultPointerGrab),
    Custom(Box<dyn PointerGrab>),
}

impl ActiveGrab {
    pub(crate) fn as_dyn(&mut self) -> &mut dyn PointerGrab {
        match self {
            ActiveGrab::Default(grab) => grab,
            ActiveGrab::Custom(grab) => grab.as_mut(),
        }
    }

    pub(crate) fn is_custom(&self) -> bool {
        matches!(self, ActiveGrab::Custom(_))
    }
}

impl Default for ActiveGrab {
    fn default() -> Self {
        ActiveGrab::Default(DefaultPointerGrab)
    }
}
