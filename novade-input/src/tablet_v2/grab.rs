//! Tablet tool grabs.
//!
//! Mirrors the pointer grab model: each tool notification runs through the
//! tool's active grab, which decides what reaches clients via the
//! [`ToolGrabHandle`].

use super::tool::ToolGrabHandle;
use crate::protocol::{ButtonState, SurfaceHandle};
use crate::translator::DeviceId;

/// Intercepts the notifications of one tool.
///
/// Each handler decides what to forward through the handle. Calling
/// [`ToolGrabHandle::end_grab`] restores the default grab after it returns.
pub trait TabletToolGrab {
    fn proximity_in(&mut self, handle: &mut ToolGrabHandle<'_>, tablet: DeviceId, surface: SurfaceHandle);
    fn proximity_out(&mut self, handle: &mut ToolGrabHandle<'_>);
    fn down(&mut self, handle: &mut ToolGrabHandle<'_>);
    fn up(&mut self, handle: &mut ToolGrabHandle<'_>);
    fn motion(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64);
    fn pressure(&mut self, handle: &mut ToolGrabHandle<'_>, pressure: f64);
    fn distance(&mut self, handle: &mut ToolGrabHandle<'_>, distance: f64);
    fn tilt(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64);
    fn rotation(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64);
    fn slider(&mut self, handle: &mut ToolGrabHandle<'_>, position: f64);
    fn wheel(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64, clicks: i32);
    fn button(&mut self, handle: &mut ToolGrabHandle<'_>, button: u32, state: ButtonState);

    /// Called once the grab was ended or replaced.
    fn cancel(&mut self, _handle: &mut ToolGrabHandle<'_>) {}
}

/// Forwards every notification unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultToolGrab;

impl TabletToolGrab for DefaultToolGrab {
    fn proximity_in(&mut self, handle: &mut ToolGrabHandle<'_>, tablet: DeviceId, surface: SurfaceHandle) {
        handle.send_proximity_in(tablet, surface);
    }

    fn proximity_out(&mut self, handle: &mut ToolGrabHandle<'_>) {
        handle.send_proximity_out();
    }

    fn down(&mut self, handle: &mut ToolGrabHandle<'_>) {
        handle.send_down();
    }

    fn up(&mut self, handle: &mut ToolGrabHandle<'_>) {
        handle.send_up();
    }

    fn motion(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64) {
        handle.send_motion(x, y);
    }

    fn pressure(&mut self, handle: &mut ToolGrabHandle<'_>, pressure: f64) {
        handle.send_pressure(pressure);
    }

    fn distance(&mut self, handle: &mut ToolGrabHandle<'_>, distance: f64) {
        handle.send_distance(distance);
    }

    fn tilt(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64) {
        handle.send_tilt(x, y);
    }

    fn rotation(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64) {
        handle.send_rotation(degrees);
    }

    fn slider(&mut self, handle: &mut ToolGrabHandle<'_>, position: f64) {
        handle.send_slider(position);
    }

    fn wheel(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64, clicks: i32) {
        handle.send_wheel(degrees, clicks);
    }

    fn button(&mut self, handle: &mut ToolGrabHandle<'_>, button: u32, state: ButtonState) {
        handle.send_button(button, state);
    }
}

/// Keeps a tool bound to the surface it went down or clicked on.
///
/// While active, proximity changes only move the remembered focus and motion
/// is delivered only while that focus is the original surface. When the tool
/// becomes idle the grab ends and the client focus is reconciled with where
/// the tool actually is.
#[derive(Debug, Clone)]
pub struct ImplicitGrab {
    pub(crate) original: SurfaceHandle,
    pub(crate) focused: Option<(DeviceId, SurfaceHandle)>,
}

impl ImplicitGrab {
    pub(crate) fn new(tablet: Option<DeviceId>, original: SurfaceHandle) -> Self {
        Self { original, focused: tablet.map(|t| (t, original)) }
    }

    pub fn original(&self) -> SurfaceHandle {
        self.original
    }

    pub fn focused(&self) -> Option<SurfaceHandle> {
        self.focused.map(|(_, surface)| surface)
    }

    fn end_if_idle(handle: &mut ToolGrabHandle<'_>) {
        if handle.state().is_idle() {
            handle.end_grab();
        }
    }
}

impl TabletToolGrab for ImplicitGrab {
    fn proximity_in(&mut self, _handle: &mut ToolGrabHandle<'_>, tablet: DeviceId, surface: SurfaceHandle) {
        self.focused = Some((tablet, surface));
    }

    fn proximity_out(&mut self, _handle: &mut ToolGrabHandle<'_>) {
        self.focused = None;
    }

    fn down(&mut self, handle: &mut ToolGrabHandle<'_>) {
        handle.send_down();
    }

    fn up(&mut self, handle: &mut ToolGrabHandle<'_>) {
        handle.send_up();
        Self::end_if_idle(handle);
    }

    fn motion(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64) {
        if self.focused() == Some(self.original) {
            handle.send_motion(x, y);
        }
    }

    fn pressure(&mut self, handle: &mut ToolGrabHandle<'_>, pressure: f64) {
        handle.send_pressure(pressure);
    }

    fn distance(&mut self, handle: &mut ToolGrabHandle<'_>, distance: f64) {
        handle.send_distance(distance);
    }

    fn tilt(&mut self, handle: &mut ToolGrabHandle<'_>, x: f64, y: f64) {
        handle.send_tilt(x, y);
    }

    fn rotation(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64) {
        handle.send_rotation(degrees);
    }

    fn slider(&mut self, handle: &mut ToolGrabHandle<'_>, position: f64) {
        handle.send_slider(position);
    }

    fn wheel(&mut self, handle: &mut ToolGrabHandle<'_>, degrees: f64, clicks: i32) {
        handle.send_wheel(degrees, clicks);
    }

    fn button(&mut self, handle: &mut ToolGrabHandle<'_>, button: u32, state: ButtonState) {
        handle.send_button(button, state);
        Self::end_if_idle(handle);
    }

    fn cancel(&mut self, handle: &mut ToolGrabHandle<'_>) {
        if self.focused() == Some(self.original) {
            return;
        }
        handle.send_proximity_out();
        if let Some((tablet, surface)) = self.focused {
            handle.send_proximity_in(tablet, surface);
        }
    }
}

pub(crate) enum ToolGrabSlot {
    Default(DefaultToolGrab),
    Implicit(ImplicitGrab),
    Custom(Box<dyn TabletToolGrab>),
}

impl ToolGrabSlot {
    pub(crate) fn as_dyn(&mut self) -> &mut dyn TabletToolGrab {
        match self {
            ToolGrabSlot::Default(grab) => grab,
            ToolGrabSlot::Implicit(grab) => grab,
            ToolGrabSlot::Custom(grab) => grab.as_mut(),
        }
    }

    pub(crate) fn is_default(&self) -> bool {
        matches!(self, ToolGrabSlot::Default(_))
    }

    pub(crate) fn is_implicit(&self) -> bool {
        matches!(self, ToolGrabSlot::Implicit(_))
    }
}

impl Default for ToolGrabSlot {
    fn default() -> Self {
        ToolGrabSlot::Default(DefaultToolGrab)
    }
}
