//! Typed notifications published by the translator.
//!
//! Positions in these events are already normalized to `0.0..=1.0` layout space.

use crate::backend::{KeyState, ProximityState, SwitchKind, TipState, ToolAxes};
use crate::protocol::{Axis, AxisRelativeDirection, AxisSource, ButtonState};
use super::device::{DeviceId, DeviceInfo, DeviceKind};
use super::tool::{ToolId, ToolInfo};

/// An abstract device was created or destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceLifecycle {
    pub device: DeviceId,
    pub kind: DeviceKind,
    pub info: DeviceInfo,
}

/// A tool identity was created or destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolLifecycle {
    pub tool: ToolId,
    pub info: ToolInfo,
}

/// A key changed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardKeyEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub key: u32,
    pub state: KeyState,
}

/// Relative pointer motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotionEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    /// Accelerated delta in layout pixels.
    pub dx: f64,
    pub dy: f64,
    /// Delta before pointer acceleration.
    pub dx_unaccel: f64,
    pub dy_unaccel: f64,
}

/// Absolute pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotionAbsoluteEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub x: f64,
    pub y: f64,
}

/// A pointer button changed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerButtonEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub button: u32,
    pub state: ButtonState,
}

/// One scrolled axis. The frame that closes it follows separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAxisEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub source: AxisSource,
    pub axis: Axis,
    /// Continuous scroll value. Zero ends a scroll sequence.
    pub delta: f64,
    /// Discrete steps, 120 per wheel detent.
    pub value120: i32,
    pub relative_direction: AxisRelativeDirection,
}

/// What happened to a touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEventKind {
    Down { slot: i32, x: f64, y: f64 },
    Up { slot: i32 },
    Motion { slot: i32, x: f64, y: f64 },
    Cancel,
    Frame,
}

/// A touch event of one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub kind: TouchEventKind,
}

/// Axis update of a tablet tool. Only fields flagged in `updated_axes` carry new values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabletToolAxisEvent {
    pub device: DeviceId,
    pub tool: ToolId,
    pub time_msec: u32,
    /// Axes that changed with this event.
    pub updated_axes: ToolAxes,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    /// `0.0..=1.0`.
    pub pressure: f64,
    /// `0.0..=1.0`.
    pub distance: f64,
    /// Degrees from the vertical, along each axis.
    pub tilt_x: f64,
    pub tilt_y: f64,
    /// Degrees, clockwise from the logical neutral position.
    pub rotation: f64,
    /// `-1.0..=1.0`.
    pub slider: f64,
    /// Wheel rotation in degrees.
    pub wheel_delta: f64,
    pub wheel_discrete: i32,
}

/// A tool entered or left proximity of a tablet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabletToolProximityEvent {
    pub device: DeviceId,
    pub tool: ToolId,
    pub time_msec: u32,
    pub state: ProximityState,
    /// Position where the tool entered or left, normalized.
    pub x: f64,
    pub y: f64,
}

/// A tool touched or left the tablet surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabletToolTipEvent {
    pub device: DeviceId,
    pub tool: ToolId,
    pub time_msec: u32,
    pub state: TipState,
    /// Position of the contact, normalized.
    pub x: f64,
    pub y: f64,
}

/// A tool button changed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabletToolButtonEvent {
    pub device: DeviceId,
    pub tool: ToolId,
    pub time_msec: u32,
    pub button: u32,
    pub state: ButtonState,
}

/// What happened on a tablet pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabletPadEventKind {
    Button { button: u32, state: ButtonState },
    Ring { ring: u32, position: f64 },
    Strip { strip: u32, position: f64 },
}

/// A tablet pad event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabletPadEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub kind: TabletPadEventKind,
}

/// A lid or tablet-mode switch toggled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchToggleEvent {
    pub device: DeviceId,
    pub time_msec: u32,
    pub switch: SwitchKind,
    /// Whether the switch is now on.
    pub on: bool,
}

/// Everything the translator publishes, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum InputNotification {
    DeviceAdded(DeviceLifecycle),
    DeviceRemoved(DeviceLifecycle),
    ToolAdded(ToolLifecycle),
    ToolDestroyed(ToolLifecycle),
    KeyboardKey(KeyboardKeyEvent),
    PointerMotion(PointerMotionEvent),
    PointerMotionAbsolute(PointerMotionAbsoluteEvent),
    PointerButton(PointerButtonEvent),
    PointerAxis(PointerAxisEvent),
    PointerFrame { device: DeviceId },
    Touch(TouchEvent),
    TabletToolAxis(TabletToolAxisEvent),
    TabletToolProximity(TabletToolProximityEvent),
    TabletToolTip(TabletToolTipEvent),
    TabletToolButton(TabletToolButtonEvent),
    TabletPad(TabletPadEvent),
    Switch(SwitchToggleEvent),
}

/// Converts a backend timestamp to the millisecond clock carried on the wire.
pub(crate) fn time_msec(time_usec: u64) -> u32 {
    (time_usec / 1000) as u32
}
