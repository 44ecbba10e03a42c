//! Backend boundary: what a hardware backend hands to the translator.
//!
//! Devices and tools are identified by opaque native handles. The translator
//! never talks to a backend library directly, it only consumes [`BackendEvent`]s.

#[cfg(feature = "backend_libinput")]
pub mod libinput;

use bitflags::bitflags;

use crate::protocol::{Axis, AxisRelativeDirection, AxisSource, ButtonState, ToolCapability, ToolType};

/// Opaque handle of a physical device as the backend knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeDeviceId(pub u64);

/// Opaque handle of a physical tablet tool as the backend knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeToolId(pub u64);

bitflags! {
    /// Capabilities a physical device exposes. Each set bit becomes one abstract device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceCapabilities: u32 {
        const KEYBOARD = 1 << 0;
        const POINTER = 1 << 1;
        const TOUCH = 1 << 2;
        const TABLET_TOOL = 1 << 3;
        const TABLET_PAD = 1 << 4;
        const SWITCH = 1 << 5;
    }
}

bitflags! {
    /// Optional axes a tablet tool can report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ToolCapabilities: u32 {
        const PRESSURE = 1 << 0;
        const TILT = 1 << 1;
        const ROTATION = 1 << 2;
        const DISTANCE = 1 << 3;
        const SLIDER = 1 << 4;
        const WHEEL = 1 << 5;
    }
}

impl ToolCapabilities {
    /// Protocol capability announcements, in wire enum order.
    pub fn announcements(self) -> Vec<ToolCapability> {
        [
            (ToolCapabilities::TILT, ToolCapability::Tilt),
            (ToolCapabilities::PRESSURE, ToolCapability::Pressure),
            (ToolCapabilities::DISTANCE, ToolCapability::Distance),
            (ToolCapabilities::ROTATION, ToolCapability::Rotation),
            (ToolCapabilities::SLIDER, ToolCapability::Slider),
            (ToolCapabilities::WHEEL, ToolCapability::Wheel),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, capability)| capability)
        .collect()
    }
}

bitflags! {
    /// Axes that changed in one tool event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ToolAxes: u32 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const DISTANCE = 1 << 2;
        const PRESSURE = 1 << 3;
        const TILT_X = 1 << 4;
        const TILT_Y = 1 << 5;
        const ROTATION = 1 << 6;
        const SLIDER = 1 << 7;
        const WHEEL = 1 << 8;
    }
}

/// Inclusive range of a device's absolute axis, in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsRange {
    pub min: f64,
    pub max: f64,
}

impl AbsRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub vendor: u32,
    pub product: u32,
    pub path: Option<String>,
    pub capabilities: DeviceCapabilities,
    pub abs_x: Option<AbsRange>,
    pub abs_y: Option<AbsRange>,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, capabilities: DeviceCapabilities) -> Self {
        Self {
            name: name.into(),
            vendor: 0,
            product: 0,
            path: None,
            capabilities,
            abs_x: None,
            abs_y: None,
        }
    }

    pub fn with_usb_id(mut self, vendor: u32, product: u32) -> Self {
        self.vendor = vendor;
        self.product = product;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_abs_ranges(mut self, x: AbsRange, y: AbsRange) -> Self {
        self.abs_x = Some(x);
        self.abs_y = Some(y);
        self
    }
}

/// Hardware description of a tool, carried on every tool event.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeToolDescriptor {
    pub id: NativeToolId,
    pub tool_type: ToolType,
    pub hardware_serial: u64,
    pub hardware_id_wacom: u64,
    pub capabilities: ToolCapabilities,
    /// Whether the hardware can tell this physical tool apart from others of its kind.
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeyboardEvent {
    pub time_usec: u64,
    pub key: u32,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPointerEvent {
    Motion {
        time_usec: u64,
        dx: f64,
        dy: f64,
        dx_unaccel: f64,
        dy_unaccel: f64,
    },
    /// Absolute position in device units.
    MotionAbsolute { time_usec: u64, x: f64, y: f64 },
    Button { time_usec: u64, button: u32, state: ButtonState },
    /// One scrolled axis. The axes of a single hardware event stay open until
    /// the [`RawPointerEvent::Frame`] that follows them.
    Axis {
        time_usec: u64,
        source: AxisSource,
        axis: Axis,
        delta: f64,
        value120: i32,
        relative_direction: AxisRelativeDirection,
    },
    /// Closes the axis events of one hardware event.
    Frame { time_usec: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTouchEvent {
    Down { time_usec: u64, slot: i32, x: f64, y: f64 },
    Up { time_usec: u64, slot: i32 },
    Motion { time_usec: u64, slot: i32, x: f64, y: f64 },
    Cancel { time_usec: u64 },
    Frame { time_usec: u64 },
}

/// Axis values of one tool event. Only axes flagged in `changed` are meaningful.
/// `x`/`y` are absolute device units; `dx`/`dy` are signed deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawToolAxes {
    pub changed: ToolAxes,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub pressure: f64,
    pub distance: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub rotation: f64,
    pub slider: f64,
    pub wheel_delta: f64,
    pub wheel_discrete: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityState {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipState {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToolEventKind {
    Axis,
    Proximity(ProximityState),
    Tip(TipState),
    Button { button: u32, state: ButtonState },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTabletToolEvent {
    pub time_usec: u64,
    pub tool: NativeToolDescriptor,
    pub axes: RawToolAxes,
    pub kind: RawToolEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTabletPadEvent {
    Button { time_usec: u64, button: u32, state: ButtonState },
    Ring { time_usec: u64, ring: u32, position: f64 },
    Strip { time_usec: u64, strip: u32, position: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    Lid,
    TabletMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSwitchEvent {
    pub time_usec: u64,
    pub switch: SwitchKind,
    pub on: bool,
}

/// One event from the hardware backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    DeviceAdded { device: NativeDeviceId, descriptor: DeviceDescriptor },
    DeviceRemoved { device: NativeDeviceId },
    Keyboard { device: NativeDeviceId, event: RawKeyboardEvent },
    Pointer { device: NativeDeviceId, event: RawPointerEvent },
    Touch { device: NativeDeviceId, event: RawTouchEvent },
    TabletTool { device: NativeDeviceId, event: RawTabletToolEvent },
    TabletPad { device: NativeDeviceId, event: RawTabletPadEvent },
    Switch { device: NativeDeviceId, event: RawSwitchEvent },
}

impl BackendEvent {
    pub fn device(&self) -> NativeDeviceId {
        match self {
            BackendEvent::DeviceAdded { device, .. }
            | BackendEvent::DeviceRemoved { device }
            | BackendEvent::Keyboard { device, .. }
            | BackendEvent::Pointer { device, .. }
            | BackendEvent::Touch { device, .. }
            | BackendEvent::TabletTool { device, .. }
            | BackendEvent::TabletPad { device, .. }
            | BackendEvent::Switch { device, .. } => *device,
        }
    }
}
