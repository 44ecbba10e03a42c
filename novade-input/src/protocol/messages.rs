//! Outbound protocol messages, one enum per interface.

use super::{
    Axis, AxisRelativeDirection, AxisSource, ButtonState, Fixed, ObjectId, SurfaceId,
    ToolCapability, ToolType,
};

/// A single event addressed to one bound protocol object of a client.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Pointer { object: ObjectId, message: PointerMessage },
    TabletSeat { object: ObjectId, message: TabletSeatMessage },
    Tablet { object: ObjectId, message: TabletMessage },
    TabletTool { object: ObjectId, message: TabletToolMessage },
}

impl OutboundMessage {
    pub fn object(&self) -> ObjectId {
        match self {
            OutboundMessage::Pointer { object, .. }
            | OutboundMessage::TabletSeat { object, .. }
            | OutboundMessage::Tablet { object, .. }
            | OutboundMessage::TabletTool { object, .. } => *object,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerMessage> {
        match self {
            OutboundMessage::Pointer { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn as_tablet_tool(&self) -> Option<&TabletToolMessage> {
        match self {
            OutboundMessage::TabletTool { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// `wl_pointer` events.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerMessage {
    Enter { serial: u32, surface: SurfaceId, sx: Fixed, sy: Fixed },
    Leave { serial: u32, surface: SurfaceId },
    Motion { time: u32, sx: Fixed, sy: Fixed },
    Button { serial: u32, time: u32, button: u32, state: ButtonState },
    Axis { time: u32, axis: Axis, value: Fixed },
    Frame,
    AxisSource(AxisSource),
    AxisStop { time: u32, axis: Axis },
    AxisDiscrete { axis: Axis, discrete: i32 },
    AxisValue120 { axis: Axis, value120: i32 },
    AxisRelativeDirection { axis: Axis, direction: AxisRelativeDirection },
}

/// `zwp_tablet_seat_v2` events. The id is the freshly created server-side object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabletSeatMessage {
    TabletAdded { id: ObjectId },
    ToolAdded { id: ObjectId },
}

/// `zwp_tablet_v2` events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabletMessage {
    Name(String),
    Id { vendor: u32, product: u32 },
    Path(String),
    Done,
    Removed,
}

/// `zwp_tablet_tool_v2` events.
#[derive(Debug, Clone, PartialEq)]
pub enum TabletToolMessage {
    Type(ToolType),
    HardwareSerial { hi: u32, lo: u32 },
    HardwareIdWacom { hi: u32, lo: u32 },
    Capability(ToolCapability),
    Done,
    Removed,
    ProximityIn { serial: u32, tablet: ObjectId, surface: SurfaceId },
    ProximityOut,
    Down { serial: u32 },
    Up,
    Motion { x: Fixed, y: Fixed },
    Pressure(u32),
    Distance(u32),
    Tilt { x: Fixed, y: Fixed },
    Rotation(Fixed),
    Slider(i32),
    Wheel { degrees: Fixed, clicks: i32 },
    Button { serial: u32, button: u32, state: ButtonState },
    Frame { time: u32 },
}

impl TabletToolMessage {
    /// Whether the message belongs to the static description sent before `done`.
    pub fn is_description(&self) -> bool {
        matches!(
            self,
            TabletToolMessage::Type(_)
                | TabletToolMessage::HardwareSerial { .. }
                | TabletToolMessage::HardwareIdWacom { .. }
                | TabletToolMessage::Capability(_)
                | TabletToolMessage::Done
        )
    }
}
