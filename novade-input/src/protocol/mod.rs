//! Client-protocol boundary.
//!
//! Everything the pipeline tells clients goes through [`ClientSink`] as an
//! [`OutboundMessage`] addressed to one bound protocol object. The actual wire
//! transport is owned by the compositor.

pub mod messages;

pub use messages::{
    OutboundMessage, PointerMessage, TabletMessage, TabletSeatMessage, TabletToolMessage,
};

use std::collections::VecDeque;

/// Identifies a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Identifies a surface. Surfaces themselves are owned by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A surface together with the client that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    pub id: SurfaceId,
    pub client: ClientId,
}

impl SurfaceHandle {
    pub fn new(id: SurfaceId, client: ClientId) -> Self {
        Self { id, client }
    }
}

/// A protocol object id within one client's object space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Allocates ids for objects created by the server (`tablet_added`, `tool_added`).
///
/// Server-side ids live in the upper half of the id space, as on the wire.
#[derive(Debug, Clone)]
pub struct ObjectIdAllocator {
    next: u32,
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self { next: 0xff00_0000 }
    }
}

impl ObjectIdAllocator {
    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next = self.next.checked_add(1).unwrap_or(0xff00_0000);
        id
    }
}

/// Signed 24.8 fixed-point number as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fixed(i32);

impl Fixed {
    pub fn from_f64(value: f64) -> Self {
        Fixed((value * 256.0).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 256.0
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Self {
        Fixed::from_f64(value)
    }
}

/// Monotonic event serial source. Zero is never handed out so it can mean "no serial".
#[derive(Debug, Clone)]
pub struct SerialCounter {
    next: u32,
}

impl Default for SerialCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SerialCounter {
    pub fn next_serial(&mut self) -> u32 {
        let serial = self.next;
        self.next = self.next.wrapping_add(1);
        if self.next == 0 {
            self.next = 1;
        }
        serial
    }
}

/// Mints serials for events addressed to a given client.
pub trait SerialSource {
    fn next_serial_for(&mut self, client: ClientId) -> u32;
}

impl SerialSource for SerialCounter {
    fn next_serial_for(&mut self, _client: ClientId) -> u32 {
        self.next_serial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    VerticalScroll,
    HorizontalScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSource {
    Wheel,
    Finger,
    Continuous,
    WheelTilt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRelativeDirection {
    Identical,
    Inverted,
}

/// Physical kind of a tablet tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolType {
    Pen,
    Eraser,
    Brush,
    Pencil,
    Airbrush,
    Finger,
    Mouse,
    Lens,
    Totem,
}

impl ToolType {
    /// Wire value of `zwp_tablet_tool_v2.type` (`BTN_TOOL_*` codes).
    /// Totems have no v2 code and are announced as pens.
    pub fn wire_code(self) -> u32 {
        match self {
            ToolType::Pen | ToolType::Totem => 0x140,
            ToolType::Eraser => 0x141,
            ToolType::Brush => 0x142,
            ToolType::Pencil => 0x143,
            ToolType::Airbrush => 0x144,
            ToolType::Finger => 0x145,
            ToolType::Mouse => 0x146,
            ToolType::Lens => 0x147,
        }
    }
}

/// One `zwp_tablet_tool_v2.capability` announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCapability {
    Tilt,
    Pressure,
    Distance,
    Rotation,
    Slider,
    Wheel,
}

/// Since-versions of optional `wl_pointer` events.
pub mod pointer_version {
    pub const FRAME: u32 = 5;
    pub const AXIS_SOURCE: u32 = 5;
    pub const AXIS_STOP: u32 = 5;
    pub const AXIS_DISCRETE: u32 = 5;
    pub const AXIS_VALUE120: u32 = 8;
    pub const AXIS_RELATIVE_DIRECTION: u32 = 9;
}

/// Receives every outbound protocol message.
pub trait ClientSink {
    fn send(&mut self, client: ClientId, message: OutboundMessage);
}

impl<S: ClientSink + ?Sized> ClientSink for &mut S {
    fn send(&mut self, client: ClientId, message: OutboundMessage) {
        (**self).send(client, message)
    }
}

/// A sink that keeps every message in order. Handy for tests and for
/// compositors that batch traffic before writing it out.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: VecDeque<(ClientId, OutboundMessage)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &(ClientId, OutboundMessage)> {
        self.messages.iter()
    }

    pub fn for_client(&self, client: ClientId) -> Vec<OutboundMessage> {
        self.messages
            .iter()
            .filter(|(c, _)| *c == client)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn take(&mut self) -> Vec<(ClientId, OutboundMessage)> {
        self.messages.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl ClientSink for RecordingSink {
    fn send(&mut self, client: ClientId, message: OutboundMessage) {
        tracing::trace!("RecordingSink: -> {:?} {:?}", client, message);
        self.messages.push_back((client, message));
    }
}
